//! Block-cipher modes of operation (spec §4.2).
//!
//! Each mode owns an `Arc<dyn CipherDescriptor>`, the cipher's key
//! schedule, a block length copied from the descriptor at construction,
//! and mode-specific scratch state (IV/counter buffer, keystream buffer
//! plus offset). The source validates a cipher-table index before every
//! call; here the index is replaced by holding the descriptor handle
//! itself, so there is nothing to re-validate — an invalid handle simply
//! can't be constructed (§9 redesign flag: capability interface instead
//! of an index into a function-pointer table).

pub mod cbc;
pub mod cfb;
pub mod ctr;
pub mod ecb;
pub mod ofb;

pub use cbc::CbcState;
pub use cfb::CfbState;
pub use ctr::{CtrEndian, CtrState};
pub use ecb::EcbState;
pub use ofb::OfbState;

use crate::error::{Error, Result};
use crate::registry::{CipherDescriptor, CipherState};
use std::sync::Arc;

/// Shared construction logic: build a key schedule from `descriptor`
/// and `key`, and record the cipher's block size. Every mode wraps this
/// and adds its own IV/counter/keystream state on top.
pub(crate) fn setup(
    descriptor: &Arc<dyn CipherDescriptor>,
    key: &[u8],
    rounds: u32,
) -> Result<(Box<dyn CipherState>, usize)> {
    let schedule = descriptor.setup(key, rounds)?;
    Ok((schedule, descriptor.block_size()))
}

pub(crate) fn check_block_len(buf: &[u8], block_size: usize) -> Result<()> {
    if buf.len() != block_size {
        return Err(Error::BufferOverflow);
    }
    Ok(())
}

pub(crate) fn xor_into(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.iter_mut().zip(src.iter()) {
        *d ^= *s;
    }
}
