//! Hash descriptor contract (spec §5 "Hash descriptor contract").

use super::Descriptor;
use crate::error::Result;

/// An in-progress hash computation.
pub trait HashState: Send {
    fn process(&mut self, data: &[u8]);
    /// Finalize and write the digest into `out`, consuming the state
    /// (the source's `done(&state, out)` that implicitly ends the
    /// state's lifetime once called).
    fn done(self: Box<Self>, out: &mut [u8]);
}

/// A registered hash algorithm.
pub trait HashDescriptor: Descriptor {
    fn digest_size(&self) -> usize;
    fn block_size(&self) -> usize;

    /// `init(&state)`: create a fresh hash state.
    fn init(&self) -> Box<dyn HashState>;

    /// Run the descriptor's embedded known-answer test.
    fn test(&self) -> Result<()>;
}
