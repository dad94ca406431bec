//! PRNG descriptor contract (spec §5 "PRNG descriptor contract").

use super::Descriptor;
use crate::error::Result;

/// An in-progress PRNG instance, seeded via [`PrngState::add_entropy`]
/// before it is ready to [`PrngState::read`] from.
pub trait PrngState: Send {
    fn add_entropy(&mut self, buf: &[u8]);
    fn ready(&self) -> bool;
    /// Fill `buf`, returning the number of bytes actually written
    /// (spec: "`read(buf, len, &state) -> bytes_actually_written`").
    fn read(&mut self, buf: &mut [u8]) -> usize;
}

/// A registered PRNG algorithm.
pub trait PrngDescriptor: Descriptor {
    /// `start(&state)`: create a fresh, unseeded PRNG instance.
    fn start(&self) -> Box<dyn PrngState>;

    /// Run the descriptor's embedded known-answer/self test.
    fn test(&self) -> Result<()>;
}
