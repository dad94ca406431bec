//! OS-entropy-backed PRNG descriptor, wrapping `rand::rngs::OsRng`
//! rather than a from-scratch Yarrow/Fortuna/SPRNG implementation (spec
//! §1 names those out of scope; this crate's "PRNG" is just the default
//! collaborator behind the descriptor contract).

use crate::error::Result;
use crate::registry::{Descriptor, PrngDescriptor, PrngState};
use rand::rngs::OsRng;
use rand_core::RngCore;

struct OsPrngState {
    rng: OsRng,
    seeded: bool,
}

impl PrngState for OsPrngState {
    /// The OS entropy source needs no externally supplied entropy;
    /// `add_entropy` only flips the descriptor's readiness flag, mirroring
    /// the source's contract where a PRNG is "ready" once it has
    /// received at least one entropy addition.
    fn add_entropy(&mut self, _buf: &[u8]) {
        self.seeded = true;
    }

    fn ready(&self) -> bool {
        self.seeded
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        self.rng.fill_bytes(buf);
        buf.len()
    }
}

pub struct OsPrngDescriptor;

impl Descriptor for OsPrngDescriptor {
    fn name(&self) -> &'static str {
        "os"
    }
    fn id(&self) -> u8 {
        0x20
    }
}

impl PrngDescriptor for OsPrngDescriptor {
    fn start(&self) -> Box<dyn PrngState> {
        Box::new(OsPrngState { rng: OsRng, seeded: false })
    }

    fn test(&self) -> Result<()> {
        let mut state = self.start();
        state.add_entropy(&[]);
        let mut buf = [0u8; 32];
        let n = state.read(&mut buf);
        debug_assert_eq!(n, buf.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unseeded_state_is_not_ready() {
        let state = OsPrngDescriptor.start();
        assert!(!state.ready());
    }

    #[test]
    fn read_fills_entire_buffer() {
        let mut state = OsPrngDescriptor.start();
        state.add_entropy(b"ignored");
        assert!(state.ready());
        let mut buf = [0u8; 16];
        assert_eq!(state.read(&mut buf), 16);
    }
}
