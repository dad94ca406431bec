//! SHA-256 descriptor, wrapping RustCrypto's `sha2` crate (spec §8
//! scenario: "SHA-256 of 'abc' matches the FIPS 180-4 known-answer
//! value").

use crate::error::{Error, Result};
use crate::registry::{Descriptor, HashDescriptor, HashState};
use sha2::{Digest, Sha256};

struct Sha256State(Sha256);

impl HashState for Sha256State {
    fn process(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn done(self: Box<Self>, out: &mut [u8]) {
        out.copy_from_slice(&self.0.finalize());
    }
}

pub struct Sha256Descriptor;

impl Descriptor for Sha256Descriptor {
    fn name(&self) -> &'static str {
        "sha256"
    }
    fn id(&self) -> u8 {
        0x11
    }
}

impl HashDescriptor for Sha256Descriptor {
    fn digest_size(&self) -> usize {
        32
    }
    fn block_size(&self) -> usize {
        64
    }

    fn init(&self) -> Box<dyn HashState> {
        Box::new(Sha256State(Sha256::new()))
    }

    fn test(&self) -> Result<()> {
        let mut state = self.init();
        state.process(b"abc");
        let mut digest = [0u8; 32];
        state.done(&mut digest);
        let expected: [u8; 32] = [
            0xba, 0x78, 0x16, 0xbf, 0x8f, 0x01, 0xcf, 0xea, 0x41, 0x41, 0x40, 0xde, 0x5d, 0xae, 0x22, 0x23, 0xb0,
            0x03, 0x61, 0xa3, 0x96, 0x17, 0x7a, 0x9c, 0xb4, 0x10, 0xff, 0x61, 0xf2, 0x00, 0x15, 0xad,
        ];
        if digest != expected {
            return Err(Error::FailTestVector);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_test_passes() {
        Sha256Descriptor.test().unwrap();
    }

    #[test]
    fn digest_size_matches_output_len() {
        let d = Sha256Descriptor;
        let mut state = d.init();
        state.process(b"");
        let mut out = vec![0u8; d.digest_size()];
        state.done(&mut out);
        assert_eq!(out.len(), 32);
    }
}
