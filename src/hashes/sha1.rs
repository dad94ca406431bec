//! SHA-1 descriptor, wrapping RustCrypto's `sha1` crate. Registered as a
//! default hash mainly for RSA PKCS#1 v1.5 interoperability with legacy
//! signatures (spec §8 scenario: "RSA-1024 sign/verify").

use crate::error::{Error, Result};
use crate::registry::{Descriptor, HashDescriptor, HashState};
use sha1::{Digest, Sha1};

struct Sha1State(Sha1);

impl HashState for Sha1State {
    fn process(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn done(self: Box<Self>, out: &mut [u8]) {
        out.copy_from_slice(&self.0.finalize());
    }
}

pub struct Sha1Descriptor;

impl Descriptor for Sha1Descriptor {
    fn name(&self) -> &'static str {
        "sha1"
    }
    fn id(&self) -> u8 {
        0x10
    }
}

impl HashDescriptor for Sha1Descriptor {
    fn digest_size(&self) -> usize {
        20
    }
    fn block_size(&self) -> usize {
        64
    }

    fn init(&self) -> Box<dyn HashState> {
        Box::new(Sha1State(Sha1::new()))
    }

    fn test(&self) -> Result<()> {
        // FIPS 180-1 known-answer vector: SHA1("abc").
        let mut state = self.init();
        state.process(b"abc");
        let mut digest = [0u8; 20];
        state.done(&mut digest);
        let expected: [u8; 20] = [
            0xa9, 0x99, 0x3e, 0x36, 0x47, 0x06, 0x81, 0x6a, 0xba, 0x3e, 0x25, 0x71, 0x78, 0x50, 0xc2, 0x6c, 0x9c,
            0xd0, 0xd8, 0x9d,
        ];
        if digest != expected {
            return Err(Error::FailTestVector);
        }
        Ok(())
    }
}
