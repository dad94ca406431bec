//! AES descriptor (spec §1 out-of-scope collaborator, wired in here only
//! as the crate's default [`CipherDescriptor`]). Wraps RustCrypto's
//! `aes` crate rather than reimplementing FIPS-197's round functions:
//! individual cipher round functions stay out of scope, specified only
//! by the descriptor contract around them.

use crate::error::{Error, Result};
use crate::registry::{CipherDescriptor, CipherState, Descriptor};
use aes::cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes128, Aes192, Aes256};

/// Rounds AES uses for each key size, per FIPS-197 §5. `setup`'s `rounds`
/// argument (spec: "`setup(key, keylen, rounds, &state)`") must be either
/// 0 (meaning "use the default for this key size") or exactly this
/// value; AES has no variable round count to override.
fn default_rounds_for(key_len: usize) -> Option<u32> {
    match key_len {
        16 => Some(10),
        24 => Some(12),
        32 => Some(14),
        _ => None,
    }
}

enum AesSchedule {
    Aes128(Box<Aes128>),
    Aes192(Box<Aes192>),
    Aes256(Box<Aes256>),
}

impl CipherState for AesSchedule {
    fn encrypt_block(&self, input: &[u8], output: &mut [u8]) {
        let mut block = GenericArray::clone_from_slice(input);
        match self {
            AesSchedule::Aes128(c) => c.encrypt_block(&mut block),
            AesSchedule::Aes192(c) => c.encrypt_block(&mut block),
            AesSchedule::Aes256(c) => c.encrypt_block(&mut block),
        }
        output.copy_from_slice(&block);
    }

    fn decrypt_block(&self, input: &[u8], output: &mut [u8]) {
        let mut block = GenericArray::clone_from_slice(input);
        match self {
            AesSchedule::Aes128(c) => c.decrypt_block(&mut block),
            AesSchedule::Aes192(c) => c.decrypt_block(&mut block),
            AesSchedule::Aes256(c) => c.decrypt_block(&mut block),
        }
        output.copy_from_slice(&block);
    }
}

pub struct AesDescriptor;

impl Descriptor for AesDescriptor {
    fn name(&self) -> &'static str {
        "aes"
    }
    fn id(&self) -> u8 {
        0x01
    }
}

impl CipherDescriptor for AesDescriptor {
    fn min_key_size(&self) -> usize {
        16
    }
    fn max_key_size(&self) -> usize {
        32
    }
    fn block_size(&self) -> usize {
        16
    }
    fn default_rounds(&self) -> u32 {
        10
    }

    fn setup(&self, key: &[u8], rounds: u32) -> Result<Box<dyn CipherState>> {
        let expected = default_rounds_for(key.len()).ok_or(Error::InvalidKeySize)?;
        if rounds != 0 && rounds != expected {
            return Err(Error::InvalidRounds);
        }
        let schedule = match key.len() {
            16 => AesSchedule::Aes128(Box::new(Aes128::new(GenericArray::from_slice(key)))),
            24 => AesSchedule::Aes192(Box::new(Aes192::new(GenericArray::from_slice(key)))),
            32 => AesSchedule::Aes256(Box::new(Aes256::new(GenericArray::from_slice(key)))),
            _ => return Err(Error::InvalidKeySize),
        };
        Ok(Box::new(schedule))
    }

    fn keysize(&self, desired: usize) -> Result<usize> {
        match desired {
            0..=15 => Err(Error::InvalidKeySize),
            16..=23 => Ok(16),
            24..=31 => Ok(24),
            _ => Ok(32),
        }
    }

    fn test(&self) -> Result<()> {
        // FIPS-197 Appendix C.1 known-answer vector (AES-128).
        let mut key = [0u8; 16];
        for (i, b) in key.iter_mut().enumerate() {
            *b = i as u8;
        }
        let pt = [
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff,
        ];
        let expected_ct = [
            0x69, 0xc4, 0xe0, 0xd8, 0x6a, 0x7b, 0x04, 0x30, 0xd8, 0xcd, 0xb7, 0x80, 0x70, 0xb4, 0xc5, 0x5a,
        ];
        let schedule = self.setup(&key, 0)?;
        let mut ct = [0u8; 16];
        schedule.encrypt_block(&pt, &mut ct);
        if ct != expected_ct {
            return Err(Error::FailTestVector);
        }
        let mut back = [0u8; 16];
        schedule.decrypt_block(&ct, &mut back);
        if back != pt {
            return Err(Error::FailTestVector);
        }
        Ok(())
    }
}
