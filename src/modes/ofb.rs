//! OFB mode (spec §4.2 "Similar [to CFB] but feedback is the raw
//! keystream, independent of plaintext.").

use super::setup;
use crate::error::Result;
use crate::registry::{CipherDescriptor, CipherState};
use std::sync::Arc;
use zeroize::Zeroize;

pub struct OfbState {
    descriptor: Arc<dyn CipherDescriptor>,
    schedule: Box<dyn CipherState>,
    block_size: usize,
    pad: Vec<u8>,
    offset: usize,
}

impl OfbState {
    pub fn new(descriptor: Arc<dyn CipherDescriptor>, key: &[u8], rounds: u32, iv: &[u8]) -> Result<Self> {
        let (schedule, block_size) = setup(&descriptor, key, rounds)?;
        if iv.len() != block_size {
            return Err(crate::error::Error::BufferOverflow);
        }
        let mut pad = vec![0u8; block_size];
        schedule.encrypt_block(iv, &mut pad);
        Ok(OfbState { descriptor, schedule, block_size, pad, offset: 0 })
    }

    pub fn descriptor(&self) -> &Arc<dyn CipherDescriptor> {
        &self.descriptor
    }

    fn refill(&mut self) {
        let prev = self.pad.clone();
        self.schedule.encrypt_block(&prev, &mut self.pad);
        self.offset = 0;
    }

    /// Encrypt and decrypt are the same operation in OFB: XOR with the
    /// keystream, which never depends on plaintext or ciphertext.
    pub fn apply_keystream(&mut self, data: &mut [u8]) {
        for byte in data.iter_mut() {
            if self.offset == self.block_size {
                self.refill();
            }
            *byte ^= self.pad[self.offset];
            self.offset += 1;
        }
    }
}

impl Drop for OfbState {
    fn drop(&mut self) {
        self.pad.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ciphers::aes::AesDescriptor;

    #[test]
    fn encrypt_then_encrypt_again_recovers_plaintext() {
        let key = [6u8; 16];
        let iv = [2u8; 16];
        let mut a = OfbState::new(Arc::new(AesDescriptor), &key, 0, &iv).unwrap();
        let mut data: Vec<u8> = (0u8..35).collect();
        let original = data.clone();
        a.apply_keystream(&mut data);
        assert_ne!(data, original);

        let mut b = OfbState::new(Arc::new(AesDescriptor), &key, 0, &iv).unwrap();
        b.apply_keystream(&mut data);
        assert_eq!(data, original);
    }

    #[test]
    fn keystream_independent_of_plaintext() {
        let key = [6u8; 16];
        let iv = [2u8; 16];
        let mut a = OfbState::new(Arc::new(AesDescriptor), &key, 0, &iv).unwrap();
        let mut b = OfbState::new(Arc::new(AesDescriptor), &key, 0, &iv).unwrap();
        let mut zeros = vec![0u8; 20];
        let mut ones = vec![0xFFu8; 20];
        a.apply_keystream(&mut zeros);
        b.apply_keystream(&mut ones);
        // keystream = ciphertext XOR plaintext; recover and compare
        let ks_a: Vec<u8> = zeros.iter().map(|c| c ^ 0).collect();
        let ks_b: Vec<u8> = ones.iter().map(|c| c ^ 0xFF).collect();
        assert_eq!(ks_a, ks_b);
    }
}
