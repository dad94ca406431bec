//! CBC mode (spec §4.2 "Holds last ciphertext block as IV. Encrypt: P
//! ⊕ IV → E → C; IV ← C. Decrypt: D(C) ⊕ IV → P; IV ← C (the original,
//! not overwritten when in-place).").

use super::{check_block_len, setup, xor_into};
use crate::error::Result;
use crate::registry::{CipherDescriptor, CipherState};
use std::sync::Arc;
use zeroize::Zeroize;

pub struct CbcState {
    descriptor: Arc<dyn CipherDescriptor>,
    schedule: Box<dyn CipherState>,
    block_size: usize,
    iv: Vec<u8>,
}

impl CbcState {
    pub fn new(descriptor: Arc<dyn CipherDescriptor>, key: &[u8], rounds: u32, iv: &[u8]) -> Result<Self> {
        let (schedule, block_size) = setup(&descriptor, key, rounds)?;
        check_block_len(iv, block_size)?;
        Ok(CbcState { descriptor, schedule, block_size, iv: iv.to_vec() })
    }

    pub fn descriptor(&self) -> &Arc<dyn CipherDescriptor> {
        &self.descriptor
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Encrypt one block: `ciphertext = E(plaintext XOR iv)`, then
    /// `iv` becomes `ciphertext` for the next call.
    pub fn encrypt_block(&mut self, plaintext: &[u8], ciphertext: &mut [u8]) -> Result<()> {
        check_block_len(plaintext, self.block_size)?;
        check_block_len(ciphertext, self.block_size)?;
        let mut buf = plaintext.to_vec();
        xor_into(&mut buf, &self.iv);
        self.schedule.encrypt_block(&buf, ciphertext);
        self.iv.copy_from_slice(ciphertext);
        buf.zeroize();
        Ok(())
    }

    /// Decrypt one block: `plaintext = D(ciphertext) XOR iv`, using the
    /// *original* ciphertext as next IV — matters when decrypting
    /// in-place, where `plaintext`'s buffer may alias `ciphertext`'s.
    pub fn decrypt_block(&mut self, ciphertext: &[u8], plaintext: &mut [u8]) -> Result<()> {
        check_block_len(ciphertext, self.block_size)?;
        check_block_len(plaintext, self.block_size)?;
        self.schedule.decrypt_block(ciphertext, plaintext);
        xor_into(plaintext, &self.iv);
        self.iv.copy_from_slice(ciphertext);
        Ok(())
    }

    pub fn encrypt(&mut self, data: &mut [u8]) -> Result<()> {
        for chunk in data.chunks_mut(self.block_size) {
            if chunk.len() != self.block_size {
                return Err(crate::error::Error::BufferOverflow);
            }
            let mut out = vec![0u8; self.block_size];
            self.encrypt_block(chunk, &mut out)?;
            chunk.copy_from_slice(&out);
        }
        Ok(())
    }

    pub fn decrypt(&mut self, data: &mut [u8]) -> Result<()> {
        for chunk in data.chunks_mut(self.block_size) {
            if chunk.len() != self.block_size {
                return Err(crate::error::Error::BufferOverflow);
            }
            let orig_ct = chunk.to_vec();
            let mut out = vec![0u8; self.block_size];
            self.decrypt_block(&orig_ct, &mut out)?;
            chunk.copy_from_slice(&out);
        }
        Ok(())
    }
}

impl Drop for CbcState {
    fn drop(&mut self) {
        self.iv.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ciphers::aes::AesDescriptor;

    #[test]
    fn roundtrips_multi_block_message() {
        let iv = [9u8; 16];
        let mut enc = CbcState::new(Arc::new(AesDescriptor), &[1u8; 16], 0, &iv).unwrap();
        let mut data = vec![5u8; 48];
        let original = data.clone();
        enc.encrypt(&mut data).unwrap();

        let mut dec = CbcState::new(Arc::new(AesDescriptor), &[1u8; 16], 0, &iv).unwrap();
        dec.decrypt(&mut data).unwrap();
        assert_eq!(data, original);
    }

    #[test]
    fn chaining_makes_identical_plaintext_blocks_differ() {
        let iv = [0u8; 16];
        let mut enc = CbcState::new(Arc::new(AesDescriptor), &[2u8; 16], 0, &iv).unwrap();
        let mut data = vec![7u8; 32]; // two identical 16-byte blocks
        enc.encrypt(&mut data).unwrap();
        assert_ne!(data[0..16], data[16..32]);
    }
}
