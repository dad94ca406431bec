//! ECB mode (spec §4.2 "Stateless per-block wrapper; encrypt/decrypt
//! dispatch to the descriptor."). No chaining state at all — included
//! for completeness and as the base every other mode is built from, not
//! for its own confidentiality properties.

use super::{check_block_len, setup};
use crate::error::Result;
use crate::registry::{CipherDescriptor, CipherState};
use std::sync::Arc;

pub struct EcbState {
    descriptor: Arc<dyn CipherDescriptor>,
    schedule: Box<dyn CipherState>,
    block_size: usize,
}

impl EcbState {
    pub fn new(descriptor: Arc<dyn CipherDescriptor>, key: &[u8], rounds: u32) -> Result<Self> {
        let (schedule, block_size) = setup(&descriptor, key, rounds)?;
        Ok(EcbState { descriptor, schedule, block_size })
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn descriptor(&self) -> &Arc<dyn CipherDescriptor> {
        &self.descriptor
    }

    pub fn encrypt_block(&self, input: &[u8], output: &mut [u8]) -> Result<()> {
        check_block_len(input, self.block_size)?;
        check_block_len(output, self.block_size)?;
        self.schedule.encrypt_block(input, output);
        Ok(())
    }

    pub fn decrypt_block(&self, input: &[u8], output: &mut [u8]) -> Result<()> {
        check_block_len(input, self.block_size)?;
        check_block_len(output, self.block_size)?;
        self.schedule.decrypt_block(input, output);
        Ok(())
    }

    /// Encrypt `data` in place, block by block. `data.len()` must be a
    /// multiple of the block size.
    pub fn encrypt(&self, data: &mut [u8]) -> Result<()> {
        for chunk in data.chunks_mut(self.block_size) {
            if chunk.len() != self.block_size {
                return Err(crate::error::Error::BufferOverflow);
            }
            let mut out = vec![0u8; self.block_size];
            self.schedule.encrypt_block(chunk, &mut out);
            chunk.copy_from_slice(&out);
        }
        Ok(())
    }

    pub fn decrypt(&self, data: &mut [u8]) -> Result<()> {
        for chunk in data.chunks_mut(self.block_size) {
            if chunk.len() != self.block_size {
                return Err(crate::error::Error::BufferOverflow);
            }
            let mut out = vec![0u8; self.block_size];
            self.schedule.decrypt_block(chunk, &mut out);
            chunk.copy_from_slice(&out);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ciphers::aes::AesDescriptor;

    #[test]
    fn roundtrips_multi_block_message() {
        let state = EcbState::new(Arc::new(AesDescriptor), &[0u8; 16], 0).unwrap();
        let mut data = vec![1u8; 48];
        let original = data.clone();
        state.encrypt(&mut data).unwrap();
        assert_ne!(data, original);
        state.decrypt(&mut data).unwrap();
        assert_eq!(data, original);
    }

    #[test]
    fn rejects_partial_block() {
        let state = EcbState::new(Arc::new(AesDescriptor), &[0u8; 16], 0).unwrap();
        let mut data = vec![1u8; 17];
        assert!(state.encrypt(&mut data).is_err());
    }
}
