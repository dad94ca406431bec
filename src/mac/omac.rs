//! OMAC / CMAC (spec §4.3).

use super::{gf_double, xor_blocks};
use crate::error::Result;
use crate::registry::{CipherDescriptor, CipherState};
use std::sync::Arc;
use zeroize::Zeroize;

pub struct OmacState {
    schedule: Box<dyn CipherState>,
    block_size: usize,
    lu: [Vec<u8>; 2],
    prev: Vec<u8>,
    buf: Vec<u8>,
    buf_len: usize,
}

impl OmacState {
    pub fn new(descriptor: &Arc<dyn CipherDescriptor>, key: &[u8], rounds: u32) -> Result<Self> {
        let schedule = descriptor.setup(key, rounds)?;
        let block_size = descriptor.block_size();
        let zero = vec![0u8; block_size];
        let mut l = vec![0u8; block_size];
        schedule.encrypt_block(&zero, &mut l);
        let lu0 = gf_double(&l);
        let lu1 = gf_double(&lu0);
        Ok(OmacState {
            schedule,
            block_size,
            lu: [lu0, lu1],
            prev: zero,
            buf: Vec::with_capacity(block_size),
            buf_len: 0,
        })
    }

    /// Buffer bytes until a full block is available; on overflow, XOR
    /// the buffered block into `prev`, encrypt, and replace `prev`. The
    /// final block is always held back, since padding/subkey choice
    /// depends on whether it turns out to be full (spec: "The *final*
    /// block is held back, never processed during `process`").
    pub fn process(&mut self, mut data: &[u8]) {
        while !data.is_empty() {
            if self.buf_len == self.block_size {
                let block = xor_blocks(&self.prev, &self.buf);
                let mut out = vec![0u8; self.block_size];
                self.schedule.encrypt_block(&block, &mut out);
                self.prev = out;
                self.buf.clear();
                self.buf_len = 0;
            }
            let take = (self.block_size - self.buf_len).min(data.len());
            self.buf.extend_from_slice(&data[..take]);
            self.buf_len += take;
            data = &data[take..];
        }
    }

    /// Finalize: pad/select subkey for the held-back final block, XOR
    /// with `prev`, encrypt, and write the full-size tag to `out`
    /// (truncate at the call site if a shorter tag is wanted).
    pub fn finish(mut self, out: &mut [u8]) {
        let mut last = self.buf.clone();
        let subkey = if self.buf_len == self.block_size {
            &self.lu[0]
        } else {
            last.push(0x80);
            last.resize(self.block_size, 0x00);
            &self.lu[1]
        };
        let mut block = xor_blocks(&last, subkey);
        block = xor_blocks(&block, &self.prev);
        let mut tag = vec![0u8; self.block_size];
        self.schedule.encrypt_block(&block, &mut tag);
        let n = out.len().min(tag.len());
        out[..n].copy_from_slice(&tag[..n]);
        tag.zeroize();
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }
}

impl Drop for OmacState {
    fn drop(&mut self) {
        self.prev.zeroize();
        self.buf.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ciphers::aes::AesDescriptor;

    fn mac(key: &[u8], msg: &[u8]) -> Vec<u8> {
        let desc: Arc<dyn CipherDescriptor> = Arc::new(AesDescriptor);
        let mut state = OmacState::new(&desc, key, 0).unwrap();
        state.process(msg);
        let mut tag = vec![0u8; 16];
        state.finish(&mut tag);
        tag
    }

    #[test]
    fn empty_message_tag_is_deterministic() {
        let key = [0u8; 16];
        assert_eq!(mac(&key, b""), mac(&key, b""));
    }

    #[test]
    fn different_messages_give_different_tags() {
        let key = [1u8; 16];
        assert_ne!(mac(&key, b"hello"), mac(&key, b"world"));
    }

    #[test]
    fn message_exactly_one_block_long() {
        let key = [2u8; 16];
        let msg = [7u8; 16];
        let t1 = mac(&key, &msg);
        assert_eq!(t1.len(), 16);
    }

    #[test]
    fn multi_block_message_with_partial_tail() {
        let key = [3u8; 16];
        let msg = vec![9u8; 40]; // two full blocks + 8-byte tail
        let t = mac(&key, &msg);
        assert_eq!(t.len(), 16);
        // changing the tail changes the tag
        let mut msg2 = msg.clone();
        msg2[39] ^= 1;
        assert_ne!(t, mac(&key, &msg2));
    }
}
