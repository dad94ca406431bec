//! EAX (spec §4.5): CTR-mode encryption plus three OMAC instances keyed
//! apart by a `[0…0, i]` prefix block (nonce → N, header → H,
//! ciphertext → C), combined as `Tag = N ⊕ H ⊕ C`.

use crate::error::Result;
use crate::mac::OmacState;
use crate::modes::{CtrEndian, CtrState};
use crate::registry::CipherDescriptor;
use std::sync::Arc;
use zeroize::Zeroize;

fn prefix_block(block_size: usize, tag: u8) -> Vec<u8> {
    let mut b = vec![0u8; block_size];
    b[block_size - 1] = tag;
    b
}

pub struct EaxState {
    n: Vec<u8>,
    header_omac: OmacState,
    ct_omac: OmacState,
    ctr: CtrState,
}

impl EaxState {
    pub fn new(
        descriptor: Arc<dyn CipherDescriptor>,
        key: &[u8],
        rounds: u32,
        nonce: &[u8],
        header: &[u8],
    ) -> Result<Self> {
        let block_size = descriptor.block_size();

        // N = OMAC_0^K(nonce)
        let mut nonce_omac = OmacState::new(&descriptor, key, rounds)?;
        nonce_omac.process(&prefix_block(block_size, 0));
        nonce_omac.process(nonce);
        let mut n = vec![0u8; block_size];
        nonce_omac.finish(&mut n);

        // H = OMAC_1^K(header), left open for further eax_addheader calls
        let mut header_omac = OmacState::new(&descriptor, key, rounds)?;
        header_omac.process(&prefix_block(block_size, 1));
        if !header.is_empty() {
            header_omac.process(header);
        }

        let ctr = CtrState::new(descriptor.clone(), key, rounds, &n, CtrEndian::Big)?;

        // ct OMAC, keyed with prefix [0...0, 2]
        let mut ct_omac = OmacState::new(&descriptor, key, rounds)?;
        ct_omac.process(&prefix_block(block_size, 2));

        Ok(EaxState { n, header_omac, ct_omac, ctr })
    }

    /// Append more header bytes (spec: "Callers may append more header
    /// bytes between encrypt calls by feeding OMAC_H").
    pub fn add_header(&mut self, header: &[u8]) {
        self.header_omac.process(header);
    }

    pub fn encrypt(&mut self, data: &mut [u8]) {
        self.ctr.apply_keystream(data);
        self.ct_omac.process(data);
    }

    pub fn decrypt(&mut self, data: &mut [u8]) {
        self.ct_omac.process(data);
        self.ctr.apply_keystream(data);
    }

    /// Finish: Tag = N ⊕ Htag ⊕ Ctag, truncated to `out.len()`.
    pub fn finish(mut self, out: &mut [u8]) {
        let block_size = self.n.len();
        let mut ctag = vec![0u8; block_size];
        self.ct_omac.finish(&mut ctag);
        let mut htag = vec![0u8; block_size];
        self.header_omac.finish(&mut htag);

        let n = out.len().min(block_size);
        for i in 0..n {
            out[i] = self.n[i] ^ htag[i] ^ ctag[i];
        }
        ctag.zeroize();
        htag.zeroize();
    }
}

impl Drop for EaxState {
    fn drop(&mut self) {
        self.n.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ciphers::aes::AesDescriptor;
    use hex_literal::hex;

    fn desc() -> Arc<dyn CipherDescriptor> {
        Arc::new(AesDescriptor)
    }

    #[test]
    fn null_message_empty_nonce_and_header_matches_known_tag() {
        let key = hex!("000102030405060708090a0b0c0d0e0f");
        let state = EaxState::new(desc(), &key, 0, &[], &[]).unwrap();
        let mut tag = [0u8; 16];
        state.finish(&mut tag);
        assert_eq!(tag, hex!("9ad07e7dbff301f505de596b9615dfff"));
    }

    #[test]
    fn with_nonce_only_matches_known_tag() {
        let key = hex!("000102030405060708090a0b0c0d0e0f");
        let nonce = hex!("000102030405060708090a0b0c0d0e0f");
        let state = EaxState::new(desc(), &key, 0, &nonce, &[]).unwrap();
        let mut tag = [0u8; 16];
        state.finish(&mut tag);
        assert_eq!(tag, hex!("1ce10d3effd4cadbe2e44b58d60ab9ec"));
    }

    #[test]
    fn with_header_only_matches_known_tag() {
        let key = hex!("000102030405060708090a0b0c0d0e0f");
        let header = hex!("000102030405060708090a0b0c0d0e0f");
        let state = EaxState::new(desc(), &key, 0, &[], &header).unwrap();
        let mut tag = [0u8; 16];
        state.finish(&mut tag);
        assert_eq!(tag, hex!("3a698f7a270e51b0f65b3d3e47193cff"));
    }

    #[test]
    fn with_header_nonce_and_32_byte_message_matches_known_vectors() {
        let key = hex!("000102030405060708090a0b0c0d0e0f");
        let nonce = hex!("000102030405060708090a0b0c0d0e0f");
        let header = hex!("000102030405060708090a0b0c0d0e0f");
        let mut pt: Vec<u8> = (0u8..32).collect();
        let mut state = EaxState::new(desc(), &key, 0, &nonce, &header).unwrap();
        state.encrypt(&mut pt);
        let mut tag = [0u8; 16];
        state.finish(&mut tag);

        assert_eq!(
            pt,
            hex!("29d878d1a3be857b6fb8c8ea5950a778331fbf2ccf33986f35e8cf121dcb30bc").to_vec()
        );
        assert_eq!(tag, hex!("4fbe0338be1c8c7e1d7ae7e45b92c587"));
    }

    #[test]
    fn decrypt_inverts_encrypt_and_tag_matches() {
        let key = [0x42u8; 16];
        let nonce = [0x24u8; 16];
        let header = b"associated data";
        let mut pt: Vec<u8> = (0u8..50).collect();
        let original = pt.clone();

        let mut enc = EaxState::new(desc(), &key, 0, &nonce, header).unwrap();
        enc.encrypt(&mut pt);
        let mut tag = [0u8; 16];
        enc.finish(&mut tag);

        let mut dec = EaxState::new(desc(), &key, 0, &nonce, header).unwrap();
        dec.decrypt(&mut pt);
        let mut tag2 = [0u8; 16];
        dec.finish(&mut tag2);

        assert_eq!(pt, original);
        assert_eq!(tag, tag2);
    }
}
