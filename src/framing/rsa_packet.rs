//! RSA encrypted-key and signature packet layouts (spec §6).
//!
//! The encrypted-key packet wraps a freshly generated random secret `z`
//! rather than the key material itself: `z` is sandwich-padded and
//! raised under the recipient's public key to form the packet's blob
//! field, then `hash(z)` is XORed with the real key to produce
//! `xored_key`. This is the same envelope shape the ECC/DH encrypted-key
//! packets use (an ephemeral value feeds a KDF whose output masks the
//! real key) adapted to RSA, which has no native shared-secret
//! agreement between two independent keypairs.

use super::{read_len, store_header, valid_header, SECTION_RSA, SUBSECTION_ENC_KEY, SUBSECTION_SIGNED};
use crate::error::{Error, Result};
use crate::mpi::Int;
use crate::pk::rsa::{sandwich_depad, sandwich_pad, sign_hash, verify_hash, RsaKey};
use rand_core::RngCore;

fn hash_with_id(hash_id: u8, data: &[u8]) -> Result<Vec<u8>> {
    let desc = crate::registry::hashes().find_by_id(hash_id).ok_or(Error::PkNotFound)?;
    let mut state = desc.init();
    state.process(data);
    let mut out = vec![0u8; desc.digest_size()];
    state.done(&mut out);
    Ok(out)
}

fn hash_digest_size(hash_id: u8) -> Result<usize> {
    let desc = crate::registry::hashes().find_by_id(hash_id).ok_or(Error::PkNotFound)?;
    Ok(desc.digest_size())
}

/// Build an encrypted-key packet: `header(4) || hash_id(1) || bloblen(4)
/// || blob || keylen(4) || xored_key`.
pub fn build_encrypted_key_packet<R: RngCore>(
    rng: &mut R,
    recipient: &RsaKey,
    hash_id: u8,
    key: &[u8],
) -> Result<Vec<u8>> {
    let digest_size = hash_digest_size(hash_id)?;
    let mut z = vec![0u8; digest_size];
    rng.fill_bytes(&mut z);

    let padded = sandwich_pad(rng, &z)?;
    let x = Int::from_bytes_be(&padded);
    let blob = recipient.public_op(&x)?.to_bytes_be();

    let mask = hash_with_id(hash_id, &z)?;
    if mask.len() != key.len() {
        return Err(Error::InvalidArg);
    }
    let xored_key: Vec<u8> = key.iter().zip(mask.iter()).map(|(a, b)| a ^ b).collect();

    let mut out = store_header(SECTION_RSA, SUBSECTION_ENC_KEY).to_vec();
    out.push(hash_id);
    out.extend_from_slice(&(blob.len() as u32).to_le_bytes());
    out.extend_from_slice(&blob);
    out.extend_from_slice(&(xored_key.len() as u32).to_le_bytes());
    out.extend_from_slice(&xored_key);
    Ok(out)
}

/// Open an encrypted-key packet built by [`build_encrypted_key_packet`].
pub fn open_encrypted_key_packet(recipient: &RsaKey, packet: &[u8]) -> Result<Vec<u8>> {
    valid_header(packet, SECTION_RSA, SUBSECTION_ENC_KEY)?;
    if packet.len() < 5 {
        return Err(Error::InvalidPacket);
    }
    let hash_id = packet[4];
    let (bloblen, after_bloblen) = read_len(packet, 5)?;
    if packet.len() < after_bloblen + bloblen {
        return Err(Error::InvalidPacket);
    }
    let blob = &packet[after_bloblen..after_bloblen + bloblen];
    let after_blob = after_bloblen + bloblen;

    let (keylen, after_keylen) = read_len(packet, after_blob)?;
    if packet.len() < after_keylen + keylen {
        return Err(Error::InvalidPacket);
    }
    let xored_key = &packet[after_keylen..after_keylen + keylen];

    let x = Int::from_bytes_be(blob);
    let padded = recipient.private_op(&x)?.to_bytes_be();
    let z = sandwich_depad(&padded)?;

    let mask = hash_with_id(hash_id, &z)?;
    if mask.len() != xored_key.len() {
        return Err(Error::InvalidPacket);
    }
    Ok(xored_key.iter().zip(mask.iter()).map(|(a, b)| a ^ b).collect())
}

/// Build a signature packet: `header(4) || hash_id(1) || siglen(4) ||
/// sig`.
pub fn build_signature_packet(key: &RsaKey, hash_id: u8, hash: &[u8]) -> Result<Vec<u8>> {
    let sig = sign_hash(key, hash)?;
    let mut out = store_header(SECTION_RSA, SUBSECTION_SIGNED).to_vec();
    out.push(hash_id);
    out.extend_from_slice(&(sig.len() as u32).to_le_bytes());
    out.extend_from_slice(&sig);
    Ok(out)
}

/// Verify a signature packet built by [`build_signature_packet`] over
/// the given digest.
pub fn verify_signature_packet(key: &RsaKey, packet: &[u8], hash: &[u8]) -> Result<bool> {
    valid_header(packet, SECTION_RSA, SUBSECTION_SIGNED)?;
    if packet.len() < 5 {
        return Err(Error::InvalidPacket);
    }
    let (siglen, after_siglen) = read_len(packet, 5)?;
    if packet.len() < after_siglen + siglen {
        return Err(Error::InvalidPacket);
    }
    let sig = &packet[after_siglen..after_siglen + siglen];
    verify_hash(key, hash, sig)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashes::sha256::Sha256Descriptor;
    use crate::pk::rsa::MIN_MODULUS_BYTES;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    const SHA256_ID: u8 = 0x11;

    fn ensure_sha256_registered() {
        let _ = crate::registry::hashes().register(std::sync::Arc::new(Sha256Descriptor));
    }

    fn test_key(rng: &mut ChaCha20Rng) -> RsaKey {
        RsaKey::generate(rng, MIN_MODULUS_BYTES, &Int::from_u64(65537)).unwrap()
    }

    #[test]
    fn encrypted_key_packet_roundtrips() {
        ensure_sha256_registered();
        let mut rng = ChaCha20Rng::seed_from_u64(20);
        let key = test_key(&mut rng);
        let secret_key = [0x5Au8; 32];
        let packet = build_encrypted_key_packet(&mut rng, &key, SHA256_ID, &secret_key).unwrap();
        let recovered = open_encrypted_key_packet(&key, &packet).unwrap();
        assert_eq!(recovered, secret_key);
    }

    #[test]
    fn encrypted_key_packet_rejects_wrong_recipient() {
        ensure_sha256_registered();
        let mut rng = ChaCha20Rng::seed_from_u64(21);
        let key = test_key(&mut rng);
        let other = test_key(&mut rng);
        let secret_key = [0x7Bu8; 32];
        let packet = build_encrypted_key_packet(&mut rng, &key, SHA256_ID, &secret_key).unwrap();
        assert!(open_encrypted_key_packet(&other, &packet).is_err());
    }

    #[test]
    fn signature_packet_roundtrips() {
        let mut rng = ChaCha20Rng::seed_from_u64(22);
        let key = test_key(&mut rng);
        let hash = [0x42u8; 32];
        let packet = build_signature_packet(&key, SHA256_ID, &hash).unwrap();
        assert!(verify_signature_packet(&key, &packet, &hash).unwrap());
    }

    #[test]
    fn signature_packet_rejects_tampered_hash() {
        let mut rng = ChaCha20Rng::seed_from_u64(23);
        let key = test_key(&mut rng);
        let mut hash = [0x42u8; 32];
        let packet = build_signature_packet(&key, SHA256_ID, &hash).unwrap();
        hash[0] ^= 1;
        assert!(!verify_signature_packet(&key, &packet, &hash).unwrap());
    }

    #[test]
    fn signature_packet_rejects_bad_header() {
        let mut rng = ChaCha20Rng::seed_from_u64(24);
        let key = test_key(&mut rng);
        let hash = [0x42u8; 32];
        let mut packet = build_signature_packet(&key, SHA256_ID, &hash).unwrap();
        packet[2] = SECTION_RSA + 1;
        assert!(verify_signature_packet(&key, &packet, &hash).is_err());
    }
}
