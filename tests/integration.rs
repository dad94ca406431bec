//! End-to-end scenarios exercising the public API the way an embedder
//! would: register descriptors once, then drive a whole primitive from
//! outside its own module.

use cryptocore::aead::{eax::EaxState, ocb};
use cryptocore::ciphers::aes::AesDescriptor;
use cryptocore::hashes::sha256::Sha256Descriptor;
use cryptocore::mpi::Int;
use cryptocore::modes::ecb::EcbState;
use cryptocore::pk::ecc::{self, EccKey};
use cryptocore::pk::rsa::{self, RsaKey, MIN_MODULUS_BYTES};
use cryptocore::registry::{CipherDescriptor, Descriptor, HashDescriptor};
use hex_literal::hex;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::sync::Arc;

#[test]
fn aes128_ecb_matches_fips_197_known_answer() {
    let key = hex!("000102030405060708090a0b0c0d0e0f");
    let pt = hex!("00112233445566778899aabbccddeeff");
    let state = EcbState::new(Arc::new(AesDescriptor), &key, 0).unwrap();
    let mut data = pt.to_vec();
    state.encrypt(&mut data).unwrap();
    assert_eq!(data, hex!("69c4e0d86a7b0430d8cdb78070b4c55a").to_vec());
    state.decrypt(&mut data).unwrap();
    assert_eq!(data, pt.to_vec());
}

#[test]
fn eax_aes128_32_byte_message_matches_known_vectors() {
    let key = hex!("000102030405060708090a0b0c0d0e0f");
    let nonce = hex!("000102030405060708090a0b0c0d0e0f");
    let header = hex!("000102030405060708090a0b0c0d0e0f");
    let mut pt: Vec<u8> = (0u8..32).collect();

    let mut state = EaxState::new(Arc::new(AesDescriptor), &key, 0, &nonce, &header).unwrap();
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
fn ocb_aes128_one_byte_message_matches_known_vectors() {
    let key = hex!("000102030405060708090a0b0c0d0e0f");
    let nonce = hex!("000102030405060708090a0b0c0d0e0f");
    let pt = hex!("11");
    let mut tag = [0u8; 16];
    let ct = ocb::encrypt_authenticate(&Arc::new(AesDescriptor), &key, 0, &nonce, &pt, &mut tag).unwrap();
    assert_eq!(ct, hex!("6f").to_vec());
    assert_eq!(tag, hex!("e261423ebb0e7f3ba6ddf13ee80b7b00"));
}

#[test]
fn sha256_of_abc_matches_fips_180_4_known_answer() {
    let desc = Sha256Descriptor;
    let mut state = desc.init();
    state.process(b"abc");
    let mut digest = [0u8; 32];
    state.done(&mut digest);
    assert_eq!(digest, hex!("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"));
}

#[test]
fn rsa1024_sign_and_verify_rejects_tampered_signature() {
    let mut rng = ChaCha20Rng::seed_from_u64(100);
    let key = RsaKey::generate(&mut rng, MIN_MODULUS_BYTES, &Int::from_u64(65537)).unwrap();
    let hash = [0x5Au8; 32];
    let mut sig = rsa::sign_hash(&key, &hash).unwrap();
    assert!(rsa::verify_hash(&key, &hash, &sig).unwrap());

    sig[sig.len() - 1] ^= 1;
    assert!(!rsa::verify_hash(&key, &hash, &sig).unwrap());
}

#[test]
fn ecc256_ecdh_agrees_and_public_export_roundtrips() {
    let mut rng = ChaCha20Rng::seed_from_u64(200);
    let alice = EccKey::generate(&mut rng, 256).unwrap();
    let bob = EccKey::generate(&mut rng, 256).unwrap();

    let alice_secret = alice.shared_secret(&bob).unwrap();
    let bob_secret = bob.shared_secret(&alice).unwrap();
    assert_eq!(alice_secret, bob_secret);

    let blob = ecc::export_point(&alice);
    let reimported = ecc::import_point(alice.table_index(), &blob).unwrap();
    assert!(!reimported.is_private());
    assert_eq!(bob.shared_secret(&reimported).unwrap(), alice_secret);
}

#[test]
fn aes_descriptor_reports_expected_sizes() {
    let desc = AesDescriptor;
    assert_eq!(desc.name(), "aes");
    assert_eq!(desc.block_size(), 16);
    assert_eq!(desc.min_key_size(), 16);
    assert_eq!(desc.max_key_size(), 32);
}
