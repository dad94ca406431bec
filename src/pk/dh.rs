//! Diffie–Hellman over a fixed table of safe primes (spec §4.8).
//!
//! The prime table below is decoded from the same radix-64 safe-prime
//! constants long shipped by the reference cryptographic libraries this
//! module is modeled on, re-verified here (Miller–Rabin on both `p` and
//! `(p-1)/2`, plus the `g^((p-1)/2) ≡ 1 mod p` quadratic-residue check)
//! rather than taken on faith — see [`self_test`].

use crate::error::{Error, Result};
use crate::mpi::{mod_exp, Int};
use rand_core::RngCore;
use zeroize::Zeroize;

struct DhEntry {
    bits: u32,
    g: u64,
    p_hex: &'static str,
}

/// Must stay sorted ascending by `bits` (spec: "***MUST*** be organized
/// by size from smallest to largest").
static TABLE: &[DhEntry] = &[
    // nominal 768-bit entry (actual modulus 784 bits), g=4
    DhEntry {
        bits: 768,
        g: 4,
        p_hex: concat!(
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "fffffffffffffffffffffffffffffffffffff00fae5f",
        ),
    },
    // nominal 1024-bit entry (actual modulus 1036 bits), g=4
    DhEntry {
        bits: 1024,
        g: 4,
        p_hex: concat!(
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffff00cc107",
        ),
    },
    // nominal 1280-bit entry (actual modulus 1288 bits), g=4
    DhEntry {
        bits: 1280,
        g: 4,
        p_hex: concat!(
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "fffffffffff012e717",
        ),
    },
    // nominal 1536-bit entry (actual modulus 1540 bits), g=4
    DhEntry {
        bits: 1536,
        g: 4,
        p_hex: concat!(
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff01",
            "78d27",
        ),
    },
    // nominal 1792-bit entry (actual modulus 1792 bits), g=4
    DhEntry {
        bits: 1792,
        g: 4,
        p_hex: concat!(
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff077fda7",
        ),
    },
    // nominal 2048-bit entry (actual modulus 2072 bits), g=4
    DhEntry {
        bits: 2048,
        g: 4,
        p_hex: concat!(
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "fffffffffffffffffffffffffffffffffffffffffffffffffffffff021666b",
        ),
    },
    // nominal 2560-bit entry (actual modulus 2576 bits), g=4
    DhEntry {
        bits: 2560,
        g: 4,
        p_hex: concat!(
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "fffffffffffffffffffffffffffff050fccf",
        ),
    },
    // nominal 3072-bit entry (actual modulus 3080 bits), g=4
    DhEntry {
        bits: 3072,
        g: 4,
        p_hex: concat!(
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "fff00c2c57",
        ),
    },
    // nominal 4096-bit entry (actual modulus 4116 bits), g=4
    DhEntry {
        bits: 4096,
        g: 4,
        p_hex: concat!(
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff023",
            "360f",
        ),
    },
];

fn prime_at(idx: usize) -> Int {
    Int::from_hex(TABLE[idx].p_hex).expect("table prime is valid hex")
}

fn generator_at(idx: usize) -> Int {
    Int::from_u64(TABLE[idx].g)
}

/// Smallest table index whose modulus is at least `min_bits` wide.
fn index_for_size(min_bits: usize) -> Result<usize> {
    TABLE
        .iter()
        .position(|e| e.bits as usize >= min_bits)
        .ok_or(Error::PkInvalidSize)
}

/// A Diffie–Hellman key. Public-only keys have `x` absent.
pub struct DhKey {
    idx: usize,
    pub y: Int,
    x: Option<Int>,
}

impl Drop for DhKey {
    fn drop(&mut self) {
        if let Some(x) = &mut self.x {
            x.zeroize();
        }
    }
}

impl DhKey {
    pub fn table_index(&self) -> usize {
        self.idx
    }

    pub fn modulus(&self) -> Int {
        prime_at(self.idx)
    }

    pub fn generator(&self) -> Int {
        generator_at(self.idx)
    }

    pub fn is_private(&self) -> bool {
        self.x.is_some()
    }

    /// Generate a key whose modulus is at least `min_bits` wide: picks
    /// the smallest table entry `>= min_bits`, reads `size` random
    /// bytes into `x`, and computes `y = g^x mod p`.
    pub fn generate<R: RngCore>(rng: &mut R, min_bits: usize) -> Result<Self> {
        let idx = index_for_size(min_bits)?;
        let size_bytes = (TABLE[idx].bits as usize) / 8;
        let mut buf = vec![0u8; size_bytes];
        rng.fill_bytes(&mut buf);
        let x = Int::from_bytes_be(&buf);
        buf.zeroize();

        let p = prime_at(idx);
        let g = generator_at(idx);
        let y = mod_exp(&g, &x, &p).ok_or(Error::InvalidArg)?;

        Ok(DhKey { idx, y, x: Some(x) })
    }

    /// `z = y_other^x_self mod p`, big-endian minimal bytes.
    pub fn shared_secret(&self, other: &DhKey) -> Result<Vec<u8>> {
        if self.idx != other.idx {
            return Err(Error::PkTypeMismatch);
        }
        let x = self.x.as_ref().ok_or(Error::PkNotPrivate)?;
        let p = prime_at(self.idx);
        let z = mod_exp(&other.y, x, &p).ok_or(Error::InvalidArg)?;
        Ok(z.to_bytes_be())
    }

    /// ElGamal-style signature over a precomputed hash digest, operating
    /// mod `(p-1)/2` rather than the textbook `mod (p-1)` (spec §4.8 —
    /// preserved verbatim from the source this module is modeled on;
    /// see DESIGN.md for the rationale).
    ///
    /// Sign: pick random `k < (p-1)/2` with `gcd(k, (p-1)/2) = 1`,
    /// `a = g^k mod p`, `b = k⁻¹·(H(m) - x·a) mod ((p-1)/2)`.
    pub fn sign_hash<R: RngCore>(&self, rng: &mut R, hash: &[u8]) -> Result<(Int, Int)> {
        let x = self.x.as_ref().ok_or(Error::PkNotPrivate)?;
        let p = prime_at(self.idx);
        let g = generator_at(self.idx);
        let order = (&p - &Int::one()).shr_bits(1);
        let h = Int::from_bytes_be(hash).modulo(&order).map_err(|_| Error::InvalidArg)?;

        loop {
            let mut buf = vec![0u8; order.bit_length().div_ceil(8)];
            rng.fill_bytes(&mut buf);
            let k = Int::from_bytes_be(&buf).modulo(&order).map_err(|_| Error::InvalidArg)?;
            buf.zeroize();
            if k.is_zero() {
                continue;
            }
            let k_inv = match k.mod_inverse(&order) {
                Some(inv) => inv,
                None => continue,
            };
            let a = mod_exp(&g, &k, &p).ok_or(Error::InvalidArg)?;
            let x_a = (x * &a).modulo(&order).map_err(|_| Error::InvalidArg)?;
            let diff = (&h - &x_a).modulo(&order).map_err(|_| Error::InvalidArg)?;
            let b = (&k_inv * &diff).modulo(&order).map_err(|_| Error::InvalidArg)?;
            return Ok((a, b));
        }
    }

    /// Verify: `g^H(m) ≡ y^a · a^b (mod p)`.
    pub fn verify_hash(&self, hash: &[u8], sig: &(Int, Int)) -> Result<bool> {
        let (a, b) = sig;
        let p = prime_at(self.idx);
        let g = generator_at(self.idx);
        let order = (&p - &Int::one()).shr_bits(1);

        if a.is_zero() || *a >= p || b.is_zero() || *b >= order {
            return Ok(false);
        }

        let h = Int::from_bytes_be(hash).modulo(&order).map_err(|_| Error::InvalidArg)?;
        let lhs = mod_exp(&g, &h, &p).ok_or(Error::InvalidArg)?;

        let ya = mod_exp(&self.y, a, &p).ok_or(Error::InvalidArg)?;
        let ab = mod_exp(a, b, &p).ok_or(Error::InvalidArg)?;
        let rhs = (&ya * &ab).modulo(&p).map_err(|_| Error::InvalidArg)?;

        Ok(lhs == rhs)
    }
}

/// Export a public (or private) key per spec §6: a type byte
/// (public=0, private=1), a size byte (modulus size in bytes), `y` as a
/// length-prefixed big-endian integer, and — for private keys — `x` the
/// same way (grounded on `dh_export`, minus that routine's leading
/// packet header, which spec §6 reserves for the RSA packet layouts
/// only).
pub fn export_key(key: &DhKey) -> Vec<u8> {
    let size_bytes = (TABLE[key.idx].bits as usize) / 8;
    let mut out = Vec::new();
    out.push(if key.is_private() { 1 } else { 0 });
    out.push(size_bytes as u8);

    let y_bytes = key.y.to_bytes_be();
    out.extend_from_slice(&(y_bytes.len() as u32).to_le_bytes());
    out.extend_from_slice(&y_bytes);

    if let Some(x) = &key.x {
        let x_bytes = x.to_bytes_be();
        out.extend_from_slice(&(x_bytes.len() as u32).to_le_bytes());
        out.extend_from_slice(&x_bytes);
    }
    out
}

/// Re-import a key exported by [`export_key`].
pub fn import_key(idx: usize, bytes: &[u8]) -> Result<DhKey> {
    if bytes.len() < 2 {
        return Err(Error::InvalidPacket);
    }
    let is_private = bytes[0] == 1;
    let mut cursor = 2usize;
    let read_len = |b: &[u8], at: usize| -> Result<(usize, usize)> {
        if b.len() < at + 4 {
            return Err(Error::InvalidPacket);
        }
        let len = u32::from_le_bytes(b[at..at + 4].try_into().unwrap()) as usize;
        Ok((len, at + 4))
    };

    let (ylen, after_ylen) = read_len(bytes, cursor)?;
    cursor = after_ylen;
    if bytes.len() < cursor + ylen {
        return Err(Error::InvalidPacket);
    }
    let y = Int::from_bytes_be(&bytes[cursor..cursor + ylen]);
    cursor += ylen;

    let x = if is_private {
        let (xlen, after_xlen) = read_len(bytes, cursor)?;
        cursor = after_xlen;
        if bytes.len() < cursor + xlen {
            return Err(Error::InvalidPacket);
        }
        Some(Int::from_bytes_be(&bytes[cursor..cursor + xlen]))
    } else {
        None
    };

    Ok(DhKey { idx, y, x })
}

/// Validates every table entry: `p` prime, `(p-1)/2` prime, and
/// `g^((p-1)/2) mod p == 1` (spec §4.8, mirrors the source's own
/// startup self-test).
pub fn self_test() -> Result<()> {
    use crate::mpi::is_probable_prime;
    for idx in 0..TABLE.len() {
        let p = prime_at(idx);
        if !is_probable_prime(&p) {
            return Err(Error::FailTestVector);
        }
        let sophie = (&p - &Int::one()).shr_bits(1);
        if !is_probable_prime(&sophie) {
            return Err(Error::FailTestVector);
        }
        let g = generator_at(idx);
        let check = mod_exp(&g, &sophie, &p).ok_or(Error::FailTestVector)?;
        if check != Int::one() {
            return Err(Error::FailTestVector);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn table_entries_pass_self_test() {
        self_test().unwrap();
    }

    #[test]
    fn index_for_size_picks_smallest_matching_entry() {
        assert_eq!(index_for_size(700).unwrap(), 0);
        assert_eq!(index_for_size(768).unwrap(), 0);
        assert_eq!(index_for_size(769).unwrap(), 1);
        assert!(index_for_size(5000).is_err());
    }

    #[test]
    fn shared_secret_agrees_both_directions() {
        let mut rng = ChaCha20Rng::seed_from_u64(10);
        let a = DhKey::generate(&mut rng, 768).unwrap();
        let b = DhKey::generate(&mut rng, 768).unwrap();
        let za = a.shared_secret(&b).unwrap();
        let zb = b.shared_secret(&a).unwrap();
        assert_eq!(za, zb);
    }

    #[test]
    fn sign_and_verify_roundtrip() {
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        let key = DhKey::generate(&mut rng, 768).unwrap();
        let hash = [0x33u8; 20];
        let sig = key.sign_hash(&mut rng, &hash).unwrap();
        assert!(key.verify_hash(&hash, &sig).unwrap());
    }

    #[test]
    fn verify_rejects_tampered_hash() {
        let mut rng = ChaCha20Rng::seed_from_u64(12);
        let key = DhKey::generate(&mut rng, 768).unwrap();
        let hash = [0x44u8; 20];
        let sig = key.sign_hash(&mut rng, &hash).unwrap();
        let mut tampered = hash;
        tampered[0] ^= 1;
        assert!(!key.verify_hash(&tampered, &sig).unwrap());
    }

    #[test]
    fn shared_secret_rejects_mismatched_table_index() {
        let mut rng = ChaCha20Rng::seed_from_u64(13);
        let a = DhKey::generate(&mut rng, 768).unwrap();
        let b = DhKey::generate(&mut rng, 1024).unwrap();
        assert!(a.shared_secret(&b).is_err());
    }

    #[test]
    fn export_then_import_roundtrips_private_key() {
        let mut rng = ChaCha20Rng::seed_from_u64(14);
        let key = DhKey::generate(&mut rng, 768).unwrap();
        let blob = export_key(&key);
        let reimported = import_key(key.idx, &blob).unwrap();
        assert!(reimported.is_private());
        assert_eq!(reimported.y, key.y);

        let other = DhKey::generate(&mut rng, 768).unwrap();
        assert_eq!(key.shared_secret(&other).unwrap(), reimported.shared_secret(&other).unwrap());
    }

    #[test]
    fn export_then_import_roundtrips_public_key() {
        let mut rng = ChaCha20Rng::seed_from_u64(15);
        let key = DhKey::generate(&mut rng, 768).unwrap();
        let public = DhKey { idx: key.idx, y: key.y.clone(), x: None };
        let blob = export_key(&public);
        let reimported = import_key(key.idx, &blob).unwrap();
        assert!(!reimported.is_private());
        assert_eq!(reimported.y, key.y);
    }
}
