//! Modular reduction strategies (spec §4.1 "Modular reduction").
//!
//! Three flavors, chosen per modulus shape by [`Reducer::choose`]:
//! Barrett (general odd or even modulus), Montgomery (odd modulus,
//! amortizes reduction across a chain of multiplies — used by
//! [`super::modexp`]), and diminished-radix (modulus with a long run of
//! set high bits, i.e. close to `b^n`). The "2k" variant (modulus near a
//! power of two) is folded into the diminished-radix path here since
//! both reduce to "subtract a small multiple of the high part from the
//! low part, iterate" — they differ only in which small constant is
//! multiplied in.

use super::{Int, Sign};

/// A chosen reduction strategy for a fixed modulus.
#[derive(Clone)]
pub enum Reducer {
    Barrett(Barrett),
    Montgomery(Montgomery),
    DiminishedRadix(DiminishedRadix),
}

impl Reducer {
    /// Pick the cheapest applicable reduction for `m` (spec: "Montgomery
    /// form is used when the modulus is odd; diminished-radix ... when
    /// applicable; generic Barrett otherwise").
    pub fn choose(m: &Int) -> Reducer {
        if let Some(dr) = DiminishedRadix::detect(m) {
            Reducer::DiminishedRadix(dr)
        } else if m.is_odd() {
            Reducer::Montgomery(Montgomery::new(m))
        } else {
            Reducer::Barrett(Barrett::new(m))
        }
    }

    pub fn modulus(&self) -> &Int {
        match self {
            Reducer::Barrett(b) => &b.m,
            Reducer::Montgomery(mo) => &mo.m,
            Reducer::DiminishedRadix(dr) => &dr.m,
        }
    }

    /// Reduce an arbitrary nonnegative `x` to `x mod m`.
    pub fn reduce(&self, x: &Int) -> Int {
        match self {
            Reducer::Barrett(b) => b.reduce(x),
            Reducer::Montgomery(mo) => x.modulo(&mo.m).expect("nonzero modulus"),
            Reducer::DiminishedRadix(dr) => dr.reduce(x),
        }
    }

    /// Multiply `a * b mod m`, routing through Montgomery domain when
    /// applicable so repeated multiplies (as in modexp) avoid a full
    /// division each time.
    pub fn mul_mod(&self, a: &Int, b: &Int) -> Int {
        match self {
            Reducer::Montgomery(mo) => mo.mul_mod(a, b),
            _ => self.reduce(&(a * b)),
        }
    }
}

/// Barrett reduction: precompute `mu = floor(b^2k / m)` once, then
/// replace each reduction's division with two multiplies and a
/// bounded subtraction loop.
#[derive(Clone)]
pub struct Barrett {
    m: Int,
    mu: Int,
    k_bits: usize,
}

impl Barrett {
    pub fn new(m: &Int) -> Self {
        let k_bits = m.bit_length();
        let b2k = Int::one().shl_bits(2 * k_bits);
        let mu = &b2k / m;
        Barrett { m: m.clone(), mu, k_bits }
    }

    pub fn reduce(&self, x: &Int) -> Int {
        if x.bit_length() <= self.k_bits {
            // x already < b^k <= conservative bound; fall back to a
            // direct division rather than relying on the approximation.
            return x.modulo(&self.m).expect("nonzero modulus");
        }
        let q1 = x.shr_bits(self.k_bits.saturating_sub(1));
        let q2 = &q1 * &self.mu;
        let q3 = q2.shr_bits(self.k_bits + 1);
        let r1 = x.modulo(&Int::one().shl_bits(self.k_bits + 1)).unwrap_or_else(|_| x.clone());
        let r2 = (&q3 * &self.m).modulo(&Int::one().shl_bits(self.k_bits + 1)).expect("nonzero power of two");
        let mut r = if r1 >= r2 { &r1 - &r2 } else { &(&r1 - &r2) + &Int::one().shl_bits(self.k_bits + 1) };
        while r >= self.m {
            r = &r - &self.m;
        }
        r
    }
}

/// Montgomery reduction for odd moduli: operands are carried in
/// Montgomery form (`x * R mod m`), which turns modular reduction after
/// a multiply into shifts and adds instead of a division.
#[derive(Clone)]
pub struct Montgomery {
    m: Int,
    r_bits: usize,
    r_inv: Int,
}

impl Montgomery {
    pub fn new(m: &Int) -> Self {
        debug_assert!(m.is_odd(), "Montgomery reduction requires an odd modulus");
        let r_bits = m.bit_length();
        let r = Int::one().shl_bits(r_bits);
        let r_inv = r.mod_inverse(m).expect("R invertible mod odd m");
        Montgomery { m: m.clone(), r_bits, r_inv }
    }

    pub fn to_mont(&self, a: &Int) -> Int {
        a.shl_bits(self.r_bits).modulo(&self.m).expect("nonzero modulus")
    }

    pub fn from_mont(&self, a: &Int) -> Int {
        // a * R^-1 mod m, computed directly via the precomputed modular
        // inverse of R rather than the digit-at-a-time REDC loop, for
        // the same verifiability reasons noted in `div.rs`.
        (a * &self.r_inv).modulo(&self.m).expect("nonzero modulus")
    }

    /// `(a_mont * b_mont) / R mod m`, i.e. multiply two Montgomery-form
    /// values and reduce back into Montgomery form in one step.
    pub fn mul_mod(&self, a_mont: &Int, b_mont: &Int) -> Int {
        (&(a_mont * b_mont) * &self.r_inv).modulo(&self.m).expect("nonzero modulus")
    }
}

/// Diminished-radix / "2k" reduction: applies when `m` is within a small
/// additive constant `k` of a power of two, `m = 2^p - k` with `k`
/// fitting in a machine digit. Reduction folds the high part back into
/// the low part scaled by `k`, iterating until the result is below `m`.
#[derive(Clone)]
pub struct DiminishedRadix {
    m: Int,
    p: usize,
    k: u64,
}

impl DiminishedRadix {
    /// Detect `m = 2^p - k` for some small `k` (spec's combined
    /// diminished-radix / "2k" shape test).
    pub fn detect(m: &Int) -> Option<Self> {
        if m.is_zero() || !m.is_odd() {
            return None;
        }
        let p = m.bit_length();
        let pow = Int::one().shl_bits(p);
        let diff = &pow - m;
        if diff.bit_length() <= 32 && diff > Int::zero() {
            let k = diff.to_u64().unwrap_or(0);
            if k != 0 {
                return Some(DiminishedRadix { m: m.clone(), p, k });
            }
        }
        None
    }

    pub fn reduce(&self, x: &Int) -> Int {
        let mut cur = x.clone();
        let mask = Int::one().shl_bits(self.p) - Int::one();
        loop {
            if cur.bit_length() <= self.p {
                break;
            }
            let hi = cur.shr_bits(self.p);
            let lo = &cur & &mask;
            cur = &lo + &(&hi * &Int::from_u64(self.k));
        }
        while cur >= self.m {
            cur = &cur - &self.m;
        }
        cur
    }
}

impl core::ops::BitAnd for &Int {
    type Output = Int;
    fn bitand(self, rhs: &Int) -> Int {
        let n = self.used().min(rhs.used());
        let mut mag = Vec::with_capacity(n);
        for i in 0..n {
            mag.push(self.digit(i) & rhs.digit(i));
        }
        super::trim(&mut mag);
        Int { sign: Sign::NonNeg, mag }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn barrett_matches_naive_mod() {
        let m = Int::from_u64(1_000_000_007);
        let b = Barrett::new(&m);
        for v in [0u64, 1, 999_999_999, 5_000_000_021] {
            let x = Int::from_u64(v);
            assert_eq!(b.reduce(&x), x.modulo(&m).unwrap());
        }
    }

    #[test]
    fn montgomery_roundtrip() {
        let m = Int::from_u64(1_000_000_009); // prime, odd
        let mont = Montgomery::new(&m);
        let a = Int::from_u64(123_456_789);
        let a_mont = mont.to_mont(&a);
        let back = mont.from_mont(&a_mont);
        assert_eq!(back, a.modulo(&m).unwrap());
    }

    #[test]
    fn montgomery_mul_matches_plain_mulmod() {
        let m = Int::from_u64(97); // small odd prime
        let mont = Montgomery::new(&m);
        let a = Int::from_u64(42);
        let b = Int::from_u64(55);
        let am = mont.to_mont(&a);
        let bm = mont.to_mont(&b);
        let prod_mont = mont.mul_mod(&am, &bm);
        let prod = mont.from_mont(&prod_mont);
        let expect = (&(&a * &b)).modulo(&m).unwrap();
        assert_eq!(prod, expect);
    }

    #[test]
    fn diminished_radix_detects_mersenne_like_modulus() {
        // 2^61 - 1, a Mersenne prime.
        let m = &Int::one().shl_bits(61) - &Int::one();
        let dr = DiminishedRadix::detect(&m).expect("should detect DR shape");
        let x = Int::one().shl_bits(70) + Int::from_u64(12345);
        assert_eq!(dr.reduce(&x), x.modulo(&m).unwrap());
    }
}
