//! Multiplication and squaring (spec §4.1 "Multiply"/"Square").
//!
//! Three algorithms are dispatched on operand size, same as the source:
//! a column-accumulating schoolbook pass ("Comba" naming — the
//! column-array trick Comba describes is exactly full-column
//! accumulation before a single carry propagation pass, which is what
//! [`comba_mul`] below does), Karatsuba above [`KARATSUBA_MUL_CUTOFF`],
//! and three-way Toom–Cook above [`TOOM_MUL_CUTOFF`].

use super::{trim, Digit, Int, Sign, Word, DIGIT_BITS, DIGIT_MASK};
use core::ops::Mul;

/// Digit-count threshold above which Karatsuba replaces the column pass.
pub const KARATSUBA_MUL_CUTOFF: usize = 80;

/// Digit-count threshold above which Toom-Cook 3-way replaces Karatsuba.
pub const TOOM_MUL_CUTOFF: usize = 350;

/// Column-accumulating schoolbook multiply: for each output column,
/// every digit pair contributing to it is summed (in a `u128` so no
/// intermediate carry propagation is needed mid-column), then the carry
/// is folded into the next column once the column total is known.
fn comba_mul(a: &[Digit], b: &[Digit]) -> Vec<Digit> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let n = a.len() + b.len();
    let mut out = vec![0 as Digit; n];
    let mut carry: u128 = 0;
    for col in 0..n {
        let mut acc: u128 = carry;
        let lo = col.saturating_sub(b.len() - 1);
        let hi = col.min(a.len() - 1);
        if lo <= hi {
            for i in lo..=hi {
                let j = col - i;
                acc += a[i] as u128 * b[j] as u128;
            }
        }
        out[col] = (acc & DIGIT_MASK as u128) as Digit;
        carry = acc >> DIGIT_BITS;
    }
    trim(&mut out);
    out
}

/// Karatsuba: split each operand at digit `b = min(len)/2`, reducing
/// three full-size multiplications to three half-size ones plus cheap
/// adds/shifts.
fn karatsuba_mul(a: &[Digit], b: &[Digit]) -> Vec<Digit> {
    let n = a.len().min(b.len());
    if n < KARATSUBA_MUL_CUTOFF {
        return comba_mul(a, b);
    }
    let split = n / 2;

    let (a0, a1) = split_at(a, split);
    let (b0, b1) = split_at(b, split);

    let z0 = mul_mag(a0, b0);
    let z2 = mul_mag(a1, b1);

    let a_sum = add_digits(a0, a1);
    let b_sum = add_digits(b0, b1);
    let z1_full = mul_mag(&a_sum, &b_sum);
    let z1 = sub_digits(&sub_digits(&z1_full, &z0), &z2);

    let mut out = vec![0 as Digit; a.len() + b.len()];
    add_into(&mut out, &z0, 0);
    add_into(&mut out, &z1, split);
    add_into(&mut out, &z2, split * 2);
    trim(&mut out);
    out
}

/// Toom-Cook 3-way: split each operand into three limbs, evaluate both
/// at 0, 1, -1, 2, infinity, multiply pointwise (5 half-size products
/// instead of Karatsuba's recursive tree), then interpolate back.
fn toom3_mul(a: &[Digit], b: &[Digit]) -> Vec<Digit> {
    let n = a.len().min(b.len());
    if n < TOOM_MUL_CUTOFF {
        return karatsuba_mul(a, b);
    }
    let k = (a.len().max(b.len()) + 2) / 3;

    let a_limbs = limbs3(a, k);
    let b_limbs = limbs3(b, k);

    // Evaluation points: -1, 0, 1, 2, infinity.
    let eval = |l: &[Vec<Digit>; 3], x: i64| -> Int {
        let (l0, l1, l2) = (digits_to_int(&l[0]), digits_to_int(&l[1]), digits_to_int(&l[2]));
        match x {
            0 => l0,
            1 => &(&l0 + &l1) + &l2,
            -1 => &(&l0 - &l1) + &l2,
            2 => &(&l0 + &l1.shl_bits(1)) + &l2.shl_bits(2),
            _ => l2, // "infinity": leading coefficient
        }
    };

    let av = [eval(&a_limbs, 0), eval(&a_limbs, 1), eval(&a_limbs, -1), eval(&a_limbs, 2), eval(&a_limbs, i64::MAX)];
    let bv = [eval(&b_limbs, 0), eval(&b_limbs, 1), eval(&b_limbs, -1), eval(&b_limbs, 2), eval(&b_limbs, i64::MAX)];

    let p: Vec<Int> = av.iter().zip(bv.iter()).map(|(x, y)| mul_int(x, y)).collect();
    let (r0, r1, rm1, r2, r4) = (&p[0], &p[1], &p[2], &p[3], &p[4]);

    // Standard 5-point Toom-3 interpolation. With r(x) = c0 + c1 x + c2 x^2
    // + c3 x^3 + c4 x^4 evaluated at x = 0, 1, -1, 2, inf:
    //   c0 = r0, c4 = r(inf)
    //   t  = (r1 - r(-1)) / 2           = c1 + c3
    //   c2 = (r1 + r(-1)) / 2 - c0 - c4
    //   c3 = (r2 - c0 - 16 c4 - 4 c2 - 2 t) / 6
    //   c1 = t - c3
    let c0 = r0.clone();
    let c4 = r4.clone();
    let t = div_exact_by_small(&(r1 - rm1), 2);
    let c2 = &div_exact_by_small(&(r1 + rm1), 2) - &(&c0 + &c4);
    let sixteen_c4 = c4.shl_bits(4);
    let four_c2 = c2.shl_bits(2);
    let two_t = t.shl_bits(1);
    let numerator = &(&(&(r2 - &c0) - &sixteen_c4) - &four_c2) - &two_t;
    let c3 = div_exact_by_small(&numerator, 6);
    let c1 = &t - &c3;

    let coeffs = [c0, c1, c2, c3, c4];
    let mut acc = Int::zero();
    for c in coeffs.into_iter().rev() {
        acc = acc.shl_digits(k) + c;
    }
    trim_to_mag(acc)
}

fn trim_to_mag(v: Int) -> Vec<Digit> {
    let mut mag = v.mag;
    trim(&mut mag);
    mag
}

fn div_exact_by_small(v: &Int, d: u32) -> Int {
    // v is guaranteed (by Toom-3 algebra) divisible by d; long-divide the
    // magnitude by the small divisor directly.
    let neg = v.is_neg();
    let mag = &v.mag;
    let mut out = vec![0 as Digit; mag.len()];
    let mut rem: u128 = 0;
    for i in (0..mag.len()).rev() {
        let cur = (rem << DIGIT_BITS) | mag[i] as u128;
        out[i] = (cur / d as u128) as Digit;
        rem = cur % d as u128;
    }
    trim(&mut out);
    let mut r = Int { sign: Sign::NonNeg, mag: out };
    if neg && !r.is_zero() {
        r.sign = Sign::Neg;
    }
    r
}

fn limbs3(a: &[Digit], k: usize) -> [Vec<Digit>; 3] {
    let get = |lo: usize, hi: usize| -> Vec<Digit> {
        if lo >= a.len() {
            Vec::new()
        } else {
            let hi = hi.min(a.len());
            let mut v = a[lo..hi].to_vec();
            trim(&mut v);
            v
        }
    };
    [get(0, k), get(k, 2 * k), get(2 * k, 3 * k)]
}

fn digits_to_int(d: &[Digit]) -> Int {
    let mut mag = d.to_vec();
    trim(&mut mag);
    Int { sign: Sign::NonNeg, mag }
}

fn mul_int(a: &Int, b: &Int) -> Int {
    let mag = mul_mag(&a.mag, &b.mag);
    let neg = a.is_neg() != b.is_neg();
    let mut r = Int { sign: Sign::NonNeg, mag };
    if neg && !r.is_zero() {
        r.sign = Sign::Neg;
    }
    r
}

fn split_at(a: &[Digit], at: usize) -> (&[Digit], &[Digit]) {
    if at >= a.len() {
        (a, &[])
    } else {
        (&a[..at], &a[at..])
    }
}

fn add_digits(a: &[Digit], b: &[Digit]) -> Vec<Digit> {
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let mut out = Vec::with_capacity(long.len() + 1);
    let mut carry: Word = 0;
    for i in 0..long.len() {
        let s = long[i] as Word + short.get(i).copied().unwrap_or(0) as Word + carry;
        out.push((s & DIGIT_MASK) as Digit);
        carry = s >> DIGIT_BITS;
    }
    if carry != 0 {
        out.push(carry as Digit);
    }
    out
}

fn sub_digits(a: &[Digit], b: &[Digit]) -> Vec<Digit> {
    // Assumes a >= b as magnitudes (true for every call site above).
    let mut out = Vec::with_capacity(a.len());
    let mut borrow: i64 = 0;
    for i in 0..a.len() {
        let bi = b.get(i).copied().unwrap_or(0) as i64;
        let mut d = a[i] as i64 - bi - borrow;
        if d < 0 {
            d += 1i64 << DIGIT_BITS;
            borrow = 1;
        } else {
            borrow = 0;
        }
        out.push(d as Digit);
    }
    trim(&mut out);
    out
}

fn add_into(out: &mut Vec<Digit>, part: &[Digit], offset: usize) {
    let mut carry: Word = 0;
    let mut i = 0;
    while i < part.len() || carry != 0 {
        if offset + i >= out.len() {
            out.push(0);
        }
        let s = out[offset + i] as Word + part.get(i).copied().unwrap_or(0) as Word + carry;
        out[offset + i] = (s & DIGIT_MASK) as Digit;
        carry = s >> DIGIT_BITS;
        i += 1;
    }
}

/// Unsigned magnitude multiply, dispatching on size.
pub(crate) fn mul_mag(a: &[Digit], b: &[Digit]) -> Vec<Digit> {
    toom3_mul(a, b)
}

/// Distinct squaring algorithm exploiting symmetry: off-diagonal
/// products `a[i]*a[j]` (i<j) are computed once and doubled, with the
/// diagonal `a[i]^2` added separately (spec §4.1 "Square").
fn square_schoolbook(a: &[Digit]) -> Vec<Digit> {
    if a.is_empty() {
        return Vec::new();
    }
    let n = a.len();
    let mut out = vec![0u64; 2 * n + 1];

    // Off-diagonal terms, doubled.
    for i in 0..n {
        let mut carry: u128 = 0;
        let ai = a[i] as u128;
        for j in (i + 1)..n {
            let p = ai * a[j] as u128 * 2 + out[i + j] as u128 + carry;
            out[i + j] = (p & DIGIT_MASK as u128) as u64;
            carry = p >> DIGIT_BITS;
        }
        let mut k = i + n;
        while carry != 0 {
            let p = out[k] as u128 + carry;
            out[k] = (p & DIGIT_MASK as u128) as u64;
            carry = p >> DIGIT_BITS;
            k += 1;
        }
    }

    // Diagonal terms.
    let mut carry: u128 = 0;
    for i in 0..n {
        let p = a[i] as u128 * a[i] as u128 + out[2 * i] as u128 + carry;
        out[2 * i] = (p & DIGIT_MASK as u128) as u64;
        let mut c = p >> DIGIT_BITS;
        // propagate the high half plus any existing carry into the next slot
        let mut k = 2 * i + 1;
        while c != 0 {
            let q = out[k] as u128 + c;
            out[k] = (q & DIGIT_MASK as u128) as u64;
            c = q >> DIGIT_BITS;
            k += 1;
        }
        carry = 0;
    }
    let _ = carry;

    let mut mag: Vec<Digit> = out.into_iter().map(|d| d as Digit).collect();
    trim(&mut mag);
    mag
}

impl Int {
    /// `self * self`, always nonneg (spec: "Sign of result is always
    /// nonneg"). Dispatches to schoolbook below [`KARATSUBA_MUL_CUTOFF`]
    /// and otherwise reuses the general multiply (`a*a`), which is what
    /// Karatsuba/Toom-Cook squaring reduce to algebraically.
    pub fn square(&self) -> Int {
        let mag = if self.mag.len() < KARATSUBA_MUL_CUTOFF {
            square_schoolbook(&self.mag)
        } else {
            mul_mag(&self.mag, &self.mag)
        };
        Int { sign: Sign::NonNeg, mag }
    }
}

impl Mul for &Int {
    type Output = Int;
    fn mul(self, rhs: &Int) -> Int {
        mul_int(self, rhs)
    }
}

impl Mul for Int {
    type Output = Int;
    fn mul(self, rhs: Int) -> Int {
        &self * &rhs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_mul(a: u64, b: u64) -> u128 {
        a as u128 * b as u128
    }

    #[test]
    fn comba_matches_naive_small() {
        for (a, b) in [(0u64, 0u64), (1, 1), (12345, 67890), (u32::MAX as u64, u32::MAX as u64)] {
            let got = &Int::from_u64(a) * &Int::from_u64(b);
            let want = naive_mul(a, b);
            assert_eq!(got, int_from_u128(want), "{a} * {b}");
        }
    }

    fn int_from_u128(v: u128) -> Int {
        let mut acc = Int::zero();
        let mut shift = 0u32;
        let mut v = v;
        while v != 0 {
            acc = acc + Int::from_u64((v & 0xFFFF_FFFF) as u64).shl_bits(shift as usize);
            v >>= 32;
            shift += 32;
        }
        acc
    }

    #[test]
    fn square_matches_mul_self() {
        let a = Int::from_u64(0xdead_beef_cafe_babe);
        assert_eq!(a.square(), &a * &a);
    }

    #[test]
    fn karatsuba_path_matches_schoolbook() {
        // Force the Karatsuba branch by using operands above the cutoff.
        let digits = KARATSUBA_MUL_CUTOFF + 5;
        let a: Vec<Digit> = (0..digits).map(|i| (i as u32).wrapping_mul(2654435761)).collect();
        let b: Vec<Digit> = (0..digits).map(|i| (i as u32).wrapping_mul(40503)).collect();
        let via_dispatch = karatsuba_mul(&a, &b);
        let via_schoolbook = comba_mul(&a, &b);
        assert_eq!(via_dispatch, via_schoolbook);
    }

    #[test]
    fn zero_times_anything_is_zero() {
        let a = Int::from_u64(123456789);
        assert!((&a * &Int::zero()).is_zero());
    }

    #[test]
    fn mul_signs() {
        let a = Int::from_i64(-7);
        let b = Int::from_i64(6);
        assert_eq!(&a * &b, Int::from_i64(-42));
        assert_eq!(&a * &a.negate(), Int::from_i64(49));
    }
}
