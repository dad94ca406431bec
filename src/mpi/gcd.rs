//! Greatest common divisor, least common multiple, and modular inverse
//! (spec §4.1 "GCD / modular inverse").
//!
//! GCD uses the binary (Stein's) algorithm — shifts, subtraction and
//! parity tests only, no division. Modular inverse uses the extended
//! Euclidean algorithm (the same identity HAC Algorithm 14.61 solves,
//! `a*x + m*y = gcd(a,m)`) built directly on `div_rem` rather than the
//! shift-only binary variant, which keeps each step's carry terms
//! unambiguous.

use super::Int;

impl Int {
    /// `gcd(|self|, |other|)` via Stein's algorithm.
    pub fn gcd(&self, other: &Int) -> Int {
        if self.is_zero() {
            return other.abs();
        }
        if other.is_zero() {
            return self.abs();
        }
        let mut u = self.abs();
        let mut v = other.abs();
        let mut shift = 0usize;
        while u.is_even() && v.is_even() {
            u = u.shr_bits(1);
            v = v.shr_bits(1);
            shift += 1;
        }
        while u.is_even() {
            u = u.shr_bits(1);
        }
        while !v.is_zero() {
            while v.is_even() {
                v = v.shr_bits(1);
            }
            if u > v {
                core::mem::swap(&mut u, &mut v);
            }
            v = &v - &u;
        }
        u.shl_bits(shift)
    }

    /// `lcm(|self|, |other|)`, or zero if either operand is zero.
    pub fn lcm(&self, other: &Int) -> Int {
        if self.is_zero() || other.is_zero() {
            return Int::zero();
        }
        let g = self.gcd(other);
        let (q, _) = self.abs().div_rem(&g).expect("gcd divides self exactly");
        (&q * &other.abs()).abs()
    }

    /// Modular inverse of `self mod m` via the extended Euclidean
    /// algorithm (HAC 14.61 solves the same `a*x + m*y = gcd` system;
    /// this uses `div_rem` directly at each step rather than the
    /// binary/shift-only variant, which keeps the carry terms in each
    /// step unambiguous). Returns `None` when `gcd(self, m) != 1`.
    pub fn mod_inverse(&self, m: &Int) -> Option<Int> {
        if m.is_zero() {
            return None;
        }
        let (mut old_r, mut r) = (self.modulo(m).ok()?, m.clone());
        let (mut old_s, mut s) = (Int::one(), Int::zero());
        while !r.is_zero() {
            let (q, rem) = old_r.div_rem(&r).ok()?;
            old_r = r;
            r = rem;
            let new_s = &old_s - &(&q * &s);
            old_s = s;
            s = new_s;
        }
        if old_r != Int::one() {
            return None;
        }
        old_s.modulo(m).ok()
    }
}
