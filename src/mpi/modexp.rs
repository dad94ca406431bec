//! Sliding-window modular exponentiation (spec §4.1 "Modular
//! exponentiation").
//!
//! Window width scales with the exponent's bit length — wider windows
//! amortize more precomputed odd powers of the base against fewer
//! multiplies, but the precomputation itself costs multiplies, so small
//! exponents use small windows. The breakpoints below match the
//! schedule production bignum libraries converged on for this tradeoff.

use super::reduce::Reducer;
use super::Int;

fn window_size(exp_bits: usize) -> usize {
    match exp_bits {
        0..=7 => 2,
        8..=36 => 3,
        37..=140 => 4,
        141..=450 => 5,
        451..=1303 => 6,
        1304..=3529 => 7,
        _ => 8,
    }
}

/// `base^exp mod m`. Negative exponents invert the base first (`base^-1
/// mod m`) and raise the inverse to `|exp|`; this requires
/// `gcd(base, m) == 1`.
pub fn mod_exp(base: &Int, exp: &Int, m: &Int) -> Option<Int> {
    if m.is_zero() {
        return None;
    }
    if exp.is_neg() {
        let inv = base.mod_inverse(m)?;
        return mod_exp(&inv, &exp.abs(), m);
    }
    if exp.is_zero() {
        return Some(Int::one().modulo(m).ok()?);
    }

    let reducer = Reducer::choose(m);
    let b = base.modulo(m).ok()?;
    let bits = exp.bit_length();
    let w = window_size(bits);

    // Precompute odd powers b^1, b^3, b^5, ..., b^(2^w - 1).
    let table_len = 1usize << (w - 1);
    let b_sq = reducer.mul_mod(&b, &b);
    let mut table = Vec::with_capacity(table_len);
    table.push(b.clone());
    for i in 1..table_len {
        let prev = table[i - 1].clone();
        table.push(reducer.mul_mod(&prev, &b_sq));
    }

    let mut result = Int::one().modulo(m).ok()?;
    let mut i = (bits - 1) as isize;
    while i >= 0 {
        if !exp.bit(i as usize) {
            result = reducer.mul_mod(&result, &result);
            i -= 1;
            continue;
        }
        // Find the widest window starting at bit i whose low bit is set.
        let mut j = core::cmp::max(0, i - (w as isize) + 1);
        while !exp.bit(j as usize) {
            j += 1;
        }
        for _ in 0..(i - j + 1) {
            result = reducer.mul_mod(&result, &result);
        }
        let mut window_val: usize = 0;
        for k in (j..=i).rev() {
            window_val = (window_val << 1) | if exp.bit(k as usize) { 1 } else { 0 };
        }
        let idx = (window_val - 1) / 2;
        result = reducer.mul_mod(&result, &table[idx]);
        i = j - 1;
    }
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_exponent_matches_manual_computation() {
        // 3^10 mod 1000 = 59049 mod 1000 = 49
        let r = mod_exp(&Int::from_u64(3), &Int::from_u64(10), &Int::from_u64(1000)).unwrap();
        assert_eq!(r, Int::from_u64(49));
    }

    #[test]
    fn exponent_zero_is_one_mod_m() {
        let r = mod_exp(&Int::from_u64(12345), &Int::zero(), &Int::from_u64(97)).unwrap();
        assert_eq!(r, Int::one());
    }

    #[test]
    fn matches_fermat_little_theorem() {
        // a^(p-1) == 1 mod p for prime p, gcd(a,p)=1
        let p = Int::from_u64(1_000_000_007);
        let a = Int::from_u64(123456);
        let r = mod_exp(&a, &(&p - &Int::one()), &p).unwrap();
        assert_eq!(r, Int::one());
    }

    #[test]
    fn large_window_path_matches_repeated_squaring() {
        let base = Int::from_u64(7);
        let m = Int::from_u64(1_000_000_007);
        // exponent wide enough to force window size > 2
        let exp = Int::one().shl_bits(200) + Int::from_u64(12345);
        let fast = mod_exp(&base, &exp, &m).unwrap();

        let mut slow = Int::one();
        let mut b = base.modulo(&m).unwrap();
        for i in 0..exp.bit_length() {
            if exp.bit(i) {
                slow = (&slow * &b).modulo(&m).unwrap();
            }
            b = (&b * &b).modulo(&m).unwrap();
        }
        assert_eq!(fast, slow);
    }

    #[test]
    fn negative_exponent_inverts_base() {
        let base = Int::from_u64(5);
        let m = Int::from_u64(1_000_000_007);
        let inv = base.mod_inverse(&m).unwrap();
        let r = mod_exp(&base, &Int::from_i64(-3), &m).unwrap();
        let expect = mod_exp(&inv, &Int::from_u64(3), &m).unwrap();
        assert_eq!(r, expect);
    }
}
