//! # Steps — Per-K Step Table and Search Eligibility
//!
//! For a multiplier K, every walk level advances the tracked residue by a
//! fixed amount mod 23#. This module derives those amounts.
//!
//! ## Anchor schema
//!
//! A candidate window is admissible for a wheel prime q when the index at
//! which the progression first hits a multiple of q lies in `[24, q)` — past
//! the window, giving the `q − 24` admissible anchor positions each walk
//! level enumerates. The level steps are built from the CRT basis over
//! `30·31·37·41·43·47·53·59`:
//!
//! - `B_q ≡ 1 (mod q)`, `≡ 0` mod 30 and the other wheel primes;
//! - `PRES_q = (−PRIM23·B_q) mod (30·Q) mod 23#`, so `S_q = PRES_q·K mod 23#`
//!   moves the level-q anchor by one position;
//! - `N0 = (−24·PRIM23·ΣB_q) mod (30·Q) mod 23#` is the K-proportional part
//!   of the wheel origin, placing every anchor at the window boundary;
//! - `N30 = B_30 mod 23#` with the i3/i5 steps `S3 = 10·B_30`, `S5 = 6·B_30`
//!   (mod 30·Q, mod 23#) fixes the K-independent mod-30 positioning: seeds
//!   are odd and walk exactly the nonzero classes mod 3 and mod 5.
//!
//! All of it is evaluated in `const` context; the per-K scaling uses the
//! split multiply from [`crate::constants::SPLIT`] so no intermediate product
//! leaves 64 bits for any 32-bit K.
//!
//! ## Eligibility
//!
//! `will_search` rejects K sharing a factor with any sieved prime: such a K
//! degenerates the per-prime anchor structure (the forbidden residues of a
//! prime dividing K·PRIM23 collapse onto one class) and the corresponding
//! progressions are covered by smaller multipliers.

use crate::constants::{
    MOD, POST_PRIMES_HIGH, POST_PRIMES_LOW, PRIM23, SIEVE_PRIMES, SPLIT, WHEEL_PRIMES, WINDOW,
};

/// Product of 30 and the seven wheel primes: the modulus the anchor basis
/// lives in. Fits comfortably in 64 bits (≈ 2^43).
const ANCHOR_MOD: u64 = {
    let mut m = 30u64;
    let mut i = 0;
    while i < WHEEL_PRIMES.len() {
        m *= WHEEL_PRIMES[i];
        i += 1;
    }
    m
};

/// Modular inverse by extended Euclid; `a` and `m` must be coprime.
const fn inv_mod(a: u64, m: u64) -> u64 {
    let mut t: i128 = 0;
    let mut new_t: i128 = 1;
    let mut r: i128 = m as i128;
    let mut new_r: i128 = (a % m) as i128;
    while new_r != 0 {
        let q = r / new_r;
        let holder = t - q * new_t;
        t = new_t;
        new_t = holder;
        let holder = r - q * new_r;
        r = new_r;
        new_r = holder;
    }
    (((t % m as i128) + m as i128) % m as i128) as u64
}

/// CRT basis element for factor `f` of [`ANCHOR_MOD`]: ≡ 1 (mod f), ≡ 0
/// modulo the cofactor.
const fn anchor_basis(f: u64) -> u64 {
    let rest = ANCHOR_MOD / f;
    let lift = (rest as u128) * (inv_mod(rest % f, f) as u128);
    (lift % ANCHOR_MOD as u128) as u64
}

/// `(−PRIM23 · B_q) mod ANCHOR_MOD, mod 23#` for wheel prime `q`.
const fn pres(q: u64) -> u64 {
    let scaled = (PRIM23 as u128 * anchor_basis(q) as u128) % ANCHOR_MOD as u128;
    let negated = (ANCHOR_MOD as u128 - scaled) % ANCHOR_MOD as u128;
    (negated % MOD as u128) as u64
}

/// Per-wheel-prime step coefficients, index-aligned with
/// [`crate::constants::WHEEL_PRIMES`]. `S_q = PRES[i]·K mod 23#`.
pub const PRES: [u64; 7] = {
    let mut a = [0u64; 7];
    let mut i = 0;
    while i < WHEEL_PRIMES.len() {
        a[i] = pres(WHEEL_PRIMES[i]);
        i += 1;
    }
    a
};

/// K-proportional wheel origin coefficient: `n0 = N0·K + N30 mod 23#`.
pub const N0: u64 = {
    let mut sum: u128 = 0;
    let mut i = 0;
    while i < WHEEL_PRIMES.len() {
        sum += anchor_basis(WHEEL_PRIMES[i]) as u128;
        i += 1;
    }
    let scaled = (WINDOW as u128 * PRIM23 as u128 % ANCHOR_MOD as u128) * (sum % ANCHOR_MOD as u128)
        % ANCHOR_MOD as u128;
    let negated = (ANCHOR_MOD as u128 - scaled) % ANCHOR_MOD as u128;
    (negated % MOD as u128) as u64
};

/// K-independent wheel origin: the mod-30 unit anchor reduced mod 23#.
pub const N30: u64 = anchor_basis(30) % MOD;

/// i3 wheel step: flips the seed between the two nonzero classes mod 3
/// while staying ≡ 0 (mod 10).
pub const S3: u64 = ((10 * anchor_basis(30) as u128 % ANCHOR_MOD as u128) % MOD as u128) as u64;

/// i5 wheel step: walks the four nonzero classes mod 5 while staying
/// ≡ 0 (mod 6).
pub const S5: u64 = ((6 * anchor_basis(30) as u128 % ANCHOR_MOD as u128) % MOD as u128) as u64;

/// `c·k mod 23#` via the split multiply: both partial products stay below
/// 2^63 for any 32-bit k.
#[inline]
pub fn scale(c: u64, k: u64) -> u64 {
    (c * (k % SPLIT) + ((c * SPLIT) % MOD) * (k / SPLIT)) % MOD
}

/// All per-K walk increments, derived once per multiplier.
#[derive(Clone, Copy, Debug)]
pub struct StepTable {
    /// The multiplier K.
    pub k: u64,
    /// Common difference of every progression this K contributes: `K·PRIM23`.
    pub step: u64,
    /// Wheel origin residue mod 23#.
    pub n0: u64,
    pub s3: u64,
    pub s5: u64,
    pub s31: u64,
    pub s37: u64,
    pub s41: u64,
    pub s43: u64,
    pub s47: u64,
    pub s53: u64,
    pub s59: u64,
}

impl StepTable {
    pub fn new(k: u32) -> StepTable {
        let k = k as u64;
        StepTable {
            k,
            step: k * PRIM23,
            n0: (scale(N0, k) + N30) % MOD,
            s3: S3,
            s5: S5,
            s31: scale(PRES[0], k),
            s37: scale(PRES[1], k),
            s41: scale(PRES[2], k),
            s43: scale(PRES[3], k),
            s47: scale(PRES[4], k),
            s53: scale(PRES[5], k),
            s59: scale(PRES[6], k),
        }
    }
}

/// Whether K is eligible for searching: coprime to every sieved prime
/// (both the mask-sieved set and the post cascade).
pub fn will_search(k: u32) -> bool {
    let k = k as u64;
    SIEVE_PRIMES
        .iter()
        .chain(POST_PRIMES_LOW.iter())
        .chain(POST_PRIMES_HIGH.iter())
        .all(|&p| k % p != 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn anchor_constants_exact() {
        // Regression pins for the const derivation.
        assert_eq!(N30, 987_601);
        assert_eq!(N0, 165_943_590);
        assert_eq!(S3, 129_678_820);
        assert_eq!(S5, 177_373_446);
        assert_eq!(
            PRES,
            [
                107_593_050, 34_335_120, 222_690_120, 215_679_570, 56_842_770, 34_648_830,
                106_283_460
            ]
        );
    }

    #[test]
    fn anchor_constants_mod_30_structure() {
        // Seeds stay odd and coprime to 15 across the whole wheel.
        assert_eq!(N30 % 2, 1);
        assert_eq!(N30 % 3, 1);
        assert_eq!(N30 % 5, 1);
        assert_eq!(N0 % 30, 0);
        assert_eq!(S3 % 2, 0);
        assert_eq!(S3 % 3, 1);
        assert_eq!(S3 % 5, 0);
        assert_eq!(S5 % 2, 0);
        assert_eq!(S5 % 3, 0);
        assert_eq!(S5 % 5, 1);
        for p in PRES {
            assert_eq!(p % 30, 0);
        }
    }

    #[test]
    fn inv_mod_small_cases() {
        assert_eq!(inv_mod(3, 7), 5);
        assert_eq!(inv_mod(10, 17), 12); // 10·12 = 120 ≡ 1 (mod 17)
        assert_eq!(inv_mod(1, 59), 1);
    }

    #[test]
    fn step_table_for_published_discovery() {
        // K of the record 26-term progression: difference 5283234035979900.
        let t = StepTable::new(11_840_885);
        assert_eq!(t.step, 5_283_234_035_979_900);
        assert!(t.n0 < MOD);
        assert_eq!(t.n0 % 2, 1);
        for s in [t.s3, t.s5, t.s31, t.s37, t.s41, t.s43, t.s47, t.s53, t.s59] {
            assert!(s < MOD);
            assert_eq!(s % 2, 0);
        }
    }

    #[test]
    fn will_search_filters_prime_set_multiples() {
        assert!(!will_search(7)); // post cascade prime
        assert!(!will_search(61)); // sieve prime
        assert!(!will_search(541));
        assert!(!will_search(61 * 3));
        assert!(will_search(1));
        assert!(will_search(2));
        assert!(will_search(29)); // 29 is in no sieved set
        assert!(will_search(11_840_885));
    }

    proptest! {
        #[test]
        fn scale_matches_wide_multiply(c in 0u64..MOD, k in 1u64..u32::MAX as u64) {
            let expected = ((c as u128 * k as u128) % MOD as u128) as u64;
            prop_assert_eq!(scale(c, k), expected);
        }

        #[test]
        fn step_table_residues_in_range(k in 1u32..200_000_000) {
            let t = StepTable::new(k);
            prop_assert!(t.n0 < MOD);
            for s in [t.s31, t.s37, t.s41, t.s43, t.s47, t.s53, t.s59] {
                prop_assert!(s < MOD);
            }
        }
    }
}
