//! # Residues — Lock-Step Update of the First 16 Sieve-Prime Remainders
//!
//! The innermost walk advances its tracked residue 35 times per level-53
//! iteration, and each advance needs `n59 mod p` for the first 16 sieve
//! primes before it can index the mask tables. Recomputing 16 remainders per
//! step costs 16 divisions; instead the remainders ride along: each step adds
//! the per-lane step remainder, a wrap of the main residue subtracts the
//! per-lane wheel-modulus remainder (adding the prime back where the lane
//! went negative), and an unconditional compare-subtract restores every lane
//! to `[0, p)`.
//!
//! Lanes are 8×16-bit halves of two 128-bit vectors. On x86_64 the update is
//! three to five SSE2 instructions per half (add, sub, compare, select); the
//! select is the classic `a ⊕ (mask ∧ (a ⊕ b))` blend. Everywhere else, and
//! for differential testing, a scalar loop with identical semantics stands
//! in. The remaining 26 sieve primes are not worth carrying incrementally at
//! this depth and are reduced directly in the kernel.

use crate::constants::SIEVE_PRIMES;

/// The 16 lane primes, split into the two vector halves.
const fn lane_primes(half: usize) -> [i16; 8] {
    let mut a = [0i16; 8];
    let mut i = 0;
    while i < 8 {
        a[i] = SIEVE_PRIMES[half * 8 + i] as i16;
        i += 1;
    }
    a
}

const LANE_PRIMES_1: [i16; 8] = lane_primes(0);
const LANE_PRIMES_2: [i16; 8] = lane_primes(1);

/// 23# reduced by each lane prime, applied on main-residue wrap.
const fn lane_mod_rems(half: usize) -> [i16; 8] {
    let mut a = [0i16; 8];
    let mut i = 0;
    while i < 8 {
        a[i] = (crate::constants::MOD % SIEVE_PRIMES[half * 8 + i]) as i16;
        i += 1;
    }
    a
}

const MOD_REMS_1: [i16; 8] = lane_mod_rems(0);
const MOD_REMS_2: [i16; 8] = lane_mod_rems(1);

/// `p − 1` per lane: the compare bound of the normalization step.
const fn lane_maxima(half: usize) -> [i16; 8] {
    let mut a = [0i16; 8];
    let mut i = 0;
    while i < 8 {
        a[i] = (SIEVE_PRIMES[half * 8 + i] - 1) as i16;
        i += 1;
    }
    a
}

const LANE_MAX_1: [i16; 8] = lane_maxima(0);
const LANE_MAX_2: [i16; 8] = lane_maxima(1);

/// Per-K lane increments: the level-59 step reduced by each lane prime.
#[derive(Clone, Copy, Debug)]
pub struct LaneSteps {
    step1: [i16; 8],
    step2: [i16; 8],
}

impl LaneSteps {
    pub fn new(s59: u64) -> LaneSteps {
        let mut step1 = [0i16; 8];
        let mut step2 = [0i16; 8];
        for i in 0..8 {
            step1[i] = (s59 % SIEVE_PRIMES[i]) as i16;
            step2[i] = (s59 % SIEVE_PRIMES[8 + i]) as i16;
        }
        LaneSteps { step1, step2 }
    }
}

/// Live remainders of the level-59 residue for the 16 lane primes.
#[derive(Clone, Copy, Debug)]
pub struct ResidueLanes {
    r1: [i16; 8],
    r2: [i16; 8],
}

impl ResidueLanes {
    /// Direct reduction of `n59` by each lane prime.
    pub fn load(n59: u64) -> ResidueLanes {
        let mut r1 = [0i16; 8];
        let mut r2 = [0i16; 8];
        for i in 0..8 {
            r1[i] = (n59 % SIEVE_PRIMES[i]) as i16;
            r2[i] = (n59 % SIEVE_PRIMES[8 + i]) as i16;
        }
        ResidueLanes { r1, r2 }
    }

    /// Stage the lanes back to scalar indices for the mask lookups.
    #[inline]
    pub fn residues(&self) -> [u16; 16] {
        let mut out = [0u16; 16];
        for i in 0..8 {
            out[i] = self.r1[i] as u16;
            out[8 + i] = self.r2[i] as u16;
        }
        out
    }

    /// Advance every lane by the step remainder; `wrapped` is whether the
    /// main residue wrapped past 23# on this step. Leaves each lane in
    /// `[0, p)`.
    #[inline]
    pub fn advance(&mut self, steps: &LaneSteps, wrapped: bool) {
        #[cfg(target_arch = "x86_64")]
        {
            // SSE2 is part of the x86_64 baseline.
            unsafe { self.advance_sse2(steps, wrapped) }
        }
        #[cfg(not(target_arch = "x86_64"))]
        {
            self.advance_scalar(steps, wrapped)
        }
    }

    /// Reference semantics, one lane at a time.
    pub fn advance_scalar(&mut self, steps: &LaneSteps, wrapped: bool) {
        fn half(r: &mut [i16; 8], s: &[i16; 8], m: &[i16; 8], p: &[i16; 8], max: &[i16; 8], wrapped: bool) {
            for i in 0..8 {
                r[i] += s[i];
                if wrapped {
                    r[i] -= m[i];
                    if r[i] < 0 {
                        r[i] += p[i];
                    }
                }
                if r[i] > max[i] {
                    r[i] -= p[i];
                }
            }
        }
        half(&mut self.r1, &steps.step1, &MOD_REMS_1, &LANE_PRIMES_1, &LANE_MAX_1, wrapped);
        half(&mut self.r2, &steps.step2, &MOD_REMS_2, &LANE_PRIMES_2, &LANE_MAX_2, wrapped);
    }

    #[cfg(target_arch = "x86_64")]
    unsafe fn advance_sse2(&mut self, steps: &LaneSteps, wrapped: bool) {
        use std::arch::x86_64::*;

        #[inline]
        unsafe fn select(a: __m128i, b: __m128i, mask: __m128i) -> __m128i {
            _mm_xor_si128(a, _mm_and_si128(mask, _mm_xor_si128(b, a)))
        }

        #[inline]
        unsafe fn half(
            r: &mut [i16; 8],
            s: &[i16; 8],
            m: &[i16; 8],
            p: &[i16; 8],
            max: &[i16; 8],
            wrapped: bool,
        ) {
            let zero = _mm_setzero_si128();
            let primes = _mm_loadu_si128(p.as_ptr() as *const __m128i);
            let mut v = _mm_loadu_si128(r.as_ptr() as *const __m128i);
            v = _mm_add_epi16(v, _mm_loadu_si128(s.as_ptr() as *const __m128i));
            if wrapped {
                v = _mm_sub_epi16(v, _mm_loadu_si128(m.as_ptr() as *const __m128i));
                let lifted = _mm_add_epi16(v, primes);
                v = select(v, lifted, _mm_cmpgt_epi16(zero, v));
            }
            let reduced = _mm_sub_epi16(v, primes);
            let bound = _mm_loadu_si128(max.as_ptr() as *const __m128i);
            v = select(v, reduced, _mm_cmpgt_epi16(v, bound));
            _mm_storeu_si128(r.as_mut_ptr() as *mut __m128i, v);
        }

        half(&mut self.r1, &steps.step1, &MOD_REMS_1, &LANE_PRIMES_1, &LANE_MAX_1, wrapped);
        half(&mut self.r2, &steps.step2, &MOD_REMS_2, &LANE_PRIMES_2, &LANE_MAX_2, wrapped);
    }
}
