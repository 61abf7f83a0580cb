//! # Tables — Per-Prime Admissibility and Folded Shift Masks
//!
//! Two table families drive the sieve:
//!
//! 1. **Admissibility tables** (`OkTables`) — for each prime p, a p-length
//!    0/1 vector over residues of the candidate first term. Residue r is 0
//!    exactly when some window position `j ∈ [0, 24)` would make
//!    `n + j·STEP ≡ 0 (mod p)`, i.e. `r ≡ j'·(STEP mod p)` for
//!    `j' ∈ [p−23, p]`. Built once per K for the sieve primes and the high
//!    post primes.
//!
//! 2. **Folded mask tables** (`MaskTables`) — for each sieve prime, a
//!    p-length vector of 64-bit words: bit j of entry r answers "is the
//!    candidate `r + (j + SHIFT)·23#` admissible mod p?". AND-ing one word
//!    per sieve prime tests 64 consecutive shift positions at once. Rebuilt
//!    whenever SHIFT moves to the next window.
//!
//! Mask construction is embarrassingly parallel across primes and runs under
//! Rayon; during a window the tables are shared read-only with the workers.

use crate::constants::{MOD, POST_PRIMES_HIGH, POST_PRIMES_LOW, SHIFT_WINDOW, SIEVE_PRIMES};
use rayon::prelude::*;

/// Per-prime admissibility vectors for one K.
pub struct OkTables {
    /// Index-aligned with [`SIEVE_PRIMES`].
    sieve: Vec<Vec<u8>>,
    /// Index-aligned with [`POST_PRIMES_HIGH`].
    post: Vec<Vec<u8>>,
}

/// Admissibility vector for a single prime: 1 everywhere except the 24
/// residues `j·(step mod p) mod p` for `j ∈ [p−23, p]`.
fn admissible(p: u64, step: u64) -> Vec<u8> {
    let mut ok = vec![1u8; p as usize];
    let sp = step % p;
    for j in (p - 23)..=p {
        ok[(j * sp % p) as usize] = 0;
    }
    ok
}

impl OkTables {
    /// Build all admissibility vectors for one common difference.
    pub fn build(step: u64) -> OkTables {
        OkTables {
            sieve: SIEVE_PRIMES.iter().map(|&p| admissible(p, step)).collect(),
            post: POST_PRIMES_HIGH
                .iter()
                .map(|&p| admissible(p, step))
                .collect(),
        }
    }

    /// Admissibility of residue `r` for sieve prime index `pi`.
    #[inline]
    pub fn sieve_ok(&self, pi: usize, r: u64) -> u8 {
        self.sieve[pi][r as usize]
    }

    /// Scalar cascade over the post primes: the low set divides 23#, so a
    /// single residue test covers the whole window; the high set goes
    /// through its admissibility vectors in ascending order. A single hit
    /// rejects the candidate.
    #[inline]
    pub fn admits_post(&self, n: u64) -> bool {
        for &p in &POST_PRIMES_LOW {
            if n % p == 0 {
                return false;
            }
        }
        for (vec, &p) in self.post.iter().zip(POST_PRIMES_HIGH.iter()) {
            if vec[(n % p) as usize] == 0 {
                return false;
            }
        }
        true
    }
}

/// Folded 64-shift masks for one (K, SHIFT) pair.
pub struct MaskTables {
    /// Index-aligned with [`SIEVE_PRIMES`].
    masks: Vec<Vec<u64>>,
}

impl MaskTables {
    /// Fold 64 consecutive shift positions of every residue into one word
    /// per (prime, residue) pair.
    pub fn build(ok: &OkTables, shift: u64) -> MaskTables {
        let masks = SIEVE_PRIMES
            .par_iter()
            .enumerate()
            .map(|(pi, &p)| {
                let table = &ok.sieve[pi];
                (0..p)
                    .map(|r| {
                        let mut word = 0u64;
                        for j in 0..SHIFT_WINDOW {
                            // (r + (j + shift)·23#) mod p, with both factors
                            // pre-reduced so the product stays far below 2^64
                            // for any shift.
                            let res = (r + ((j + shift) % p) * (MOD % p)) % p;
                            word |= u64::from(table[res as usize]) << j;
                        }
                        word
                    })
                    .collect()
            })
            .collect();
        MaskTables { masks }
    }

    /// Survivor word for residue `r` of sieve prime index `pi`.
    #[inline]
    pub fn word(&self, pi: usize, r: u64) -> u64 {
        self.masks[pi][r as usize]
    }
}
