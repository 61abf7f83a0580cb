//! # Kernel — Four-Level Residue Walk and Survivor Drain
//!
//! The hot path. For one seed residue the kernel walks the four deep wheel
//! levels (19 × 23 × 29 × 35 iterations), and at the innermost level tests
//! 64 candidate shifts at a time:
//!
//! 1. AND together the mask words of the first 8 sieve primes, indexed by
//!    the staged lane residues. A zero word — the common case — ends the
//!    iteration immediately.
//! 2. Survivors AND in the second 8 staged lanes, then the remaining 26
//!    primes' words indexed by direct reduction (11 primes to 193, then 15
//!    to 277), short-circuiting on zero between groups.
//! 3. Each set bit of the surviving word names a candidate
//!    `n59 + (bit + SHIFT)·23#`, drained from the highest bit down through
//!    the scalar post cascade and, past that, the extension probe.
//!
//! Amortized, the mask sieve spends about one table word per candidate to
//! reject well over 99.9% of them before any division happens.

use crate::constants::{wheel_iterations, MOD, SIEVE_PRIMES};
use crate::residues::{LaneSteps, ResidueLanes};
use crate::steps::StepTable;
use crate::tables::{MaskTables, OkTables};
use crate::{probe, SolutionSink};
use anyhow::Result;

const LEVEL_43: u64 = wheel_iterations(43);
const LEVEL_47: u64 = wheel_iterations(47);
const LEVEL_53: u64 = wheel_iterations(53);
const LEVEL_59: u64 = wheel_iterations(59);

/// Read-only state shared by every worker for one (K, SHIFT) window.
pub(crate) struct WindowCtx<'a> {
    pub steps: &'a StepTable,
    pub ok: &'a OkTables,
    pub masks: &'a MaskTables,
    pub lane_steps: LaneSteps,
    pub shift: u64,
    pub prp: fn(u64) -> bool,
}

/// AND-reduction over the 42 sieve primes for one block of 64 shifts.
#[inline]
fn survivor_mask(masks: &MaskTables, staged: &[u16; 16], n59: u64) -> u64 {
    let mut sito = masks.word(0, staged[0] as u64);
    for i in 1..8 {
        sito &= masks.word(i, staged[i] as u64);
    }
    if sito == 0 {
        return 0;
    }
    for i in 8..16 {
        sito &= masks.word(i, staged[i] as u64);
    }
    if sito == 0 {
        return 0;
    }
    for i in 16..27 {
        sito &= masks.word(i, n59 % SIEVE_PRIMES[i]);
    }
    if sito == 0 {
        return 0;
    }
    for i in 27..42 {
        sito &= masks.word(i, n59 % SIEVE_PRIMES[i]);
    }
    sito
}

/// Walk the set bits from high to low; each names one candidate for the
/// post cascade and probe.
fn drain(ctx: &WindowCtx, mut sito: u64, n59: u64, sink: &dyn SolutionSink) -> Result<()> {
    while sito != 0 {
        let bit = 63 - sito.leading_zeros() as u64;
        let n = n59 + (bit + ctx.shift) * MOD;
        if ctx.ok.admits_post(n) {
            if let Some(found) = probe::extend(n, ctx.steps.step, ctx.prp) {
                sink.solution(found.len, ctx.steps.k, found.first_term)?;
            }
        }
        sito ^= 1u64 << bit;
    }
    Ok(())
}

/// Run the full nest under one seed residue.
pub(crate) fn sieve_seed(ctx: &WindowCtx, seed: u64, sink: &dyn SolutionSink) -> Result<()> {
    let s = ctx.steps;
    let mut n43 = seed;
    for _ in 0..LEVEL_43 {
        let mut n47 = n43;
        for _ in 0..LEVEL_47 {
            let mut n53 = n47;
            for _ in 0..LEVEL_53 {
                let mut n59 = n53;
                let mut lanes = ResidueLanes::load(n59);
                for _ in 0..LEVEL_59 {
                    let staged = lanes.residues();
                    let sito = survivor_mask(ctx.masks, &staged, n59);
                    if sito != 0 {
                        drain(ctx, sito, n59, sink)?;
                    }
                    n59 += s.s59;
                    let wrapped = n59 >= MOD;
                    if wrapped {
                        n59 -= MOD;
                    }
                    lanes.advance(&ctx.lane_steps, wrapped);
                }
                n53 += s.s53;
                if n53 >= MOD {
                    n53 -= MOD;
                }
            }
            n47 += s.s47;
            if n47 >= MOD {
                n47 -= MOD;
            }
        }
        n43 += s.s43;
        if n43 >= MOD {
            n43 -= MOD;
        }
    }
    Ok(())
}
