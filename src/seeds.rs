//! # Seeds — Outer Wheel Enumeration
//!
//! Produces the 10,840 starting residues the worker pool partitions. The
//! wheel is the product of the two mod-30 positions (i3 ∈ {0,1}, i5 ∈ {0..3})
//! with the 1,355 admissible (i31, i37, i41) anchor triples; the four deeper
//! wheel primes are walked inside the kernel instead of being enumerated
//! here, keeping the seed table small enough to hand out in contiguous
//! slices.
//!
//! The triple filter bounds how far the three anchors may spread from one
//! another; triples outside the band duplicate windows reachable from a
//! neighboring anchor and are skipped. Seed order is the lexicographic
//! expansion of the filtered triple loop — the scheduler depends on this
//! order being a pure function of K.

use crate::constants::{MOD, NUM_SEEDS};
use crate::steps::StepTable;

/// Maximum forward spread between anchor positions of consecutive wheel
/// primes (i37 ahead of i31, i41 ahead of either).
const SPREAD_AHEAD: i64 = 10;
/// Maximum backward spread (i31 ahead of i37 or i41).
const SPREAD_BEHIND: i64 = 4;
/// The i41 anchor may run further ahead of both smaller primes.
const SPREAD_41_AHEAD: i64 = 14;

/// Enumerate the seed residues for one K, in wheel order.
pub fn seed_table(steps: &StepTable) -> Vec<u64> {
    let mut seeds = Vec::with_capacity(NUM_SEEDS);
    for i31 in 0..7i64 {
        for i37 in 0..13i64 {
            if i37 - i31 > SPREAD_AHEAD || i31 - i37 > SPREAD_BEHIND {
                continue;
            }
            for i41 in 0..17i64 {
                if i41 - i31 > SPREAD_41_AHEAD
                    || i41 - i37 > SPREAD_41_AHEAD
                    || i31 - i41 > SPREAD_BEHIND
                    || i37 - i41 > SPREAD_AHEAD
                {
                    continue;
                }
                let anchor = (steps.n0
                    + i31 as u64 * steps.s31
                    + i37 as u64 * steps.s37
                    + i41 as u64 * steps.s41)
                    % MOD;
                for i3 in 0..2u64 {
                    for i5 in 0..4u64 {
                        seeds.push((anchor + i3 * steps.s3 + i5 * steps.s5) % MOD);
                    }
                }
            }
        }
    }
    debug_assert_eq!(seeds.len(), NUM_SEEDS);
    seeds
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn seed_count_is_fixed() {
        let steps = StepTable::new(1);
        assert_eq!(seed_table(&steps).len(), NUM_SEEDS);
    }

    #[test]
    fn seeds_below_modulus_and_coprime_to_30() {
        let steps = StepTable::new(11_840_885);
        for &s in &seed_table(&steps) {
            assert!(s < MOD);
            assert_eq!(s % 2, 1);
            assert_ne!(s % 3, 0);
            assert_ne!(s % 5, 0);
        }
    }

    #[test]
    fn mod_5_wheel_walks_all_nonzero_classes() {
        let steps = StepTable::new(371);
        let seeds = seed_table(&steps);
        // Within each group of four consecutive seeds the i5 wheel runs its
        // full cycle, so the classes mod 5 are {1, 2, 3, 4} in some order.
        for group in seeds.chunks(4) {
            let mut classes: Vec<u64> = group.iter().map(|s| s % 5).collect();
            classes.sort_unstable();
            assert_eq!(classes, vec![1, 2, 3, 4]);
        }
    }

    #[test]
    fn rebuild_is_byte_identical() {
        let steps = StepTable::new(2);
        assert_eq!(seed_table(&steps), seed_table(&steps));
    }

    proptest! {
        #[test]
        fn seed_table_shape_for_any_k(k in 1u32..100_000_000) {
            let steps = StepTable::new(k);
            let seeds = seed_table(&steps);
            prop_assert_eq!(seeds.len(), NUM_SEEDS);
            prop_assert!(seeds.iter().all(|&s| s < MOD));
        }
    }
}
