//! # Probe — Bidirectional Extension of a Surviving Candidate
//!
//! A candidate that clears every residue table has positions 0..=23 of its
//! window free of small factors, but how many of those terms are actually
//! prime is unknown. The probe grows the run outward from position 5: upward
//! first (a short run usually dies within a term or two, so the cheap
//! direction goes first), then downward from position 4 once ten consecutive
//! primes make the candidate worth finishing.
//!
//! The downward walk decrements with `checked_sub`: a run reaching toward
//! zero ends cleanly at the last testable term instead of relying on wrap
//! detection.

use crate::constants::MIN_PROBE_LEN;

/// A probed progression: `len` consecutive prime terms starting at
/// `first_term` with the session's common difference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progression {
    pub len: u32,
    pub first_term: u64,
}

/// Extend around candidate `n`, testing terms with `prp`. Returns the
/// maximal run containing window positions 4..=5 when it reaches
/// [`MIN_PROBE_LEN`] terms.
pub fn extend(n: u64, step: u64, prp: fn(u64) -> bool) -> Option<Progression> {
    let mut len = 0u32;
    let mut term = n + 5 * step;
    while prp(term) {
        len += 1;
        term += step;
    }
    if len < MIN_PROBE_LEN {
        return None;
    }

    let mut term = n + 4 * step;
    let first_term = loop {
        if !prp(term) {
            break term + step;
        }
        len += 1;
        match term.checked_sub(step) {
            Some(next) => term = next,
            // The run ran out of u64 below; the last prime tested leads it.
            None => break term,
        }
    };

    if len >= MIN_PROBE_LEN {
        Some(Progression { len, first_term })
    } else {
        None
    }
}
