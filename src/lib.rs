//! # apsieve — Core Library
//!
//! Search engine for long arithmetic progressions of primes whose common
//! difference is a multiple of the 23-primorial: for a multiplier K, it
//! enumerates candidate first terms n and reports every progression
//! `n, n + K·2·23#, n + 2·K·2·23#, …` of probable primes long enough to
//! matter.
//!
//! ## Pipeline
//!
//! ```text
//! seeds → 4-level residue walk → 64-shift mask sieve → post cascade → probe → sink
//! ```
//!
//! - [`steps`] — per-K step table; [`seeds`] — the 10,840-entry outer wheel.
//! - [`tables`] — per-prime admissibility vectors and their 64-shift folds.
//! - [`kernel`] + [`residues`] — the hot nested walk with lane-parallel
//!   remainder tracking.
//! - [`probe`] + [`primality`] — bidirectional extension of survivors under
//!   a Montgomery base-2 test.
//! - [`search`] — shift windows and the work-stealing worker pool.
//! - [`report`], [`checkpoint`], [`progress`] — results file with checksum
//!   and revalidation, alternating state files, progress fan-out.
//!
//! ## Embedding
//!
//! The engine's outward seams are two small traits: [`SolutionSink`]
//! receives every probed progression, [`ProgressSink`] receives fraction-
//! done estimates. The bundled [`report::Recorder`] and
//! [`progress::Console`] implement the standalone behavior; a distributed-
//! computing wrapper supplies its own.

pub mod checkpoint;
pub mod constants;
pub mod kernel;
pub mod primality;
pub mod probe;
pub mod progress;
pub mod report;
pub mod residues;
pub mod search;
pub mod seeds;
pub mod steps;
pub mod tables;

use anyhow::Result;

pub use search::{KProgress, KSearch, SearchParams};
pub use steps::will_search;

/// Receives every progression the probe certifies (length ≥ 10). Called
/// under the engine's reporting lock, so implementations see one call at a
/// time; an error aborts the search.
pub trait SolutionSink: Send + Sync {
    fn solution(&self, len: u32, k: u64, first_term: u64) -> Result<()>;
}

/// Receives fraction-done estimates in `[0, 1]`, at most one every five
/// seconds, from worker 0 of the pool.
pub trait ProgressSink: Send + Sync {
    fn progress(&self, fraction: f64);
}
