//! # Search — Per-K Session, Shift Windows, and the Worker Pool
//!
//! One [`KSearch`] owns everything derived from a multiplier: the step
//! table, the admissibility tables, and the seed table. A run sweeps ten
//! 64-shift windows; each window rebuilds the folded mask tables, resets the
//! shared seed cursor, and drives a fixed pool of OS threads to completion.
//!
//! ## Scheduling
//!
//! Workers claim contiguous slices of the seed index space under a mutex
//! (`thread_range` seeds per claim) and process them in ascending order.
//! Slice claiming totally orders the cursor; everything else a worker
//! touches is either read-only (tables, published before spawn) or
//! serialized behind the solution sink's own lock. Worker 0 doubles as the
//! progress beacon, emitting a fraction of the whole K assignment at most
//! every five seconds.
//!
//! The solution *multiset* for a (K, startSHIFT) pair is independent of the
//! thread count and claim size; only the report interleaving varies.

use crate::constants::{MOD, NUM_SEEDS, PRIM23, SHIFT_WINDOW, WINDOWS_PER_PASS};
use crate::kernel::{self, WindowCtx};
use crate::residues::LaneSteps;
use crate::seeds::seed_table;
use crate::steps::{will_search, StepTable};
use crate::tables::{MaskTables, OkTables};
use crate::{primality, ProgressSink, SolutionSink};
use anyhow::{anyhow, bail, Context, Result};
use std::ops::Range;
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Minimum pause between progress emissions from worker 0.
const PROGRESS_EVERY: Duration = Duration::from_secs(5);

/// Bounds and worker configuration for a whole assignment.
#[derive(Clone, Copy, Debug)]
pub struct SearchParams {
    pub kmin: u32,
    pub kmax: u32,
    pub start_shift: u64,
    pub threads: usize,
    /// Seeds handed out per cursor claim.
    pub thread_range: usize,
}

impl SearchParams {
    /// Fail fast on configurations the kernel's arithmetic cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.kmin == 0 {
            bail!("KMIN must be positive");
        }
        if self.kmin > self.kmax {
            bail!("empty K range: {} > {}", self.kmin, self.kmax);
        }
        if self.threads == 0 {
            bail!("worker count must be at least 1");
        }
        if self.thread_range == 0 {
            bail!("thread range must be at least 1");
        }
        // Largest value the probe can touch: the top shift of the last
        // window plus a generous 64-term extension above the window.
        let top = (self.start_shift as u128 + 640) * MOD as u128
            + 64 * self.kmax as u128 * PRIM23 as u128;
        if top > u64::MAX as u128 {
            bail!(
                "assignment reaches past 64 bits: SHIFT {} with KMAX {}",
                self.start_shift,
                self.kmax
            );
        }
        Ok(())
    }
}

/// Position of one K within the assignment, for progress estimation only.
#[derive(Clone, Copy, Debug)]
pub struct KProgress {
    /// Searchable K values already finished.
    pub done: u64,
    /// Searchable K values in the whole assignment.
    pub count: u64,
}

impl Default for KProgress {
    fn default() -> Self {
        KProgress { done: 0, count: 1 }
    }
}

/// Everything derived from one multiplier, shared read-only by the pool.
pub struct KSearch {
    steps: StepTable,
    ok: OkTables,
    seeds: Vec<u64>,
    prp: fn(u64) -> bool,
}

impl KSearch {
    /// Derive the per-K state. Rejects K sharing a factor with the sieve
    /// prime sets before any table work.
    pub fn new(k: u32) -> Result<KSearch> {
        if k == 0 || !will_search(k) {
            bail!("K {} shares a factor with the sieve prime set", k);
        }
        let steps = StepTable::new(k);
        let ok = OkTables::build(steps.step);
        let seeds = seed_table(&steps);
        debug!(k, step = steps.step, "per-K tables ready");
        Ok(KSearch {
            steps,
            ok,
            seeds,
            prp: primality::is_prime_2,
        })
    }

    /// Replace the probe's primality test. The default is the base-2 strong
    /// probable prime test; embedders substitute instrumented or stricter
    /// predicates.
    pub fn with_prp(mut self, prp: fn(u64) -> bool) -> KSearch {
        self.prp = prp;
        self
    }

    pub fn k(&self) -> u64 {
        self.steps.k
    }

    /// Sweep the ten shift windows of `start_shift` with a worker pool.
    pub fn run(
        &self,
        start_shift: u64,
        threads: usize,
        thread_range: usize,
        tracker: KProgress,
        sink: &dyn SolutionSink,
        progress: &dyn ProgressSink,
    ) -> Result<()> {
        let began = Instant::now();
        for window in 0..WINDOWS_PER_PASS {
            let shift = start_shift + window * SHIFT_WINDOW;
            self.run_window_over(
                shift,
                window,
                0..self.seeds.len(),
                threads,
                thread_range,
                tracker,
                sink,
                progress,
            )?;
        }
        info!(
            k = self.steps.k,
            elapsed = ?began.elapsed(),
            "computation of K complete"
        );
        Ok(())
    }

    /// Run one shift window over a sub-range of the seed table. The public
    /// entry point for embedders that split work below the K level; `run`
    /// calls it with the full range.
    #[allow(clippy::too_many_arguments)]
    pub fn run_window_over(
        &self,
        shift: u64,
        window: u64,
        seed_range: Range<usize>,
        threads: usize,
        thread_range: usize,
        tracker: KProgress,
        sink: &dyn SolutionSink,
        progress: &dyn ProgressSink,
    ) -> Result<()> {
        let masks = MaskTables::build(&self.ok, shift);
        let ctx = WindowCtx {
            steps: &self.steps,
            ok: &self.ok,
            masks: &masks,
            lane_steps: LaneSteps::new(self.steps.s59),
            shift,
            prp: self.prp,
        };
        let ctx = &ctx;
        let cursor = Mutex::new(seed_range.start);
        let cursor = &cursor;
        let seed_end = seed_range.end.min(self.seeds.len());
        let seeds = &self.seeds;

        // Fraction bookkeeping over the whole assignment: K values done,
        // then windows done within this K, then seeds within this window.
        let done_base =
            (tracker.done * NUM_SEEDS as u64 * WINDOWS_PER_PASS + window * NUM_SEEDS as u64) as f64;
        let scale = 1.0 / (tracker.count.max(1) * NUM_SEEDS as u64 * WINDOWS_PER_PASS) as f64;

        thread::scope(|scope| -> Result<()> {
            let mut workers = Vec::with_capacity(threads);
            for id in 0..threads {
                let handle = thread::Builder::new()
                    .name(format!("sieve-{id}"))
                    .spawn_scoped(scope, move || -> Result<()> {
                        let mut beacon = Instant::now();
                        loop {
                            let (start, stop) = {
                                let mut cur = cursor.lock().unwrap();
                                let start = *cur;
                                let stop = (start + thread_range).min(seed_end);
                                *cur = stop;
                                (start, stop)
                            };
                            if start >= seed_end {
                                return Ok(());
                            }
                            for idx in start..stop {
                                if id == 0 && beacon.elapsed() >= PROGRESS_EVERY {
                                    progress.progress((done_base + idx as f64) * scale);
                                    beacon = Instant::now();
                                }
                                kernel::sieve_seed(ctx, seeds[idx], sink)?;
                            }
                        }
                    })
                    .context("spawning sieve worker")?;
                workers.push(handle);
            }
            for worker in workers {
                worker
                    .join()
                    .map_err(|_| anyhow!("sieve worker panicked"))??;
            }
            Ok(())
        })
    }
}
