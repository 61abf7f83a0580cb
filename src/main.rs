//! # Main — CLI Entry Point
//!
//! Standalone driver for a K-range assignment: parse `KMIN KMAX SHIFT`,
//! resume from the alternating state files when they match the assignment,
//! sweep every searchable K through the engine, and finish the results file
//! with its checksum footer.

use anyhow::{Context, Result};
use apsieve::checkpoint::{StateFiles, TaskState};
use apsieve::progress::Console;
use apsieve::report::Recorder;
use apsieve::{KProgress, KSearch, SearchParams};
use clap::Parser;
use std::path::PathBuf;
use std::thread::available_parallelism;
use std::time::{Duration, Instant};
use tracing::info;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Pause between checkpoint writes at K boundaries.
const CHECKPOINT_EVERY: Duration = Duration::from_secs(60);

#[derive(Parser)]
#[command(
    name = "apsieve",
    about = "Search for long arithmetic progressions of primes with difference K·2·23#"
)]
struct Cli {
    /// First multiplier of the assignment
    kmin: u32,

    /// Last multiplier of the assignment (inclusive)
    kmax: u32,

    /// Base shift; each K sweeps SHIFT..SHIFT+640 in ten windows of 64
    shift: u64,

    /// Worker threads (defaults to all logical cores)
    #[arg(long)]
    threads: Option<usize>,

    /// Seeds claimed per worker visit to the shared cursor
    #[arg(long, default_value_t = 40)]
    thread_range: usize,

    /// Results file
    #[arg(long, default_value = "SOL-AP26.txt")]
    results: PathBuf,

    /// Directory holding the alternating state files
    #[arg(long, default_value = ".")]
    state_dir: PathBuf,

    /// Ignore existing state files and start the assignment over
    #[arg(long)]
    fresh: bool,
}

fn main() -> Result<()> {
    // LOG_FORMAT=json for machine collection, human-readable stderr otherwise.
    if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt().json().with_target(false).init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();
    let threads = match cli.threads {
        Some(t) => t,
        None => available_parallelism().map(|n| n.get()).unwrap_or(1),
    };
    let params = SearchParams {
        kmin: cli.kmin,
        kmax: cli.kmax,
        start_shift: cli.shift,
        threads,
        thread_range: cli.thread_range,
    };
    params.validate()?;

    let mut state_files = StateFiles::new(&cli.state_dir);
    let resumed = if cli.fresh {
        None
    } else {
        state_files.load(params.kmin, params.kmax, params.start_shift)
    };
    let (mut k, cksum, total) = match resumed {
        Some(state) => {
            info!(k = state.k, "resuming assignment from saved state");
            println!("Resuming search from saved state at K {}", state.k);
            (state.k as u64, state.cksum, state.total)
        }
        None => {
            println!("Beginning a new search with parameters from the command line");
            (params.kmin as u64, 0, 0)
        }
    };

    if k > params.kmax as u64 {
        println!("Assignment complete.");
        return Ok(());
    }

    let recorder = Recorder::open(&cli.results, resumed.is_some(), cksum, total)
        .context("preparing results file")?;
    let progress = Console::new();

    // Searchable K counts for the progress estimate.
    let mut tracker = KProgress { done: 0, count: 0 };
    for i in params.kmin as u64..=params.kmax as u64 {
        if apsieve::will_search(i as u32) {
            tracker.count += 1;
            if k > i {
                tracker.done += 1;
            }
        }
    }

    let began = Instant::now();
    let mut last_checkpoint = Instant::now();
    while k <= params.kmax as u64 {
        if apsieve::will_search(k as u32) {
            if last_checkpoint.elapsed() >= CHECKPOINT_EVERY {
                let (cksum, total) = recorder.snapshot();
                state_files.save(&TaskState {
                    kmin: params.kmin,
                    kmax: params.kmax,
                    shift: params.start_shift,
                    k: k as u32,
                    cksum,
                    total,
                })?;
                info!(k, cksum, total, "checkpoint saved");
                last_checkpoint = Instant::now();
            }

            let search = KSearch::new(k as u32)?;
            search.run(
                params.start_shift,
                params.threads,
                params.thread_range,
                tracker,
                &recorder,
                &progress,
            )?;
            tracker.done += 1;
        }
        k += 1;
    }

    let (cksum, total) = recorder.snapshot();
    state_files.save(&TaskState {
        kmin: params.kmin,
        kmax: params.kmax,
        shift: params.start_shift,
        k: k.min(u32::MAX as u64) as u32,
        cksum,
        total,
    })?;
    recorder.write_footer(params.kmin, params.kmax)?;

    info!(total, elapsed = ?began.elapsed(), "assignment complete");
    println!(
        "Search finished in {} s. Number of AP10+ found: {}",
        began.elapsed().as_secs(),
        total
    );
    Ok(())
}
