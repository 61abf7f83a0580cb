//! # Progress — Fraction-Done Reporting
//!
//! Worker 0 of the pool computes a fraction of total work done (over the
//! whole K assignment, not just the current window) at most once every five
//! seconds and hands it to whatever [`ProgressSink`](crate::ProgressSink)
//! the embedder wired in. The sink here is the standalone one: a stderr
//! tracing event plus the stdout percentage line.

use crate::ProgressSink;
use std::sync::Mutex;
use std::time::Instant;
use tracing::info;

/// Discards every report; for embedders that poll state themselves.
pub struct Silent;

impl ProgressSink for Silent {
    fn progress(&self, _fraction: f64) {}
}

/// Standalone progress output with elapsed wall-clock time.
pub struct Console {
    start: Instant,
    last: Mutex<f64>,
}

impl Console {
    pub fn new() -> Console {
        Console {
            start: Instant::now(),
            last: Mutex::new(0.0),
        }
    }
}

impl Default for Console {
    fn default() -> Self {
        Console::new()
    }
}

impl ProgressSink for Console {
    fn progress(&self, fraction: f64) {
        let mut last = self.last.lock().unwrap();
        // The pool's rate limit is per worker claim; a regressing value can
        // still arrive right after a window rollover. Report monotonically.
        if fraction < *last {
            return;
        }
        *last = fraction;
        let secs = self.start.elapsed().as_secs();
        let elapsed = format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60);
        info!(elapsed = %elapsed, "tests done: {:.4}%", fraction * 100.0);
        println!("Tests done: {:.4}%", fraction * 100.0);
    }
}
