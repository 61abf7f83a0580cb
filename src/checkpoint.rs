//! # Checkpoint — Alternating State Files
//!
//! Progress across the K range persists as a single line of six integers,
//!
//! ```text
//! KMIN KMAX SHIFT K cksum totalaps
//! ```
//!
//! written alternately to `AP26-state.a.txt` and `AP26-state.b.txt` so a
//! crash mid-write always leaves the previous generation intact. Writes go
//! through a temp file renamed into place. On resume both files are read;
//! one with the wrong K range or shift, or that does not parse, is ignored,
//! and of two valid files the larger K wins. The loser's slot is the next
//! write target.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

const STATE_A: &str = "AP26-state.a.txt";
const STATE_B: &str = "AP26-state.b.txt";

/// One checkpoint generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TaskState {
    pub kmin: u32,
    pub kmax: u32,
    pub shift: u64,
    /// Next multiplier to search (the K in progress when saved).
    pub k: u32,
    pub cksum: u32,
    pub total: u32,
}

impl TaskState {
    fn to_line(self) -> String {
        format!(
            "{} {} {} {} {} {}\n",
            self.kmin, self.kmax, self.shift, self.k, self.cksum, self.total
        )
    }

    fn parse(text: &str) -> Option<TaskState> {
        let mut fields = text.split_whitespace();
        let state = TaskState {
            kmin: fields.next()?.parse().ok()?,
            kmax: fields.next()?.parse().ok()?,
            shift: fields.next()?.parse().ok()?,
            k: fields.next()?.parse().ok()?,
            cksum: fields.next()?.parse().ok()?,
            total: fields.next()?.parse().ok()?,
        };
        match fields.next() {
            None => Some(state),
            Some(_) => None,
        }
    }
}

/// The pair of alternating state files in one directory.
pub struct StateFiles {
    dir: PathBuf,
    write_a_next: bool,
}

impl StateFiles {
    pub fn new(dir: &Path) -> StateFiles {
        StateFiles {
            dir: dir.to_path_buf(),
            write_a_next: true,
        }
    }

    fn slot(&self, a: bool) -> PathBuf {
        self.dir.join(if a { STATE_A } else { STATE_B })
    }

    fn read_slot(&self, a: bool, kmin: u32, kmax: u32, shift: u64) -> Option<TaskState> {
        let path = self.slot(a);
        let text = fs::read_to_string(&path).ok()?;
        let state = match TaskState::parse(&text) {
            Some(s) => s,
            None => {
                warn!(path = %path.display(), "unparsable state file ignored");
                return None;
            }
        };
        // A state from a different assignment must not hijack this run.
        if state.kmin != kmin || state.kmax != kmax || state.shift != shift {
            return None;
        }
        Some(state)
    }

    /// Recover the most recent state matching this assignment, if any, and
    /// arrange for the next save to overwrite the stale slot.
    pub fn load(&mut self, kmin: u32, kmax: u32, shift: u64) -> Option<TaskState> {
        let a = self.read_slot(true, kmin, kmax, shift);
        let b = self.read_slot(false, kmin, kmax, shift);
        match (a, b) {
            (Some(a), Some(b)) => {
                if a.k > b.k {
                    self.write_a_next = false;
                    Some(a)
                } else {
                    self.write_a_next = true;
                    Some(b)
                }
            }
            (Some(a), None) => {
                self.write_a_next = false;
                Some(a)
            }
            (None, Some(b)) => {
                self.write_a_next = true;
                Some(b)
            }
            (None, None) => None,
        }
    }

    /// Persist one generation and flip the target slot.
    pub fn save(&mut self, state: &TaskState) -> Result<()> {
        let target = self.slot(self.write_a_next);
        let temp = target.with_extension("tmp");
        fs::write(&temp, state.to_line())
            .with_context(|| format!("writing state to {}", temp.display()))?;
        fs::rename(&temp, &target)
            .with_context(|| format!("committing state file {}", target.display()))?;
        self.write_a_next = !self.write_a_next;
        Ok(())
    }
}
