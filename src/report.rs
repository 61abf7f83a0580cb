//! # Report — Solution Serialization, Revalidation, and the Results File
//!
//! The probe certifies terms with a base-2 test only, so everything it
//! reports is revalidated here with the deterministic battery before it can
//! reach the results file. A progression failing revalidation at term `i`
//! still may contain valid sub-progressions: the leading `i` terms and the
//! trailing terms past `i` are re-reported recursively. If even the base-2
//! recheck cannot reproduce the probe's claim, the machine computed
//! something wrong and the search must stop rather than write results.
//!
//! Every reported progression — valid or split, long enough to write or not
//! — folds `first_term mod 1000 + len` into a running checksum wrapped at
//! 2·10⁹; the run footer packs the K-range into the high half:
//! `((KMIN+KMAX) << 32) | cksum`, written as 16 uppercase hex digits.
//!
//! One mutex serializes the whole path; workers hit it only on the rare
//! probe success.

use crate::constants::{CKSUM_WRAP, MIN_REPORT_LEN, PRIM23};
use crate::{primality, SolutionSink};
use anyhow::{bail, Context, Result};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn};

/// Fold one reported progression into the running checksum.
fn fold_cksum(cksum: u32, len: u32, first_term: u64) -> u32 {
    let mut sum = cksum as u64 + first_term % 1000 + len as u64;
    while sum > CKSUM_WRAP {
        sum -= CKSUM_WRAP;
    }
    sum as u32
}

struct RecorderState {
    cksum: u32,
    total: u32,
    out: File,
}

/// Mutex-serialized solution sink writing the results file.
pub struct Recorder {
    path: PathBuf,
    state: Mutex<RecorderState>,
}

impl Recorder {
    /// Open the results file, truncating on a fresh start and appending on
    /// resume, and restore the running counters.
    pub fn open(path: &Path, resume: bool, cksum: u32, total: u32) -> Result<Recorder> {
        let out = OpenOptions::new()
            .create(true)
            .append(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("opening results file {}", path.display()))?;
        if !resume {
            out.set_len(0)
                .with_context(|| format!("clearing results file {}", path.display()))?;
        }
        Ok(Recorder {
            path: path.to_path_buf(),
            state: Mutex::new(RecorderState { cksum, total, out }),
        })
    }

    /// Running `(cksum, total progressions reported)`.
    pub fn snapshot(&self) -> (u32, u32) {
        let state = self.state.lock().unwrap();
        (state.cksum, state.total)
    }

    /// Append the run footer: K-range in the high 32 bits, checksum in the
    /// low, as 16 uppercase hex digits.
    pub fn write_footer(&self, kmin: u32, kmax: u32) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let mut range = kmin as u64 + kmax as u64;
        while range > CKSUM_WRAP {
            range -= CKSUM_WRAP;
        }
        let footer = (range << 32) | state.cksum as u64;
        writeln!(state.out, "{:016X}", footer)
            .with_context(|| format!("writing footer to {}", self.path.display()))?;
        state.out.flush()?;
        Ok(())
    }

    fn record(state: &mut RecorderState, path: &Path, len: u32, k: u64, first_term: u64) -> Result<()> {
        state.cksum = fold_cksum(state.cksum, len, first_term);

        let step = k * PRIM23;
        let valid_to = primality::first_failing_term(len, step, first_term);
        if valid_to < len {
            // The probe runs base-2 only; a pseudoprime term is expected
            // occasionally. Anything else is a genuine computation error.
            if primality::first_failing_term_2(len, step, first_term) < len {
                bail!(
                    "progression of {} terms at {} fails its own base-2 certificate",
                    len,
                    first_term
                );
            }
            warn!(
                len,
                first_term,
                failing_index = valid_to,
                "probe result contains a base-2 pseudoprime, splitting"
            );
            Self::record(state, path, valid_to, k, first_term)?;
            let tail_len = len - (valid_to + 1);
            let tail_first = first_term + (valid_to as u64 + 1) * step;
            Self::record(state, path, tail_len, k, tail_first)?;
            return Ok(());
        }

        if len >= MIN_REPORT_LEN {
            info!(len, k, first_term, "progression found");
            writeln!(state.out, "{} {} {}", len, k, first_term)
                .with_context(|| format!("writing to {}", path.display()))?;
        }
        Ok(())
    }
}

impl SolutionSink for Recorder {
    fn solution(&self, len: u32, k: u64, first_term: u64) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, &self.path, len, k, first_term)?;
        state.total += 1;
        Ok(())
    }
}

/// Sink collecting solutions in memory; the handoff point for embedders and
/// tests that do not want a results file.
#[derive(Default)]
pub struct Collected {
    solutions: Mutex<Vec<(u32, u64, u64)>>,
}

impl Collected {
    pub fn new() -> Collected {
        Collected::default()
    }

    /// All solutions reported so far, as `(len, k, first_term)`.
    pub fn take(&self) -> Vec<(u32, u64, u64)> {
        std::mem::take(&mut self.solutions.lock().unwrap())
    }
}

impl SolutionSink for Collected {
    fn solution(&self, len: u32, k: u64, first_term: u64) -> Result<()> {
        self.solutions.lock().unwrap().push((len, k, first_term));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn cksum_folds_and_wraps() {
        assert_eq!(fold_cksum(0, 26, 43_142_746_595_714_191), 26 + 191);
        assert_eq!(fold_cksum(1_999_999_990, 20, 999), 1_999_999_990 + 20 + 999 - 2_000_000_000);
    }

    #[test]
    fn record_progression_reaches_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("solutions.txt");
        let rec = Recorder::open(&path, false, 0, 0).unwrap();
        rec.solution(26, 11_840_885, 43_142_746_595_714_191).unwrap();
        rec.write_footer(11_840_885, 11_840_885).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("26 11840885 43142746595714191"));
        let footer = lines.next().unwrap();
        assert_eq!(footer.len(), 16);
        let packed = u64::from_str_radix(footer, 16).unwrap();
        assert_eq!(packed & 0xFFFF_FFFF, (26 + 191) as u64);
        assert_eq!(packed >> 32, 2 * 11_840_885 as u64);
        assert_eq!(rec.snapshot(), (26 + 191, 1));
    }

    #[test]
    fn short_progressions_count_but_do_not_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("solutions.txt");
        let rec = Recorder::open(&path, false, 0, 0).unwrap();
        // A "progression" of 1 genuine prime: valid, but below the write bar.
        rec.solution(1, 1, 446_189_017).unwrap();
        assert_eq!(rec.snapshot(), (17 + 1, 1));
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn pseudoprime_term_splits_into_sub_progressions() {
        // 3277 = 29·113 is a base-2 strong pseudoprime, and 3277 + PRIM23
        // is prime: the probe would report the pair as a 2-term progression.
        // Revalidation must split it without erroring and fold all three
        // reports (whole, leading empty, trailing single) into the checksum.
        let dir = tempdir().unwrap();
        let path = dir.path().join("solutions.txt");
        let rec = Recorder::open(&path, false, 0, 0).unwrap();
        rec.solution(2, 1, 3_277).unwrap();
        let (cksum, total) = rec.snapshot();
        assert_eq!(cksum, (277 + 2) + 277 + (17 + 1));
        assert_eq!(total, 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn impossible_certificate_is_a_fatal_error() {
        // 25 is composite to every base; claiming it as a 1-term progression
        // cannot be explained by a pseudoprime and must error out.
        let dir = tempdir().unwrap();
        let path = dir.path().join("solutions.txt");
        let rec = Recorder::open(&path, false, 0, 0).unwrap();
        assert!(rec.solution(1, 1, 25).is_err());
    }

    #[test]
    fn resume_appends_and_restores_counters() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("solutions.txt");
        {
            let rec = Recorder::open(&path, false, 0, 0).unwrap();
            rec.solution(26, 11_840_885, 43_142_746_595_714_191).unwrap();
        }
        let rec = Recorder::open(&path, true, 217, 1).unwrap();
        assert_eq!(rec.snapshot(), (217, 1));
        rec.solution(26, 11_840_885, 43_142_746_595_714_191).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert_eq!(rec.snapshot(), (2 * 217, 2));
    }

    #[test]
    fn collected_sink_accumulates() {
        let sink = Collected::new();
        sink.solution(20, 5, 77).unwrap();
        sink.solution(21, 5, 99).unwrap();
        assert_eq!(sink.take(), vec![(20, 5, 77), (21, 5, 99)]);
        assert!(sink.take().is_empty());
    }
}
