//! CLI integration tests for the `apsieve` binary.
//!
//! Spawns the compiled binary with `assert_cmd` and asserts on exit code and
//! output. Real assignments take hours per K, so end-to-end runs here use K
//! ranges the eligibility filter empties out — the binary then exercises
//! argument handling, state files, the results file, and the checksum footer
//! without entering the kernel.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn bin() -> Command {
    Command::cargo_bin("apsieve").unwrap()
}

#[test]
fn help_lists_the_assignment_arguments() {
    bin()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("KMIN"))
        .stdout(predicate::str::contains("KMAX"))
        .stdout(predicate::str::contains("SHIFT"));
}

#[test]
fn missing_arguments_fail_with_usage() {
    bin()
        .args(["100", "200"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn empty_k_range_is_a_configuration_error() {
    bin()
        .args(["200", "100", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("empty K range"));
}

#[test]
fn fully_filtered_range_completes_with_footer() {
    // K = 61 is a sieve prime: the assignment contains nothing searchable
    // and must finish immediately with an empty result set.
    let dir = tempdir().unwrap();
    let results = dir.path().join("SOL-AP26.txt");
    bin()
        .args(["61", "61", "0"])
        .arg("--results")
        .arg(&results)
        .arg("--state-dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Beginning a new search"))
        .stdout(predicate::str::contains("Number of AP10+ found: 0"));

    // Footer: (KMIN + KMAX) in the high 32 bits, zero checksum below.
    let text = fs::read_to_string(&results).unwrap();
    assert_eq!(text.trim(), "0000007A00000000");
    assert!(dir.path().join("AP26-state.a.txt").exists());
}

#[test]
fn multiplier_with_post_prime_factor_is_skipped() {
    // K = 7 fails the eligibility filter; no worker ever spawns.
    let dir = tempdir().unwrap();
    let results = dir.path().join("SOL-AP26.txt");
    bin()
        .args(["7", "7", "0"])
        .arg("--results")
        .arg(&results)
        .arg("--state-dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Number of AP10+ found: 0"));
}

#[test]
fn finished_assignment_resumes_as_complete() {
    let dir = tempdir().unwrap();
    let results = dir.path().join("SOL-AP26.txt");
    let run = |fresh: bool| {
        let mut cmd = bin();
        cmd.args(["61", "61", "0"])
            .arg("--results")
            .arg(&results)
            .arg("--state-dir")
            .arg(dir.path());
        if fresh {
            cmd.arg("--fresh");
        }
        cmd
    };
    run(false).assert().success();
    // The saved state sits past KMAX: nothing left to do.
    run(false)
        .assert()
        .success()
        .stdout(predicate::str::contains("Assignment complete."));
    // A fresh start ignores the state and redoes the (empty) assignment.
    run(true)
        .assert()
        .success()
        .stdout(predicate::str::contains("Beginning a new search"));
}
