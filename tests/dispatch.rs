//! End-to-end dispatcher tests that fork real child processes.
//!
//! The signal policy is process-wide, so it is installed once for the whole
//! test binary. Note that with automatic child reaping in effect, waits
//! inside the dispatcher finish with ECHILD once the child is gone; these
//! tests observe only the behavior the dispatcher promises its caller.

use dsh::dispatch::dispatch;
use dsh::signals;
use once_cell::sync::Lazy;
use std::fs;
use std::thread;
use std::time::{Duration, Instant};

static SIGNAL_POLICY: Lazy<()> = Lazy::new(|| {
    signals::install().expect("failed to install signal policy");
});

fn setup() {
    Lazy::force(&SIGNAL_POLICY);
}

fn argv(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|t| t.to_string()).collect()
}

fn open_descriptors() -> usize {
    fs::read_dir("/proc/self/fd")
        .expect("cannot read /proc/self/fd")
        .count()
}

#[test]
fn foreground_blocks_until_child_exits() {
    setup();
    let started = Instant::now();
    let mut args = argv(&["sleep", "1"]);
    assert_eq!(dispatch(&mut args).unwrap(), true);
    assert!(started.elapsed() >= Duration::from_millis(900));
}

#[test]
fn foreground_exec_failure_is_confined_to_the_child() {
    setup();
    let mut args = argv(&["dsh-no-such-program-exists"]);
    assert_eq!(dispatch(&mut args).unwrap(), true);
}

#[test]
fn background_returns_without_waiting() {
    setup();
    let started = Instant::now();
    let mut args = argv(&["sleep", "5", "&"]);
    assert_eq!(dispatch(&mut args).unwrap(), true);
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[test]
fn background_command_runs_with_ampersand_stripped() {
    setup();
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("marker");
    let script = format!("echo ran > {}", marker.display());
    let mut args = argv(&["sh", "-c", &script, "&"]);
    assert_eq!(dispatch(&mut args).unwrap(), true);

    // The child runs unsupervised; poll for its side effect.
    let deadline = Instant::now() + Duration::from_secs(5);
    while !marker.exists() {
        assert!(Instant::now() < deadline, "background command never ran");
        thread::sleep(Duration::from_millis(20));
    }
    assert_eq!(fs::read_to_string(&marker).unwrap(), "ran\n");
}

#[test]
fn pipeline_feeds_left_output_to_right_input() {
    setup();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let out_path = out.display().to_string();
    let mut args = argv(&["echo", "hi", "|", "tee", &out_path]);
    assert_eq!(dispatch(&mut args).unwrap(), true);

    // dispatch waited for both sides, so tee has already written the file.
    assert_eq!(fs::read_to_string(&out).unwrap(), "hi\n");
}

#[test]
fn pipeline_waits_for_both_children() {
    setup();
    let started = Instant::now();
    let mut args = argv(&["sleep", "1", "|", "sleep", "1"]);
    assert_eq!(dispatch(&mut args).unwrap(), true);
    assert!(started.elapsed() >= Duration::from_millis(900));
}

#[test]
fn pipeline_with_empty_side_is_rejected_but_recoverable() {
    setup();
    let mut args = argv(&["|", "wc"]);
    assert_eq!(dispatch(&mut args).unwrap(), true);
    let mut args = argv(&["ls", "|"]);
    assert_eq!(dispatch(&mut args).unwrap(), true);
}

#[test]
fn lone_ampersand_is_a_no_op() {
    setup();
    let mut args = argv(&["&"]);
    assert_eq!(dispatch(&mut args).unwrap(), true);
}

#[test]
fn repeated_pipelines_do_not_leak_descriptors() {
    setup();
    let before = open_descriptors();
    for _ in 0..100 {
        let mut args = argv(&["true", "|", "true"]);
        assert_eq!(dispatch(&mut args).unwrap(), true);
    }
    // Other tests may briefly hold a few descriptors; a leak here would add
    // two per iteration.
    assert!(open_descriptors() <= before + 16);
}
