#![cfg(unix)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use rstest::rstest;
use stager_process::{
    BufferedOutputCallback, OutputType, PathExecutableFinder, ProcessFactory, ProcessRunner,
};
use stager_translation::ErrorKind;
use tempfile::TempDir;

fn sh(script: &str) -> Vec<String> {
    vec!["sh".into(), "-c".into(), script.into()]
}

#[test]
fn empty_command_is_invalid_argument() {
    let err = ProcessFactory::new()
        .create(Vec::<String>::new())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn captures_both_streams() {
    let process = ProcessFactory::new()
        .create(sh("echo out1; echo err1 >&2; echo out2"))
        .unwrap();

    let output = process.run(None, None).unwrap();

    assert!(output.success());
    assert_eq!(output.stdout, "out1\nout2\n");
    assert_eq!(output.stderr, "err1\n");
}

#[test]
fn streams_lines_to_callback_with_their_type() {
    let process = ProcessFactory::new()
        .create(sh("echo hello; echo oops >&2"))
        .unwrap();
    let mut buffer = BufferedOutputCallback::new();

    process.run(Some(&mut buffer), None).unwrap();

    assert_eq!(buffer.output(), vec!["hello"]);
    assert_eq!(buffer.error_output(), vec!["oops"]);
}

#[test]
fn closure_callback_receives_lines_in_order() {
    let process = ProcessFactory::new()
        .create(sh("for i in 1 2 3; do echo line$i; done"))
        .unwrap();
    let mut seen = Vec::new();
    let mut callback = |kind: OutputType, line: &str| {
        assert_eq!(kind, OutputType::Out);
        seen.push(line.to_string());
    };

    process.run(Some(&mut callback), None).unwrap();

    assert_eq!(seen, vec!["line1", "line2", "line3"]);
}

#[test]
fn run_reports_non_zero_exit_without_failing() {
    let process = ProcessFactory::new().create(sh("exit 3")).unwrap();
    let output = process.run(None, None).unwrap();
    assert_eq!(output.exit_code, Some(3));
    assert!(!output.success());
}

#[test]
fn must_run_fails_with_error_output() {
    let process = ProcessFactory::new()
        .create(sh("echo 'disk is full' >&2; exit 1"))
        .unwrap();

    let err = process.must_run(None, None).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Runtime);
    assert!(err.to_string().contains("disk is full"));
}

#[test]
fn timeout_kills_the_process() {
    let process = ProcessFactory::new().create(sh("sleep 5")).unwrap();
    let started = Instant::now();

    let err = process
        .run(None, Some(Duration::from_millis(200)))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Runtime);
    assert!(err.to_string().contains("timeout"));
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[test]
fn fast_process_finishes_within_timeout() {
    let process = ProcessFactory::new().create(sh("echo quick")).unwrap();
    let output = process.run(None, Some(Duration::from_secs(10))).unwrap();
    assert_eq!(output.stdout, "quick\n");
}

#[test]
fn backgrounded_grandchild_does_not_hold_the_run_open() {
    let process = ProcessFactory::new()
        .create(sh("sleep 4 & echo launched"))
        .unwrap();
    let started = Instant::now();

    let output = process.run(None, Some(Duration::from_secs(2))).unwrap();

    assert!(output.success());
    assert_eq!(output.stdout, "launched\n");
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[test]
fn backgrounded_grandchild_without_timeout_returns_when_child_exits() {
    let process = ProcessFactory::new()
        .create(sh("sleep 4 & exit 0"))
        .unwrap();
    let started = Instant::now();

    let output = process.run(None, None).unwrap();

    assert_eq!(output.exit_code, Some(0));
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[test]
fn env_and_working_dir_are_applied() {
    let temp = TempDir::new().unwrap();
    let process = ProcessFactory::new()
        .create(sh("echo $STAGER_GREETING; pwd"))
        .unwrap()
        .with_env("STAGER_GREETING", "hi")
        .with_working_dir(temp.path());

    let output = process.run(None, None).unwrap();
    let lines: Vec<&str> = output.stdout.lines().collect();

    assert_eq!(lines[0], "hi");
    let pwd = std::fs::canonicalize(lines[1]).unwrap();
    assert_eq!(pwd, std::fs::canonicalize(temp.path()).unwrap());
}

#[test]
fn missing_program_is_runtime_error() {
    let process = ProcessFactory::new()
        .create(["/nonexistent/stager-tool"])
        .unwrap();
    let err = process.run(None, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Runtime);
}

#[rstest]
#[case("sh", true)]
#[case("stager-definitely-not-an-executable", false)]
fn runner_availability(#[case] executable: &str, #[case] available: bool) {
    let runner = ProcessRunner::new(executable, Arc::new(PathExecutableFinder::new()));
    assert_eq!(runner.is_available(), available);
    assert_eq!(runner.executable_name(), executable);
}

#[test]
fn runner_runs_in_working_dir() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("marker.txt"), "x").unwrap();
    let runner = ProcessRunner::new("ls", Arc::new(PathExecutableFinder::new()));

    let output = runner.run(&[], Some(temp.path()), None, None).unwrap();

    assert!(output.stdout.contains("marker.txt"));
}

#[test]
fn runner_reports_missing_executable_as_logic_error() {
    let runner = ProcessRunner::new(
        "stager-definitely-not-an-executable",
        Arc::new(PathExecutableFinder::new()),
    );
    let err = runner.run(&[], None, None, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Logic);
}
