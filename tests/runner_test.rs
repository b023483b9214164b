//! Process runner integration tests against real child processes.
#![cfg(unix)]

use std::fs;
use std::time::{Duration, Instant};

use devbootstrap::shell::{CancelToken, CommandRunner, CommandSpec, ExecContext, ExecError, ProcessRunner};
use devbootstrap::ui::MockUI;
use tempfile::TempDir;

fn run(spec: &CommandSpec) -> devbootstrap::shell::CommandOutcome {
    let mut ui = MockUI::new();
    let cancel = CancelToken::new();
    let mut ctx = ExecContext {
        ui: &mut ui,
        dry_run: false,
        askpass: None,
        allow_terminal: false,
        cancel: &cancel,
    };
    ProcessRunner::new().execute(spec, &mut ctx)
}

#[test]
fn timed_out_process_is_gone() {
    let temp = TempDir::new().unwrap();
    let pid_file = temp.path().join("pid");
    let script = format!("echo $$ > '{}'; sleep 30", pid_file.display());

    let started = Instant::now();
    let outcome = run(&CommandSpec::bash(&script).timeout(Duration::from_millis(500)));

    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(!outcome.success);
    assert!(outcome.is_timeout());
    assert!(matches!(outcome.error, Some(ExecError::Timeout { .. })));

    let pid: i32 = fs::read_to_string(&pid_file).unwrap().trim().parse().unwrap();
    // SAFETY: signal 0 only checks for existence.
    let alive = unsafe { libc::kill(pid, 0) } == 0;
    assert!(!alive, "process {} survived its timeout", pid);
}

#[test]
fn stderr_is_captured_on_failure() {
    let outcome = run(&CommandSpec::bash("echo 'E: Unable to locate package' >&2; exit 100"));
    assert!(!outcome.success);
    assert_eq!(outcome.exit_code, 100);
    assert!(outcome.error_text().contains("Unable to locate package"));
}

#[test]
fn environment_reaches_the_child() {
    let outcome = run(&CommandSpec::bash("printf %s \"$DEVBOOTSTRAP_TEST\"").env("DEVBOOTSTRAP_TEST", "hello"));
    assert!(outcome.success);
    assert_eq!(outcome.stdout, "hello");
}
