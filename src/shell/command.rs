//! External command execution.
//!
//! A [`CommandSpec`] describes one invocation; a [`CommandRunner`] turns it
//! into a [`CommandOutcome`]. Failures of the command itself (non-zero exit,
//! timeout, cancellation, spawn failure) are reported in the outcome, never as
//! an `Err`, so each installer decides locally what is fatal.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, warn};

use crate::privilege::SecretString;
use crate::ui::UserInterface;

use super::platform::{is_elevated, sudo_credentials_cached};
use super::probe::{parse_system_path, resolve_tool_path};

/// Default deadline for a single command.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Time a signalled command gets to exit after SIGTERM before SIGKILL.
///
/// sudo relays SIGTERM to the command it runs but cannot relay SIGKILL.
const TERM_GRACE: Duration = Duration::from_secs(2);

/// Time to collect already-buffered output after a command was killed.
const DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Environment variable sudo reads for `-A`.
pub const ASKPASS_ENV: &str = "SUDO_ASKPASS";

/// Description of a command to run.
///
/// Built with chained setters and consumed by [`CommandRunner::execute`].
#[derive(Debug, Clone)]
pub struct CommandSpec {
    /// Program followed by its arguments.
    pub argv: Vec<String>,
    /// Working directory.
    pub cwd: Option<PathBuf>,
    /// Environment overrides (merged with the inherited environment).
    pub env: HashMap<String, String>,
    /// Human-readable label shown as ephemeral progress while running.
    pub description: Option<String>,
    /// Run under sudo unless already privileged.
    pub elevate: bool,
    /// Prefer `sudo -n`, relying on an already cached credential.
    pub non_interactive_elevation: bool,
    /// Attach stdin/stdout/stderr to the controlling terminal.
    pub interactive: bool,
    /// Deadline for the whole invocation.
    pub timeout: Duration,
    /// Run even in dry-run mode (read-only probes).
    pub skip_dry_run: bool,
    /// Data written to stdin in captured mode.
    pub stdin: Option<SecretString>,
}

impl CommandSpec {
    /// Create a spec for `argv` with default options.
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            cwd: None,
            env: HashMap::new(),
            description: None,
            elevate: false,
            non_interactive_elevation: false,
            interactive: false,
            timeout: DEFAULT_TIMEOUT,
            skip_dry_run: false,
            stdin: None,
        }
    }

    /// Run `script` through `bash -c`.
    pub fn bash(script: &str) -> Self {
        Self::new(["bash", "-c", script])
    }

    pub fn elevated(mut self) -> Self {
        self.elevate = true;
        self
    }

    pub fn non_interactive_elevation(mut self) -> Self {
        self.elevate = true;
        self.non_interactive_elevation = true;
        self
    }

    pub fn interactive(mut self) -> Self {
        self.interactive = true;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn skip_dry_run(mut self) -> Self {
        self.skip_dry_run = true;
        self
    }

    /// Feed `input` to the command's stdin; it is masked in captured output.
    pub fn stdin(mut self, input: SecretString) -> Self {
        self.stdin = Some(input);
        self
    }

    /// The command line without any elevation prefix.
    pub fn display(&self) -> String {
        self.argv.join(" ")
    }
}

/// Why a command did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecError {
    #[error("exited with code {code}")]
    Exit { code: i32 },

    #[error("Command timed out after {}s", .after.as_secs())]
    Timeout { after: Duration },

    #[error("Command cancelled")]
    Cancelled,

    #[error("failed to start: {message}")]
    Spawn { message: String },
}

/// Result of running a [`CommandSpec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// True iff the process exited 0 or the dry-run bypass applied.
    pub success: bool,
    /// Captured standard output, trimmed.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Process exit code, -1 when there is none (timeout, signal, spawn failure).
    pub exit_code: i32,
    /// Failure kind, `None` on success.
    pub error: Option<ExecError>,
}

impl CommandOutcome {
    /// Create a success outcome.
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into().trim().to_string(),
            stderr: String::new(),
            exit_code: 0,
            error: None,
        }
    }

    /// Outcome of a command skipped by dry run.
    pub fn simulated() -> Self {
        Self::success("")
    }

    /// Create a failure outcome for a non-zero exit.
    pub fn failure(exit_code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: stdout.into().trim().to_string(),
            stderr: stderr.into(),
            exit_code,
            error: Some(ExecError::Exit { code: exit_code }),
        }
    }

    /// Create a failure outcome that never produced an exit code.
    pub fn aborted(error: ExecError) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: error.to_string(),
            exit_code: -1,
            error: Some(error),
        }
    }

    /// Whether the command was killed at its deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self.error, Some(ExecError::Timeout { .. }))
    }

    /// Best text to show for a failure.
    pub fn error_text(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        self.error
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    /// First non-empty line of stdout.
    pub fn first_line(&self) -> Option<String> {
        self.stdout
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .map(str::to_string)
    }
}

/// Cooperative cancellation shared between the caller and running commands.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Per-call execution context threaded down from the batch.
pub struct ExecContext<'a> {
    /// Reporter for progress and dry-run notices.
    pub ui: &'a mut dyn UserInterface,
    /// Report commands instead of running them.
    pub dry_run: bool,
    /// Askpass relay created by the privilege broker, if any.
    pub askpass: Option<&'a Path>,
    /// Whether a command may take over the terminal (sudo password prompt).
    pub allow_terminal: bool,
    /// Cancellation for the running batch.
    pub cancel: &'a CancelToken,
}

/// How sudo is applied to a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Elevation {
    /// Run as-is.
    None,
    /// `sudo -n`: fail fast without a cached credential.
    NonInteractive,
    /// `sudo -A` with the askpass relay.
    Relay,
    /// Plain `sudo` attached to the terminal.
    Terminal,
}

impl Elevation {
    fn prefix(self) -> &'static [&'static str] {
        match self {
            Elevation::None => &[],
            Elevation::NonInteractive => &["sudo", "-n"],
            Elevation::Relay => &["sudo", "-A"],
            Elevation::Terminal => &["sudo"],
        }
    }
}

/// Chosen elevation plus whether a non-interactive request had to fall back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElevationPlan {
    pub mode: Elevation,
    pub fell_back: bool,
}

/// Decide how to elevate a command.
///
/// `cached` is only consulted for non-interactive requests made without a
/// relay, so the `sudo -n true` probe runs at most once per command.
pub fn plan_elevation(
    spec: &CommandSpec,
    privileged: bool,
    has_relay: bool,
    allow_terminal: bool,
    cached: impl FnOnce() -> bool,
) -> ElevationPlan {
    let plan = |mode| ElevationPlan {
        mode,
        fell_back: false,
    };

    if !spec.elevate || privileged {
        return plan(Elevation::None);
    }

    if spec.non_interactive_elevation {
        if has_relay {
            return plan(Elevation::Relay);
        }
        if cached() {
            return plan(Elevation::NonInteractive);
        }
        if allow_terminal {
            return ElevationPlan {
                mode: Elevation::Terminal,
                fell_back: true,
            };
        }
        return plan(Elevation::NonInteractive);
    }

    if has_relay {
        plan(Elevation::Relay)
    } else if allow_terminal {
        plan(Elevation::Terminal)
    } else {
        plan(Elevation::NonInteractive)
    }
}

/// Full argument vector including the elevation prefix.
pub fn elevated_argv(argv: &[String], mode: Elevation) -> Vec<String> {
    mode.prefix()
        .iter()
        .map(|s| s.to_string())
        .chain(argv.iter().cloned())
        .collect()
}

/// Report a command that dry run skipped and return the simulated outcome.
///
/// Returns `None` when the command must actually run.
pub fn simulate_if_dry_run(
    spec: &CommandSpec,
    display: &str,
    ctx: &mut ExecContext<'_>,
) -> Option<CommandOutcome> {
    if !ctx.dry_run || spec.skip_dry_run {
        return None;
    }
    ctx.ui.clear_progress();
    ctx.ui.message(&format!("[DRY RUN] {}", display));
    Some(CommandOutcome::simulated())
}

/// Executes commands and answers PATH queries.
///
/// Implemented by [`ProcessRunner`] for real processes and by
/// [`MockRunner`](super::MockRunner) in tests.
pub trait CommandRunner {
    /// Run a command to completion, timeout or cancellation.
    fn execute(&self, spec: &CommandSpec, ctx: &mut ExecContext<'_>) -> CommandOutcome;

    /// Absolute path of an executable on the search path.
    fn command_path(&self, name: &str) -> Option<PathBuf>;

    /// Whether an executable is on the search path.
    fn command_exists(&self, name: &str) -> bool {
        self.command_path(name).is_some()
    }

    /// First line of `<name> --version`, if it runs successfully.
    fn command_version(&self, name: &str, ctx: &mut ExecContext<'_>) -> Option<String> {
        let spec = CommandSpec::new([name, "--version"])
            .timeout(Duration::from_secs(10))
            .skip_dry_run();
        let outcome = self.execute(&spec, ctx);
        if outcome.success {
            outcome.first_line()
        } else {
            None
        }
    }
}

/// Runs real child processes.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    privileged: bool,
    search_path: Option<Vec<PathBuf>>,
    poll_interval: Duration,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessRunner {
    /// Runner for the current process, detecting root.
    pub fn new() -> Self {
        Self {
            privileged: is_elevated(),
            search_path: None,
            poll_interval: Duration::from_millis(25),
        }
    }

    /// Override privilege detection.
    pub fn with_privileged(mut self, privileged: bool) -> Self {
        self.privileged = privileged;
        self
    }

    /// Resolve executables against `entries` instead of `$PATH`.
    pub fn with_search_path(mut self, entries: Vec<PathBuf>) -> Self {
        self.search_path = Some(entries);
        self
    }

    fn build_command(&self, argv: &[String], spec: &CommandSpec, askpass: Option<&Path>) -> Command {
        let mut cmd = Command::new(&argv[0]);
        cmd.args(&argv[1..]);

        if let Some(path) = askpass {
            cmd.env(ASKPASS_ENV, path);
        }
        for (key, value) in &spec.env {
            cmd.env(key, value);
        }
        if let Some(cwd) = &spec.cwd {
            cmd.current_dir(cwd);
        }
        cmd
    }

    fn run_interactive(
        &self,
        mut cmd: Command,
        spec: &CommandSpec,
        cancel: &CancelToken,
    ) -> CommandOutcome {
        cmd.stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                return CommandOutcome::aborted(ExecError::Spawn {
                    message: e.to_string(),
                })
            }
        };

        let deadline = Instant::now() + spec.timeout;
        match wait_with_deadline(&mut child, deadline, spec.timeout, cancel, self.poll_interval, false) {
            Wait::Exited(status) => outcome_from_status(status, String::new(), String::new()),
            Wait::Aborted(error) => CommandOutcome::aborted(error),
        }
    }

    fn run_captured(
        &self,
        mut cmd: Command,
        spec: &CommandSpec,
        cancel: &CancelToken,
    ) -> CommandOutcome {
        let stdin = if spec.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        };
        cmd.stdin(stdin)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // Own process group so a timeout can take down grandchildren too.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                return CommandOutcome::aborted(ExecError::Spawn {
                    message: e.to_string(),
                })
            }
        };

        if let (Some(mut pipe), Some(input)) = (child.stdin.take(), spec.stdin.as_ref()) {
            // Dropping the pipe closes it so the child sees EOF.
            let _ = pipe.write_all(input.expose().as_bytes());
        }

        let stdout_rx = child.stdout.take().map(spawn_reader);
        let stderr_rx = child.stderr.take().map(spawn_reader);

        let deadline = Instant::now() + spec.timeout;
        let wait = wait_with_deadline(&mut child, deadline, spec.timeout, cancel, self.poll_interval, true);

        // A background grandchild can keep the pipes open after the child
        // exits; the deadline bounds that wait too.
        let drain_until = match wait {
            Wait::Exited(_) => deadline,
            Wait::Aborted(_) => Instant::now() + DRAIN_GRACE,
        };
        let stdout = drain(stdout_rx, drain_until);
        let stderr = drain(stderr_rx, drain_until);

        let overran = matches!(wait, Wait::Exited(_)) && (stdout.is_none() || stderr.is_none());
        let wait = if overran {
            warn!(pid = child.id(), timeout = ?spec.timeout, "Output still open after exit; killing the process group");
            terminate(&mut child, true, self.poll_interval);
            Wait::Aborted(ExecError::Timeout { after: spec.timeout })
        } else {
            wait
        };

        let mut stdout = stdout.unwrap_or_default();
        let mut stderr = stderr.unwrap_or_default();
        if let Some(secret) = &spec.stdin {
            stdout = secret.mask(&stdout);
            stderr = secret.mask(&stderr);
        }

        match wait {
            Wait::Exited(status) => outcome_from_status(status, stdout, stderr),
            Wait::Aborted(error) => CommandOutcome {
                stdout: stdout.trim().to_string(),
                ..CommandOutcome::aborted(error)
            },
        }
    }
}

impl CommandRunner for ProcessRunner {
    fn execute(&self, spec: &CommandSpec, ctx: &mut ExecContext<'_>) -> CommandOutcome {
        if spec.argv.is_empty() {
            return CommandOutcome::aborted(ExecError::Spawn {
                message: "empty command".to_string(),
            });
        }

        let dry_run = ctx.dry_run;
        let plan = plan_elevation(
            spec,
            self.privileged,
            ctx.askpass.is_some(),
            ctx.allow_terminal,
            || !dry_run && sudo_credentials_cached(),
        );
        let argv = elevated_argv(&spec.argv, plan.mode);
        let shown = argv.join(" ");

        if let Some(description) = &spec.description {
            ctx.ui.show_progress(description);
        }

        if let Some(outcome) = simulate_if_dry_run(spec, &shown, ctx) {
            return outcome;
        }

        if plan.fell_back {
            ctx.ui.clear_progress();
            ctx.ui.warning(
                "No cached sudo credentials; falling back to an interactive sudo prompt",
            );
        }

        if ctx.cancel.is_cancelled() {
            ctx.ui.clear_progress();
            return CommandOutcome::aborted(ExecError::Cancelled);
        }

        debug!(command = %shown, elevation = ?plan.mode, timeout = ?spec.timeout, "Running command");

        let askpass = match plan.mode {
            Elevation::Relay => ctx.askpass,
            _ => None,
        };
        let cmd = self.build_command(&argv, spec, askpass);

        let outcome = if spec.interactive || plan.mode == Elevation::Terminal {
            ctx.ui.clear_progress();
            self.run_interactive(cmd, spec, ctx.cancel)
        } else {
            let outcome = self.run_captured(cmd, spec, ctx.cancel);
            ctx.ui.clear_progress();
            outcome
        };

        if !outcome.success {
            debug!(command = %shown, code = outcome.exit_code, error = ?outcome.error, "Command failed");
        }
        outcome
    }

    fn command_path(&self, name: &str) -> Option<PathBuf> {
        if name.contains('/') {
            let path = PathBuf::from(name);
            return super::probe::is_executable(&path).then_some(path);
        }
        match &self.search_path {
            Some(entries) => resolve_tool_path(name, entries),
            None => resolve_tool_path(name, &parse_system_path()),
        }
    }
}

enum Wait {
    Exited(ExitStatus),
    Aborted(ExecError),
}

/// Poll `child` until it exits, `deadline` passes, or `cancel` fires.
///
/// On deadline or cancellation the child is terminated and reaped before
/// returning. With `group` set the whole process group is signalled.
fn wait_with_deadline(
    child: &mut Child,
    deadline: Instant,
    timeout: Duration,
    cancel: &CancelToken,
    poll: Duration,
    group: bool,
) -> Wait {
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Wait::Exited(status),
            Ok(None) => {}
            Err(e) => {
                terminate(child, group, poll);
                return Wait::Aborted(ExecError::Spawn {
                    message: e.to_string(),
                });
            }
        }

        if cancel.is_cancelled() {
            warn!(pid = child.id(), "Cancelling command");
            terminate(child, group, poll);
            return Wait::Aborted(ExecError::Cancelled);
        }

        if Instant::now() >= deadline {
            warn!(pid = child.id(), ?timeout, "Command timed out; terminating it");
            terminate(child, group, poll);
            return Wait::Aborted(ExecError::Timeout { after: timeout });
        }

        thread::sleep(poll);
    }
}

/// SIGTERM, a grace period, then SIGKILL, then reap.
///
/// Elevated commands run under sudo, which forwards SIGTERM to its command
/// but dies alone on SIGKILL.
fn terminate(child: &mut Child, group: bool, poll: Duration) {
    send_signal(child, group, Signal::Term);

    let grace_ends = Instant::now() + TERM_GRACE;
    let mut leader_exited = false;
    while Instant::now() < grace_ends {
        if !leader_exited {
            leader_exited = matches!(child.try_wait(), Ok(Some(_)));
        }
        if leader_exited && !(group && group_alive(child)) {
            break;
        }
        thread::sleep(poll.max(Duration::from_millis(10)));
    }

    send_signal(child, group, Signal::Kill);
    let _ = child.kill();
    let _ = child.wait();
}

#[derive(Clone, Copy)]
enum Signal {
    Term,
    Kill,
}

#[cfg(unix)]
fn send_signal(child: &Child, group: bool, signal: Signal) {
    let Ok(pid) = i32::try_from(child.id()) else {
        return;
    };
    let signo = match signal {
        Signal::Term => libc::SIGTERM,
        Signal::Kill => libc::SIGKILL,
    };
    let target = if group { -pid } else { pid };
    // SAFETY: kill(2) has no memory-safety preconditions. A negative pid
    // addresses the process group created for this child.
    unsafe {
        libc::kill(target, signo);
    }
}

// No signals here; `terminate` falls back to `Child::kill`.
#[cfg(not(unix))]
fn send_signal(_child: &Child, _group: bool, _signal: Signal) {}

#[cfg(unix)]
fn group_alive(child: &Child) -> bool {
    let Ok(pid) = i32::try_from(child.id()) else {
        return false;
    };
    // SAFETY: signal 0 only checks that the group still has members.
    unsafe { libc::kill(-pid, 0) == 0 }
}

#[cfg(not(unix))]
fn group_alive(_child: &Child) -> bool {
    false
}

fn spawn_reader<R: Read + Send + 'static>(mut source: R) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = source.read_to_end(&mut buf);
        let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
    });
    rx
}

/// Output of one reader, or `None` if the pipe is still open at `until`.
fn drain(rx: Option<Receiver<String>>, until: Instant) -> Option<String> {
    let Some(rx) = rx else {
        return Some(String::new());
    };
    match rx.recv_timeout(until.saturating_duration_since(Instant::now())) {
        Ok(output) => Some(output),
        Err(RecvTimeoutError::Disconnected) => Some(String::new()),
        Err(RecvTimeoutError::Timeout) => None,
    }
}

fn outcome_from_status(status: ExitStatus, stdout: String, stderr: String) -> CommandOutcome {
    if status.success() {
        CommandOutcome::success(stdout)
    } else {
        CommandOutcome::failure(status.code().unwrap_or(-1), stdout, stderr)
    }
}
