//! Scriptable command runner for tests.
//!
//! `MockRunner` never spawns processes. Commands are matched by prefix
//! against configured responses and every executed command is recorded.
//!
//! # Example
//!
//! ```
//! use devbootstrap::shell::{CancelToken, CommandOutcome, CommandRunner, CommandSpec, ExecContext, MockRunner};
//! use devbootstrap::ui::MockUI;
//!
//! let runner = MockRunner::new()
//!     .with_tool("docker")
//!     .on("docker --version", CommandOutcome::success("Docker version 24.0.7"));
//!
//! let mut ui = MockUI::new();
//! let cancel = CancelToken::new();
//! let mut ctx = ExecContext { ui: &mut ui, dry_run: false, askpass: None, allow_terminal: false, cancel: &cancel };
//!
//! assert!(runner.command_exists("docker"));
//! let outcome = runner.execute(&CommandSpec::new(["docker", "--version"]), &mut ctx);
//! assert_eq!(outcome.stdout, "Docker version 24.0.7");
//! assert_eq!(runner.commands(), vec!["docker --version"]);
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

use super::command::{
    elevated_argv, plan_elevation, simulate_if_dry_run, CommandOutcome, CommandRunner,
    CommandSpec, ExecContext,
};

/// A command the mock executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCommand {
    /// Command line without the sudo prefix.
    pub command: String,
    /// Whether elevation was requested.
    pub elevated: bool,
    /// Whether the command was attached to the terminal.
    pub interactive: bool,
}

/// Mock [`CommandRunner`].
#[derive(Debug, Default)]
pub struct MockRunner {
    rules: Vec<(String, CommandOutcome)>,
    fallback: Option<CommandOutcome>,
    paths: HashMap<String, PathBuf>,
    executed: RefCell<Vec<RecordedCommand>>,
    simulated: RefCell<Vec<String>>,
}

impl MockRunner {
    /// Create a runner where every command succeeds with empty output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond to commands starting with `prefix`. Later rules win.
    pub fn on(mut self, prefix: &str, outcome: CommandOutcome) -> Self {
        self.rules.push((prefix.to_string(), outcome));
        self
    }

    /// Make commands starting with `prefix` exit 1 with `stderr`.
    pub fn fail_on(self, prefix: &str, stderr: &str) -> Self {
        self.on(prefix, CommandOutcome::failure(1, "", stderr))
    }

    /// Outcome for commands no rule matches.
    pub fn otherwise(mut self, outcome: CommandOutcome) -> Self {
        self.fallback = Some(outcome);
        self
    }

    /// Pretend `name` is installed at `/usr/bin/<name>`.
    pub fn with_tool(mut self, name: &str) -> Self {
        self.paths
            .insert(name.to_string(), PathBuf::from("/usr/bin").join(name));
        self
    }

    /// Pretend `name` is installed at `path`.
    pub fn with_tool_at(mut self, name: &str, path: impl Into<PathBuf>) -> Self {
        self.paths.insert(name.to_string(), path.into());
        self
    }

    /// Command lines that actually "ran", in order.
    pub fn commands(&self) -> Vec<String> {
        self.executed
            .borrow()
            .iter()
            .map(|c| c.command.clone())
            .collect()
    }

    /// Full records of executed commands.
    pub fn recorded(&self) -> Vec<RecordedCommand> {
        self.executed.borrow().clone()
    }

    /// Command lines skipped by dry run, with their sudo prefix.
    pub fn simulated(&self) -> Vec<String> {
        self.simulated.borrow().clone()
    }

    /// Whether any executed command starts with `prefix`.
    pub fn ran(&self, prefix: &str) -> bool {
        self.executed
            .borrow()
            .iter()
            .any(|c| c.command.starts_with(prefix))
    }

    /// Position of the first executed command starting with `prefix`.
    pub fn position(&self, prefix: &str) -> Option<usize> {
        self.executed
            .borrow()
            .iter()
            .position(|c| c.command.starts_with(prefix))
    }

    fn respond(&self, command: &str) -> CommandOutcome {
        self.rules
            .iter()
            .rev()
            .find(|(prefix, _)| command.starts_with(prefix.as_str()))
            .map(|(_, outcome)| outcome.clone())
            .or_else(|| self.fallback.clone())
            .unwrap_or_else(|| CommandOutcome::success(""))
    }
}

impl CommandRunner for MockRunner {
    fn execute(&self, spec: &CommandSpec, ctx: &mut ExecContext<'_>) -> CommandOutcome {
        let plan = plan_elevation(spec, false, ctx.askpass.is_some(), ctx.allow_terminal, || {
            false
        });
        let display = elevated_argv(&spec.argv, plan.mode).join(" ");

        if let Some(outcome) = simulate_if_dry_run(spec, &display, ctx) {
            self.simulated.borrow_mut().push(display);
            return outcome;
        }

        let command = spec.display();
        self.executed.borrow_mut().push(RecordedCommand {
            command: command.clone(),
            elevated: spec.elevate,
            interactive: spec.interactive,
        });
        self.respond(&command)
    }

    fn command_path(&self, name: &str) -> Option<PathBuf> {
        self.paths.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::CancelToken;
    use crate::ui::MockUI;

    fn exec(runner: &MockRunner, spec: CommandSpec, dry_run: bool) -> CommandOutcome {
        let mut ui = MockUI::new();
        let cancel = CancelToken::new();
        let mut ctx = ExecContext {
            ui: &mut ui,
            dry_run,
            askpass: None,
            allow_terminal: false,
            cancel: &cancel,
        };
        runner.execute(&spec, &mut ctx)
    }

    #[test]
    fn later_rules_override_earlier() {
        let runner = MockRunner::new()
            .fail_on("apt-get", "E: broken")
            .on("apt-get update", CommandOutcome::success("ok"));
        assert!(exec(&runner, CommandSpec::new(["apt-get", "update"]), false).success);
        assert!(!exec(&runner, CommandSpec::new(["apt-get", "install"]), false).success);
    }

    #[test]
    fn dry_run_records_simulated_only() {
        let runner = MockRunner::new();
        exec(&runner, CommandSpec::new(["rm", "-rf", "/tmp/x"]).elevated(), true);
        assert!(runner.commands().is_empty());
        assert_eq!(runner.simulated(), vec!["sudo -n rm -rf /tmp/x"]);
    }

    #[test]
    fn records_elevation_flag() {
        let runner = MockRunner::new();
        exec(&runner, CommandSpec::new(["systemctl", "start", "docker"]).elevated(), false);
        assert!(runner.recorded()[0].elevated);
        assert!(runner.ran("systemctl start"));
        assert_eq!(runner.position("systemctl"), Some(0));
    }

    #[test]
    fn fallback_outcome_applies() {
        let runner = MockRunner::new().otherwise(CommandOutcome::failure(2, "", "nope"));
        assert_eq!(exec(&runner, CommandSpec::new(["anything"]), false).exit_code, 2);
    }
}
