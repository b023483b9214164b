//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::time::Duration;

use tracing::debug;

use crate::cli::args::{Cli, Commands, ListArgs};
use crate::config::{load_config, DevBootstrapConfig};
use crate::download::{Downloader, HttpDownloader};
use crate::error::Result;
use crate::fs::{FileSystem, LocalFs};
use crate::orchestrator::Orchestrator;
use crate::platform::Platform;
use crate::shell::{CommandRunner, ProcessRunner};
use crate::ui::{OutputMode, UserInterface};

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `ui` - User interface for displaying output and prompts
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Global flags that change how batches run.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalFlags {
    pub dry_run: bool,
    pub no_interaction: bool,
}

impl From<&Cli> for GlobalFlags {
    fn from(cli: &Cli) -> Self {
        Self {
            dry_run: cli.dry_run,
            no_interaction: cli.no_interaction,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    platform: Platform,
}

impl CommandDispatcher {
    /// Create a dispatcher for the given host.
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    /// Create a dispatcher for the current machine.
    pub fn detect() -> Self {
        Self::new(Platform::detect())
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Dispatch and execute a command against the real host.
    ///
    /// Loads the user configuration, then builds the process runner and
    /// downloader from it.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        if let Some(Commands::Completions(args)) = &cli.command {
            return super::completions::CompletionsCommand::new(args.clone()).execute(ui);
        }

        let config = load_config(cli.config.as_deref(), &self.platform.home_dir)?;
        let runner = ProcessRunner::new().with_privileged(self.platform.is_root);
        let fs = LocalFs::new();
        let downloader = HttpDownloader::with_timeout(Duration::from_secs(
            config.settings.download_timeout_secs,
        ))?;
        self.dispatch_with(cli, &config, ui, &runner, &fs, &downloader)
    }

    /// Dispatch using the given collaborators.
    pub fn dispatch_with(
        &self,
        cli: &Cli,
        config: &DevBootstrapConfig,
        ui: &mut dyn UserInterface,
        runner: &dyn CommandRunner,
        fs: &dyn FileSystem,
        downloader: &dyn Downloader,
    ) -> Result<CommandResult> {
        // The config default applies only when no output flag was given
        if ui.output_mode() == OutputMode::Normal {
            ui.set_output_mode(config.settings.default_output);
        }

        let orchestrator = Orchestrator::new(runner, fs, downloader, &self.platform);
        let flags = GlobalFlags::from(cli);
        debug!(?flags, command = ?cli.command, "Dispatching");

        match &cli.command {
            Some(Commands::Install(args)) => {
                let cmd =
                    super::install::InstallCommand::new(&orchestrator, config, flags, args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Uninstall(args)) => {
                let cmd = super::uninstall::UninstallCommand::new(
                    &orchestrator,
                    config,
                    flags,
                    args.clone(),
                );
                cmd.execute(ui)
            }
            Some(Commands::List(args)) => {
                let cmd = super::list::ListCommand::new(&orchestrator, args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Completions(args)) => {
                let cmd = super::completions::CompletionsCommand::new(args.clone());
                cmd.execute(ui)
            }
            None => {
                // Default to list with default args
                let cmd = super::list::ListCommand::new(&orchestrator, ListArgs::default());
                cmd.execute(ui)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::MockDownloader;
    use crate::platform::{Architecture, OsType};
    use crate::shell::MockRunner;
    use crate::ui::MockUI;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn command_result_success() {
        let result = CommandResult::success();
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn command_result_failure() {
        let result = CommandResult::failure(1);
        assert!(!result.success);
        assert_eq!(result.exit_code, 1);
    }

    fn dispatch(argv: &[&str], config: &DevBootstrapConfig, runner: &MockRunner, ui: &mut MockUI) -> CommandResult {
        let home = TempDir::new().unwrap();
        let dispatcher =
            CommandDispatcher::new(Platform::new(OsType::Ubuntu, Architecture::Amd64, home.path()));
        let cli = Cli::parse_from(argv);
        dispatcher
            .dispatch_with(&cli, config, ui, runner, &LocalFs::new(), &MockDownloader::new())
            .unwrap()
    }

    #[test]
    fn no_subcommand_lists() {
        let mut ui = MockUI::new();
        let result = dispatch(&["devbootstrap"], &DevBootstrapConfig::default(), &MockRunner::new(), &mut ui);
        assert!(result.success);
        assert!(ui.headers().iter().any(|h| h == "Applications"));
    }

    #[test]
    fn config_output_mode_applies_without_flags() {
        let mut config = DevBootstrapConfig::default();
        config.settings.default_output = OutputMode::Quiet;
        let mut ui = MockUI::new();
        dispatch(&["devbootstrap", "list"], &config, &MockRunner::new(), &mut ui);
        assert_eq!(ui.output_mode(), OutputMode::Quiet);
    }

    #[test]
    fn config_no_interaction_blocks_picker() {
        let mut config = DevBootstrapConfig::default();
        config.settings.no_interaction = true;
        let mut ui = MockUI::interactive();
        let result = dispatch(&["devbootstrap", "install"], &config, &MockRunner::new(), &mut ui);
        assert_eq!(result.exit_code, 2);
        assert!(ui.prompts_shown().is_empty());
    }

    #[test]
    fn install_dispatches_to_batch() {
        let runner = MockRunner::new();
        let mut ui = MockUI::new();
        let result = dispatch(&["devbootstrap", "install", "zsh"], &DevBootstrapConfig::default(), &runner, &mut ui);
        assert!(result.success);
        assert!(runner.ran("apt-get install -y zsh"));
    }
}
