//! Uninstall command implementation.
//!
//! The `devbootstrap uninstall` command removes the selected applications,
//! applying the same removal flags to each of them.

use crate::cli::args::UninstallArgs;
use crate::config::DevBootstrapConfig;
use crate::error::Result;
use crate::orchestrator::{BatchMode, Operation, Orchestrator};
use crate::shell::CancelToken;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult, GlobalFlags};
use super::display::show_summary;
use super::select::select_apps;

/// The uninstall command implementation.
pub struct UninstallCommand<'a> {
    orchestrator: &'a Orchestrator<'a>,
    config: &'a DevBootstrapConfig,
    flags: GlobalFlags,
    args: UninstallArgs,
}

impl<'a> UninstallCommand<'a> {
    /// Create a new uninstall command.
    pub fn new(
        orchestrator: &'a Orchestrator<'a>,
        config: &'a DevBootstrapConfig,
        flags: GlobalFlags,
        args: UninstallArgs,
    ) -> Self {
        Self {
            orchestrator,
            config,
            flags,
            args,
        }
    }
}

impl Command for UninstallCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let no_interaction = self.flags.no_interaction || self.config.settings.no_interaction;
        let options = self.args.options(self.flags.dry_run, no_interaction);
        let interactive = !no_interaction && ui.is_interactive();

        let Some(ids) = select_apps(
            ui,
            self.orchestrator,
            &self.args.apps,
            BatchMode::Uninstall,
            interactive,
        )?
        else {
            return Ok(CommandResult::failure(2));
        };
        if ids.is_empty() {
            ui.message("Nothing selected.");
            return Ok(CommandResult::success());
        }

        if options.dry_run {
            ui.warning("Dry run: commands are shown, nothing is changed");
        }

        let outcome = self.orchestrator.run_batch(
            &ids,
            &Operation::Uninstall(options),
            ui,
            &CancelToken::new(),
        )?;
        show_summary(ui, &outcome);

        Ok(if outcome.is_success() {
            CommandResult::success()
        } else {
            CommandResult::failure(outcome.exit_code())
        })
    }
}
