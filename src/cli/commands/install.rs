//! Install command implementation.
//!
//! The `devbootstrap install` command installs the selected applications.

use crate::cli::args::InstallArgs;
use crate::config::DevBootstrapConfig;
use crate::error::Result;
use crate::installer::InstallOptions;
use crate::orchestrator::{expand_selection, BatchMode, Operation, Orchestrator};
use crate::shell::CancelToken;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult, GlobalFlags};
use super::display::show_summary;
use super::select::select_apps;

/// The install command implementation.
pub struct InstallCommand<'a> {
    orchestrator: &'a Orchestrator<'a>,
    config: &'a DevBootstrapConfig,
    flags: GlobalFlags,
    args: InstallArgs,
}

impl<'a> InstallCommand<'a> {
    /// Create a new install command.
    pub fn new(
        orchestrator: &'a Orchestrator<'a>,
        config: &'a DevBootstrapConfig,
        flags: GlobalFlags,
        args: InstallArgs,
    ) -> Self {
        Self {
            orchestrator,
            config,
            flags,
            args,
        }
    }

    fn options(&self) -> InstallOptions {
        InstallOptions {
            dry_run: self.flags.dry_run,
            no_interaction: self.flags.no_interaction || self.config.settings.no_interaction,
            apps: self.config.apps.clone(),
        }
    }
}

impl Command for InstallCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let options = self.options();
        let interactive = !options.no_interaction && ui.is_interactive();

        let Some(ids) = select_apps(
            ui,
            self.orchestrator,
            &self.args.apps,
            BatchMode::Install,
            interactive,
        )?
        else {
            return Ok(CommandResult::failure(2));
        };
        if ids.is_empty() {
            ui.message("Nothing selected.");
            return Ok(CommandResult::success());
        }

        let ids = expand_selection(&ids, &options);
        if options.dry_run {
            ui.warning("Dry run: commands are shown, nothing is changed");
        }

        let outcome = self.orchestrator.run_batch(
            &ids,
            &Operation::Install(options),
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
