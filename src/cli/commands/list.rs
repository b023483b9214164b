//! List command implementation.
//!
//! The `devbootstrap list` command shows the catalog with live status.

use crate::apps::ApplicationDescriptor;
use crate::cli::args::ListArgs;
use crate::error::Result;
use crate::orchestrator::Orchestrator;
use crate::ui::theme::BootstrapTheme;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::display::app_line;

/// The list command implementation.
pub struct ListCommand<'a> {
    orchestrator: &'a Orchestrator<'a>,
    args: ListArgs,
}

impl<'a> ListCommand<'a> {
    /// Create a new list command.
    pub fn new(orchestrator: &'a Orchestrator<'a>, args: ListArgs) -> Self {
        Self { orchestrator, args }
    }

    fn applications(&self, ui: &mut dyn UserInterface) -> Vec<ApplicationDescriptor> {
        if self.args.installed {
            self.orchestrator.list_installed(ui)
        } else if self.args.available {
            self.orchestrator.list_not_installed(ui)
        } else {
            self.orchestrator.list_applications(ui)
        }
    }
}

/// Render `apps` as a JSON array.
pub fn render_json(apps: &[ApplicationDescriptor]) -> Result<String> {
    Ok(serde_json::to_string_pretty(apps).map_err(anyhow::Error::from)?)
}

impl Command for ListCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let apps = self.applications(ui);

        if self.args.json {
            println!("{}", render_json(&apps)?);
            return Ok(CommandResult::success());
        }

        let title = if self.args.installed {
            "Installed applications"
        } else if self.args.available {
            "Available applications"
        } else {
            "Applications"
        };
        ui.show_header(title);

        if apps.is_empty() {
            ui.message("  (none)");
            return Ok(CommandResult::success());
        }

        let theme = BootstrapTheme::new();
        for app in &apps {
            ui.message(&app_line(app));
            ui.message(&format!("        {}", theme.dim.apply_to(&app.description)));
        }
        Ok(CommandResult::success())
    }
}
