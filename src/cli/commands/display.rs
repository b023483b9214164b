//! Shared display helpers for batch results and application listings.

use crate::apps::{AppStatus, ApplicationDescriptor};
use crate::orchestrator::{AppOutcome, BatchMode, BatchOutcome};
use crate::ui::UserInterface;

/// Bracketed symbol for an application's status (non-TTY friendly).
pub fn status_symbol(status: AppStatus) -> &'static str {
    match status {
        AppStatus::Installed => "[ok]",
        AppStatus::UpdateAvailable => "[update]",
        AppStatus::NotInstalled => "[  ]",
    }
}

/// One listing line: symbol, id, name and version.
pub fn app_line(app: &ApplicationDescriptor) -> String {
    let mut line = format!("  {} {:<14} {}", status_symbol(app.status), app.id, app.name);
    if !app.version.is_empty() {
        line.push_str(&format!(" ({})", app.version));
    }
    line
}

/// Print one application's result, styled by severity.
pub fn show_app_outcome(ui: &mut dyn UserInterface, id: &str, outcome: &AppOutcome) {
    let line = format!("  {}: {}", id, outcome.message());
    if outcome.success() {
        ui.success(&line);
    } else {
        ui.error(&line);
    }
    for error in outcome.errors() {
        ui.error(&format!("      {}", error));
    }
    for warning in outcome.warnings() {
        ui.warning(&format!("    {}: {}", id, warning));
    }
}

/// Print the end-of-batch summary.
pub fn show_summary(ui: &mut dyn UserInterface, outcome: &BatchOutcome) {
    let title = match outcome.mode {
        BatchMode::Install => "Installation summary",
        BatchMode::Uninstall => "Uninstallation summary",
    };
    ui.show_header(title);
    for (id, app) in &outcome.entries {
        show_app_outcome(ui, id, app);
    }

    let counts = format!(
        "{} succeeded, {} failed ({:.1}s)",
        outcome.succeeded(),
        outcome.failed(),
        outcome.duration.as_secs_f64()
    );
    if outcome.is_success() {
        ui.success(&counts);
    } else {
        ui.error(&counts);
    }
}
