//! Choosing the applications for a batch.

use crate::error::Result;
use crate::orchestrator::{BatchMode, Orchestrator};
use crate::ui::{Prompt, PromptOption, UserInterface};

use super::display::app_line;

/// Prompt key for the interactive application picker.
pub const SELECT_PROMPT_KEY: &str = "apps";

/// Ids to run, from the command line or an interactive picker.
///
/// Returns `None` when nothing was given and prompting is not possible,
/// which callers report as a usage error.
pub fn select_apps(
    ui: &mut dyn UserInterface,
    orchestrator: &Orchestrator<'_>,
    requested: &[String],
    mode: BatchMode,
    interactive: bool,
) -> Result<Option<Vec<String>>> {
    if !requested.is_empty() {
        return Ok(Some(requested.to_vec()));
    }
    if !interactive {
        ui.error("No applications given. Pass one or more ids, e.g. `devbootstrap install zsh`.");
        return Ok(None);
    }

    let candidates = match mode {
        BatchMode::Install => orchestrator.list_applications(ui),
        BatchMode::Uninstall => orchestrator.list_installed(ui),
    };
    if candidates.is_empty() {
        ui.message("Nothing is installed.");
        return Ok(Some(Vec::new()));
    }

    let options = candidates
        .iter()
        .map(|app| PromptOption::new(app_line(app).trim().to_string(), app.id.clone()))
        .collect();
    let question = match mode {
        BatchMode::Install => "Select applications to install",
        BatchMode::Uninstall => "Select applications to uninstall",
    };
    let answer = ui.prompt(&Prompt::multi_select(SELECT_PROMPT_KEY, question, options, &[]))?;
    Ok(Some(answer.into_strings()))
}
