//! Interactive terminal UI.

use console::Term;
use std::io::Write;

use crate::error::Result;

use super::{
    prompt_user, should_use_colors, BootstrapTheme, NonInteractiveUI, OutputMode,
    ProgressSpinner, Prompt, PromptResult, UserInterface,
};

/// Interactive terminal UI implementation.
pub struct TerminalUI {
    term: Term,
    theme: BootstrapTheme,
    mode: OutputMode,
    spinner: Option<ProgressSpinner>,
}

impl TerminalUI {
    /// Create a new terminal UI.
    pub fn new(mode: OutputMode) -> Self {
        let theme = if should_use_colors() {
            BootstrapTheme::new()
        } else {
            BootstrapTheme::plain()
        };

        Self {
            term: Term::stdout(),
            theme,
            mode,
            spinner: None,
        }
    }

    fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.clear();
        }
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn set_output_mode(&mut self, mode: OutputMode) {
        self.mode = mode;
    }

    fn message(&mut self, msg: &str) {
        self.stop_spinner();
        if self.mode.shows_info() {
            writeln!(self.term, "{}", self.theme.format_info(msg)).ok();
        }
    }

    fn success(&mut self, msg: &str) {
        self.stop_spinner();
        if self.mode.shows_info() {
            writeln!(self.term, "{}", self.theme.format_success(msg)).ok();
        }
    }

    fn warning(&mut self, msg: &str) {
        self.stop_spinner();
        if self.mode.shows_status() {
            writeln!(self.term, "{}", self.theme.format_warning(msg)).ok();
        }
    }

    fn error(&mut self, msg: &str) {
        self.stop_spinner();
        writeln!(self.term, "{}", self.theme.format_error(msg)).ok();
    }

    fn show_header(&mut self, title: &str) {
        self.stop_spinner();
        if self.mode.shows_status() {
            writeln!(self.term, "\n{}\n", self.theme.format_header(title)).ok();
        }
    }

    fn show_step(&mut self, current: usize, total: usize, msg: &str) {
        self.stop_spinner();
        if self.mode.shows_status() {
            writeln!(self.term, "{}", self.theme.format_step(current, total, msg)).ok();
        }
    }

    fn show_progress(&mut self, msg: &str) {
        if !self.mode.shows_spinners() {
            return;
        }
        match &self.spinner {
            Some(spinner) => spinner.set_message(msg),
            None => self.spinner = Some(ProgressSpinner::new(msg)),
        }
    }

    fn clear_progress(&mut self) {
        self.stop_spinner();
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        self.stop_spinner();
        prompt_user(prompt, &self.term)
    }

    fn is_interactive(&self) -> bool {
        self.term.is_term()
    }
}

/// Create the appropriate UI based on context.
pub fn create_ui(interactive: bool, mode: OutputMode) -> Box<dyn UserInterface> {
    if interactive && Term::stdout().is_term() {
        Box::new(TerminalUI::new(mode))
    } else {
        Box::new(NonInteractiveUI::new(mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_ui_output_mode() {
        let ui = TerminalUI::new(OutputMode::Quiet);
        assert_eq!(ui.output_mode(), OutputMode::Quiet);
    }

    #[test]
    fn quiet_terminal_never_starts_spinner() {
        let mut ui = TerminalUI::new(OutputMode::Quiet);
        ui.show_progress("Downloading");
        assert!(ui.spinner.is_none());
    }

    #[test]
    fn messages_stop_active_spinner() {
        let mut ui = TerminalUI::new(OutputMode::Silent);
        ui.spinner = Some(ProgressSpinner::hidden());
        ui.warning("careful");
        assert!(ui.spinner.is_none());
    }

    #[test]
    fn create_ui_non_interactive() {
        let ui = create_ui(false, OutputMode::Normal);
        assert!(!ui.is_interactive());
    }

    #[test]
    fn create_ui_respects_mode() {
        let ui = create_ui(false, OutputMode::Silent);
        assert_eq!(ui.output_mode(), OutputMode::Silent);
    }
}
