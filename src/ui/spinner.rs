//! Ephemeral progress spinner.
//!
//! The spinner animates on indicatif's steady-tick thread. That thread only
//! redraws the terminal line; it never sees installation state. The owner
//! must call [`ProgressSpinner::clear`] before printing anything else.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// A progress spinner for long-running operations.
pub struct ProgressSpinner {
    bar: ProgressBar,
}

impl ProgressSpinner {
    /// Create a new spinner with a message and start ticking.
    pub fn new(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(style);
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));

        Self { bar }
    }

    /// Create a spinner that doesn't draw (for quiet modes and tests).
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Update the spinner message.
    pub fn set_message(&self, msg: &str) {
        self.bar.set_message(msg.to_string());
    }

    /// Current message.
    pub fn message(&self) -> String {
        self.bar.message()
    }

    /// Stop the tick thread and erase the line.
    pub fn clear(&self) {
        self.bar.finish_and_clear();
    }

    /// Whether the spinner has been stopped.
    pub fn is_finished(&self) -> bool {
        self.bar.is_finished()
    }
}

impl Drop for ProgressSpinner {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_spinner_tracks_message() {
        let spinner = ProgressSpinner::hidden();
        spinner.set_message("Installing packages");
        assert_eq!(spinner.message(), "Installing packages");
    }

    #[test]
    fn clear_finishes_spinner() {
        let spinner = ProgressSpinner::hidden();
        assert!(!spinner.is_finished());
        spinner.clear();
        assert!(spinner.is_finished());
    }

    #[test]
    fn visible_spinner_can_be_cleared() {
        let spinner = ProgressSpinner::new("Downloading");
        spinner.clear();
        assert!(spinner.is_finished());
    }
}
