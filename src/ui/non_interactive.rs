//! Non-interactive UI for CI/headless environments.

use std::collections::HashMap;

use crate::error::{BootstrapError, Result};

use super::{parse_bool, OutputMode, Prompt, PromptResult, PromptType, UserInterface};

const OVERRIDE_PREFIX: &str = "DEVBOOTSTRAP_PROMPT_";

/// UI implementation for non-interactive mode.
///
/// Prompts are answered from `DEVBOOTSTRAP_PROMPT_<KEY>` environment
/// variables when present, otherwise from the prompt's default. Progress
/// lines are dropped since they only add noise to log-based output.
pub struct NonInteractiveUI {
    mode: OutputMode,
    env_overrides: HashMap<String, String>,
}

impl NonInteractiveUI {
    /// Create a new non-interactive UI.
    pub fn new(mode: OutputMode) -> Self {
        let env_overrides: HashMap<String, String> = std::env::vars()
            .filter(|(k, _)| k.starts_with(OVERRIDE_PREFIX))
            .collect();

        Self {
            mode,
            env_overrides,
        }
    }

    /// Create with explicit overrides (for testing).
    pub fn with_overrides(mode: OutputMode, overrides: HashMap<String, String>) -> Self {
        Self {
            mode,
            env_overrides: overrides,
        }
    }
}

/// Environment variable name consulted for a prompt key.
fn override_key(key: &str) -> String {
    format!(
        "{}{}",
        OVERRIDE_PREFIX,
        key.to_uppercase().replace(['-', '.'], "_")
    )
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn set_output_mode(&mut self, mode: OutputMode) {
        self.mode = mode;
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_info() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_info() {
            println!("✓ {}", msg);
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("⚠ {}", msg);
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("✗ {}", msg);
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            println!("\n== {} ==\n", title);
        }
    }

    fn show_step(&mut self, current: usize, total: usize, msg: &str) {
        if self.mode.shows_status() {
            println!("[{}/{}] {}", current, total, msg);
        }
    }

    fn show_progress(&mut self, _msg: &str) {}

    fn clear_progress(&mut self) {}

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        let answer = self
            .env_overrides
            .get(&override_key(&prompt.key))
            .or(prompt.default.as_ref());

        let Some(value) = answer else {
            return Err(BootstrapError::PromptUnavailable {
                key: prompt.key.clone(),
            });
        };

        Ok(match prompt.prompt_type {
            PromptType::Confirm => PromptResult::Bool(parse_bool(value)),
            PromptType::MultiSelect { .. } => PromptResult::Strings(
                value
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            ),
            _ => PromptResult::String(value.clone()),
        })
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::PromptOption;

    #[test]
    fn non_interactive_is_not_interactive() {
        let ui = NonInteractiveUI::new(OutputMode::Normal);
        assert!(!ui.is_interactive());
    }

    #[test]
    fn confirm_uses_default_as_bool() {
        let mut ui = NonInteractiveUI::with_overrides(OutputMode::Normal, HashMap::new());
        let result = ui
            .prompt(&Prompt::confirm("reinstall", "Reinstall?", false))
            .unwrap();
        assert_eq!(result.as_bool(), Some(false));
    }

    #[test]
    fn input_uses_default() {
        let mut ui = NonInteractiveUI::with_overrides(OutputMode::Normal, HashMap::new());
        let result = ui
            .prompt(&Prompt::input("theme", "Theme?", Some("robbyrussell")))
            .unwrap();
        assert_eq!(result.as_string(), "robbyrussell");
    }

    #[test]
    fn password_fails_without_override() {
        let mut ui = NonInteractiveUI::with_overrides(OutputMode::Normal, HashMap::new());
        let result = ui.prompt(&Prompt::password("sudo_password", "Password"));
        assert!(matches!(
            result,
            Err(BootstrapError::PromptUnavailable { .. })
        ));
    }

    #[test]
    fn prompt_uses_env_override() {
        let mut overrides = HashMap::new();
        overrides.insert(
            "DEVBOOTSTRAP_PROMPT_ZSH_THEME".to_string(),
            "agnoster".to_string(),
        );
        let mut ui = NonInteractiveUI::with_overrides(OutputMode::Normal, overrides);
        let result = ui
            .prompt(&Prompt::input("zsh-theme", "Theme?", Some("robbyrussell")))
            .unwrap();
        assert_eq!(result.as_string(), "agnoster");
    }

    #[test]
    fn multiselect_prompt_uses_default() {
        let mut ui = NonInteractiveUI::with_overrides(OutputMode::Normal, HashMap::new());
        let prompt = Prompt::multi_select(
            "apps",
            "Apps?",
            vec![
                PromptOption::new("Docker", "docker"),
                PromptOption::new("Zsh", "zsh"),
            ],
            &["docker".to_string(), "zsh".to_string()],
        );
        let result = ui.prompt(&prompt).unwrap();
        assert!(matches!(result, PromptResult::Strings(_)));
        assert_eq!(result.as_string(), "docker,zsh");
    }

    #[test]
    fn override_key_normalizes_separators() {
        assert_eq!(override_key("oh-my-zsh.theme"), "DEVBOOTSTRAP_PROMPT_OH_MY_ZSH_THEME");
    }

    #[test]
    fn output_mode_preserved() {
        let ui = NonInteractiveUI::new(OutputMode::Quiet);
        assert_eq!(ui.output_mode(), OutputMode::Quiet);
    }
}
