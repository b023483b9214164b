//! Shape of the user configuration file.

use serde::Deserialize;

use crate::installer::AppOptions;
use crate::ui::OutputMode;

/// Root of `~/.devbootstrap/config.yml`.
///
/// Every field is optional; an empty file is the default configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DevBootstrapConfig {
    /// Global settings
    pub settings: Settings,

    /// Per-application options, keyed by application id
    pub apps: AppOptions,
}

/// Settings that apply to every batch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Output mode when no `--verbose` / `--quiet` flag is given
    pub default_output: OutputMode,

    /// Upper bound for a single payload download, in seconds
    pub download_timeout_secs: u64,

    /// Never prompt, as if `--no-interaction` were always passed
    pub no_interaction: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_output: OutputMode::Normal,
            download_timeout_secs: default_download_timeout(),
            no_interaction: false,
        }
    }
}

fn default_download_timeout() -> u64 {
    crate::download::DEFAULT_DOWNLOAD_TIMEOUT.as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::installer::FontFamily;

    #[test]
    fn empty_document_is_default() {
        let config: DevBootstrapConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, DevBootstrapConfig::default());
        assert_eq!(config.settings.download_timeout_secs, 1800);
    }

    #[test]
    fn settings_and_apps_parse_together() {
        let yaml = r#"
settings:
  default_output: quiet
  no_interaction: true
apps:
  vscode:
    extensions: [rust-lang.rust-analyzer]
  nerd-font:
    family: jetbrains
"#;
        let config: DevBootstrapConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.settings.default_output, OutputMode::Quiet);
        assert!(config.settings.no_interaction);
        assert_eq!(config.settings.download_timeout_secs, 1800);
        assert_eq!(config.apps.vscode.extensions, vec!["rust-lang.rust-analyzer"]);
        assert_eq!(config.apps.nerd_font.family, FontFamily::JetBrains);
    }

    #[test]
    fn unknown_output_mode_is_rejected() {
        let result: Result<DevBootstrapConfig, _> =
            serde_yaml::from_str("settings:\n  default_output: loud\n");
        assert!(result.is_err());
    }
}
