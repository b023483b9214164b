//! Install and uninstall options.
//!
//! [`AppOptions`] is the per-application option bag. It is read from the
//! `apps:` section of the user config, so every field has a serde default.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Options for an install batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct InstallOptions {
    /// Report actions instead of performing them.
    pub dry_run: bool,
    /// Never prompt; take defaults.
    pub no_interaction: bool,
    /// Application-specific settings.
    pub apps: AppOptions,
}

/// Per-application settings, keyed by application id in config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppOptions {
    pub docker: DockerOptions,
    pub vscode: VsCodeOptions,
    pub neovim: NeovimOptions,
    pub zsh: ZshOptions,
    #[serde(rename = "nerd-font")]
    pub nerd_font: FontOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DockerOptions {
    pub install_compose: bool,
    pub add_user_to_docker_group: bool,
    pub start_on_boot: bool,
}

impl Default for DockerOptions {
    fn default() -> Self {
        Self {
            install_compose: true,
            add_user_to_docker_group: true,
            start_on_boot: true,
        }
    }
}

/// Extensions installed after VS Code unless overridden.
pub const DEFAULT_VSCODE_EXTENSIONS: &[&str] = &[
    "ms-python.python",
    "esbenp.prettier-vscode",
    "dbaeumer.vscode-eslint",
    "ms-vscode.vscode-typescript-next",
    "bradlc.vscode-tailwindcss",
    "eamodio.gitlens",
    "PKief.material-icon-theme",
];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct VsCodeOptions {
    pub extensions: Vec<String>,
}

impl Default for VsCodeOptions {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_VSCODE_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct NeovimOptions {
    /// `minimal` writes the bundled init.lua; `custom` writes `custom_config`.
    pub config_preset: String,
    pub custom_config: Option<String>,
}

impl Default for NeovimOptions {
    fn default() -> Self {
        Self {
            config_preset: "minimal".to_string(),
            custom_config: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ZshOptions {
    /// Add oh-my-zsh to an install batch that selects zsh.
    pub install_oh_my_zsh: bool,
    pub theme: String,
    pub plugins: Vec<String>,
}

impl Default for ZshOptions {
    fn default() -> Self {
        Self {
            install_oh_my_zsh: false,
            theme: "robbyrussell".to_string(),
            plugins: vec![
                "git".to_string(),
                "zsh-autosuggestions".to_string(),
                "zsh-syntax-highlighting".to_string(),
            ],
        }
    }
}

/// Supported Nerd Font families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    #[default]
    Meslo,
    FiraCode,
    JetBrains,
    Hack,
}

impl FontFamily {
    pub const ALL: [FontFamily; 4] = [
        FontFamily::Meslo,
        FontFamily::FiraCode,
        FontFamily::JetBrains,
        FontFamily::Hack,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            FontFamily::Meslo => "MesloLG Nerd Font",
            FontFamily::FiraCode => "FiraCode Nerd Font",
            FontFamily::JetBrains => "JetBrainsMono Nerd Font",
            FontFamily::Hack => "Hack Nerd Font",
        }
    }

    /// Homebrew cask name.
    pub fn cask(self) -> &'static str {
        match self {
            FontFamily::Meslo => "font-meslo-lg-nerd-font",
            FontFamily::FiraCode => "font-fira-code-nerd-font",
            FontFamily::JetBrains => "font-jetbrains-mono-nerd-font",
            FontFamily::Hack => "font-hack-nerd-font",
        }
    }

    /// Archive name in the nerd-fonts GitHub release.
    pub fn archive(self) -> &'static str {
        match self {
            FontFamily::Meslo => "Meslo.zip",
            FontFamily::FiraCode => "FiraCode.zip",
            FontFamily::JetBrains => "JetBrainsMono.zip",
            FontFamily::Hack => "Hack.zip",
        }
    }
}

impl fmt::Display for FontFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = match self {
            FontFamily::Meslo => "meslo",
            FontFamily::FiraCode => "firacode",
            FontFamily::JetBrains => "jetbrains",
            FontFamily::Hack => "hack",
        };
        f.write_str(id)
    }
}

impl FromStr for FontFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FontFamily::ALL
            .into_iter()
            .find(|family| family.to_string() == s.to_lowercase())
            .ok_or_else(|| format!("unknown font family '{}' (meslo, firacode, jetbrains, hack)", s))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FontOptions {
    pub family: FontFamily,
}

/// Options for an uninstall batch.
///
/// Removal flags apply to every application in the batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UninstallOptions {
    pub dry_run: bool,
    pub no_interaction: bool,
    pub remove_config: bool,
    pub remove_cache: bool,
    pub remove_data: bool,
    /// Docker: prune all images before removal.
    pub remove_images: bool,
    /// Docker: prune all volumes before removal.
    pub remove_volumes: bool,
    /// Zsh: also remove `~/.oh-my-zsh`.
    pub remove_oh_my_zsh: bool,
    /// Zsh: remove plugins cloned into the oh-my-zsh custom directory.
    pub remove_plugins: bool,
    /// Remove the generated `.zshrc` and restore the backup.
    pub remove_zshrc: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn docker_defaults_are_enabled() {
        let docker = DockerOptions::default();
        assert!(docker.install_compose && docker.add_user_to_docker_group && docker.start_on_boot);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let yaml = "zsh:\n  theme: agnoster\nnerd-font:\n  family: hack\n";
        let apps: AppOptions = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(apps.zsh.theme, "agnoster");
        assert_eq!(apps.zsh.plugins.len(), 3);
        assert_eq!(apps.nerd_font.family, FontFamily::Hack);
        assert_eq!(apps.vscode.extensions.len(), DEFAULT_VSCODE_EXTENSIONS.len());
    }

    #[test]
    fn docker_flags_can_be_disabled() {
        let apps: AppOptions = serde_yaml::from_str("docker:\n  install_compose: false\n").unwrap();
        assert!(!apps.docker.install_compose);
        assert!(apps.docker.start_on_boot);
    }

    #[test]
    fn font_family_parses_ids() {
        assert_eq!("FiraCode".parse::<FontFamily>().unwrap(), FontFamily::FiraCode);
        assert_eq!("jetbrains".parse::<FontFamily>().unwrap().cask(), "font-jetbrains-mono-nerd-font");
        assert!("comic".parse::<FontFamily>().is_err());
    }
}
