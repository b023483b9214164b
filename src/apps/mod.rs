//! The application catalog.

use std::fmt;

use serde::Serialize;

/// Installation state of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AppStatus {
    #[default]
    NotInstalled,
    Installed,
    UpdateAvailable,
}

impl AppStatus {
    /// `Installed` and `UpdateAvailable` both count as installed.
    pub fn is_installed(self) -> bool {
        matches!(self, AppStatus::Installed | AppStatus::UpdateAvailable)
    }
}

impl fmt::Display for AppStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AppStatus::NotInstalled => "not installed",
            AppStatus::Installed => "installed",
            AppStatus::UpdateAvailable => "update available",
        };
        f.write_str(label)
    }
}

/// Classification tag used for grouping in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AppTag {
    App,
    Config,
    Editor,
    Shell,
    Container,
    Font,
}

impl fmt::Display for AppTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AppTag::App => "app",
            AppTag::Config => "config",
            AppTag::Editor => "editor",
            AppTag::Shell => "shell",
            AppTag::Container => "container",
            AppTag::Font => "font",
        };
        f.write_str(label)
    }
}

/// An installable tool and its last observed status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationDescriptor {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tags: Vec<AppTag>,
    pub status: AppStatus,
    /// Empty when not installed.
    pub version: String,
}

impl ApplicationDescriptor {
    pub fn new(id: &str, name: &str, description: &str, tags: &[AppTag]) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            tags: tags.to_vec(),
            status: AppStatus::NotInstalled,
            version: String::new(),
        }
    }

    pub fn is_installed(&self) -> bool {
        self.status.is_installed()
    }

    /// Record the result of a status check.
    pub fn update_status(&mut self, status: AppStatus, version: impl Into<String>) {
        self.status = status;
        self.version = if status.is_installed() {
            version.into()
        } else {
            String::new()
        };
    }

    pub fn has_tag(&self, tag: AppTag) -> bool {
        self.tags.contains(&tag)
    }
}

/// All applications, in display order.
pub fn catalog() -> Vec<ApplicationDescriptor> {
    use AppTag::*;
    vec![
        ApplicationDescriptor::new("docker", "Docker", "Container platform", &[App, Container]),
        ApplicationDescriptor::new(
            "vscode",
            "Visual Studio Code",
            "Lightweight source code editor",
            &[App, Editor],
        ),
        ApplicationDescriptor::new("neovim", "Neovim", "Modern terminal text editor", &[App, Editor]),
        ApplicationDescriptor::new(
            "neovim-config",
            "Neovim Config",
            "Starter configuration for Neovim",
            &[Config],
        ),
        ApplicationDescriptor::new("zsh", "Zsh", "The Z shell", &[App, Shell]),
        ApplicationDescriptor::new(
            "oh-my-zsh",
            "Oh My Zsh",
            "Zsh configuration framework with plugins",
            &[Config],
        ),
        ApplicationDescriptor::new("nerd-font", "Nerd Font", "Patched fonts with terminal icons", &[Font]),
    ]
}

/// Look up a catalog entry by identifier.
pub fn find(id: &str) -> Option<ApplicationDescriptor> {
    catalog().into_iter().find(|app| app.id == id)
}
