//! Installer strategies.
//!
//! Every application implements [`InstallerStrategy`]: check its status,
//! install it, verify it, uninstall it. Concrete strategies are chosen by
//! [`factory::resolve`] from the application id and the detected platform.
//!
//! Strategies never turn a failed command into an `Err`. They inspect each
//! [`CommandOutcome`](crate::shell::CommandOutcome) and either stop with a
//! failure result or keep going with a warning. `Err` is reserved for
//! conditions the orchestrator must convert into a failure result, such as
//! an unsupported platform.

pub mod brew;
pub mod context;
pub mod docker;
pub mod factory;
pub mod nerd_font;
pub mod neovim;
pub mod neovim_config;
pub mod oh_my_zsh;
pub mod options;
#[cfg(test)]
pub(crate) mod test_support;
pub mod version;
pub mod vscode;
pub mod zsh;

pub use context::InstallContext;
pub use factory::resolve;
pub use options::{
    AppOptions, DockerOptions, FontFamily, FontOptions, InstallOptions, NeovimOptions,
    UninstallOptions, VsCodeOptions, ZshOptions,
};

use std::path::PathBuf;

use serde::Serialize;

use crate::apps::AppStatus;
use crate::error::Result;
use crate::platform::Platform;

/// Result of a status probe.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusReport {
    pub status: AppStatus,
    /// Empty when not installed or unknown.
    pub version: String,
}

impl StatusReport {
    pub fn installed(version: impl Into<String>) -> Self {
        Self {
            status: AppStatus::Installed,
            version: version.into(),
        }
    }

    pub fn not_installed() -> Self {
        Self::default()
    }

    pub fn is_installed(&self) -> bool {
        self.status.is_installed()
    }
}

/// Package manager front end a strategy drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    /// macOS through Homebrew or vendor bundles.
    MacOs,
    /// Ubuntu/Debian through apt.
    Debian,
}

impl Flavor {
    /// Flavor for a platform, if it is supported at all.
    pub fn for_platform(platform: &Platform) -> Option<Self> {
        if platform.is_macos() {
            Some(Flavor::MacOs)
        } else if platform.is_debian_family() {
            Some(Flavor::Debian)
        } else {
            None
        }
    }
}

/// Outcome of one install operation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct InstallResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl InstallResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            ..Default::default()
        }
    }

    /// Attach an error line, skipping empty text.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.add_error(error);
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Carry over warnings collected before the result was built.
    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn add_error(&mut self, error: impl Into<String>) {
        let error = error.into();
        if !error.trim().is_empty() {
            self.errors.push(error.trim().to_string());
        }
    }
}

/// Outcome of one uninstall operation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct UninstallResult {
    pub success: bool,
    pub message: String,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl UninstallResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.add_error(error);
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn add_error(&mut self, error: impl Into<String>) {
        let error = error.into();
        if !error.trim().is_empty() {
            self.errors.push(error.trim().to_string());
        }
    }
}

/// Lifecycle of one application on one platform.
pub trait InstallerStrategy {
    /// Probe whether the application is present. Must not change anything.
    fn check_status(&self, ctx: &mut InstallContext<'_>) -> Result<StatusReport>;

    /// Run the platform's installation sequence.
    fn install(&self, ctx: &mut InstallContext<'_>, options: &InstallOptions)
        -> Result<InstallResult>;

    /// Cheap post-install sanity check.
    fn verify(&self, ctx: &mut InstallContext<'_>) -> bool;

    /// Reverse the installation. Absent state is not an error.
    fn uninstall(
        &self,
        ctx: &mut InstallContext<'_>,
        options: &UninstallOptions,
    ) -> Result<UninstallResult>;
}
