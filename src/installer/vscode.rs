//! Visual Studio Code: Homebrew cask on macOS, Microsoft apt repository on
//! Ubuntu/Debian. Both finish by installing the configured extensions.

use std::path::PathBuf;
use std::time::Duration;

use super::brew::{brew, has_homebrew, missing_homebrew};
use super::{
    Flavor, InstallContext, InstallOptions, InstallResult, InstallerStrategy, StatusReport,
    UninstallOptions, UninstallResult,
};
use crate::error::Result;
use crate::shell::CommandSpec;

const APP_BUNDLE: &str = "Visual Studio Code.app";
const CASK: &str = "visual-studio-code";
const KEY_URL: &str = "https://packages.microsoft.com/keys/microsoft.asc";
const KEYRING: &str = "/etc/apt/keyrings/packages.microsoft.gpg";
const SOURCES_LIST: &str = "/etc/apt/sources.list.d/vscode.list";
const MANUAL_URL: &str = "https://code.visualstudio.com/download";

#[derive(Debug, Clone)]
pub struct VsCode {
    flavor: Flavor,
    applications: PathBuf,
}

impl VsCode {
    pub fn new(flavor: Flavor) -> Self {
        Self {
            flavor,
            applications: PathBuf::from("/Applications"),
        }
    }

    /// Look for the app bundle in another Applications folder.
    pub fn with_applications(mut self, dir: impl Into<PathBuf>) -> Self {
        self.applications = dir.into();
        self
    }

    fn install_macos(&self, ctx: &mut InstallContext<'_>) -> InstallResult {
        if !has_homebrew(ctx) {
            return missing_homebrew("Visual Studio Code");
        }
        ctx.info("Installing with Homebrew...");
        let outcome = brew(ctx, &["install", "--cask", CASK], Duration::from_secs(600));
        if !outcome.success {
            return InstallResult::failure("Failed to install Visual Studio Code")
                .with_error(outcome.error_text());
        }
        InstallResult::success("Visual Studio Code installed successfully")
            .with_path(self.applications.join(APP_BUNDLE))
    }

    fn install_debian(&self, ctx: &mut InstallContext<'_>) -> InstallResult {
        ctx.info("Adding the Microsoft GPG key...");
        let staged = ctx.temp_dir.join("microsoft.asc");
        if let Err(e) = ctx.download(KEY_URL, &staged) {
            return InstallResult::failure("Failed to download the Microsoft GPG key")
                .with_error(e.to_string())
                .with_error(format!("Download Visual Studio Code manually from {}", MANUAL_URL));
        }
        let staged = staged.display().to_string();
        ctx.run(CommandSpec::new(["mkdir", "-p", "/etc/apt/keyrings"]).elevated());
        let key = ctx.run(
            CommandSpec::new(["gpg", "--dearmor", "--yes", "-o", KEYRING, staged.as_str()]).elevated(),
        );
        if !key.success {
            return InstallResult::failure("Failed to install the Microsoft GPG key")
                .with_error(key.error_text());
        }

        ctx.info("Configuring the APT source...");
        let line = format!(
            "deb [arch=amd64,arm64,armhf signed-by={}] https://packages.microsoft.com/repos/code stable main",
            KEYRING
        );
        let source = ctx.run(
            CommandSpec::bash(&format!("echo '{}' > {}", line, SOURCES_LIST)).elevated(),
        );
        if !source.success {
            return InstallResult::failure("Failed to configure the Visual Studio Code repository")
                .with_error(source.error_text());
        }

        let mut warnings = Vec::new();
        let update = ctx.run(
            CommandSpec::new(["apt-get", "update"])
                .elevated()
                .description("Updating the package index")
                .timeout(Duration::from_secs(300)),
        );
        if !update.success {
            warnings.push("Failed to update the package index".to_string());
        }

        let outcome = ctx.run(
            CommandSpec::new(["apt-get", "install", "-y", "code"])
                .elevated()
                .description("Installing Visual Studio Code")
                .timeout(Duration::from_secs(600)),
        );
        if !outcome.success {
            return InstallResult::failure("Failed to install Visual Studio Code")
                .with_error(outcome.error_text())
                .with_warnings(warnings);
        }
        InstallResult::success("Visual Studio Code installed successfully").with_warnings(warnings)
    }

    fn install_extensions(&self, ctx: &mut InstallContext<'_>, extensions: &[String], result: &mut InstallResult) {
        ctx.section("Installing extensions");
        for extension in extensions {
            let outcome = ctx.run(
                CommandSpec::new(["code", "--install-extension", extension.as_str(), "--force"])
                    .description(format!("Installing {}", extension))
                    .timeout(Duration::from_secs(120)),
            );
            if outcome.success {
                ctx.success(&format!("{} installed", extension));
            } else {
                result.add_warning(format!("Failed to install extension {}", extension));
            }
        }
    }
}

impl InstallerStrategy for VsCode {
    fn check_status(&self, ctx: &mut InstallContext<'_>) -> Result<StatusReport> {
        if ctx.command_exists("code") {
            return Ok(StatusReport::installed(ctx.version("code")));
        }
        if self.flavor == Flavor::MacOs {
            let bundles = [
                self.applications.join(APP_BUNDLE),
                ctx.home("Applications").join(APP_BUNDLE),
            ];
            if bundles.iter().any(|p| ctx.exists(p)) {
                return Ok(StatusReport::installed("('code' command not configured)"));
            }
        }
        Ok(StatusReport::not_installed())
    }

    fn install(&self, ctx: &mut InstallContext<'_>, options: &InstallOptions) -> Result<InstallResult> {
        ctx.section("Installing Visual Studio Code");
        let mut result = match self.flavor {
            Flavor::MacOs => self.install_macos(ctx),
            Flavor::Debian => self.install_debian(ctx),
        };
        if !result.success {
            return Ok(result);
        }
        ctx.success("Visual Studio Code installed");

        let extensions = &options.apps.vscode.extensions;
        if !extensions.is_empty()
            && ctx.confirm("vscode_extensions", "Install recommended extensions?", true)
        {
            self.install_extensions(ctx, extensions, &mut result);
        }
        if ctx.command_exists("code") {
            result.version = ctx.version("code");
        }
        Ok(result)
    }

    fn verify(&self, ctx: &mut InstallContext<'_>) -> bool {
        ctx.command_exists("code")
    }

    fn uninstall(
        &self,
        ctx: &mut InstallContext<'_>,
        options: &UninstallOptions,
    ) -> Result<UninstallResult> {
        ctx.section("Uninstalling Visual Studio Code");
        let mut result = UninstallResult::success("Visual Studio Code uninstalled successfully");

        let data = match self.flavor {
            Flavor::MacOs => {
                if has_homebrew(ctx) {
                    let outcome = brew(ctx, &["uninstall", "--cask", CASK], Duration::from_secs(300));
                    if !outcome.success {
                        result.add_warning(format!("brew uninstall failed: {}", outcome.error_text()));
                    }
                }
                let bundle = self.applications.join(APP_BUNDLE);
                if ctx.exists(&bundle) {
                    if let Err(e) = ctx.remove_all(&bundle) {
                        return Ok(UninstallResult::failure("Could not remove Visual Studio Code.app")
                            .with_error(e.to_string())
                            .with_warnings(result.warnings));
                    }
                }
                vec![ctx.home("Library/Application Support/Code"), ctx.home(".vscode")]
            }
            Flavor::Debian => {
                let outcome = ctx.run(
                    CommandSpec::new(["apt-get", "purge", "-y", "code"])
                        .elevated()
                        .timeout(Duration::from_secs(300)),
                );
                if !outcome.success {
                    return Ok(UninstallResult::failure("Failed to remove Visual Studio Code")
                        .with_error(outcome.error_text()));
                }
                vec![ctx.home(".config/Code"), ctx.home(".vscode")]
            }
        };

        if options.remove_data {
            ctx.info("Removing Visual Studio Code data...");
            ctx.remove_paths(&data, &mut result.warnings);
        }
        ctx.success("Visual Studio Code uninstalled");
        Ok(result)
    }
}
