//! The Z shell. Preinstalled on macOS, installed with apt elsewhere.

use std::time::Duration;

use super::brew::{brew, has_homebrew, missing_homebrew};
use super::oh_my_zsh::{install_dir, plugins_dir, restore_zshrc, EXTERNAL_PLUGINS};
use super::{
    Flavor, InstallContext, InstallOptions, InstallResult, InstallerStrategy, StatusReport,
    UninstallOptions, UninstallResult,
};
use crate::error::Result;
use crate::shell::CommandSpec;

#[derive(Debug, Clone)]
pub struct Zsh {
    flavor: Flavor,
}

impl Zsh {
    pub fn new(flavor: Flavor) -> Self {
        Self { flavor }
    }

    /// Oh My Zsh and plugin cleanup requested alongside the shell.
    fn remove_extras(&self, ctx: &mut InstallContext<'_>, options: &UninstallOptions, warnings: &mut Vec<String>) {
        if options.remove_oh_my_zsh {
            ctx.info("Removing Oh My Zsh...");
            ctx.remove_paths(&[install_dir(ctx)], warnings);
        } else if options.remove_plugins {
            ctx.info("Removing plugins...");
            let dir = plugins_dir(ctx);
            let plugins: Vec<_> = EXTERNAL_PLUGINS
                .iter()
                .map(|(name, _)| dir.join(name))
                .filter(|p| ctx.exists(p))
                .collect();
            ctx.remove_paths(&plugins, warnings);
        }
        if options.remove_zshrc {
            restore_zshrc(ctx, warnings);
        }
    }
}

impl InstallerStrategy for Zsh {
    fn check_status(&self, ctx: &mut InstallContext<'_>) -> Result<StatusReport> {
        if ctx.command_exists("zsh") {
            return Ok(StatusReport::installed(ctx.version("zsh")));
        }
        Ok(StatusReport::not_installed())
    }

    fn install(&self, ctx: &mut InstallContext<'_>, _options: &InstallOptions) -> Result<InstallResult> {
        let outcome = match self.flavor {
            Flavor::MacOs => {
                if ctx.command_exists("zsh") {
                    ctx.success("Zsh ships with macOS");
                    return Ok(InstallResult::success("Zsh already installed")
                        .with_version(ctx.version("zsh")));
                }
                if !has_homebrew(ctx) {
                    return Ok(missing_homebrew("Zsh"));
                }
                ctx.section("Installing Zsh");
                brew(ctx, &["install", "zsh"], Duration::from_secs(300))
            }
            Flavor::Debian => {
                ctx.section("Installing Zsh");
                ctx.run(
                    CommandSpec::new(["apt-get", "install", "-y", "zsh"])
                        .elevated()
                        .description("Installing Zsh")
                        .timeout(Duration::from_secs(300)),
                )
            }
        };

        if !outcome.success {
            return Ok(InstallResult::failure("Failed to install Zsh").with_error(outcome.error_text()));
        }
        ctx.success("Zsh installed");
        let mut result = InstallResult::success("Zsh installed successfully");
        if let Some(path) = ctx.command_path("zsh") {
            result.version = ctx.version("zsh");
            result.path = Some(path);
        }
        Ok(result)
    }

    fn verify(&self, ctx: &mut InstallContext<'_>) -> bool {
        ctx.command_exists("zsh")
    }

    fn uninstall(
        &self,
        ctx: &mut InstallContext<'_>,
        options: &UninstallOptions,
    ) -> Result<UninstallResult> {
        ctx.section("Uninstalling Zsh");
        let mut warnings = Vec::new();

        let message = match self.flavor {
            Flavor::MacOs => {
                warnings.push("Zsh is a macOS system component and was kept".to_string());
                "Zsh kept (system component)"
            }
            Flavor::Debian => {
                let outcome = ctx.run(
                    CommandSpec::new(["apt-get", "purge", "-y", "zsh"])
                        .elevated()
                        .timeout(Duration::from_secs(300)),
                );
                if !outcome.success {
                    return Ok(UninstallResult::failure("Failed to remove Zsh").with_error(outcome.error_text()));
                }
                ctx.success("Zsh removed");
                "Zsh uninstalled successfully"
            }
        };

        self.remove_extras(ctx, options, &mut warnings);
        Ok(UninstallResult::success(message).with_warnings(warnings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::installer::test_support::Harness;
    use crate::shell::{CommandOutcome, MockRunner};

    #[test]
    fn mac_with_zsh_is_a_no_op() {
        let runner = MockRunner::new()
            .with_tool("zsh")
            .on("zsh --version", CommandOutcome::success("zsh 5.9 (arm64-apple-darwin23.0)"));
        let mut h = Harness::mac(runner);
        let result = Zsh::new(Flavor::MacOs)
            .install(&mut h.ctx(), &InstallOptions::default())
            .unwrap();
        assert!(result.success);
        assert_eq!(result.message, "Zsh already installed");
        assert_eq!(result.version, "5.9");
        assert!(!h.runner.ran("brew"));
    }

    #[test]
    fn mac_without_zsh_uses_brew() {
        let mut h = Harness::mac(MockRunner::new().with_tool("brew"));
        let result = Zsh::new(Flavor::MacOs)
            .install(&mut h.ctx(), &InstallOptions::default())
            .unwrap();
        assert!(result.success);
        assert!(h.runner.ran("brew install zsh"));
    }

    #[test]
    fn debian_install_is_elevated() {
        let mut h = Harness::ubuntu(MockRunner::new());
        Zsh::new(Flavor::Debian)
            .install(&mut h.ctx(), &InstallOptions::default())
            .unwrap();
        let record = &h.runner.recorded()[0];
        assert_eq!(record.command, "apt-get install -y zsh");
        assert!(record.elevated);
    }

    #[test]
    fn apt_failure_is_reported() {
        let runner = MockRunner::new().fail_on("apt-get install", "E: Could not get lock /var/lib/dpkg/lock-frontend");
        let mut h = Harness::ubuntu(runner);
        let result = Zsh::new(Flavor::Debian)
            .install(&mut h.ctx(), &InstallOptions::default())
            .unwrap();
        assert!(!result.success);
        assert!(result.errors[0].contains("Could not get lock"));
    }

    #[test]
    fn mac_uninstall_keeps_system_shell() {
        let mut h = Harness::mac(MockRunner::new().with_tool("zsh"));
        let result = Zsh::new(Flavor::MacOs)
            .uninstall(&mut h.ctx(), &UninstallOptions::default())
            .unwrap();
        assert!(result.success);
        assert!(!result.warnings.is_empty());
        assert!(h.runner.commands().is_empty());
    }

    #[test]
    fn plugins_removed_without_touching_framework() {
        let mut h = Harness::ubuntu(MockRunner::new());
        let core = h.touch(".oh-my-zsh/oh-my-zsh.sh");
        let plugin = h.touch(".oh-my-zsh/custom/plugins/zsh-autosuggestions/init.zsh");
        let options = UninstallOptions {
            remove_plugins: true,
            ..Default::default()
        };

        Zsh::new(Flavor::Debian).uninstall(&mut h.ctx(), &options).unwrap();

        assert!(h.runner.ran("apt-get purge -y zsh"));
        assert!(core.exists());
        assert!(!plugin.exists());
    }

    #[test]
    fn remove_oh_my_zsh_removes_framework() {
        let mut h = Harness::ubuntu(MockRunner::new());
        h.touch(".oh-my-zsh/oh-my-zsh.sh");
        let options = UninstallOptions {
            remove_oh_my_zsh: true,
            ..Default::default()
        };
        Zsh::new(Flavor::Debian).uninstall(&mut h.ctx(), &options).unwrap();
        assert!(!h.home(".oh-my-zsh").exists());
    }
}
