//! Neovim plus the command-line tools popular configurations expect.

use std::time::Duration;

use super::brew::{brew, has_homebrew, missing_homebrew};
use super::{
    Flavor, InstallContext, InstallOptions, InstallResult, InstallerStrategy, StatusReport,
    UninstallOptions, UninstallResult,
};
use crate::error::Result;
use crate::platform::OsType;
use crate::shell::CommandSpec;

const PPA: &str = "ppa:neovim-ppa/unstable";

#[derive(Debug, Clone)]
pub struct Neovim {
    flavor: Flavor,
}

impl Neovim {
    pub fn new(flavor: Flavor) -> Self {
        Self { flavor }
    }

    /// Packages installed after Neovim itself.
    fn dependencies(&self) -> &'static [&'static str] {
        match self.flavor {
            Flavor::MacOs => &["ripgrep", "fd", "fzf", "lazygit"],
            Flavor::Debian => &["ripgrep", "fd-find"],
        }
    }

    fn apt_install(ctx: &mut InstallContext<'_>, package: &str, timeout: Duration) -> crate::shell::CommandOutcome {
        ctx.run(
            CommandSpec::new(["apt-get", "install", "-y", package])
                .elevated()
                .description(format!("Installing {}", package))
                .timeout(timeout),
        )
    }

    fn install_package(&self, ctx: &mut InstallContext<'_>, warnings: &mut Vec<String>) -> InstallResult {
        match self.flavor {
            Flavor::MacOs => {
                if !has_homebrew(ctx) {
                    return missing_homebrew("Neovim");
                }
                ctx.info("Installing with Homebrew...");
                let outcome = brew(ctx, &["install", "neovim"], Duration::from_secs(600));
                if !outcome.success {
                    return InstallResult::failure("Failed to install Neovim")
                        .with_error(outcome.error_text());
                }
            }
            Flavor::Debian => {
                // The PPA only exists for Ubuntu; Debian uses its own package.
                if ctx.platform.os == OsType::Ubuntu {
                    ctx.info("Adding the Neovim PPA...");
                    let ppa = ctx.run(
                        CommandSpec::new(["add-apt-repository", "-y", PPA])
                            .elevated()
                            .timeout(Duration::from_secs(300)),
                    );
                    if !ppa.success {
                        warnings.push("Could not add the Neovim PPA; using the distribution package".to_string());
                    }
                }
                let update = ctx.run(
                    CommandSpec::new(["apt-get", "update"])
                        .elevated()
                        .description("Updating the package index")
                        .timeout(Duration::from_secs(300)),
                );
                if !update.success {
                    warnings.push("Failed to update the package index".to_string());
                }
                let outcome = Self::apt_install(ctx, "neovim", Duration::from_secs(600));
                if !outcome.success {
                    return InstallResult::failure("Failed to install Neovim")
                        .with_error(outcome.error_text());
                }
            }
        }
        InstallResult::success("Neovim installed successfully")
    }

    fn install_dependencies(&self, ctx: &mut InstallContext<'_>, result: &mut InstallResult) {
        ctx.section("Installing dependencies");
        for &dep in self.dependencies() {
            let outcome = match self.flavor {
                Flavor::MacOs => brew(ctx, &["install", dep], Duration::from_secs(300)),
                Flavor::Debian => Self::apt_install(ctx, dep, Duration::from_secs(300)),
            };
            if outcome.success {
                ctx.success(&format!("{} installed", dep));
            } else {
                result.add_warning(format!("Failed to install {}", dep));
            }
        }
    }
}

impl InstallerStrategy for Neovim {
    fn check_status(&self, ctx: &mut InstallContext<'_>) -> Result<StatusReport> {
        if ctx.command_exists("nvim") {
            return Ok(StatusReport::installed(ctx.version("nvim")));
        }
        Ok(StatusReport::not_installed())
    }

    fn install(&self, ctx: &mut InstallContext<'_>, _options: &InstallOptions) -> Result<InstallResult> {
        ctx.section("Installing Neovim");
        let mut warnings = Vec::new();
        let mut result = self.install_package(ctx, &mut warnings).with_warnings(warnings);
        if !result.success {
            return Ok(result);
        }
        self.install_dependencies(ctx, &mut result);
        ctx.success("Neovim installed");
        if ctx.command_exists("nvim") {
            result.version = ctx.version("nvim");
        }
        Ok(result)
    }

    fn verify(&self, ctx: &mut InstallContext<'_>) -> bool {
        ctx.command_exists("nvim")
    }

    fn uninstall(
        &self,
        ctx: &mut InstallContext<'_>,
        options: &UninstallOptions,
    ) -> Result<UninstallResult> {
        ctx.section("Uninstalling Neovim");
        let mut result = UninstallResult::success("Neovim uninstalled successfully");

        let outcome = match self.flavor {
            Flavor::MacOs if has_homebrew(ctx) => Some(brew(ctx, &["uninstall", "neovim"], Duration::from_secs(300))),
            Flavor::MacOs => None,
            Flavor::Debian => Some(ctx.run(
                CommandSpec::new(["apt-get", "purge", "-y", "neovim"])
                    .elevated()
                    .timeout(Duration::from_secs(300)),
            )),
        };
        if let Some(outcome) = outcome.filter(|o| !o.success) {
            return Ok(UninstallResult::failure("Failed to remove Neovim").with_error(outcome.error_text()));
        }

        if options.remove_config {
            ctx.info("Removing configuration...");
            ctx.remove_paths(&[ctx.home(".config/nvim")], &mut result.warnings);
        }
        if options.remove_data {
            ctx.info("Removing data...");
            let data = [ctx.home(".local/share/nvim"), ctx.home(".local/state/nvim")];
            ctx.remove_paths(&data, &mut result.warnings);
        }
        if options.remove_cache {
            ctx.info("Removing cache...");
            ctx.remove_paths(&[ctx.home(".cache/nvim")], &mut result.warnings);
        }

        ctx.success("Neovim uninstalled");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::installer::test_support::Harness;
    use crate::shell::{CommandOutcome, MockRunner};

    #[test]
    fn ubuntu_install_adds_ppa_then_dependencies() {
        let runner = MockRunner::new()
            .with_tool("nvim")
            .on("nvim --version", CommandOutcome::success("NVIM v0.10.1\nBuild type: Release"));
        let mut h = Harness::ubuntu(runner);
        let result = Neovim::new(Flavor::Debian)
            .install(&mut h.ctx(), &InstallOptions::default())
            .unwrap();

        assert!(result.success);
        assert_eq!(result.version, "0.10.1");
        let ppa = h.runner.position("add-apt-repository -y ppa:neovim-ppa/unstable").unwrap();
        let nvim = h.runner.position("apt-get install -y neovim").unwrap();
        let fd = h.runner.position("apt-get install -y fd-find").unwrap();
        assert!(ppa < nvim && nvim < fd);
    }

    #[test]
    fn debian_skips_ppa() {
        let mut h = Harness::new(OsType::Debian, MockRunner::new());
        Neovim::new(Flavor::Debian)
            .install(&mut h.ctx(), &InstallOptions::default())
            .unwrap();
        assert!(!h.runner.ran("add-apt-repository"));
        assert!(h.runner.ran("apt-get install -y neovim"));
    }

    #[test]
    fn mac_installs_extra_tools() {
        let mut h = Harness::mac(MockRunner::new().with_tool("brew"));
        Neovim::new(Flavor::MacOs)
            .install(&mut h.ctx(), &InstallOptions::default())
            .unwrap();
        for tool in ["neovim", "ripgrep", "fd", "fzf", "lazygit"] {
            assert!(h.runner.ran(&format!("brew install {}", tool)), "{}", tool);
        }
    }

    #[test]
    fn failed_dependency_keeps_success() {
        let runner = MockRunner::new().fail_on("apt-get install -y ripgrep", "E: broken");
        let mut h = Harness::ubuntu(runner);
        let result = Neovim::new(Flavor::Debian)
            .install(&mut h.ctx(), &InstallOptions::default())
            .unwrap();
        assert!(result.success);
        assert_eq!(result.warnings, vec!["Failed to install ripgrep"]);
    }

    #[test]
    fn failed_package_skips_dependencies() {
        let runner = MockRunner::new().fail_on("apt-get install -y neovim", "E: Unable to locate package neovim");
        let mut h = Harness::ubuntu(runner);
        let result = Neovim::new(Flavor::Debian)
            .install(&mut h.ctx(), &InstallOptions::default())
            .unwrap();
        assert!(!result.success);
        assert!(!h.runner.ran("apt-get install -y ripgrep"));
    }

    #[test]
    fn uninstall_with_config_only_keeps_data() {
        let mut h = Harness::ubuntu(MockRunner::new());
        let config = h.touch(".config/nvim/init.lua");
        let data = h.touch(".local/share/nvim/lazy/lock.json");
        let cache = h.touch(".cache/nvim/log");
        let options = UninstallOptions {
            remove_config: true,
            ..Default::default()
        };

        let result = Neovim::new(Flavor::Debian).uninstall(&mut h.ctx(), &options).unwrap();

        assert!(result.success);
        assert!(!config.exists());
        assert!(data.exists());
        assert!(cache.exists());
    }

    #[test]
    fn dry_run_uninstall_reports_removals() {
        let mut h = Harness::ubuntu(MockRunner::new()).dry_run();
        let config = h.touch(".config/nvim/init.lua");
        let options = UninstallOptions {
            remove_config: true,
            ..Default::default()
        };
        Neovim::new(Flavor::Debian).uninstall(&mut h.ctx(), &options).unwrap();
        assert!(config.exists());
        assert!(h.ui.has_message("[DRY RUN] rm -rf"));
        assert!(h.runner.commands().is_empty());
    }
}
