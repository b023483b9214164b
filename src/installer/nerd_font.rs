//! Patched developer fonts from the Nerd Fonts project.
//!
//! macOS installs the Homebrew cask; Linux unpacks the release archive into
//! `~/.local/share/fonts` and refreshes fontconfig.

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::brew::{brew, has_homebrew, installed_casks, missing_homebrew};
use super::{
    Flavor, FontFamily, InstallContext, InstallOptions, InstallResult, InstallerStrategy, StatusReport,
    UninstallOptions, UninstallResult,
};
use crate::error::Result;
use crate::shell::CommandSpec;

const RELEASE_URL: &str = "https://github.com/ryanoasis/nerd-fonts/releases/latest/download";
const MANUAL_URL: &str = "https://www.nerdfonts.com/font-downloads";

#[derive(Debug, Clone)]
pub struct NerdFont {
    flavor: Flavor,
}

impl NerdFont {
    pub fn new(flavor: Flavor) -> Self {
        Self { flavor }
    }

    fn fonts_dir(&self, ctx: &InstallContext<'_>) -> PathBuf {
        match self.flavor {
            Flavor::MacOs => ctx.home("Library/Fonts"),
            Flavor::Debian => ctx.home(".local/share/fonts"),
        }
    }

    /// Font files in `dir` that came from a Nerd Fonts archive.
    fn nerd_files(ctx: &InstallContext<'_>, dir: &Path) -> Vec<PathBuf> {
        ctx.read_dir(dir)
            .unwrap_or_default()
            .into_iter()
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.contains("Nerd"))
            })
            .collect()
    }

    /// Family whose files are present in `dir`, if any.
    fn family_on_disk(ctx: &InstallContext<'_>, dir: &Path) -> Option<FontFamily> {
        let files = Self::nerd_files(ctx, dir);
        if files.is_empty() {
            return None;
        }
        let family = FontFamily::ALL.into_iter().find(|family| {
            let stem = family.archive().trim_end_matches(".zip");
            files.iter().any(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(stem))
            })
        });
        Some(family.unwrap_or_default())
    }

    fn show_instructions(ctx: &mut InstallContext<'_>, family: FontFamily) {
        ctx.section("Configuration");
        ctx.info("To use this font:");
        ctx.info("  1. Open your terminal preferences");
        ctx.info(&format!("  2. Select '{}' as the font", family.display_name()));
        ctx.info("  3. Restart the terminal");
        ctx.info("Themes such as 'agnoster' need a Nerd Font to render their glyphs");
    }

    fn install_macos(&self, ctx: &mut InstallContext<'_>, family: FontFamily) -> InstallResult {
        if !has_homebrew(ctx) {
            return missing_homebrew(family.display_name());
        }
        let mut result = InstallResult::success(format!("{} installed successfully", family.display_name()));

        ctx.info("Adding the homebrew/cask-fonts tap...");
        let tap = brew(ctx, &["tap", "homebrew/cask-fonts"], Duration::from_secs(120));
        if !tap.success {
            // Recent Homebrew ships font casks in the main tap.
            result.add_warning("Could not add the homebrew/cask-fonts tap");
        }

        let outcome = brew(ctx, &["install", "--cask", family.cask()], Duration::from_secs(300));
        if !outcome.success {
            return InstallResult::failure(format!("Failed to install {}", family.display_name()))
                .with_error(outcome.error_text());
        }
        result
    }

    fn install_linux(&self, ctx: &mut InstallContext<'_>, family: FontFamily) -> Result<InstallResult> {
        let dir = self.fonts_dir(ctx);
        ctx.create_dir_all(&dir)?;

        let url = format!("{}/{}", RELEASE_URL, family.archive());
        let archive = ctx.temp_dir.join(family.archive());
        ctx.info(&format!("Downloading {}...", family.display_name()));
        if let Err(e) = ctx.download(&url, &archive) {
            return Ok(InstallResult::failure("Failed to download the font")
                .with_error(e.to_string())
                .with_error(format!("Download it manually from {}", MANUAL_URL)));
        }

        ctx.info("Extracting the font...");
        let unzip = ctx.run(
            CommandSpec::new([
                "unzip".to_string(),
                "-o".to_string(),
                archive.display().to_string(),
                "-d".to_string(),
                dir.display().to_string(),
            ])
            .timeout(Duration::from_secs(120)),
        );
        if !unzip.success {
            return Ok(InstallResult::failure("Failed to extract the font").with_error(unzip.error_text()));
        }

        let mut result = InstallResult::success(format!("{} installed successfully", family.display_name()))
            .with_path(dir.clone());
        ctx.info("Updating the font cache...");
        if !ctx.run(CommandSpec::new(["fc-cache", "-fv"])).success {
            result.add_warning("Failed to refresh the font cache; run fc-cache -fv manually");
        }
        ctx.remove_paths(&[archive], &mut result.warnings);
        Ok(result)
    }
}

impl InstallerStrategy for NerdFont {
    fn check_status(&self, ctx: &mut InstallContext<'_>) -> Result<StatusReport> {
        if self.flavor == Flavor::MacOs && has_homebrew(ctx) {
            let casks = installed_casks(ctx);
            if let Some(family) = FontFamily::ALL
                .into_iter()
                .find(|f| casks.iter().any(|c| c == f.cask()))
            {
                return Ok(StatusReport::installed(family.display_name()));
            }
        }
        let dir = self.fonts_dir(ctx);
        Ok(match Self::family_on_disk(ctx, &dir) {
            Some(family) => StatusReport::installed(family.display_name()),
            None => StatusReport::not_installed(),
        })
    }

    fn install(&self, ctx: &mut InstallContext<'_>, options: &InstallOptions) -> Result<InstallResult> {
        let family = options.apps.nerd_font.family;
        ctx.section(&format!("Installing {}", family.display_name()));

        let result = match self.flavor {
            Flavor::MacOs => self.install_macos(ctx, family),
            Flavor::Debian => self.install_linux(ctx, family)?,
        };
        if result.success {
            ctx.success(&format!("{} installed", family.display_name()));
            Self::show_instructions(ctx, family);
        }
        Ok(result)
    }

    fn verify(&self, ctx: &mut InstallContext<'_>) -> bool {
        self.check_status(ctx).map(|s| s.is_installed()).unwrap_or(false)
    }

    fn uninstall(
        &self,
        ctx: &mut InstallContext<'_>,
        _options: &UninstallOptions,
    ) -> Result<UninstallResult> {
        ctx.section("Uninstalling Nerd Fonts");
        let mut result = UninstallResult::success("Nerd Fonts uninstalled successfully");

        match self.flavor {
            Flavor::MacOs => {
                if has_homebrew(ctx) {
                    let casks = installed_casks(ctx);
                    for family in FontFamily::ALL {
                        if !casks.iter().any(|c| c == family.cask()) {
                            continue;
                        }
                        let outcome = brew(ctx, &["uninstall", "--cask", family.cask()], Duration::from_secs(120));
                        if !outcome.success {
                            result.add_warning(format!("Failed to uninstall {}", family.cask()));
                        }
                    }
                }
                let dir = self.fonts_dir(ctx);
                let files = Self::nerd_files(ctx, &dir);
                ctx.remove_paths(&files, &mut result.warnings);
            }
            Flavor::Debian => {
                let dir = self.fonts_dir(ctx);
                let files = Self::nerd_files(ctx, &dir);
                ctx.remove_paths(&files, &mut result.warnings);
                if !ctx.run(CommandSpec::new(["fc-cache", "-fv"])).success {
                    result.add_warning("Failed to refresh the font cache");
                }
            }
        }

        ctx.success("Nerd Fonts uninstalled");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::MockDownloader;
    use crate::installer::test_support::Harness;
    use crate::shell::{CommandOutcome, MockRunner};

    fn options(family: FontFamily) -> InstallOptions {
        let mut options = InstallOptions::default();
        options.apps.nerd_font.family = family;
        options
    }

    #[test]
    fn mac_installs_selected_cask() {
        let mut h = Harness::mac(MockRunner::new().with_tool("brew"));
        let result = NerdFont::new(Flavor::MacOs)
            .install(&mut h.ctx(), &options(FontFamily::Hack))
            .unwrap();
        assert!(result.success);
        let tap = h.runner.position("brew tap homebrew/cask-fonts").unwrap();
        let cask = h.runner.position("brew install --cask font-hack-nerd-font").unwrap();
        assert!(tap < cask);
        assert!(h.ui.has_message("Select 'Hack Nerd Font'"));
    }

    #[test]
    fn failed_tap_is_only_a_warning() {
        let runner = MockRunner::new()
            .with_tool("brew")
            .fail_on("brew tap", "Error: homebrew/cask-fonts was deprecated");
        let mut h = Harness::mac(runner);
        let result = NerdFont::new(Flavor::MacOs)
            .install(&mut h.ctx(), &InstallOptions::default())
            .unwrap();
        assert!(result.success);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn mac_without_brew_fails() {
        let mut h = Harness::mac(MockRunner::new());
        let result = NerdFont::new(Flavor::MacOs)
            .install(&mut h.ctx(), &InstallOptions::default())
            .unwrap();
        assert!(!result.success);
        assert!(result.message.starts_with("Homebrew is required"));
    }

    #[test]
    fn mac_status_reads_cask_list() {
        let runner = MockRunner::new()
            .with_tool("brew")
            .on("brew list --cask", CommandOutcome::success("font-fira-code-nerd-font\n"));
        let mut h = Harness::mac(runner);
        let status = NerdFont::new(Flavor::MacOs).check_status(&mut h.ctx()).unwrap();
        assert_eq!(status, StatusReport::installed("FiraCode Nerd Font"));
    }

    #[test]
    fn linux_downloads_and_extracts_archive() {
        let mut h = Harness::ubuntu(MockRunner::new());
        let result = NerdFont::new(Flavor::Debian)
            .install(&mut h.ctx(), &options(FontFamily::JetBrains))
            .unwrap();

        assert!(result.success);
        assert_eq!(
            h.downloads.urls(),
            vec!["https://github.com/ryanoasis/nerd-fonts/releases/latest/download/JetBrainsMono.zip"]
        );
        let commands = h.runner.commands();
        assert!(commands[0].starts_with("unzip -o "));
        assert!(commands[0].ends_with(".local/share/fonts"));
        assert_eq!(commands[1], "fc-cache -fv");
        assert!(h.home(".local/share/fonts").is_dir());
        assert!(!h.home("tmp/JetBrainsMono.zip").exists());
    }

    #[test]
    fn download_failure_points_at_manual_page() {
        let downloads = MockDownloader::new().fail_status("https://github.com", 404);
        let mut h = Harness::ubuntu(MockRunner::new()).downloads(downloads);
        let result = NerdFont::new(Flavor::Debian)
            .install(&mut h.ctx(), &InstallOptions::default())
            .unwrap();
        assert!(!result.success);
        assert_eq!(result.message, "Failed to download the font");
        assert!(result.errors.iter().any(|e| e.contains(MANUAL_URL)));
        assert!(!h.runner.ran("unzip"));
    }

    #[test]
    fn linux_status_detects_family_from_files() {
        let mut h = Harness::ubuntu(MockRunner::new());
        h.touch(".local/share/fonts/FiraCodeNerdFont-Regular.ttf");
        h.touch(".local/share/fonts/DejaVuSans.ttf");
        let status = NerdFont::new(Flavor::Debian).check_status(&mut h.ctx()).unwrap();
        assert_eq!(status, StatusReport::installed("FiraCode Nerd Font"));
    }

    #[test]
    fn linux_status_without_fonts_dir() {
        let mut h = Harness::ubuntu(MockRunner::new());
        let status = NerdFont::new(Flavor::Debian).check_status(&mut h.ctx()).unwrap();
        assert!(!status.is_installed());
    }

    #[test]
    fn linux_uninstall_keeps_other_fonts() {
        let mut h = Harness::ubuntu(MockRunner::new());
        let nerd = h.touch(".local/share/fonts/MesloLGSNerdFont-Bold.ttf");
        let other = h.touch(".local/share/fonts/DejaVuSans.ttf");
        let result = NerdFont::new(Flavor::Debian)
            .uninstall(&mut h.ctx(), &UninstallOptions::default())
            .unwrap();
        assert!(result.success);
        assert!(!nerd.exists());
        assert!(other.exists());
        assert!(h.runner.ran("fc-cache -fv"));
    }

    #[test]
    fn mac_uninstall_only_removes_installed_casks() {
        let runner = MockRunner::new()
            .with_tool("brew")
            .on("brew list --cask", CommandOutcome::success("font-meslo-lg-nerd-font\n"));
        let mut h = Harness::mac(runner);
        NerdFont::new(Flavor::MacOs)
            .uninstall(&mut h.ctx(), &UninstallOptions::default())
            .unwrap();
        assert!(h.runner.ran("brew uninstall --cask font-meslo-lg-nerd-font"));
        assert!(!h.runner.ran("brew uninstall --cask font-hack-nerd-font"));
    }
}
