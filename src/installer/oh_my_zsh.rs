//! Oh My Zsh: cloned into `~/.oh-my-zsh` with a generated `.zshrc`.

use std::path::PathBuf;
use std::time::Duration;

use super::{
    InstallContext, InstallOptions, InstallResult, InstallerStrategy, StatusReport,
    UninstallOptions, UninstallResult, ZshOptions,
};
use crate::error::Result;
use crate::shell::CommandSpec;

const REPOSITORY: &str = "https://github.com/ohmyzsh/ohmyzsh.git";

/// Plugins that do not ship with Oh My Zsh and must be cloned.
pub const EXTERNAL_PLUGINS: &[(&str, &str)] = &[
    ("zsh-autosuggestions", "https://github.com/zsh-users/zsh-autosuggestions"),
    ("zsh-syntax-highlighting", "https://github.com/zsh-users/zsh-syntax-highlighting"),
    ("zsh-completions", "https://github.com/zsh-users/zsh-completions"),
];

/// `.zshrc` for the given theme and plugin list.
pub fn render_zshrc(options: &ZshOptions) -> String {
    format!(
        r#"# Oh My Zsh configuration
export ZSH="$HOME/.oh-my-zsh"

# Theme
ZSH_THEME="{}"

# Plugins
plugins=({})

source $ZSH/oh-my-zsh.sh

# User configuration
export LANG=en_US.UTF-8
export EDITOR='nvim'

# Aliases
alias ll='ls -la'
alias la='ls -A'
alias l='ls -CF'
"#,
        options.theme,
        options.plugins.join(" ")
    )
}

pub(crate) fn install_dir(ctx: &InstallContext<'_>) -> PathBuf {
    ctx.home(".oh-my-zsh")
}

pub(crate) fn plugins_dir(ctx: &InstallContext<'_>) -> PathBuf {
    ctx.home(".oh-my-zsh/custom/plugins")
}

/// Remove the generated `.zshrc`, restoring the backup taken at install.
pub(crate) fn restore_zshrc(ctx: &mut InstallContext<'_>, warnings: &mut Vec<String>) {
    let zshrc = ctx.home(".zshrc");
    let backup = ctx.home(".zshrc.backup");
    ctx.remove_paths(&[zshrc.clone()], warnings);
    if ctx.exists(&backup) {
        match ctx.rename(&backup, &zshrc) {
            Ok(()) => ctx.info(".zshrc restored from backup"),
            Err(e) => warnings.push(format!("Could not restore .zshrc: {}", e)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OhMyZsh;

impl OhMyZsh {
    pub fn new() -> Self {
        Self
    }

    fn write_zshrc(&self, ctx: &mut InstallContext<'_>, options: &ZshOptions, result: &mut InstallResult) {
        let zshrc = ctx.home(".zshrc");
        let backup = ctx.home(".zshrc.backup");
        // An existing backup holds the user's original rc from an earlier run.
        if ctx.exists(&zshrc) && !ctx.exists(&backup) {
            if let Err(e) = ctx.copy(&zshrc, &backup) {
                result.add_warning(format!("Could not back up .zshrc: {}", e));
                return;
            }
        }
        match ctx.write(&zshrc, &render_zshrc(options)) {
            Ok(()) => ctx.success(".zshrc created"),
            Err(e) => result.add_warning(format!("Could not write .zshrc: {}", e)),
        }
    }

    fn install_plugins(&self, ctx: &mut InstallContext<'_>, options: &ZshOptions, result: &mut InstallResult) {
        let wanted: Vec<_> = EXTERNAL_PLUGINS
            .iter()
            .filter(|(name, _)| options.plugins.iter().any(|p| p == name))
            .collect();
        if wanted.is_empty() {
            return;
        }

        ctx.section("Installing plugins");
        let dir = plugins_dir(ctx);
        for &(name, url) in wanted {
            let target = dir.join(name);
            if ctx.exists(&target) {
                continue;
            }
            let target = target.display().to_string();
            let outcome = ctx.run(
                CommandSpec::new(["git", "clone", "--depth=1", url, target.as_str()])
                    .description(format!("Installing {}", name))
                    .timeout(Duration::from_secs(120)),
            );
            if outcome.success {
                ctx.success(&format!("{} installed", name));
            } else {
                result.add_warning(format!("Failed to install plugin {}", name));
            }
        }
    }

    fn set_default_shell(&self, ctx: &mut InstallContext<'_>, result: &mut InstallResult) {
        let Some(zsh) = ctx.command_path("zsh") else {
            result.add_warning("Could not find the zsh executable to set it as the default shell");
            return;
        };
        let username = ctx.platform.username.clone();
        if username.is_empty() {
            result.add_warning("Could not determine the user name to change the default shell");
            return;
        }
        let zsh = zsh.display().to_string();

        ctx.info("Setting Zsh as the default shell...");
        let argv = if ctx.platform.is_macos() {
            vec![
                "dscl".to_string(),
                ".".to_string(),
                "-create".to_string(),
                format!("/Users/{}", username),
                "UserShell".to_string(),
                zsh,
            ]
        } else {
            vec!["chsh".to_string(), "-s".to_string(), zsh, username]
        };
        let manual = format!("sudo {}", argv.join(" "));
        let outcome = ctx.run(
            CommandSpec::new(argv)
                .elevated()
                .description("Setting the default shell"),
        );
        if outcome.success {
            ctx.success("Zsh is now the default shell");
        } else {
            result.add_warning(format!(
                "Could not set Zsh as the default shell; run manually: {}",
                manual
            ));
        }
    }
}

impl InstallerStrategy for OhMyZsh {
    fn check_status(&self, ctx: &mut InstallContext<'_>) -> Result<StatusReport> {
        if ctx.exists(&install_dir(ctx)) {
            return Ok(StatusReport::installed(""));
        }
        Ok(StatusReport::not_installed())
    }

    fn install(&self, ctx: &mut InstallContext<'_>, options: &InstallOptions) -> Result<InstallResult> {
        if !ctx.command_exists("zsh") {
            return Ok(InstallResult::failure("Zsh must be installed before Oh My Zsh"));
        }
        let zsh = &options.apps.zsh;
        let dir = install_dir(ctx);

        // git refuses to clone into a non-empty directory.
        if ctx.exists(&dir) {
            if let Err(e) = ctx.remove_all(&dir) {
                return Ok(InstallResult::failure("Could not remove the previous Oh My Zsh")
                    .with_error(e.to_string()));
            }
        }

        ctx.section("Installing Oh My Zsh");
        let target = dir.display().to_string();
        let outcome = ctx.run(
            CommandSpec::new(["git", "clone", "--depth=1", REPOSITORY, target.as_str()])
                .description("Downloading Oh My Zsh")
                .timeout(Duration::from_secs(300)),
        );
        if !outcome.success {
            return Ok(InstallResult::failure("Failed to download Oh My Zsh")
                .with_error(outcome.error_text()));
        }

        let mut result = InstallResult::success("Oh My Zsh installed successfully").with_path(&dir);
        self.write_zshrc(ctx, zsh, &mut result);
        self.install_plugins(ctx, zsh, &mut result);

        if ctx.confirm("default_shell", "Set Zsh as the default shell?", true) {
            self.set_default_shell(ctx, &mut result);
        }

        ctx.success("Oh My Zsh installed");
        Ok(result)
    }

    fn verify(&self, ctx: &mut InstallContext<'_>) -> bool {
        ctx.exists(&install_dir(ctx))
    }

    fn uninstall(
        &self,
        ctx: &mut InstallContext<'_>,
        options: &UninstallOptions,
    ) -> Result<UninstallResult> {
        ctx.section("Uninstalling Oh My Zsh");
        let mut result = UninstallResult::success("Oh My Zsh uninstalled successfully");

        let dir = install_dir(ctx);
        if let Err(e) = ctx.remove_all(&dir) {
            return Ok(UninstallResult::failure("Could not remove Oh My Zsh").with_error(e.to_string()));
        }
        ctx.success("Oh My Zsh removed");

        if options.remove_zshrc {
            restore_zshrc(ctx, &mut result.warnings);
        }
        Ok(result)
    }
}
