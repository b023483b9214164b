//! Starter Neovim configuration in `~/.config/nvim`.

use std::path::PathBuf;

use super::{
    InstallContext, InstallOptions, InstallResult, InstallerStrategy, StatusReport,
    UninstallOptions, UninstallResult,
};
use crate::error::Result;

/// `init.lua` written by the `minimal` preset.
pub const MINIMAL_INIT_LUA: &str = r#"-- Neovim configuration
vim.opt.number = true
vim.opt.relativenumber = true
vim.opt.tabstop = 4
vim.opt.shiftwidth = 4
vim.opt.expandtab = true
vim.opt.smartindent = true
vim.opt.wrap = false
vim.opt.termguicolors = true
vim.opt.scrolloff = 8
vim.opt.signcolumn = "yes"
vim.opt.updatetime = 50

-- Leader key
vim.g.mapleader = " "

-- Basic keymaps
vim.keymap.set("n", "<leader>w", ":w<CR>")
vim.keymap.set("n", "<leader>q", ":q<CR>")
vim.keymap.set("n", "<Esc>", ":noh<CR>")
"#;

/// Works on any platform; only needs `nvim` on PATH.
#[derive(Debug, Clone, Default)]
pub struct NeovimConfig;

impl NeovimConfig {
    pub fn new() -> Self {
        Self
    }

    fn config_dir(ctx: &InstallContext<'_>) -> PathBuf {
        ctx.home(".config/nvim")
    }

    fn init_lua(ctx: &InstallContext<'_>) -> PathBuf {
        Self::config_dir(ctx).join("init.lua")
    }
}

impl InstallerStrategy for NeovimConfig {
    fn check_status(&self, ctx: &mut InstallContext<'_>) -> Result<StatusReport> {
        if ctx.exists(&Self::init_lua(ctx)) {
            return Ok(StatusReport::installed(""));
        }
        Ok(StatusReport::not_installed())
    }

    fn install(&self, ctx: &mut InstallContext<'_>, options: &InstallOptions) -> Result<InstallResult> {
        if !ctx.command_exists("nvim") {
            return Ok(InstallResult::failure(
                "Neovim must be installed before its configuration",
            ));
        }

        let preset = &options.apps.neovim;
        let contents = match (preset.config_preset.as_str(), &preset.custom_config) {
            ("custom", Some(custom)) => custom.as_str(),
            ("custom", None) => {
                return Ok(InstallResult::failure("No custom Neovim configuration provided")
                    .with_error("Set apps.neovim.custom_config or use the minimal preset"))
            }
            _ => MINIMAL_INIT_LUA,
        };

        let dir = Self::config_dir(ctx);
        if ctx.exists(&dir) {
            ctx.info("Backing up the existing configuration...");
            let backup = ctx.home(".config/nvim.backup");
            // An older backup would make the rename fail.
            ctx.remove_all(&backup)?;
            if let Err(e) = ctx.rename(&dir, &backup) {
                return Ok(InstallResult::failure("Could not back up the existing configuration")
                    .with_error(e.to_string()));
            }
        }

        ctx.section("Installing the Neovim configuration");
        if let Err(e) = ctx.create_dir_all(&dir) {
            return Ok(InstallResult::failure("Could not create the configuration directory")
                .with_error(e.to_string()));
        }
        let init = Self::init_lua(ctx);
        if let Err(e) = ctx.write(&init, contents) {
            return Ok(InstallResult::failure("Failed to write the configuration")
                .with_error(e.to_string()));
        }

        ctx.success("Neovim configuration installed");
        Ok(InstallResult::success("Configuration installed successfully").with_path(init))
    }

    fn verify(&self, ctx: &mut InstallContext<'_>) -> bool {
        ctx.exists(&Self::init_lua(ctx))
    }

    fn uninstall(
        &self,
        ctx: &mut InstallContext<'_>,
        _options: &UninstallOptions,
    ) -> Result<UninstallResult> {
        let dir = Self::config_dir(ctx);
        if let Err(e) = ctx.remove_all(&dir) {
            return Ok(UninstallResult::failure("Could not remove the Neovim configuration")
                .with_error(e.to_string()));
        }
        ctx.success("Neovim configuration removed");
        Ok(UninstallResult::success("Configuration removed successfully"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::installer::test_support::Harness;
    use crate::shell::MockRunner;

    #[test]
    fn requires_neovim() {
        let mut h = Harness::ubuntu(MockRunner::new());
        let result = NeovimConfig.install(&mut h.ctx(), &InstallOptions::default()).unwrap();
        assert!(!result.success);
        assert_eq!(result.message, "Neovim must be installed before its configuration");
        assert!(!h.home(".config/nvim").exists());
    }

    #[test]
    fn writes_minimal_config_and_backs_up_existing() {
        let mut h = Harness::mac(MockRunner::new().with_tool("nvim"));
        let old = h.touch(".config/nvim/lua/plugins.lua");

        let result = NeovimConfig.install(&mut h.ctx(), &InstallOptions::default()).unwrap();

        assert!(result.success);
        assert!(!old.exists());
        assert!(h.home(".config/nvim.backup/lua/plugins.lua").exists());
        let written = std::fs::read_to_string(h.home(".config/nvim/init.lua")).unwrap();
        assert_eq!(written, MINIMAL_INIT_LUA);
        assert!(NeovimConfig.verify(&mut h.ctx()));
    }

    #[test]
    fn custom_preset_uses_provided_text() {
        let mut h = Harness::ubuntu(MockRunner::new().with_tool("nvim"));
        let mut options = InstallOptions::default();
        options.apps.neovim.config_preset = "custom".to_string();
        options.apps.neovim.custom_config = Some("vim.opt.number = false\n".to_string());

        NeovimConfig.install(&mut h.ctx(), &options).unwrap();
        let written = std::fs::read_to_string(h.home(".config/nvim/init.lua")).unwrap();
        assert_eq!(written, "vim.opt.number = false\n");
    }

    #[test]
    fn status_is_idempotent() {
        let mut h = Harness::ubuntu(MockRunner::new());
        h.touch(".config/nvim/init.lua");
        let first = NeovimConfig.check_status(&mut h.ctx()).unwrap();
        let second = NeovimConfig.check_status(&mut h.ctx()).unwrap();
        assert!(first.is_installed());
        assert_eq!(first, second);
    }

    #[test]
    fn uninstall_of_missing_config_succeeds() {
        let mut h = Harness::ubuntu(MockRunner::new());
        let result = NeovimConfig
            .uninstall(&mut h.ctx(), &UninstallOptions::default())
            .unwrap();
        assert!(result.success);
    }
}
