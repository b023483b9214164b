//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::installer::UninstallOptions;

/// devbootstrap - Install and remove developer tools on a workstation.
#[derive(Debug, Parser)]
#[command(name = "devbootstrap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides ~/.devbootstrap/config.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Show what would be done without changing anything
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Never prompt; take defaults
    #[arg(short = 'n', long, global = true)]
    pub no_interaction: bool,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Install applications
    Install(InstallArgs),

    /// Uninstall applications
    Uninstall(UninstallArgs),

    /// List applications and their status (default if no command specified)
    List(ListArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `install` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct InstallArgs {
    /// Application ids (prompted for when omitted)
    #[arg(value_name = "APP")]
    pub apps: Vec<String>,
}

/// Arguments for the `uninstall` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct UninstallArgs {
    /// Application ids (prompted for when omitted)
    #[arg(value_name = "APP")]
    pub apps: Vec<String>,

    /// Also remove configuration directories
    #[arg(long)]
    pub remove_config: bool,

    /// Also remove cache directories
    #[arg(long)]
    pub remove_cache: bool,

    /// Also remove data directories
    #[arg(long)]
    pub remove_data: bool,

    /// Docker: remove all images
    #[arg(long)]
    pub remove_images: bool,

    /// Docker: remove all volumes
    #[arg(long)]
    pub remove_volumes: bool,

    /// Zsh: also remove Oh My Zsh
    #[arg(long)]
    pub remove_oh_my_zsh: bool,

    /// Zsh: remove plugins cloned into Oh My Zsh
    #[arg(long)]
    pub remove_plugins: bool,

    /// Remove the generated .zshrc and restore the backup
    #[arg(long)]
    pub remove_zshrc: bool,
}

impl UninstallArgs {
    /// Removal policy applied to every application in the batch.
    pub fn options(&self, dry_run: bool, no_interaction: bool) -> UninstallOptions {
        UninstallOptions {
            dry_run,
            no_interaction,
            remove_config: self.remove_config,
            remove_cache: self.remove_cache,
            remove_data: self.remove_data,
            remove_images: self.remove_images,
            remove_volumes: self.remove_volumes,
            remove_oh_my_zsh: self.remove_oh_my_zsh,
            remove_plugins: self.remove_plugins,
            remove_zshrc: self.remove_zshrc,
        }
    }
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ListArgs {
    /// List only installed applications
    #[arg(long, conflicts_with = "available")]
    pub installed: bool,

    /// List only applications that are not installed
    #[arg(long)]
    pub available: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn install_takes_ids_in_order() {
        let cli = Cli::parse_from(["devbootstrap", "install", "zsh", "neovim"]);
        match cli.command {
            Some(Commands::Install(args)) => assert_eq!(args.apps, vec!["zsh", "neovim"]),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = Cli::parse_from(["devbootstrap", "install", "docker", "--dry-run", "-n"]);
        assert!(cli.dry_run);
        assert!(cli.no_interaction);
    }

    #[test]
    fn removal_flags_become_options() {
        let cli = Cli::parse_from([
            "devbootstrap",
            "uninstall",
            "neovim",
            "--remove-config",
            "--remove-cache",
        ]);
        let Some(Commands::Uninstall(args)) = cli.command else {
            panic!("expected uninstall");
        };
        let options = args.options(false, true);
        assert!(options.remove_config && options.remove_cache);
        assert!(!options.remove_data);
        assert!(options.no_interaction);
    }

    #[test]
    fn list_filters_conflict() {
        let result = Cli::try_parse_from(["devbootstrap", "list", "--installed", "--available"]);
        assert!(result.is_err());
    }

    #[test]
    fn no_subcommand_is_allowed() {
        let cli = Cli::parse_from(["devbootstrap"]);
        assert!(cli.command.is_none());
    }
}
