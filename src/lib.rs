//! devbootstrap - Install and remove developer tools on a workstation.
//!
//! devbootstrap knows a small catalog of developer applications (Docker,
//! VS Code, Neovim and its configuration, Zsh, Oh My Zsh, a Nerd Font) and
//! installs or removes them on macOS and Debian-family Linux. A batch asks
//! for the sudo password at most once and reports one result per
//! application.
//!
//! # Modules
//!
//! - [`apps`] - The application catalog
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - User configuration loading
//! - [`download`] - HTTP downloads to disk
//! - [`error`] - Error types and result aliases
//! - [`fs`] - Filesystem access behind a trait
//! - [`installer`] - Per-application install strategies
//! - [`orchestrator`] - Batch install and uninstall
//! - [`platform`] - Host operating system detection
//! - [`privilege`] - One-time sudo authorization
//! - [`shell`] - External command execution
//! - [`ui`] - Interactive prompts, spinners, and terminal output
//!
//! # Example
//!
//! ```
//! use devbootstrap::orchestrator::expand_selection;
//! use devbootstrap::installer::InstallOptions;
//!
//! let mut options = InstallOptions::default();
//! options.apps.zsh.install_oh_my_zsh = true;
//!
//! let ids = vec!["zsh".to_string(), "docker".to_string()];
//! let expanded = expand_selection(&ids, &options);
//! assert_eq!(expanded, ["zsh", "oh-my-zsh", "docker"]);
//! ```

pub mod apps;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod fs;
pub mod installer;
pub mod orchestrator;
pub mod platform;
pub mod privilege;
pub mod shell;
pub mod ui;

pub use error::{BootstrapError, Result};
