//! User configuration.
//!
//! An optional YAML file supplies defaults for output and per-application
//! options. Command-line flags override whatever it sets.
//!
//! # Example
//!
//! ```
//! use devbootstrap::config::load_config;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let home = TempDir::new().unwrap();
//! let dir = home.path().join(".devbootstrap");
//! fs::create_dir_all(&dir).unwrap();
//! fs::write(dir.join("config.yml"), "apps:\n  zsh:\n    install_oh_my_zsh: true\n").unwrap();
//!
//! let config = load_config(None, home.path()).unwrap();
//! assert!(config.apps.zsh.install_oh_my_zsh);
//! ```

pub mod loader;
pub mod schema;

pub use loader::{default_config_path, load_config, load_config_file, parse_config};
pub use schema::{DevBootstrapConfig, Settings};
