//! Configuration file discovery and loading.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::schema::DevBootstrapConfig;
use crate::error::{BootstrapError, Result};

/// Directory under the home directory holding the config file.
pub const CONFIG_DIR: &str = ".devbootstrap";

/// Config file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.yml";

/// Location of the user config: `~/.devbootstrap/config.yml`.
pub fn default_config_path(home: &Path) -> PathBuf {
    home.join(CONFIG_DIR).join(CONFIG_FILE)
}

/// Parse YAML content into a [`DevBootstrapConfig`].
///
/// `source_path` is only used for error reporting. Blank content yields the
/// defaults.
pub fn parse_config(content: &str, source_path: &Path) -> Result<DevBootstrapConfig> {
    if content.trim().is_empty() {
        return Ok(DevBootstrapConfig::default());
    }
    serde_yaml::from_str(content).map_err(|e| BootstrapError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load the config at `path`.
///
/// # Errors
///
/// Returns `ConfigParseError` if the YAML is invalid and `Io` if the file
/// exists but cannot be read. A missing file is not an error.
pub fn load_config_file(path: &Path) -> Result<DevBootstrapConfig> {
    match fs::read_to_string(path) {
        Ok(content) => {
            debug!(path = %path.display(), "Loading config");
            parse_config(&content, path)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No config file; using defaults");
            Ok(DevBootstrapConfig::default())
        }
        Err(e) => Err(BootstrapError::Io(e)),
    }
}

/// Load the explicit `--config` file, or the user config under `home`.
///
/// An explicit path that does not exist is an error; a missing default file
/// is not.
pub fn load_config(explicit: Option<&Path>, home: &Path) -> Result<DevBootstrapConfig> {
    match explicit {
        Some(path) if !path.exists() => Err(BootstrapError::ConfigParseError {
            path: path.to_path_buf(),
            message: "file not found".to_string(),
        }),
        Some(path) => load_config_file(path),
        None => load_config_file(&default_config_path(home)),
    }
}
