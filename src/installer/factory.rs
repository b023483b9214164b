//! Maps an application id and platform to its strategy.

use tracing::debug;

use super::docker::{DockerDebian, DockerMacOs};
use super::nerd_font::NerdFont;
use super::neovim::Neovim;
use super::neovim_config::NeovimConfig;
use super::oh_my_zsh::OhMyZsh;
use super::vscode::VsCode;
use super::zsh::Zsh;
use super::{Flavor, InstallerStrategy};
use crate::apps;
use crate::error::{BootstrapError, Result};
use crate::platform::Platform;

/// Select the strategy for `app_id` on `platform`.
///
/// Configuration-only applications work anywhere; everything else needs
/// macOS or a Debian-family Linux.
pub fn resolve(app_id: &str, platform: &Platform) -> Result<Box<dyn InstallerStrategy>> {
    if apps::find(app_id).is_none() {
        return Err(BootstrapError::UnknownApplication {
            id: app_id.to_string(),
        });
    }

    match app_id {
        "neovim-config" => return Ok(Box::new(NeovimConfig::new())),
        "oh-my-zsh" => return Ok(Box::new(OhMyZsh::new())),
        _ => {}
    }

    let flavor = Flavor::for_platform(platform).ok_or_else(|| BootstrapError::UnsupportedPlatform {
        app: app_id.to_string(),
        os: platform.os.to_string(),
    })?;
    debug!(app = app_id, ?flavor, os = %platform.os, "Resolved installer strategy");

    let strategy: Box<dyn InstallerStrategy> = match (app_id, flavor) {
        ("docker", Flavor::MacOs) => Box::new(DockerMacOs::new()),
        ("docker", Flavor::Debian) => Box::new(DockerDebian::new()),
        ("vscode", flavor) => Box::new(VsCode::new(flavor)),
        ("neovim", flavor) => Box::new(Neovim::new(flavor)),
        ("zsh", flavor) => Box::new(Zsh::new(flavor)),
        ("nerd-font", flavor) => Box::new(NerdFont::new(flavor)),
        _ => {
            return Err(BootstrapError::UnknownApplication {
                id: app_id.to_string(),
            })
        }
    };
    Ok(strategy)
}
