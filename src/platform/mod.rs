//! Host platform detection.
//!
//! Strategies are chosen by [`OsType`]; everything else on [`Platform`]
//! (home directory, user name, architecture) feeds into the commands they
//! build.

use std::fmt;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use serde::Serialize;

use crate::shell::{current_username, is_elevated, parse_system_path, resolve_tool_path};

const OS_RELEASE: &str = "/etc/os-release";

/// Operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OsType {
    MacOs,
    Ubuntu,
    Debian,
    LinuxOther,
    Unsupported,
}

impl OsType {
    pub fn is_linux(self) -> bool {
        matches!(self, OsType::Ubuntu | OsType::Debian | OsType::LinuxOther)
    }

    /// Ubuntu, Debian and their derivatives.
    pub fn is_debian_family(self) -> bool {
        matches!(self, OsType::Ubuntu | OsType::Debian)
    }

    pub fn is_macos(self) -> bool {
        self == OsType::MacOs
    }
}

impl fmt::Display for OsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OsType::MacOs => "macOS",
            OsType::Ubuntu => "Ubuntu",
            OsType::Debian => "Debian",
            OsType::LinuxOther => "Linux",
            OsType::Unsupported => "Unsupported",
        };
        f.write_str(name)
    }
}

/// CPU architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    Amd64,
    Arm64,
    Unknown,
}

impl Architecture {
    /// Map a Rust target architecture name.
    pub fn from_target(arch: &str) -> Self {
        match arch {
            "x86_64" => Architecture::Amd64,
            "aarch64" => Architecture::Arm64,
            _ => Architecture::Unknown,
        }
    }

    /// Name used by Debian packages and vendor download URLs.
    pub fn as_str(self) -> &'static str {
        match self {
            Architecture::Amd64 => "amd64",
            Architecture::Arm64 => "arm64",
            Architecture::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields of interest from `/etc/os-release`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OsRelease {
    pub id: String,
    pub id_like: String,
    pub pretty_name: String,
    pub version_id: String,
    pub version_codename: String,
}

impl OsRelease {
    /// Classify the distribution, looking at `ID_LIKE` for derivatives.
    pub fn os_type(&self) -> OsType {
        match self.id.as_str() {
            "ubuntu" => return OsType::Ubuntu,
            "debian" => return OsType::Debian,
            _ => {}
        }
        if self.id_like.contains("ubuntu") {
            OsType::Ubuntu
        } else if self.id_like.contains("debian") {
            OsType::Debian
        } else {
            OsType::LinuxOther
        }
    }
}

/// Parse the `KEY=value` lines of an os-release file.
pub fn parse_os_release(content: &str) -> OsRelease {
    let mut release = OsRelease::default();
    for line in content.lines() {
        let Some((key, value)) = line.trim().split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"').trim_matches('\'').to_string();
        match key {
            "ID" => release.id = value.to_lowercase(),
            "ID_LIKE" => release.id_like = value.to_lowercase(),
            "PRETTY_NAME" => release.pretty_name = value,
            "VERSION_ID" => release.version_id = value,
            "VERSION_CODENAME" => release.version_codename = value,
            _ => {}
        }
    }
    release
}

/// The host the batch runs on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Platform {
    pub os: OsType,
    pub arch: Architecture,
    pub os_name: String,
    pub os_version: String,
    pub home_dir: PathBuf,
    pub username: String,
    pub is_root: bool,
    /// Root, or `sudo` is on the search path.
    pub has_sudo: bool,
}

impl Platform {
    /// A platform with the given identity and no privileges, for callers that
    /// do not probe the host.
    pub fn new(os: OsType, arch: Architecture, home_dir: impl Into<PathBuf>) -> Self {
        Self {
            os,
            arch,
            os_name: os.to_string(),
            os_version: String::new(),
            home_dir: home_dir.into(),
            username: "user".to_string(),
            is_root: false,
            has_sudo: true,
        }
    }

    /// Probe the current host.
    pub fn detect() -> Self {
        let arch = Architecture::from_target(std::env::consts::ARCH);
        let is_root = is_elevated();
        let has_sudo = is_root || resolve_tool_path("sudo", &parse_system_path()).is_some();
        let home_dir = dirs::home_dir().unwrap_or_else(std::env::temp_dir);
        let username = current_username();

        let (os, os_name, os_version) = match std::env::consts::OS {
            "macos" => (OsType::MacOs, "macOS".to_string(), macos_version()),
            "linux" => match std::fs::read_to_string(OS_RELEASE) {
                Ok(content) => {
                    let release = parse_os_release(&content);
                    let name = if release.pretty_name.is_empty() {
                        "Linux".to_string()
                    } else {
                        release.pretty_name.clone()
                    };
                    (release.os_type(), name, release.version_id)
                }
                Err(_) => (OsType::LinuxOther, "Linux".to_string(), String::new()),
            },
            _ => (OsType::Unsupported, "Unknown".to_string(), String::new()),
        };

        tracing::debug!(%os, %arch, %os_version, is_root, has_sudo, "Detected platform");

        Self {
            os,
            arch,
            os_name,
            os_version,
            home_dir,
            username,
            is_root,
            has_sudo,
        }
    }

    pub fn is_macos(&self) -> bool {
        self.os.is_macos()
    }

    pub fn is_debian_family(&self) -> bool {
        self.os.is_debian_family()
    }

    /// `home_dir` joined with a relative path.
    pub fn home(&self, rel: &str) -> PathBuf {
        self.home_dir.join(rel)
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn with_root(mut self, is_root: bool) -> Self {
        self.is_root = is_root;
        self
    }
}

fn macos_version() -> String {
    Command::new("sw_vers")
        .arg("-productVersion")
        .stderr(Stdio::null())
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .unwrap_or_default()
}
