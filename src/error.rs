//! Error types for devbootstrap operations.
//!
//! This module defines [`BootstrapError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - A failing external command is not an error: it is a
//!   [`CommandOutcome`](crate::shell::CommandOutcome) with `success == false`
//! - Use `BootstrapError` for failures that callers handle distinctly
//!   (unknown application, unsupported platform, download failures)
//! - Use `anyhow::Error` (via `BootstrapError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for devbootstrap operations.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The application identifier is not in the catalog.
    #[error("Unknown application: {id}")]
    UnknownApplication { id: String },

    /// No strategy exists for this application on the detected OS.
    #[error("Unsupported platform for {app}: {os}")]
    UnsupportedPlatform { app: String, os: String },

    /// Shell command failed.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// The remote answered with a non-2xx status.
    #[error("Download of {url} failed with HTTP status {status}")]
    DownloadStatus { url: String, status: u16 },

    /// The request never produced a response (DNS, TLS, timeout, reset).
    #[error("Download of {url} failed: {message}")]
    DownloadTransport { url: String, message: String },

    /// Elevation could not be obtained.
    #[error("Privileges unavailable: {message}")]
    PrivilegeUnavailable { message: String },

    /// A prompt was required but no answer could be obtained.
    #[error("Cannot prompt for '{key}' in non-interactive mode (no default value)")]
    PromptUnavailable { key: String },

    /// Failed to parse the user configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BootstrapError {
    /// Whether this error came from a network fetch.
    pub fn is_download(&self) -> bool {
        matches!(
            self,
            Self::DownloadStatus { .. } | Self::DownloadTransport { .. }
        )
    }
}

/// Result type alias for devbootstrap operations.
pub type Result<T> = std::result::Result<T, BootstrapError>;
