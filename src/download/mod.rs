//! HTTP downloads of installer payloads.
//!
//! Errors separate a non-2xx response ([`BootstrapError::DownloadStatus`])
//! from a transport failure ([`BootstrapError::DownloadTransport`]) so
//! installers can point the user at a manual download page.

use std::fs::File;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use crate::error::{BootstrapError, Result};

pub mod mock;

pub use mock::MockDownloader;

/// Default timeout for a whole download.
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Fetches remote resources.
pub trait Downloader {
    /// Stream `url` into the file at `dest`, replacing it.
    fn download(&self, url: &str, dest: &Path) -> Result<()>;

    /// Fetch `url` into memory.
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Downloader backed by a blocking reqwest client.
pub struct HttpDownloader {
    client: Client,
    timeout: Duration,
}

impl HttpDownloader {
    /// Create a downloader with the default timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_DOWNLOAD_TIMEOUT)
    }

    /// Create a downloader with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("devbootstrap/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| BootstrapError::Other(anyhow::anyhow!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, timeout })
    }

    /// Get the configured timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response> {
        debug!(%url, "Downloading");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| transport(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BootstrapError::DownloadStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

fn transport(url: &str, err: impl std::fmt::Display) -> BootstrapError {
    BootstrapError::DownloadTransport {
        url: url.to_string(),
        message: err.to_string(),
    }
}

impl Downloader for HttpDownloader {
    fn download(&self, url: &str, dest: &Path) -> Result<()> {
        let mut response = self.get(url)?;
        let mut file = File::create(dest)?;
        let bytes = response.copy_to(&mut file).map_err(|e| transport(url, e))?;
        debug!(%url, dest = %dest.display(), bytes, "Download complete");
        Ok(())
    }

    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.get(url)?;
        let body = response.bytes().map_err(|e| transport(url, e))?;
        Ok(body.to_vec())
    }
}
