//! Recording downloader for tests.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use super::Downloader;
use crate::error::{BootstrapError, Result};

#[derive(Debug, Clone)]
enum Failure {
    Status(u16),
    Transport(String),
}

/// Mock [`Downloader`] that never touches the network.
///
/// Successful downloads write `body` to the destination so later steps can
/// find the file. Failures are configured per URL prefix.
#[derive(Debug)]
pub struct MockDownloader {
    body: Vec<u8>,
    failures: Vec<(String, Failure)>,
    requests: RefCell<Vec<(String, Option<PathBuf>)>>,
}

impl Default for MockDownloader {
    fn default() -> Self {
        Self {
            body: b"payload".to_vec(),
            failures: Vec::new(),
            requests: RefCell::new(Vec::new()),
        }
    }
}

impl MockDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, body: &[u8]) -> Self {
        self.body = body.to_vec();
        self
    }

    /// Answer URLs starting with `prefix` with an HTTP status error.
    pub fn fail_status(mut self, prefix: &str, status: u16) -> Self {
        self.failures
            .push((prefix.to_string(), Failure::Status(status)));
        self
    }

    /// Fail URLs starting with `prefix` as if the connection broke.
    pub fn fail_transport(mut self, prefix: &str, message: &str) -> Self {
        self.failures
            .push((prefix.to_string(), Failure::Transport(message.to_string())));
        self
    }

    /// URLs requested so far, in order.
    pub fn urls(&self) -> Vec<String> {
        self.requests.borrow().iter().map(|(u, _)| u.clone()).collect()
    }

    fn check(&self, url: &str, dest: Option<&Path>) -> Result<()> {
        self.requests
            .borrow_mut()
            .push((url.to_string(), dest.map(Path::to_path_buf)));
        match self
            .failures
            .iter()
            .find(|(prefix, _)| url.starts_with(prefix.as_str()))
        {
            Some((_, Failure::Status(status))) => Err(BootstrapError::DownloadStatus {
                url: url.to_string(),
                status: *status,
            }),
            Some((_, Failure::Transport(message))) => Err(BootstrapError::DownloadTransport {
                url: url.to_string(),
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl Downloader for MockDownloader {
    fn download(&self, url: &str, dest: &Path) -> Result<()> {
        self.check(url, Some(dest))?;
        std::fs::write(dest, &self.body)?;
        Ok(())
    }

    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.check(url, None)?;
        Ok(self.body.clone())
    }
}
