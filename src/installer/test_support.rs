//! Shared fixture for strategy tests.

use std::path::PathBuf;
use std::time::Duration;

use tempfile::TempDir;

use super::InstallContext;
use crate::download::MockDownloader;
use crate::fs::LocalFs;
use crate::platform::{Architecture, OsType, Platform};
use crate::shell::{CancelToken, MockRunner};
use crate::ui::MockUI;

/// A fake host: scripted commands, a throwaway home directory, captured UI.
pub struct Harness {
    pub runner: MockRunner,
    pub fs: LocalFs,
    pub downloads: MockDownloader,
    pub platform: Platform,
    pub ui: MockUI,
    pub cancel: CancelToken,
    pub dry_run: bool,
    pub interactive: bool,
    home: TempDir,
}

impl Harness {
    pub fn new(os: OsType, runner: MockRunner) -> Self {
        let home = TempDir::new().unwrap();
        std::fs::create_dir_all(home.path().join("tmp")).unwrap();
        let platform = Platform::new(os, Architecture::Arm64, home.path()).with_username("dev");
        Self {
            runner,
            fs: LocalFs::new(),
            downloads: MockDownloader::new(),
            platform,
            ui: MockUI::new(),
            cancel: CancelToken::new(),
            dry_run: false,
            interactive: false,
            home,
        }
    }

    pub fn mac(runner: MockRunner) -> Self {
        Self::new(OsType::MacOs, runner)
    }

    pub fn ubuntu(runner: MockRunner) -> Self {
        Self::new(OsType::Ubuntu, runner)
    }

    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Allow prompts; answers come from `ui` responses.
    pub fn interactive(mut self) -> Self {
        self.interactive = true;
        self.ui.set_interactive(true);
        self
    }

    pub fn downloads(mut self, downloads: MockDownloader) -> Self {
        self.downloads = downloads;
        self
    }

    pub fn ctx(&mut self) -> InstallContext<'_> {
        InstallContext::new(
            &self.runner,
            &self.fs,
            &self.downloads,
            &self.platform,
            &mut self.ui,
            &self.cancel,
        )
        .dry_run(self.dry_run)
        .interactive(self.interactive)
        .temp_dir(self.home.path().join("tmp"))
        .poll_interval(Duration::ZERO)
    }

    /// Path under the fake home directory.
    pub fn home(&self, rel: &str) -> PathBuf {
        self.home.path().join(rel)
    }

    /// Create a file (and its parents) under the fake home directory.
    pub fn touch(&self, rel: &str) -> PathBuf {
        let path = self.home(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, "").unwrap();
        path
    }
}
