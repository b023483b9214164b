//! Collaborators and per-batch settings handed to every strategy call.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::download::Downloader;
use crate::error::Result;
use crate::fs::FileSystem;
use crate::platform::Platform;
use crate::shell::{CancelToken, CommandOutcome, CommandRunner, CommandSpec, ExecContext};
use crate::ui::{self, UserInterface};

use super::version::normalize_version;

/// Everything a strategy needs to act on the host.
///
/// Built once per batch by the orchestrator and passed down explicitly, so
/// dry run, interactivity and the askpass relay never live in globals.
pub struct InstallContext<'a> {
    pub runner: &'a dyn CommandRunner,
    pub fs: &'a dyn FileSystem,
    pub downloader: &'a dyn Downloader,
    pub platform: &'a Platform,
    pub ui: &'a mut dyn UserInterface,
    pub cancel: &'a CancelToken,
    /// Report actions instead of performing them.
    pub dry_run: bool,
    /// Prompts may be shown.
    pub interactive: bool,
    /// A terminal is attached, so sudo may prompt on it.
    pub allow_terminal: bool,
    /// Askpass relay from the privilege broker.
    pub askpass: Option<&'a Path>,
    /// Scratch directory for downloads.
    pub temp_dir: PathBuf,
    /// Delay between readiness polls (Docker Desktop startup).
    pub poll_interval: Duration,
}

impl<'a> InstallContext<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        fs: &'a dyn FileSystem,
        downloader: &'a dyn Downloader,
        platform: &'a Platform,
        ui: &'a mut dyn UserInterface,
        cancel: &'a CancelToken,
    ) -> Self {
        Self {
            runner,
            fs,
            downloader,
            platform,
            ui,
            cancel,
            dry_run: false,
            interactive: false,
            allow_terminal: false,
            askpass: None,
            temp_dir: std::env::temp_dir(),
            poll_interval: Duration::from_secs(2),
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn allow_terminal(mut self, allow: bool) -> Self {
        self.allow_terminal = allow;
        self
    }

    pub fn askpass(mut self, path: Option<&'a Path>) -> Self {
        self.askpass = path;
        self
    }

    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    fn exec(&mut self) -> ExecContext<'_> {
        ExecContext {
            ui: &mut *self.ui,
            dry_run: self.dry_run,
            askpass: self.askpass,
            allow_terminal: self.allow_terminal,
            cancel: self.cancel,
        }
    }

    // --- commands ---

    pub fn run(&mut self, spec: CommandSpec) -> CommandOutcome {
        let runner = self.runner;
        runner.execute(&spec, &mut self.exec())
    }

    pub fn command_exists(&self, name: &str) -> bool {
        self.runner.command_exists(name)
    }

    pub fn command_path(&self, name: &str) -> Option<PathBuf> {
        self.runner.command_path(name)
    }

    /// Normalized version of an executable, empty when it cannot be read.
    pub fn version(&mut self, name: &str) -> String {
        let runner = self.runner;
        runner
            .command_version(name, &mut self.exec())
            .map(|line| normalize_version(&line))
            .unwrap_or_default()
    }

    /// Whether the run was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Wait `self.poll_interval`, skipped entirely on dry run.
    pub fn pause(&self) {
        if !self.dry_run && !self.poll_interval.is_zero() {
            std::thread::sleep(self.poll_interval);
        }
    }

    // --- filesystem ---

    pub fn exists(&self, path: &Path) -> bool {
        self.fs.exists(path)
    }

    pub fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        self.fs.read_dir(path)
    }

    pub fn write(&mut self, path: &Path, contents: &str) -> Result<()> {
        let fs = self.fs;
        fs.write(path, contents.as_bytes(), &mut self.exec())
    }

    pub fn create_dir_all(&mut self, path: &Path) -> Result<()> {
        let fs = self.fs;
        fs.create_dir_all(path, &mut self.exec())
    }

    pub fn remove_all(&mut self, path: &Path) -> Result<()> {
        let fs = self.fs;
        fs.remove_all(path, &mut self.exec())
    }

    pub fn copy(&mut self, from: &Path, to: &Path) -> Result<()> {
        let fs = self.fs;
        fs.copy(from, to, &mut self.exec())
    }

    pub fn rename(&mut self, from: &Path, to: &Path) -> Result<()> {
        let fs = self.fs;
        fs.rename(from, to, &mut self.exec())
    }

    /// Remove every path, turning failures into warnings.
    pub fn remove_paths(&mut self, paths: &[PathBuf], warnings: &mut Vec<String>) {
        for path in paths {
            if let Err(e) = self.remove_all(path) {
                warnings.push(format!("Could not remove {}: {}", path.display(), e));
            }
        }
    }

    // --- network ---

    /// Download `url` to `dest`, reported instead of performed on dry run.
    pub fn download(&mut self, url: &str, dest: &Path) -> Result<()> {
        if self.dry_run {
            self.ui.clear_progress();
            self.ui
                .message(&format!("[DRY RUN] download {} -> {}", url, dest.display()));
            return Ok(());
        }
        self.ui.show_progress(&format!("Downloading {}", url));
        let result = self.downloader.download(url, dest);
        self.ui.clear_progress();
        result
    }

    // --- reporting and prompts ---

    pub fn section(&mut self, title: &str) {
        self.ui.show_header(title);
    }

    pub fn info(&mut self, msg: &str) {
        self.ui.message(msg);
    }

    pub fn success(&mut self, msg: &str) {
        self.ui.success(msg);
    }

    pub fn warning(&mut self, msg: &str) {
        self.ui.warning(msg);
    }

    pub fn progress(&mut self, msg: &str) {
        self.ui.show_progress(msg);
    }

    pub fn clear_progress(&mut self) {
        self.ui.clear_progress();
    }

    /// Ask a yes/no question; non-interactive runs take `default`.
    pub fn confirm(&mut self, key: &str, question: &str, default: bool) -> bool {
        if !self.interactive {
            return default;
        }
        ui::confirm(&mut *self.ui, key, question, default)
    }

    /// `home_dir` joined with `rel`.
    pub fn home(&self, rel: &str) -> PathBuf {
        self.platform.home(rel)
    }
}
