//! Batch orchestration.
//!
//! The [`Orchestrator`] drives each selected application through its
//! strategy, one at a time and in the order given. One application's failure
//! never stops the batch: it becomes a failure entry in the [`BatchOutcome`].

use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::apps::{self, ApplicationDescriptor};
use crate::download::Downloader;
use crate::error::Result;
use crate::fs::FileSystem;
use crate::installer::{
    self, InstallContext, InstallOptions, InstallResult, InstallerStrategy, StatusReport,
    UninstallOptions, UninstallResult,
};
use crate::platform::Platform;
use crate::privilege::{CredentialSession, PrivilegeBroker};
use crate::shell::{CancelToken, CommandRunner};
use crate::ui::UserInterface;

/// Prompt key for the reinstall confirmation.
pub const REINSTALL_PROMPT_KEY: &str = "reinstall";

/// Prompt key for the uninstall confirmation.
pub const UNINSTALL_PROMPT_KEY: &str = "confirm_uninstall";

/// What a batch does to every selected application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Install(InstallOptions),
    Uninstall(UninstallOptions),
}

impl Operation {
    pub fn mode(&self) -> BatchMode {
        match self {
            Operation::Install(_) => BatchMode::Install,
            Operation::Uninstall(_) => BatchMode::Uninstall,
        }
    }

    pub fn dry_run(&self) -> bool {
        match self {
            Operation::Install(o) => o.dry_run,
            Operation::Uninstall(o) => o.dry_run,
        }
    }

    pub fn no_interaction(&self) -> bool {
        match self {
            Operation::Install(o) => o.no_interaction,
            Operation::Uninstall(o) => o.no_interaction,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchMode {
    Install,
    Uninstall,
}

impl BatchMode {
    /// Present participle shown in step lines.
    pub fn verb(self) -> &'static str {
        match self {
            BatchMode::Install => "Installing",
            BatchMode::Uninstall => "Uninstalling",
        }
    }
}

/// Result for one application in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AppOutcome {
    Install(InstallResult),
    Uninstall(UninstallResult),
}

impl AppOutcome {
    pub fn success(&self) -> bool {
        match self {
            AppOutcome::Install(r) => r.success,
            AppOutcome::Uninstall(r) => r.success,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppOutcome::Install(r) => &r.message,
            AppOutcome::Uninstall(r) => &r.message,
        }
    }

    pub fn warnings(&self) -> &[String] {
        match self {
            AppOutcome::Install(r) => &r.warnings,
            AppOutcome::Uninstall(r) => &r.warnings,
        }
    }

    pub fn errors(&self) -> &[String] {
        match self {
            AppOutcome::Install(r) => &r.errors,
            AppOutcome::Uninstall(r) => &r.errors,
        }
    }

    fn failure(mode: BatchMode, message: String, error: String) -> Self {
        match mode {
            BatchMode::Install => AppOutcome::Install(InstallResult::failure(message).with_error(error)),
            BatchMode::Uninstall => {
                AppOutcome::Uninstall(UninstallResult::failure(message).with_error(error))
            }
        }
    }
}

/// Per-application results of a batch, in selection order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub mode: BatchMode,
    pub entries: Vec<(String, AppOutcome)>,
    #[serde(skip)]
    pub duration: Duration,
}

impl BatchOutcome {
    pub fn new(mode: BatchMode) -> Self {
        Self {
            mode,
            entries: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    pub fn push(&mut self, id: impl Into<String>, outcome: AppOutcome) {
        self.entries.push((id.into(), outcome));
    }

    /// Result for `id`, if it was part of the batch.
    pub fn get(&self, id: &str) -> Option<&AppOutcome> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == id)
            .map(|(_, outcome)| outcome)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|(_, o)| o.success()).count()
    }

    pub fn failed(&self) -> usize {
        self.entries.len() - self.succeeded()
    }

    /// True only when every application succeeded.
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Process exit code for the batch.
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

/// Add implied applications and drop duplicates, keeping selection order.
///
/// Selecting `zsh` with `apps.zsh.install_oh_my_zsh` set also selects
/// `oh-my-zsh`, right after it.
pub fn expand_selection(ids: &[String], options: &InstallOptions) -> Vec<String> {
    let mut expanded: Vec<String> = Vec::with_capacity(ids.len() + 1);
    for id in ids {
        if expanded.contains(id) {
            continue;
        }
        expanded.push(id.clone());
        let implied = id == "zsh" && options.apps.zsh.install_oh_my_zsh;
        if implied && !ids.iter().any(|i| i == "oh-my-zsh") {
            expanded.push("oh-my-zsh".to_string());
        }
    }
    expanded
}

/// First occurrence of each id, in order.
fn dedupe(ids: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(id) {
            unique.push(id.clone());
        }
    }
    unique
}

/// Whether the application runs commands through sudo on `platform`.
pub fn needs_elevation(id: &str, platform: &Platform) -> bool {
    match id {
        // chsh
        "oh-my-zsh" => true,
        "docker" | "vscode" | "neovim" | "zsh" => platform.is_debian_family(),
        _ => false,
    }
}

fn display_name(id: &str) -> String {
    apps::find(id)
        .map(|app| app.name)
        .unwrap_or_else(|| id.to_string())
}

/// Runs batches against one host.
pub struct Orchestrator<'a> {
    runner: &'a dyn CommandRunner,
    fs: &'a dyn FileSystem,
    downloader: &'a dyn Downloader,
    platform: &'a Platform,
    temp_dir: Option<PathBuf>,
    poll_interval: Option<Duration>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        fs: &'a dyn FileSystem,
        downloader: &'a dyn Downloader,
        platform: &'a Platform,
    ) -> Self {
        Self {
            runner,
            fs,
            downloader,
            platform,
            temp_dir: None,
            poll_interval: None,
        }
    }

    /// Scratch directory for downloads and the askpass relay.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Delay between readiness polls.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    fn context<'c>(
        &'c self,
        ui: &'c mut dyn UserInterface,
        cancel: &'c CancelToken,
    ) -> InstallContext<'c> {
        let mut ctx = InstallContext::new(
            self.runner,
            self.fs,
            self.downloader,
            self.platform,
            ui,
            cancel,
        );
        if let Some(dir) = &self.temp_dir {
            ctx = ctx.temp_dir(dir.clone());
        }
        if let Some(interval) = self.poll_interval {
            ctx = ctx.poll_interval(interval);
        }
        ctx
    }

    /// The catalog with every status freshly probed.
    ///
    /// Applications without a strategy on this platform are listed as not
    /// installed.
    pub fn list_applications(&self, ui: &mut dyn UserInterface) -> Vec<ApplicationDescriptor> {
        let cancel = CancelToken::new();
        let mut catalog = apps::catalog();
        for app in &mut catalog {
            let strategy = match installer::resolve(&app.id, self.platform) {
                Ok(strategy) => strategy,
                Err(e) => {
                    debug!(app = %app.id, error = %e, "No strategy; listing as not installed");
                    continue;
                }
            };
            let mut ctx = self.context(&mut *ui, &cancel);
            match strategy.check_status(&mut ctx) {
                Ok(report) => app.update_status(report.status, report.version),
                Err(e) => warn!(app = %app.id, error = %e, "Status check failed"),
            }
        }
        catalog
    }

    pub fn list_installed(&self, ui: &mut dyn UserInterface) -> Vec<ApplicationDescriptor> {
        self.list_applications(ui)
            .into_iter()
            .filter(|app| app.is_installed())
            .collect()
    }

    pub fn list_not_installed(&self, ui: &mut dyn UserInterface) -> Vec<ApplicationDescriptor> {
        self.list_applications(ui)
            .into_iter()
            .filter(|app| !app.is_installed())
            .collect()
    }

    /// Run `operation` on every id, in order.
    ///
    /// Returns one entry per id. The only error is failing to set up the
    /// askpass relay, which would leave every elevated command without
    /// credentials.
    pub fn run_batch(
        &self,
        ids: &[String],
        operation: &Operation,
        ui: &mut dyn UserInterface,
        cancel: &CancelToken,
    ) -> Result<BatchOutcome> {
        let started = Instant::now();
        let ids = dedupe(ids);
        let ids = ids.as_slice();
        let mode = operation.mode();
        let dry_run = operation.dry_run();
        let interactive = !operation.no_interaction() && ui.is_interactive();
        let allow_terminal = ui.is_interactive();
        info!(?mode, count = ids.len(), dry_run, interactive, "Starting batch");

        // Held until the end of this function; dropping it removes the relay.
        let session = if ids.iter().any(|id| needs_elevation(id, self.platform)) {
            let mut broker = PrivilegeBroker::new(self.runner);
            if let Some(dir) = &self.temp_dir {
                broker = broker.with_temp_dir(dir.clone());
            }
            broker.acquire(&mut *ui, dry_run, self.platform.is_root)?
        } else {
            CredentialSession::inactive()
        };

        let total = ids.len();
        let mut outcome = BatchOutcome::new(mode);
        for (index, id) in ids.iter().enumerate() {
            let name = display_name(id);
            ui.show_step(index + 1, total, &format!("{} {}", mode.verb(), name));
            debug!(app = %id, step = index + 1, total, "Batch step");

            if cancel.is_cancelled() {
                outcome.push(
                    id.clone(),
                    AppOutcome::failure(mode, format!("{} skipped", name), "Cancelled".to_string()),
                );
                continue;
            }

            let result = {
                let mut ctx = self
                    .context(&mut *ui, cancel)
                    .dry_run(dry_run)
                    .interactive(interactive)
                    .allow_terminal(allow_terminal)
                    .askpass(session.askpass_path());
                match operation {
                    Operation::Install(options) => {
                        AppOutcome::Install(self.install_one(id, &name, &mut ctx, options))
                    }
                    Operation::Uninstall(options) => {
                        AppOutcome::Uninstall(self.uninstall_one(id, &name, &mut ctx, options))
                    }
                }
            };

            if result.success() {
                debug!(app = %id, message = result.message(), "Application succeeded");
            } else {
                warn!(app = %id, message = result.message(), "Application failed");
                ui.error(&format!("{}: {}", name, result.message()));
            }
            outcome.push(id.clone(), result);
        }

        if let Err(e) = session.close() {
            warn!(error = %e, "Could not remove the askpass relay");
        }
        outcome.duration = started.elapsed();
        info!(
            succeeded = outcome.succeeded(),
            failed = outcome.failed(),
            "Batch finished"
        );
        Ok(outcome)
    }

    fn check(
        strategy: &dyn InstallerStrategy,
        name: &str,
        ctx: &mut InstallContext<'_>,
        warnings: &mut Vec<String>,
    ) -> Option<StatusReport> {
        match strategy.check_status(ctx) {
            Ok(report) => Some(report),
            Err(e) => {
                warnings.push(format!("Could not check whether {} is installed: {}", name, e));
                None
            }
        }
    }

    fn install_one(
        &self,
        id: &str,
        name: &str,
        ctx: &mut InstallContext<'_>,
        options: &InstallOptions,
    ) -> InstallResult {
        let strategy = match installer::resolve(id, self.platform) {
            Ok(strategy) => strategy,
            Err(e) => return InstallResult::failure(e.to_string()),
        };

        let mut warnings = Vec::new();
        let status = Self::check(strategy.as_ref(), name, ctx, &mut warnings);
        if let Some(report) = status.filter(|r| r.is_installed()) {
            if ctx.interactive {
                let detail = if report.version.is_empty() {
                    format!("{} is already installed", name)
                } else {
                    format!("{} is already installed (version {})", name, report.version)
                };
                ctx.info(&detail);
                if !ctx.confirm(REINSTALL_PROMPT_KEY, "Reinstall?", false) {
                    return InstallResult::success(format!("{} already installed", name))
                        .with_version(report.version)
                        .with_warnings(warnings);
                }
            } else {
                debug!(app = id, "Already installed; reinstalling without prompting");
            }
        }

        let mut result = match strategy.install(ctx, options) {
            Ok(result) => result,
            Err(e) => InstallResult::failure(format!("Failed to install {}", name))
                .with_error(e.to_string()),
        };
        warnings.append(&mut result.warnings);
        result.warnings = warnings;

        if result.success && !ctx.dry_run {
            if strategy.verify(ctx) {
                if result.version.is_empty() {
                    if let Ok(report) = strategy.check_status(ctx) {
                        result.version = report.version;
                    }
                }
            } else {
                result.add_warning(format!(
                    "{} could not be verified; open a new terminal and check again",
                    name
                ));
            }
        }
        result
    }

    fn uninstall_one(
        &self,
        id: &str,
        name: &str,
        ctx: &mut InstallContext<'_>,
        options: &UninstallOptions,
    ) -> UninstallResult {
        let strategy = match installer::resolve(id, self.platform) {
            Ok(strategy) => strategy,
            Err(e) => return UninstallResult::failure(e.to_string()),
        };

        let mut warnings = Vec::new();
        // An unknown status still attempts removal; strategies tolerate absent state.
        if let Some(report) = Self::check(strategy.as_ref(), name, ctx, &mut warnings) {
            if !report.is_installed() {
                ctx.info(&format!("{} is not installed", name));
                return UninstallResult::success(format!("{} not installed", name))
                    .with_warnings(warnings);
            }
        }

        let question = format!("Are you sure you want to uninstall {}?", name);
        if ctx.interactive && !ctx.confirm(UNINSTALL_PROMPT_KEY, &question, false) {
            return UninstallResult::success(format!("Uninstall of {} cancelled", name))
                .with_warnings(warnings);
        }

        let mut result = match strategy.uninstall(ctx, options) {
            Ok(result) => result,
            Err(e) => UninstallResult::failure(format!("Failed to uninstall {}", name))
                .with_error(e.to_string()),
        };
        warnings.append(&mut result.warnings);
        result.warnings = warnings;
        result
    }
}
