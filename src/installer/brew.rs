//! Homebrew helpers shared by the macOS strategies.

use std::path::Path;
use std::time::Duration;

use super::{InstallContext, InstallResult};
use crate::shell::{CommandOutcome, CommandSpec};

/// Install locations for Apple silicon and Intel Macs.
const BREW_LOCATIONS: [&str; 2] = ["/opt/homebrew/bin/brew", "/usr/local/bin/brew"];

/// The brew executable to invoke.
///
/// A freshly installed Homebrew is often not on `PATH` yet, so the standard
/// prefixes are tried before giving up and using the bare name.
pub fn homebrew_path(ctx: &InstallContext<'_>) -> String {
    if ctx.command_exists("brew") {
        return "brew".to_string();
    }
    BREW_LOCATIONS
        .iter()
        .find(|p| ctx.exists(Path::new(p)))
        .map(|p| p.to_string())
        .unwrap_or_else(|| "brew".to_string())
}

/// Whether Homebrew is installed at all.
pub fn has_homebrew(ctx: &InstallContext<'_>) -> bool {
    ctx.command_exists("brew") || BREW_LOCATIONS.iter().any(|p| ctx.exists(Path::new(p)))
}

/// Failure result telling the user to install Homebrew first.
pub fn missing_homebrew(app: &str) -> InstallResult {
    InstallResult::failure(format!("Homebrew is required to install {}", app))
        .with_error("Install it from https://brew.sh and try again")
}

/// Run `brew <args>`.
pub fn brew(ctx: &mut InstallContext<'_>, args: &[&str], timeout: Duration) -> CommandOutcome {
    let program = homebrew_path(ctx);
    let argv = std::iter::once(program.as_str()).chain(args.iter().copied());
    ctx.run(CommandSpec::new(argv).timeout(timeout))
}

/// Casks installed through brew, empty when the listing fails.
///
/// Read-only, so it also runs during a dry run.
pub fn installed_casks(ctx: &mut InstallContext<'_>) -> Vec<String> {
    let program = homebrew_path(ctx);
    let outcome = ctx.run(
        CommandSpec::new([program.as_str(), "list", "--cask"])
            .timeout(Duration::from_secs(30))
            .skip_dry_run(),
    );
    if !outcome.success {
        return Vec::new();
    }
    outcome
        .stdout
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
