//! One-time sudo authorization for a batch.
//!
//! The [`PrivilegeBroker`] asks for the sudo password once, checks it with
//! `sudo -S -v`, then writes a small askpass script that prints it. Elevated
//! commands run through `sudo -A` with `SUDO_ASKPASS` pointing at that script,
//! so separate subprocesses never prompt again. The script lives exactly as
//! long as the returned [`CredentialSession`].

mod secret;

pub use secret::SecretString;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempPath;
use tracing::debug;

use crate::error::{BootstrapError, Result};
use crate::shell::{CancelToken, CommandRunner, CommandSpec, ExecContext};
use crate::ui::{Prompt, UserInterface};

/// Prompt key for the sudo password (`DEVBOOTSTRAP_PROMPT_SUDO_PASSWORD`).
pub const PASSWORD_PROMPT_KEY: &str = "sudo_password";

const VERIFY_TIMEOUT: Duration = Duration::from_secs(30);

/// Escape a value for use inside single quotes in a POSIX shell.
pub fn escape_single_quotes(value: &str) -> String {
    value.replace('\'', "'\"'\"'")
}

/// Body of the askpass relay script for `password`.
pub fn askpass_script(password: &SecretString) -> SecretString {
    SecretString::new(format!(
        "#!/bin/sh\nprintf '%s\\n' '{}'\n",
        escape_single_quotes(password.expose())
    ))
}

/// Pre-authorized elevation for the duration of a batch.
///
/// Dropping the session deletes the relay script. An inactive session has no
/// relay; elevated commands then use cached credentials or the terminal.
#[derive(Debug, Default)]
pub struct CredentialSession {
    relay: Option<TempPath>,
}

impl CredentialSession {
    /// A session without a relay.
    pub fn inactive() -> Self {
        Self::default()
    }

    /// Path of the askpass relay, if one was created.
    pub fn askpass_path(&self) -> Option<&Path> {
        self.relay.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.relay.is_some()
    }

    /// Remove the relay now, reporting any I/O error.
    pub fn close(mut self) -> Result<()> {
        match self.relay.take() {
            Some(relay) => relay.close().map_err(BootstrapError::from),
            None => Ok(()),
        }
    }
}

impl Drop for CredentialSession {
    fn drop(&mut self) {
        if let Some(relay) = self.relay.take() {
            debug!(path = %relay.display(), "Removing askpass relay");
            let _ = relay.close();
        }
    }
}

/// Obtains a [`CredentialSession`] before a batch.
pub struct PrivilegeBroker<'a> {
    runner: &'a dyn CommandRunner,
    temp_dir: Option<PathBuf>,
}

impl<'a> PrivilegeBroker<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self {
            runner,
            temp_dir: None,
        }
    }

    /// Create relay scripts in `dir` instead of the system temp directory.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Prompt for, verify and relay the sudo password.
    ///
    /// Returns an inactive session when the process is already `privileged`,
    /// on a dry run, without `sudo`, or when the password cannot be read or is
    /// rejected (with a warning). Only a failure to create the relay file is an
    /// error.
    pub fn acquire(
        &self,
        ui: &mut dyn UserInterface,
        dry_run: bool,
        privileged: bool,
    ) -> Result<CredentialSession> {
        if privileged || dry_run || !self.runner.command_exists("sudo") {
            debug!(privileged, dry_run, "Skipping sudo authorization");
            return Ok(CredentialSession::inactive());
        }

        ui.message("Some installations need administrator rights.");
        let password = match ui.prompt(&Prompt::password(PASSWORD_PROMPT_KEY, "Password")) {
            Ok(answer) => {
                let raw = SecretString::new(answer.as_string());
                SecretString::new(raw.expose().trim())
            }
            Err(BootstrapError::PromptUnavailable { .. }) => {
                debug!("No sudo password available; elevated commands will not be relayed");
                return Ok(CredentialSession::inactive());
            }
            Err(e) => {
                ui.warning(&format!("Could not read the password: {}", e));
                return Ok(CredentialSession::inactive());
            }
        };

        if password.is_empty() {
            return Ok(CredentialSession::inactive());
        }

        if !self.verify(ui, &password) {
            ui.warning("Incorrect password; sudo will prompt when needed");
            return Ok(CredentialSession::inactive());
        }

        let relay = self.write_relay(&password)?;
        debug!(path = %relay.display(), "Created askpass relay");
        Ok(CredentialSession { relay: Some(relay) })
    }

    fn verify(&self, ui: &mut dyn UserInterface, password: &SecretString) -> bool {
        let cancel = CancelToken::new();
        let mut ctx = ExecContext {
            ui,
            dry_run: false,
            askpass: None,
            allow_terminal: false,
            cancel: &cancel,
        };
        // A still-valid timestamp makes `sudo -v` succeed without reading the
        // password, so drop it first.
        let reset = CommandSpec::new(["sudo", "-k"])
            .timeout(VERIFY_TIMEOUT)
            .skip_dry_run();
        let reset = self.runner.execute(&reset, &mut ctx);
        if !reset.success {
            debug!(error = %reset.error_text(), "Could not invalidate the sudo timestamp");
        }

        let spec = CommandSpec::new(["sudo", "-S", "-v"])
            .stdin(password.with_newline())
            .timeout(VERIFY_TIMEOUT)
            .skip_dry_run();
        self.runner.execute(&spec, &mut ctx).success
    }

    fn write_relay(&self, password: &SecretString) -> Result<TempPath> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("askpass-").suffix(".sh");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(std::fs::Permissions::from_mode(0o700));
        }

        let mut file = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(askpass_script(password).expose().as_bytes())?;
        file.flush()?;
        let path = file.into_temp_path();

        // The umask may have narrowed the create mode.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o700))?;
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::{CommandOutcome, MockRunner};
    use crate::ui::MockUI;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn sudo_runner() -> MockRunner {
        MockRunner::new().with_tool("sudo")
    }

    #[test]
    fn escape_single_quotes_closes_and_reopens() {
        assert_eq!(escape_single_quotes("it's"), "it'\"'\"'s");
        assert_eq!(escape_single_quotes("plain"), "plain");
    }

    #[test]
    fn askpass_script_prints_password() {
        let script = askpass_script(&SecretString::new("a'b"));
        assert_eq!(
            script.expose(),
            "#!/bin/sh\nprintf '%s\\n' 'a'\"'\"'b'\n"
        );
    }

    #[test]
    fn skips_when_privileged() {
        let runner = sudo_runner();
        let mut ui = MockUI::new();
        let session = PrivilegeBroker::new(&runner)
            .acquire(&mut ui, false, true)
            .unwrap();
        assert!(!session.is_active());
        assert!(ui.prompts_shown().is_empty());
    }

    #[test]
    fn skips_on_dry_run() {
        let runner = sudo_runner();
        let mut ui = MockUI::new();
        let session = PrivilegeBroker::new(&runner)
            .acquire(&mut ui, true, false)
            .unwrap();
        assert!(!session.is_active());
        assert!(runner.commands().is_empty());
    }

    #[test]
    fn skips_without_sudo() {
        let runner = MockRunner::new();
        let mut ui = MockUI::new();
        let session = PrivilegeBroker::new(&runner)
            .acquire(&mut ui, false, false)
            .unwrap();
        assert!(!session.is_active());
    }

    #[test]
    fn verified_password_creates_private_relay() {
        let temp = TempDir::new().unwrap();
        let runner = sudo_runner();
        let mut ui = MockUI::new();
        ui.set_prompt_response(PASSWORD_PROMPT_KEY, "s3cret");

        let session = PrivilegeBroker::new(&runner)
            .with_temp_dir(temp.path())
            .acquire(&mut ui, false, false)
            .unwrap();

        assert!(session.is_active());
        assert_eq!(runner.commands(), vec!["sudo -k", "sudo -S -v"]);
        let path = session.askpass_path().unwrap().to_path_buf();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("askpass-") && name.ends_with(".sh"));
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
        let body = std::fs::read_to_string(&path).unwrap();
        assert_eq!(body, "#!/bin/sh\nprintf '%s\\n' 's3cret'\n");

        drop(session);
        assert!(!path.exists());
    }

    #[test]
    fn cached_timestamp_is_dropped_before_checking_password() {
        let temp = TempDir::new().unwrap();
        let runner = sudo_runner();
        let mut ui = MockUI::new();
        ui.set_prompt_response(PASSWORD_PROMPT_KEY, "typo");

        let _session = PrivilegeBroker::new(&runner)
            .with_temp_dir(temp.path())
            .acquire(&mut ui, false, false)
            .unwrap();

        let reset = runner.position("sudo -k").unwrap();
        let check = runner.position("sudo -S -v").unwrap();
        assert!(reset < check);
    }

    #[test]
    fn close_removes_relay() {
        let temp = TempDir::new().unwrap();
        let runner = sudo_runner();
        let mut ui = MockUI::new();
        ui.set_prompt_response(PASSWORD_PROMPT_KEY, "pw");

        let session = PrivilegeBroker::new(&runner)
            .with_temp_dir(temp.path())
            .acquire(&mut ui, false, false)
            .unwrap();
        let path = session.askpass_path().unwrap().to_path_buf();
        session.close().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn rejected_password_warns_and_stays_inactive() {
        let temp = TempDir::new().unwrap();
        let runner = sudo_runner().on(
            "sudo -S -v",
            CommandOutcome::failure(1, "", "Sorry, try again."),
        );
        let mut ui = MockUI::new();
        ui.set_prompt_response(PASSWORD_PROMPT_KEY, "wrong");

        let session = PrivilegeBroker::new(&runner)
            .with_temp_dir(temp.path())
            .acquire(&mut ui, false, false)
            .unwrap();

        assert!(!session.is_active());
        assert!(ui.has_warning("Incorrect password"));
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[test]
    fn missing_password_is_silent() {
        let runner = sudo_runner();
        let mut ui = MockUI::new();
        let session = PrivilegeBroker::new(&runner)
            .acquire(&mut ui, false, false)
            .unwrap();
        assert!(!session.is_active());
        assert!(ui.warnings().is_empty());
        assert!(runner.commands().is_empty());
    }

    #[test]
    fn blank_password_is_not_verified() {
        let runner = sudo_runner();
        let mut ui = MockUI::new();
        ui.set_prompt_response(PASSWORD_PROMPT_KEY, "   ");
        let session = PrivilegeBroker::new(&runner)
            .acquire(&mut ui, false, false)
            .unwrap();
        assert!(!session.is_active());
        assert!(runner.commands().is_empty());
    }

    #[test]
    fn unwritable_temp_dir_is_an_error() {
        let temp = TempDir::new().unwrap();
        let runner = sudo_runner();
        let mut ui = MockUI::new();
        ui.set_prompt_response(PASSWORD_PROMPT_KEY, "pw");
        let result = PrivilegeBroker::new(&runner)
            .with_temp_dir(temp.path().join("missing"))
            .acquire(&mut ui, false, false);
        assert!(matches!(result, Err(BootstrapError::Io(_))));
    }
}
