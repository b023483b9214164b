//! In-memory secret handling.

use std::fmt;

const MASK: &str = "[REDACTED]";

/// A string that never prints itself and is zeroed when dropped.
///
/// # Example
///
/// ```
/// use devbootstrap::privilege::SecretString;
///
/// let secret = SecretString::new("hunter2");
/// assert_eq!(format!("{:?}", secret), "SecretString([REDACTED])");
/// assert_eq!(secret.mask("password: hunter2"), "password: [REDACTED]");
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the plain value.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// The same secret followed by a newline, as read by `sudo -S`.
    pub fn with_newline(&self) -> Self {
        let mut line = String::with_capacity(self.0.len() + 1);
        line.push_str(&self.0);
        line.push('\n');
        Self(line)
    }

    /// Replace every occurrence of the secret in `text`.
    pub fn mask(&self, text: &str) -> String {
        let needle = self.0.trim_end_matches('\n');
        if needle.is_empty() {
            return text.to_string();
        }
        text.replace(needle, MASK)
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString({})", MASK)
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        let mut bytes = std::mem::take(&mut self.0).into_bytes();
        bytes.fill(0);
        std::hint::black_box(&bytes);
    }
}
