//! Version string normalization.

use std::sync::LazyLock;

use regex::Regex;

static VERSION: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\d+\.\d+(?:\.\d+)?").ok());

/// Extract the first dotted version number from a `--version` line.
///
/// Falls back to the trimmed line when it contains none.
///
/// ```
/// use devbootstrap::installer::version::normalize_version;
///
/// assert_eq!(normalize_version("Docker version 24.0.7, build afdd53b"), "24.0.7");
/// assert_eq!(normalize_version("NVIM v0.10.1"), "0.10.1");
/// assert_eq!(normalize_version("dev-build"), "dev-build");
/// ```
pub fn normalize_version(line: &str) -> String {
    let line = line.trim();
    VERSION
        .as_ref()
        .and_then(|re| re.find(line))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| line.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zsh_version_line() {
        assert_eq!(normalize_version("zsh 5.9 (x86_64-ubuntu-linux-gnu)"), "5.9");
    }

    #[test]
    fn vscode_prints_version_first() {
        assert_eq!(normalize_version("1.92.2"), "1.92.2");
    }

    #[test]
    fn empty_line_stays_empty() {
        assert_eq!(normalize_version("   "), "");
    }
}
