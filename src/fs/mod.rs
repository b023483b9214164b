//! Filesystem access for installers.
//!
//! Mutating operations take the [`ExecContext`] so they honor dry run the
//! same way commands do: the intended action is reported as
//! `[DRY RUN] <shell equivalent>` and the disk is left untouched.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::shell::ExecContext;

/// Filesystem operations used by installer strategies.
pub trait FileSystem {
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Entries of a directory, sorted by path.
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;

    fn write(&self, path: &Path, contents: &[u8], ctx: &mut ExecContext<'_>) -> Result<()>;

    fn create_dir_all(&self, path: &Path, ctx: &mut ExecContext<'_>) -> Result<()>;

    /// Remove a file or directory tree. A missing path is not an error.
    fn remove_all(&self, path: &Path, ctx: &mut ExecContext<'_>) -> Result<()>;

    fn copy(&self, from: &Path, to: &Path, ctx: &mut ExecContext<'_>) -> Result<()>;

    fn rename(&self, from: &Path, to: &Path, ctx: &mut ExecContext<'_>) -> Result<()>;

    fn set_mode(&self, path: &Path, mode: u32, ctx: &mut ExecContext<'_>) -> Result<()>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    pub fn new() -> Self {
        Self
    }
}

fn simulated(ctx: &mut ExecContext<'_>, action: String) -> bool {
    if ctx.dry_run {
        ctx.ui.clear_progress();
        ctx.ui.message(&format!("[DRY RUN] {}", action));
        return true;
    }
    debug!(%action, "Filesystem change");
    false
}

impl FileSystem for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = std::fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort();
        Ok(entries)
    }

    fn write(&self, path: &Path, contents: &[u8], ctx: &mut ExecContext<'_>) -> Result<()> {
        if simulated(ctx, format!("write file {}", path.display())) {
            return Ok(());
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn create_dir_all(&self, path: &Path, ctx: &mut ExecContext<'_>) -> Result<()> {
        if simulated(ctx, format!("mkdir -p {}", path.display())) {
            return Ok(());
        }
        std::fs::create_dir_all(path)?;
        Ok(())
    }

    fn remove_all(&self, path: &Path, ctx: &mut ExecContext<'_>) -> Result<()> {
        if simulated(ctx, format!("rm -rf {}", path.display())) {
            return Ok(());
        }
        let result = match std::fs::symlink_metadata(path) {
            Ok(meta) if meta.is_dir() => std::fs::remove_dir_all(path),
            Ok(_) => std::fs::remove_file(path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        };
        Ok(result?)
    }

    fn copy(&self, from: &Path, to: &Path, ctx: &mut ExecContext<'_>) -> Result<()> {
        if simulated(ctx, format!("cp {} {}", from.display(), to.display())) {
            return Ok(());
        }
        std::fs::copy(from, to)?;
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path, ctx: &mut ExecContext<'_>) -> Result<()> {
        if simulated(ctx, format!("mv {} {}", from.display(), to.display())) {
            return Ok(());
        }
        std::fs::rename(from, to)?;
        Ok(())
    }

    fn set_mode(&self, path: &Path, mode: u32, ctx: &mut ExecContext<'_>) -> Result<()> {
        if simulated(ctx, format!("chmod {:o} {}", mode, path.display())) {
            return Ok(());
        }
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))?;
        }
        Ok(())
    }
}
