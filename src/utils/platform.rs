//! Platform naming and search-path helpers for the built-in handlers
//!
//! Handlers that download platform-specific artifacts need the running
//! platform spelled the way their vendor spells it, and handlers that install
//! executables may need to put the install directory on the search path.
//! Both concerns live here so individual handlers stay small.

use crate::core::{DependError, Result};
use std::path::Path;
use tracing::debug;

/// The running OS in HashiCorp release-artifact naming
///
/// HashiCorp names its artifacts `linux`, `darwin`, `windows`, `freebsd`,
/// etc.; the only spelling difference from [`std::env::consts::OS`] is macOS.
///
/// # Examples
///
/// ```rust
/// use depend::utils::platform::hashicorp_os;
///
/// let os = hashicorp_os();
/// assert!(["linux", "darwin", "windows", "freebsd", "openbsd", "solaris"].contains(&os));
/// ```
#[must_use]
pub fn hashicorp_os() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

/// Create a directory and its parents if absent
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        debug!(path = %path.display(), "creating directory");
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Prepend a directory to the `PATH` environment variable
///
/// Sound only under the crate's sequential execution model: no other thread
/// may read or write the environment while dispatch is running.
pub fn prepend_to_path(dir: &Path) -> Result<()> {
    let current = std::env::var_os("PATH").unwrap_or_default();
    let mut entries = vec![dir.to_path_buf()];
    entries.extend(std::env::split_paths(&current));
    let joined = std::env::join_paths(entries).map_err(|e| DependError::Other {
        message: format!("cannot add {} to PATH: {e}", dir.display()),
    })?;
    debug!(dir = %dir.display(), "prepending to PATH");
    // SAFETY: dispatch is single-threaded and handlers run sequentially; no
    // concurrent access to the process environment exists here.
    unsafe { std::env::set_var("PATH", &joined) };
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashicorp_os_never_reports_macos_spelling() {
        assert_ne!(hashicorp_os(), "macos");
        if std::env::consts::OS == "linux" {
            assert_eq!(hashicorp_os(), "linux");
        }
    }

    #[test]
    fn test_ensure_dir_creates_nested_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/c");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
        // Second call is a no-op
        ensure_dir(&nested).unwrap();
    }

    #[test]
    fn test_prepend_to_path_puts_directory_first() {
        let dir = tempfile::tempdir().unwrap();
        prepend_to_path(dir.path()).unwrap();

        let path = std::env::var_os("PATH").unwrap();
        let first = std::env::split_paths(&path).next().unwrap();
        assert_eq!(first, dir.path());
    }
}
