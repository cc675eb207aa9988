//! Destination directory mirroring.
//!
//! The output tree replicates `{output_root}/{LIBRARY}/{FILE}/`.
//! Creation is idempotent and strictly sequential: a directory is
//! confirmed to exist before any transfer into it is dispatched.

use crate::error::{MigrateError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Ensure a directory exists, creating it and any parents if absent.
///
/// An already-present directory is success, not a warning.
pub async fn ensure(path: &Path) -> Result<()> {
    if !path.exists() {
        debug!("Creating directory: {}", path.display());
    }
    tokio::fs::create_dir_all(path).await?;
    Ok(())
}

/// Resolve the output root: absolute paths are taken as-is, relative
/// paths resolve against the invoking user's home directory.
pub fn resolve_output_root(raw: &str) -> Result<PathBuf> {
    let home = std::env::var_os("HOME").map(PathBuf::from);
    resolve_with_home(raw, home.as_deref())
}

fn resolve_with_home(raw: &str, home: Option<&Path>) -> Result<PathBuf> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(MigrateError::Config("output directory is empty".into()));
    }

    let path = Path::new(raw);
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    match home {
        Some(home) => Ok(home.join(path)),
        None => Err(MigrateError::Config(
            "the current user has no home directory; use an absolute output path".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ensure_creates_nested_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("PRODLIB").join("QRPGSRC");

        ensure(&path).await.unwrap();
        assert!(path.is_dir());
    }

    #[tokio::test]
    async fn test_ensure_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("PRODLIB");

        ensure(&path).await.unwrap();
        ensure(&path).await.unwrap();
        assert!(path.is_dir());
    }

    #[test]
    fn test_absolute_root_taken_as_is() {
        let root = resolve_with_home("/home/u1/sources", None).unwrap();
        assert_eq!(root, PathBuf::from("/home/u1/sources"));
    }

    #[test]
    fn test_relative_root_resolves_against_home() {
        let root = resolve_with_home("sources", Some(Path::new("/home/u1"))).unwrap();
        assert_eq!(root, PathBuf::from("/home/u1/sources"));
    }

    #[test]
    fn test_relative_root_without_home_fails() {
        let err = resolve_with_home("sources", None).unwrap_err();
        assert!(err.to_string().contains("home directory"));
    }

    #[test]
    fn test_empty_root_rejected() {
        assert!(resolve_with_home("  ", Some(Path::new("/home/u1"))).is_err());
    }
}
