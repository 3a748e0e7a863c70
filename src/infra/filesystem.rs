//! Filesystem operations
//!
//! Handles output directory preparation.

use std::path::Path;

use crate::error::FilesystemError;

/// Create a directory and all parent directories
pub fn create_dir_all(path: &Path) -> Result<(), FilesystemError> {
    std::fs::create_dir_all(path).map_err(|e| FilesystemError::CreateDir {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Remove a directory and all its contents
pub fn remove_dir_all(path: &Path) -> Result<(), FilesystemError> {
    if path.exists() {
        std::fs::remove_dir_all(path).map_err(|e| FilesystemError::RemoveDir {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
    }
    Ok(())
}

/// Delete everything at `path` and create it again, empty
pub fn recreate_dir(path: &Path) -> Result<(), FilesystemError> {
    remove_dir_all(path)?;
    create_dir_all(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_recreate_dir_wipes_contents() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("Builds/Win");
        std::fs::create_dir_all(out.join("old")).unwrap();
        std::fs::write(out.join("stale.exe"), "x").unwrap();

        recreate_dir(&out).unwrap();

        assert!(out.is_dir());
        assert_eq!(std::fs::read_dir(&out).unwrap().count(), 0);
    }

    #[test]
    fn test_recreate_dir_creates_missing_parents() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("a/b/c");
        recreate_dir(&out).unwrap();
        assert!(out.is_dir());
    }

    #[test]
    fn test_remove_missing_dir_is_ok() {
        let temp = TempDir::new().unwrap();
        assert!(remove_dir_all(&temp.path().join("missing")).is_ok());
    }
}
