//! Local cache directory handling.

use std::path::Path;
use tracing::debug;

use crate::{Error, Result};

/// Default cache root, relative to the working directory.
pub const DEFAULT_CACHE_ROOT: &str = ".cache";

/// Remove `dir` if it exists and create it again, empty.
///
/// Nothing from a previous run survives; there is no incremental reuse.
///
/// # Errors
///
/// Returns an error if the old directory cannot be removed or the new one
/// cannot be created.
pub async fn recreate_dir(dir: &Path) -> Result<()> {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => debug!(?dir, "Removed existing cache directory"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(Error::io(
                e,
                Some(dir.to_path_buf()),
                "remove cache directory",
            ));
        }
    }

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| Error::io(e, Some(dir.to_path_buf()), "create cache directory"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_stale_contents_are_removed() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("nodenv");
        std::fs::create_dir_all(dir.join("nodenv/old")).unwrap();
        std::fs::write(dir.join("stale.txt"), b"old").unwrap();
        std::fs::write(dir.join("nodenv.tar.gz"), b"old").unwrap();

        recreate_dir(&dir).await.unwrap();

        assert!(dir.is_dir());
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_creates_missing_parents() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".cache").join("pyenv");

        recreate_dir(&dir).await.unwrap();

        assert!(dir.is_dir());
    }
}
