//! Atomic replacement of the JSON tag store file.

use std::io::{self, Write as _};
use std::path::Path;
use tempfile::NamedTempFile;

/// Write content to a file atomically using a temporary file.
///
/// The temp file is created next to the target so the final rename stays on
/// one filesystem. Readers see either the old content or the new one.
///
/// # Errors
///
/// Returns an `io::Error` if the path has no parent, or if creating,
/// writing or renaming the temp file fails.
pub async fn atomic_write(path: &Path, content: &str) -> io::Result<()> {
    let parent = match path.parent() {
        Some(dir) if dir.as_os_str().is_empty() => Path::new(".").to_path_buf(),
        Some(dir) => dir.to_path_buf(),
        None => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Path has no parent directory",
            ))
        }
    };
    let target_path = path.to_path_buf();
    let content_owned = content.to_owned();

    tokio::task::spawn_blocking(move || -> io::Result<()> {
        let mut temp_file = NamedTempFile::new_in(&parent)?;
        temp_file.write_all(content_owned.as_bytes())?;
        temp_file.as_file().sync_all()?;
        // persist consumes the temp file, so it is not deleted on drop
        temp_file.persist(&target_path)?;
        Ok(())
    })
    .await
    .map_err(io::Error::other)?
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_atomic_write_creates_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("tags.json");

        atomic_write(&file_path, r#"{"tags": []}"#).await.unwrap();

        assert!(file_path.exists());
        let content = std::fs::read_to_string(&file_path).unwrap();
        assert_eq!(content, r#"{"tags": []}"#);
    }

    #[tokio::test]
    async fn test_atomic_write_overwrites_existing() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("tags.json");
        std::fs::write(&file_path, "initial").unwrap();

        atomic_write(&file_path, "updated").await.unwrap();

        let content = std::fs::read_to_string(&file_path).unwrap();
        assert_eq!(content, "updated");
    }

    #[tokio::test]
    async fn test_atomic_write_no_leftover_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("tags.json");

        atomic_write(&file_path, "content").await.unwrap();
        atomic_write(&file_path, "content again").await.unwrap();

        let count = std::fs::read_dir(temp_dir.path()).unwrap().count();
        assert_eq!(count, 1, "Should only have the target file, no temp files");
    }

    #[tokio::test]
    async fn test_atomic_write_fails_with_invalid_parent() {
        let result = atomic_write(Path::new("/nonexistent/deeply/nested/tags.json"), "content").await;
        assert!(result.is_err());
    }
}
