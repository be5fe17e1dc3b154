//! Temp-file-then-rename primitives shared by every writer in this crate.

use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};

use insight_core::InsightError;

/// Errors that can occur during atomic storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// File I/O error.
    IoError(std::io::Error),
    /// CSV encoding or decoding error.
    CsvError(csv::Error),
    /// TOML parse error.
    TomlError(toml::de::Error),
    /// TOML serialization error.
    TomlSerError(toml::ser::Error),
    /// Header row does not carry the required columns.
    SchemaError(String),
    /// File locking error.
    LockError(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::IoError(e) => write!(f, "I/O error: {}", e),
            StorageError::CsvError(e) => write!(f, "CSV error: {}", e),
            StorageError::TomlError(e) => write!(f, "TOML parse error: {}", e),
            StorageError::TomlSerError(e) => write!(f, "TOML serialization error: {}", e),
            StorageError::SchemaError(e) => write!(f, "Schema error: {}", e),
            StorageError::LockError(e) => write!(f, "Lock error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::IoError(e)
    }
}

impl From<csv::Error> for StorageError {
    fn from(e: csv::Error) -> Self {
        StorageError::CsvError(e)
    }
}

impl From<toml::de::Error> for StorageError {
    fn from(e: toml::de::Error) -> Self {
        StorageError::TomlError(e)
    }
}

impl From<toml::ser::Error> for StorageError {
    fn from(e: toml::ser::Error) -> Self {
        StorageError::TomlSerError(e)
    }
}

impl StorageError {
    /// Converts into the shared error type, attaching the path involved.
    pub fn at(self, path: &Path) -> InsightError {
        match self {
            StorageError::IoError(e) => InsightError::filesystem(path, e.to_string()),
            StorageError::CsvError(e) => InsightError::from(e),
            StorageError::TomlError(e) => InsightError::from(e),
            StorageError::TomlSerError(e) => InsightError::from(e),
            StorageError::SchemaError(msg) => InsightError::Serialization {
                format: "CSV".to_string(),
                message: format!("{}: {}", path.display(), msg),
            },
            StorageError::LockError(msg) => InsightError::filesystem(path, msg),
        }
    }
}

/// Sibling temp path used while writing `path`: `dir/.<name>.tmp`.
pub fn temp_path_for(path: &Path) -> Result<PathBuf, StorageError> {
    let parent = path.parent().ok_or_else(|| {
        StorageError::IoError(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Path has no parent directory",
        ))
    })?;

    let file_name = path.file_name().ok_or_else(|| {
        StorageError::IoError(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Path has no file name",
        ))
    })?;

    let tmp_name = format!(".{}.tmp", file_name.to_string_lossy());
    Ok(parent.join(tmp_name))
}

/// Writes `bytes` to `path` via temp file, fsync and rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    if let Some(parent) = path.parent()
        && !parent.exists()
    {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = temp_path_for(path)?;
    let mut tmp_file = File::create(&tmp_path)?;
    tmp_file.write_all(bytes)?;
    tmp_file.sync_all()?;
    drop(tmp_file);

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(())
}

/// Async variant of [`write_atomic`] for callers on the runtime.
pub async fn write_atomic_async(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    use tokio::io::AsyncWriteExt;

    let tmp_path = temp_path_for(path)?;
    let mut tmp_file = tokio::fs::File::create(&tmp_path).await?;
    tmp_file.write_all(bytes).await?;
    tmp_file.sync_all().await?;
    drop(tmp_file);

    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(e.into());
    }
    Ok(())
}

/// A file lock guard that automatically releases the lock when dropped.
pub(crate) struct FileLock {
    #[allow(dead_code)]
    file: File,
    lock_path: PathBuf,
}

impl FileLock {
    /// Acquires an exclusive lock next to the given path.
    pub(crate) fn acquire(path: &Path) -> Result<Self, StorageError> {
        let lock_path = path.with_extension("lock");

        if let Some(parent) = lock_path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        #[cfg(unix)]
        {
            use fs2::FileExt;
            file.lock_exclusive()
                .map_err(|e| StorageError::LockError(format!("Failed to acquire lock: {}", e)))?;
        }

        Ok(FileLock { file, lock_path })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_temp_path_is_hidden_sibling() {
        let tmp = temp_path_for(Path::new("/data/processed/insights.csv")).unwrap();
        assert_eq!(tmp, PathBuf::from("/data/processed/.insights.csv.tmp"));
    }

    #[test]
    fn test_write_atomic_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("out.bin");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"second");
        assert!(!temp_dir.path().join("nested").join(".out.bin.tmp").exists());
    }

    #[tokio::test]
    async fn test_write_atomic_async_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.pdf");

        write_atomic_async(&path, b"one").await.unwrap();
        write_atomic_async(&path, b"two").await.unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"two");
        assert!(!temp_dir.path().join(".a.pdf.tmp").exists());
    }
}
