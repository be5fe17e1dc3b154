//! Typed CSV table files with staged, atomic replacement.

use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use super::atomic_file::{StorageError, temp_path_for};

/// A handle to one CSV table on disk with a fixed header row.
///
/// Provides:
/// - **Atomicity**: replacement goes through a staged temp file + rename
/// - **Consistency**: the header is checked against the required columns on load
/// - **Durability**: explicit fsync before the staged file is promoted
pub struct CsvTable<R> {
    path: PathBuf,
    columns: &'static [&'static str],
    _phantom: PhantomData<R>,
}

impl<R> CsvTable<R>
where
    R: Serialize + DeserializeOwned,
{
    /// Creates a new table handle.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the CSV file
    /// * `columns` - Header row written on save and required on load
    pub fn new(path: PathBuf, columns: &'static [&'static str]) -> Self {
        Self {
            path,
            columns,
            _phantom: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads every row of the table.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(rows))`: Successfully loaded (possibly zero rows)
    /// - `Ok(None)`: File doesn't exist
    /// - `Err`: Failed to read, the header is missing a column, or a row is malformed
    pub fn load(&self) -> Result<Option<Vec<R>>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let file = File::open(&self.path)?;
        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(file);

        let headers = reader.headers()?.clone();
        let missing: Vec<&str> = self
            .columns
            .iter()
            .copied()
            .filter(|col| !headers.iter().any(|h| h == *col))
            .collect();
        if !missing.is_empty() {
            return Err(StorageError::SchemaError(format!(
                "missing columns: {}",
                missing.join(", ")
            )));
        }

        let rows = reader
            .deserialize::<R>()
            .collect::<Result<Vec<R>, csv::Error>>()?;
        Ok(Some(rows))
    }

    /// Writes `rows` to the sibling temp file without touching the table.
    ///
    /// The parent directory must already exist. The returned [`StagedFile`]
    /// must be committed to replace the table; dropping it removes the temp
    /// file.
    pub fn stage(&self, rows: &[R]) -> Result<StagedFile, StorageError> {
        let tmp_path = temp_path_for(&self.path)?;
        let staged = StagedFile {
            tmp_path: tmp_path.clone(),
            final_path: self.path.clone(),
            committed: false,
        };

        let file = File::create(&tmp_path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record(self.columns)?;
        for row in rows {
            writer.serialize(row)?;
        }
        let file = writer
            .into_inner()
            .map_err(|e| StorageError::IoError(std::io::Error::other(e.to_string())))?;
        file.sync_all()?;

        Ok(staged)
    }

    /// Replaces the table with `rows` in one step.
    pub fn save(&self, rows: &[R]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }
        self.stage(rows)?.commit()
    }
}

/// A fully written temp file waiting to replace its table.
#[derive(Debug)]
pub struct StagedFile {
    tmp_path: PathBuf,
    final_path: PathBuf,
    committed: bool,
}

impl StagedFile {
    pub fn final_path(&self) -> &Path {
        &self.final_path
    }

    /// Promotes the staged file over the table via atomic rename.
    pub fn commit(mut self) -> Result<(), StorageError> {
        fs::rename(&self.tmp_path, &self.final_path)?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.committed && self.tmp_path.is_file() && fs::remove_file(&self.tmp_path).is_ok() {
            tracing::debug!("Removed uncommitted staging file {}", self.tmp_path.display());
        }
    }
}
