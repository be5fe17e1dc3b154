//! Writes the five derived tables of a dataset into one directory.
//!
//! Writing is two-phase: every table is first staged to a temp file next to
//! its target, and only once all five are on disk are they renamed into
//! place. A failure while staging leaves the previous tables untouched.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use insight_core::dataset::{DerivedDataset, TableKind};
use insight_core::{InsightError, Result};

use crate::storage::{CsvTable, StagedFile};

pub struct DerivedTables {
    dir: PathBuf,
}

impl DerivedTables {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of one table inside this directory.
    pub fn table_path(&self, kind: TableKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }

    /// Typed handle for one table.
    pub fn table<R>(&self, kind: TableKind) -> CsvTable<R>
    where
        R: Serialize + DeserializeOwned,
    {
        CsvTable::new(self.table_path(kind), kind.columns())
    }

    /// Stages all five tables without replacing anything.
    ///
    /// # Errors
    ///
    /// Returns `InsightError::Filesystem` if the directory is missing or a
    /// temp file cannot be written. Already staged files are cleaned up.
    pub fn stage(&self, dataset: &DerivedDataset) -> Result<StagedTables> {
        if !self.dir.is_dir() {
            return Err(InsightError::filesystem(&self.dir, "Derived directory does not exist"));
        }

        let mut files = Vec::with_capacity(TableKind::ALL.len());
        files.push(self.stage_one(TableKind::Insights, &dataset.insights)?);
        files.push(self.stage_one(TableKind::Domain, &dataset.domain)?);
        files.push(self.stage_one(TableKind::Temporal, &dataset.temporal)?);
        files.push(self.stage_one(TableKind::Pattern, &dataset.pattern)?);
        files.push(self.stage_one(TableKind::Entity, &dataset.entity)?);

        tracing::debug!("Staged {} tables in {}", files.len(), self.dir.display());
        Ok(StagedTables { files })
    }

    /// Stages and promotes all five tables in one call.
    pub fn write(&self, dataset: &DerivedDataset) -> Result<BTreeSet<TableKind>> {
        self.stage(dataset)?.commit()
    }

    fn stage_one<R>(&self, kind: TableKind, rows: &[R]) -> Result<(TableKind, StagedFile)>
    where
        R: Serialize + DeserializeOwned,
    {
        let table = self.table::<R>(kind);
        let staged = table.stage(rows).map_err(|e| e.at(table.path()))?;
        Ok((kind, staged))
    }
}

/// Five fully written temp files awaiting promotion.
#[derive(Debug)]
pub struct StagedTables {
    files: Vec<(TableKind, StagedFile)>,
}

impl StagedTables {
    /// Renames every staged file over its table.
    ///
    /// Returns the set of tables now present.
    pub fn commit(self) -> Result<BTreeSet<TableKind>> {
        let mut written = BTreeSet::new();
        for (kind, staged) in self.files {
            let target = staged.final_path().to_path_buf();
            staged.commit().map_err(|e| e.at(&target))?;
            written.insert(kind);
        }
        Ok(written)
    }
}
