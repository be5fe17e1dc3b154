//! Read path of the display layer: loads the five tables from a directory.

use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use insight_core::dataset::{DerivedDataset, TableKind};

use crate::derived_tables::DerivedTables;

/// Loads derived datasets, substituting empty tables for anything unreadable.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataLoader;

impl DataLoader {
    pub fn new() -> Self {
        Self
    }

    /// Loads all five tables found under `dir`.
    ///
    /// A missing file, a header lacking a required column, or a malformed
    /// row yields an empty table for that slot only. Never fails.
    pub fn load(&self, dir: &Path) -> DerivedDataset {
        let tables = DerivedTables::new(dir);
        DerivedDataset {
            insights: load_table(&tables, TableKind::Insights),
            domain: load_table(&tables, TableKind::Domain),
            temporal: load_table(&tables, TableKind::Temporal),
            pattern: load_table(&tables, TableKind::Pattern),
            entity: load_table(&tables, TableKind::Entity),
        }
    }
}

fn load_table<R>(tables: &DerivedTables, kind: TableKind) -> Vec<R>
where
    R: Serialize + DeserializeOwned,
{
    let table = tables.table::<R>(kind);
    match table.load() {
        Ok(Some(rows)) => rows,
        Ok(None) => {
            tracing::debug!("Table {} not found, using empty table", table.path().display());
            Vec::new()
        }
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", table.path().display(), e);
            Vec::new()
        }
    }
}
