//! Storage primitives: atomic files, CSV tables and the config file.

mod atomic_file;
mod config_storage;
mod csv_table;

pub use atomic_file::{StorageError, temp_path_for, write_atomic, write_atomic_async};
pub use config_storage::ConfigStorage;
pub use csv_table::{CsvTable, StagedFile};
