//! The Migration Engine (spec §4.6): owns the history table and the lock
//! table; orders, applies, rolls back, validates, and reports status of
//! migrations under a mutual-exclusion lock.
//!
//! Also carries the ambient project-configuration layer (`nexus.json`
//! loading and discovery) and the on-disk migration file format, since
//! both exist only to serve this crate's `LoadFromDir`/`SaveMigration`
//! and the CLI's project wiring.

mod config;
mod engine;
mod error;
mod file;
mod history;
mod lock;
mod validate;

pub use config::{
    find_project_config, find_project_config_or_error, load as load_config, save as save_config, DatabaseConfig, OutputConfig,
    ProjectConfig, SchemaConfig, CONFIG_FILENAME,
};
pub use engine::{DownReport, MigrationEngine, MigrationStatus, ResetReport, UpReport};
pub use error::{EngineError, Result};
pub use file::{backup_originals, delete_originals, load_from_dir, save_migration};
pub use history::HistoryRow;
pub use lock::{LockRow, DEFAULT_TTL_SECONDS};
pub use validate::{validate, Finding, Severity, ValidationResult};
