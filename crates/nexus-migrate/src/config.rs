//! `nexus.json` project configuration (spec §6): loading, saving, and
//! directory discovery, generalizing the teacher's `find_beads_dir`
//! walk-up-the-tree helper to an arbitrary marker filename.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// The project marker filename, analogous to the teacher's `.beads/`.
pub const CONFIG_FILENAME: &str = "nexus.json";

/// The top-level `nexus.json` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Target database connection.
    pub database: DatabaseConfig,
    /// Schema DSL file location.
    pub schema: SchemaConfig,
    /// Code-generation output location (pinned, per spec §1, as an
    /// external collaborator's interface -- the core does not generate
    /// code, but it owns the file this section describes).
    pub output: OutputConfig,
}

/// The `database` section of `nexus.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// The dialect identifier: `"postgres"`, `"mysql"`, or `"sqlite"`.
    pub dialect: String,
    /// The driver-specific connection URL. May itself be a
    /// `${VAR}`-style placeholder for the caller to interpolate from the
    /// environment; this crate reads it verbatim (spec §6,
    /// "Environment").
    pub url: String,
}

/// The `schema` section of `nexus.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Path to the schema DSL file, relative to the project root.
    pub path: String,
}

/// The `output` section of `nexus.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory generated code is written to.
    pub dir: String,
    /// The package/module name for generated code.
    pub package: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                dialect: "sqlite".to_string(),
                url: "./nexus.db".to_string(),
            },
            schema: SchemaConfig {
                path: "./schema.nexus".to_string(),
            },
            output: OutputConfig {
                dir: "./generated".to_string(),
                package: "db".to_string(),
            },
        }
    }
}

/// Loads `nexus.json` from `path`.
pub fn load(path: &Path) -> Result<ProjectConfig> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Serializes and writes `config` to `path`, pretty-printed.
pub fn save(path: &Path, config: &ProjectConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let contents = serde_json::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

/// Walks up the directory tree from `start` looking for `nexus.json`.
/// Returns the path to the file (not its containing directory) if found.
pub fn find_project_config(start: &Path) -> Option<PathBuf> {
    let start = start.canonicalize().ok()?;
    let mut current = start.as_path();
    loop {
        let candidate = current.join(CONFIG_FILENAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        match current.parent() {
            Some(parent) if parent != current => current = parent,
            _ => break,
        }
    }
    None
}

/// Like [`find_project_config`], but returns [`EngineError::ProjectNotFound`]
/// instead of `None`.
pub fn find_project_config_or_error(start: &Path) -> Result<PathBuf> {
    find_project_config(start).ok_or(EngineError::ProjectNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn round_trips_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        let config = ProjectConfig::default();
        save(&path, &config).unwrap();
        let loaded = load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn finds_config_by_walking_up() {
        let dir = tempdir().unwrap();
        save(&dir.path().join(CONFIG_FILENAME), &ProjectConfig::default()).unwrap();
        let child = dir.path().join("src").join("deep");
        std::fs::create_dir_all(&child).unwrap();

        let found = find_project_config(&child).unwrap();
        assert_eq!(found.canonicalize().unwrap(), dir.path().join(CONFIG_FILENAME).canonicalize().unwrap());
    }

    #[test]
    fn parses_documented_shape() {
        let json = r#"{
            "database": { "dialect": "postgres", "url": "postgres://localhost/app" },
            "schema": { "path": "./schema.nexus" },
            "output": { "dir": "./generated", "package": "db" }
        }"#;
        let config: ProjectConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.database.dialect, "postgres");
    }
}
