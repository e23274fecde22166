//! Runtime context for command execution: the resolved project root, its
//! `nexus.json`, and a live [`SchemaConnector`] opened against the
//! configured database.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use nexus_connector::{Dialect, SchemaConnector};
use nexus_migrate::{find_project_config_or_error, load_config, ProjectConfig};

use crate::cli::GlobalArgs;

/// Holds everything a command handler needs: the project root, its
/// parsed config, and global flags. Built once in `main` after CLI
/// parsing, before command dispatch.
pub struct RuntimeContext {
    /// Directory containing `nexus.json`.
    pub root: PathBuf,
    /// The parsed project configuration.
    pub config: ProjectConfig,
    /// Verbose output requested.
    pub verbose: bool,
}

impl RuntimeContext {
    /// Discovers `nexus.json` starting from `--project` or the current
    /// directory, and loads it.
    pub fn discover(global: &GlobalArgs) -> Result<Self> {
        let start = match &global.project {
            Some(p) => PathBuf::from(p),
            None => env::current_dir().context("failed to get current directory")?,
        };
        let config_path = find_project_config_or_error(&start)
            .context("no nexus.json found; run `nexus init` first")?;
        let root = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let config = load_config(&config_path).context("failed to parse nexus.json")?;

        Ok(Self {
            root,
            config,
            verbose: global.verbose,
        })
    }

    /// The schema DSL file's path, relative to the project root.
    pub fn schema_path(&self) -> PathBuf {
        self.root.join(&self.config.schema.path)
    }

    /// The `migrations/` directory, relative to the project root.
    pub fn migrations_dir(&self) -> PathBuf {
        self.root.join("migrations")
    }

    /// Opens a live connector against the configured database.
    pub fn open_connector(&self) -> Result<Box<dyn SchemaConnector>> {
        open_connector(&self.config.database.dialect, &self.config.database.url)
    }
}

/// Opens a connector for `dialect` against `url`, matching the driver the
/// dialect's own adapter crate wraps.
pub fn open_connector(dialect: &str, url: &str) -> Result<Box<dyn SchemaConnector>> {
    let dialect = Dialect::parse(dialect).with_context(|| format!("unknown dialect '{dialect}'"))?;
    match dialect {
        Dialect::Sqlite => {
            let conn = rusqlite::Connection::open(url)
                .with_context(|| format!("failed to open sqlite database at '{url}'"))?;
            Ok(Box::new(nexus_sql::SqliteConnector::new(conn)))
        }
        Dialect::Postgres => {
            let client = postgres::Client::connect(url, postgres::NoTls)
                .with_context(|| format!("failed to connect to postgres at '{url}'"))?;
            Ok(Box::new(nexus_sql::PostgresConnector::new(client)))
        }
        Dialect::Mysql => {
            let opts = mysql::Opts::from_url(url).with_context(|| format!("invalid mysql url '{url}'"))?;
            let conn = mysql::Conn::new(opts).with_context(|| format!("failed to connect to mysql at '{url}'"))?;
            Ok(Box::new(nexus_sql::MysqlConnector::new(conn)))
        }
    }
}
