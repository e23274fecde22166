//! `nexus init` -- scaffold `nexus.json`, `migrations/`, and a starter
//! schema file in the current directory (spec.md SUPPLEMENTED FEATURES).

use std::env;
use std::fs;

use anyhow::{bail, Context, Result};

use nexus_connector::Dialect;
use nexus_migrate::{save_config, DatabaseConfig, OutputConfig, ProjectConfig, SchemaConfig, CONFIG_FILENAME};

use crate::cli::InitArgs;

const STARTER_SCHEMA: &str = r#"// Edit this file, then run `nexus migrate diff <name>` to capture the
// difference between it and the live database as a new migration.

model User {
  id        Int    @id @autoincrement
  email     String @unique
  createdAt DateTime @default(now())
}
"#;

/// Execute the `nexus init` command.
pub fn run(args: &InitArgs) -> Result<()> {
    let cwd = env::current_dir().context("failed to get current directory")?;
    let config_path = cwd.join(CONFIG_FILENAME);

    if config_path.exists() && !args.force {
        bail!(
            "'{}' already exists in {}\n\nUse --force to re-initialize.",
            CONFIG_FILENAME,
            cwd.display()
        );
    }

    let dialect = Dialect::parse(&args.dialect).with_context(|| format!("unknown dialect '{}'", args.dialect))?;

    let mut config = ProjectConfig::default();
    config.database = DatabaseConfig {
        dialect: dialect.name().to_string(),
        url: default_url_for(dialect),
    };
    config.schema = SchemaConfig {
        path: "./schema.nexus".to_string(),
    };
    config.output = OutputConfig {
        dir: "./generated".to_string(),
        package: "db".to_string(),
    };

    save_config(&config_path, &config)?;

    let migrations_dir = cwd.join("migrations");
    fs::create_dir_all(&migrations_dir)
        .with_context(|| format!("failed to create directory: {}", migrations_dir.display()))?;

    let schema_path = cwd.join(&config.schema.path);
    if !schema_path.exists() {
        fs::write(&schema_path, STARTER_SCHEMA)
            .with_context(|| format!("failed to create {}", schema_path.display()))?;
    }

    println!();
    println!("nexus project initialized!");
    println!();
    println!("  Config:     {}", config_path.display());
    println!("  Schema:     {}", schema_path.display());
    println!("  Migrations: {}", migrations_dir.display());
    println!("  Dialect:    {}", dialect.name());
    println!();
    println!("Edit {}, then run `nexus migrate diff <name>`.", config.schema.path);
    println!();

    Ok(())
}

fn default_url_for(dialect: Dialect) -> String {
    match dialect {
        Dialect::Sqlite => "./nexus.db".to_string(),
        Dialect::Postgres => "postgres://localhost/nexus".to_string(),
        Dialect::Mysql => "mysql://localhost/nexus".to_string(),
    }
}
