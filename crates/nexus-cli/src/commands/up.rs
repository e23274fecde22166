//! `nexus migrate up` -- apply every pending migration.

use anyhow::{Context, Result};
use chrono::Utc;
use nexus_migrate::{load_from_dir, MigrationEngine};

use crate::cli::ForceArgs;
use crate::context::RuntimeContext;

pub fn run(ctx: &RuntimeContext, args: &ForceArgs) -> Result<()> {
    let migrations = load_from_dir(&ctx.migrations_dir()).context("failed to load migrations")?;
    let connector = ctx.open_connector()?;
    let engine = MigrationEngine::new(connector.as_ref(), migrations);

    let now = Utc::now();
    let report = engine.up(args.force, &now)?;

    if report.applied.is_empty() {
        println!("Already up to date.");
    } else {
        for id in &report.applied {
            println!("Applied {id}");
        }
    }
    Ok(())
}
