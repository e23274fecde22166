//! `nexus migrate reset` -- roll back every applied migration, then
//! reapply all of them.

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
    let report = engine.reset(args.force, &now)?;

    for id in &report.rolled_back {
        println!("Rolled back {id}");
    }
    for id in &report.applied {
        println!("Applied {id}");
    }
    Ok(())
}
