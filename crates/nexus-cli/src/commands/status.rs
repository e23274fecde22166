//! `nexus migrate status` -- list each migration's applied/pending state.

use anyhow::{Context, Result};
use nexus_migrate::{load_from_dir, MigrationEngine};

use crate::context::RuntimeContext;

pub fn run(ctx: &RuntimeContext) -> Result<()> {
    let migrations = load_from_dir(&ctx.migrations_dir()).context("failed to load migrations")?;
    let connector = ctx.open_connector()?;
    let engine = MigrationEngine::new(connector.as_ref(), migrations);

    let statuses = engine.status()?;
    if statuses.is_empty() {
        println!("No migrations found.");
        return Ok(());
    }

    for s in &statuses {
        let marker = if s.applied { "[applied]" } else { "[pending]" };
        match &s.applied_at {
            Some(at) => println!("{marker} {} {} (applied {at})", s.id, s.name),
            None => println!("{marker} {} {}", s.id, s.name),
        }
    }
    Ok(())
}
