//! `nexus migrate down [--to=<id> | -n=<k>] [--force]` -- roll back one or
//! more applied migrations.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use nexus_migrate::{load_from_dir, MigrationEngine};

use crate::cli::DownArgs;
use crate::context::RuntimeContext;

pub fn run(ctx: &RuntimeContext, args: &DownArgs) -> Result<()> {
    if args.to.is_some() && args.steps.is_some() {
        bail!("--to and --steps (-n) are mutually exclusive");
    }

    let migrations = load_from_dir(&ctx.migrations_dir()).context("failed to load migrations")?;
    let connector = ctx.open_connector()?;
    let engine = MigrationEngine::new(connector.as_ref(), migrations);

    let now = Utc::now();
    let report = if let Some(target) = &args.to {
        engine.down_to(target, args.force.force, &now)?
    } else if let Some(n) = args.steps {
        engine.down_n(n, args.force.force, &now)?
    } else {
        engine.down(args.force.force, &now)?
    };

    if report.rolled_back.is_empty() {
        println!("Nothing to roll back.");
    } else {
        for id in &report.rolled_back {
            println!("Rolled back {id}");
        }
    }
    Ok(())
}
