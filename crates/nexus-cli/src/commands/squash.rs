//! `nexus migrate squash <name> [--from=<id>] [--to=<id>] [--keep-originals]`
//! -- combine a contiguous range of migrations into one.

use anyhow::{Context, Result};
use chrono::Utc;
use nexus_migrate::{backup_originals, load_from_dir, save_migration};
use nexus_squash::SquashOptions;

use crate::cli::SquashArgs;
use crate::context::RuntimeContext;

pub fn run(ctx: &RuntimeContext, args: &SquashArgs) -> Result<()> {
    let migrations_dir = ctx.migrations_dir();
    let migrations = load_from_dir(&migrations_dir).context("failed to load migrations")?;

    let options = SquashOptions {
        from_id: args.from.clone(),
        to_id: args.to.clone(),
        output_name: args.name.clone(),
    };

    let now = Utc::now();
    let (squashed, report) = nexus_squash::squash(&migrations, &options, &now)?;

    println!(
        "Squashed {} migration(s) ({} statement(s) -> {} statement(s), {} removed).",
        report.original_count, report.original_count, report.optimized_count, report.removed_count
    );

    let originals: Vec<_> = migrations
        .into_iter()
        .filter(|m| report.original_ids.contains(&m.id))
        .collect();

    if !args.keep_originals {
        let backup_dir = backup_originals(&migrations_dir, &originals)?;
        println!("Originals moved to {}", backup_dir.display());
    }

    let path = save_migration(&migrations_dir, &squashed)?;
    println!("Created {}", path.display());
    Ok(())
}
