//! `nexus migrate diff <name>` -- diff the schema file against the live
//! database and write the result as a new migration.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use nexus_connector::format_id;

use crate::cli::NewArgs;
use crate::context::RuntimeContext;
use crate::output::print_parse_error;

pub fn run(ctx: &RuntimeContext, args: &NewArgs) -> Result<()> {
    let source = std::fs::read_to_string(ctx.schema_path())
        .with_context(|| format!("failed to read schema file {}", ctx.schema_path().display()))?;
    let outcome = nexus_parser::parse(&source);
    if !outcome.errors.is_empty() {
        for err in &outcome.errors {
            print_parse_error(err);
        }
        bail!("schema file has {} error(s)", outcome.errors.len());
    }

    let connector = ctx.open_connector()?;
    let snapshot = connector.introspect().context("failed to introspect database")?;
    let changes = nexus_diff::diff(&outcome.schema, &snapshot, connector.as_ref());

    if !nexus_diff::has_changes(&changes) {
        println!("No changes detected.");
        return Ok(());
    }

    println!("{}", nexus_diff::describe_changes(&changes));

    let now = Utc::now();
    let id = format_id(&now);
    let migration = nexus_diff::generate_migration_from_diff(connector.as_ref(), &snapshot, &changes, &args.name, id);

    let path = nexus_migrate::save_migration(&ctx.migrations_dir(), &migration)?;
    println!();
    println!("Created {}", path.display());
    Ok(())
}
