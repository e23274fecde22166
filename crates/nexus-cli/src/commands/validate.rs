//! `nexus migrate validate` -- check every migration file's SQL for
//! structural errors and courtesy warnings, without applying anything.

use anyhow::{bail, Context, Result};
use nexus_migrate::{load_from_dir, Severity};

use crate::context::RuntimeContext;

pub fn run(ctx: &RuntimeContext) -> Result<()> {
    let migrations = load_from_dir(&ctx.migrations_dir()).context("failed to load migrations")?;

    let mut error_count = 0;
    for migration in &migrations {
        let result = nexus_migrate::validate(migration);
        for finding in &result.findings {
            let label = match finding.severity {
                Severity::Error => {
                    error_count += 1;
                    "error"
                }
                Severity::Warning => "warning",
            };
            println!("{}: {label}: {}", migration.id, finding.message);
        }
    }

    if error_count > 0 {
        bail!("{error_count} validation error(s) found");
    }

    println!("{} migration(s) validated, no errors.", migrations.len());
    Ok(())
}
