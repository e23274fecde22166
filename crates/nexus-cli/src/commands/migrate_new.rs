//! `nexus migrate new <name>` -- scaffold an empty timestamped migration
//! file pair (spec.md SUPPLEMENTED FEATURES).

use anyhow::Result;
use chrono::Utc;
use nexus_connector::{format_id, Migration};
use nexus_migrate::save_migration;

use crate::cli::NewArgs;
use crate::context::RuntimeContext;

pub fn run(ctx: &RuntimeContext, args: &NewArgs) -> Result<()> {
    let now = Utc::now();
    let id = format_id(&now);
    let migration = Migration::new(id, &args.name, "", "");

    let path = save_migration(&ctx.migrations_dir(), &migration)?;
    println!("Created {}", path.display());
    Ok(())
}
