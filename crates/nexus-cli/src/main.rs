//! `nexus` -- the CLI wrapper around the schema model, parser, dialect
//! adapters, diff engine, squash optimizer, and migration engine (spec §6).
//!
//! This crate is the only one in the workspace that uses `anyhow`: it
//! adapts every library crate's `thiserror` error type to a single
//! process exit path, matching the convention of `anyhow` at the binary
//! boundary and `thiserror` inside library crates.

mod cli;
mod commands;
mod context;
mod output;

use clap::Parser;

use cli::{Cli, Commands, MigrateCommand};
use context::RuntimeContext;

fn main() {
    let cli = Cli::parse();

    if cli.global.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("nexus=debug")
            .with_writer(std::io::stderr)
            .init();
    }

    let result = run(&cli);

    if let Err(err) = result {
        output::print_error(&err);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Init(args) => commands::init::run(args),
        Commands::Migrate(args) => {
            let ctx = RuntimeContext::discover(&cli.global)?;
            match &args.command {
                MigrateCommand::New(args) => commands::migrate_new::run(&ctx, args),
                MigrateCommand::Up(args) => commands::up::run(&ctx, args),
                MigrateCommand::Down(args) => commands::down::run(&ctx, args),
                MigrateCommand::Status => commands::status::run(&ctx),
                MigrateCommand::Reset(args) => commands::reset::run(&ctx, args),
                MigrateCommand::Diff(args) => commands::diff::run(&ctx, args),
                MigrateCommand::Squash(args) => commands::squash::run(&ctx, args),
                MigrateCommand::Validate => commands::validate::run(&ctx),
            }
        }
    }
}
