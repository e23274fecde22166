//! Clap CLI definitions for the `nexus` command (spec §6).

use clap::{Args, Parser, Subcommand};

/// nexus -- schema-driven database migration toolkit.
#[derive(Parser, Debug)]
#[command(
    name = "nexus",
    about = "Schema-driven database migration toolkit",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Global flags available to all subcommands.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose/debug output.
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Path to the project root (default: discovered by walking up from
    /// the current directory looking for `nexus.json`).
    #[arg(long, global = true)]
    pub project: Option<String>,
}

/// All available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new nexus project in the current directory.
    Init(InitArgs),

    /// Migration commands: scaffold, apply, roll back, inspect.
    Migrate(MigrateArgs),
}

/// `nexus init` arguments.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Database dialect: postgres, mysql, or sqlite.
    #[arg(long, default_value = "sqlite")]
    pub dialect: String,

    /// Re-initialize even if `nexus.json` already exists.
    #[arg(long)]
    pub force: bool,
}

/// `nexus migrate` arguments: a further subcommand.
#[derive(Args, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// The `migrate` subcommand tree, mirroring spec §6's command surface.
#[derive(Subcommand, Debug)]
pub enum MigrateCommand {
    /// Scaffold an empty timestamped migration file pair.
    New(NewArgs),

    /// Apply every pending migration.
    Up(ForceArgs),

    /// Roll back the last applied migration, or further with `--to`/`-n`.
    Down(DownArgs),

    /// Show each migration's applied/pending status.
    Status,

    /// Roll back every applied migration, then reapply all of them.
    Reset(ForceArgs),

    /// Diff the schema file against the live database and write a new
    /// migration capturing the difference.
    Diff(NewArgs),

    /// Combine a contiguous range of migrations into one.
    Squash(SquashArgs),

    /// Validate every migration file's SQL without applying anything.
    Validate,
}

/// Shared `--force` flag for lock-clearing operations.
#[derive(Args, Debug)]
pub struct ForceArgs {
    /// Unconditionally clear a held lock before proceeding.
    #[arg(long)]
    pub force: bool,
}

/// `nexus migrate new <name>` / `nexus migrate diff <name>` arguments.
#[derive(Args, Debug)]
pub struct NewArgs {
    /// Human-readable migration name, e.g. `add_users_table`.
    pub name: String,
}

/// `nexus migrate down` arguments.
#[derive(Args, Debug)]
pub struct DownArgs {
    /// Roll back down to and including this migration id's successor
    /// (i.e. leave this id as the latest applied migration).
    #[arg(long)]
    pub to: Option<String>,

    /// Roll back this many migrations.
    #[arg(short = 'n', long = "steps")]
    pub steps: Option<usize>,

    #[command(flatten)]
    pub force: ForceArgs,
}

/// `nexus migrate squash <name>` arguments.
#[derive(Args, Debug)]
pub struct SquashArgs {
    /// Human-readable name for the emitted migration.
    pub name: String,

    /// Lower bound on migration id, inclusive.
    #[arg(long)]
    pub from: Option<String>,

    /// Upper bound on migration id, inclusive.
    #[arg(long)]
    pub to: Option<String>,

    /// Leave the originals in place instead of moving them into
    /// `migrations/.squashed_backup/`.
    #[arg(long)]
    pub keep_originals: bool,
}
