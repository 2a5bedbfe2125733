use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use rust_sqlmigrate::{diff_snapshots, generate_migration, GenerateOptions, SqlServerVersion};

#[derive(Parser)]
#[command(name = "rust-sqlmigrate")]
#[command(author, version, about = "Schema migration compiler for SQL Server")]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet output (errors only)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a migration into a T-SQL script
    Generate {
        /// Path to the migration project file
        #[arg(short, long)]
        project: Option<PathBuf>,

        /// Snapshot the database currently matches (omit for an empty database)
        #[arg(long)]
        source: Option<PathBuf>,

        /// Snapshot the database should end up matching
        #[arg(long)]
        target: Option<PathBuf>,

        /// Pre-diffed operation list (JSON), used instead of diffing the snapshots
        #[arg(long)]
        operations: Option<PathBuf>,

        /// Output path for the script (defaults to bin/<project>.sql)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Generate a script that can be re-run against a partially migrated database
        #[arg(long)]
        idempotent: bool,

        /// Name default constraints DF_<table>_<column> (overrides the model setting)
        #[arg(long)]
        named_defaults: Option<bool>,

        /// Target SQL Server platform (Sql130, Sql140, Sql150, Sql160)
        #[arg(short, long)]
        target_platform: Option<SqlServerVersion>,
    },

    /// Print the operations between two snapshots as JSON
    Diff {
        /// Snapshot the database currently matches (omit for an empty database)
        #[arg(long)]
        source: Option<PathBuf>,

        /// Snapshot the database should end up matching
        #[arg(long)]
        target: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Commands::Generate {
            project,
            source,
            target,
            operations,
            output,
            idempotent,
            named_defaults,
            target_platform,
        } => {
            let options = GenerateOptions {
                project_path: project,
                source_model: source,
                target_model: target,
                operations,
                output_path: output,
                idempotent,
                use_named_default_constraints: named_defaults,
                target_platform,
            };

            let path = generate_migration(options)?;
            println!("{}", path.display());
        }
        Commands::Diff { source, target } => {
            let operations = diff_snapshots(source.as_deref(), &target)?;
            println!("{}", serde_json::to_string_pretty(&operations)?);
        }
    }

    Ok(())
}
