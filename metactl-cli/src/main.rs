//! metactl: keep a GraphQL engine's metadata in step with a project directory.
//!
//! # Usage
//!
//! ```text
//! metactl metadata export
//! metactl metadata clear
//! metactl metadata reload
//! metactl metadata apply
//! metactl metadata diff
//! metactl metadata get_inconsistent [--json]
//! metactl metadata drop_inconsistent
//!
//! options: --project <DIR> --endpoint <URL> --admin-secret <SECRET> [-v]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::metadata::MetadataArgs;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "metactl",
    version,
    about = "Export, apply and inspect GraphQL engine metadata",
    long_about = None,
)]
struct Cli {
    /// Log progress to stderr (`RUST_LOG` takes precedence).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage the engine's metadata.
    Metadata(MetadataArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Metadata(args) => args.run(),
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
