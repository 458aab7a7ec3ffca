//! CLI argument parsing and command dispatch.

pub mod args;
pub mod commands;

use std::path::PathBuf;

use anyhow::Result;
use args::{Cli, Commands};
use clap::Parser;
use directories::ProjectDirs;
use tracing_subscriber::EnvFilter;

use crate::output::OutputFormat;

/// Run the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let base_dir = match cli.base_dir {
        Some(dir) => dir,
        None => default_base_dir()?,
    };
    tracing::debug!(base_dir = %base_dir.display(), "resolved base directory");

    // Create context for commands
    let ctx = commands::Context {
        base_dir,
        root_url: cli.root_url,
        default_token: cli.default_token,
        output_format: cli.output.unwrap_or(OutputFormat::Pretty),
    };

    // Dispatch to appropriate command
    match cli.command {
        Commands::Node(args) => commands::node::execute(ctx, args).await,
        Commands::Hub(args) => commands::hub::execute(ctx, args).await,
        Commands::Root(args) => commands::root::execute(ctx, args).await,
        Commands::Hubs(args) => commands::hubs::execute(ctx, args).await,
        Commands::Pki(args) => commands::pki::execute(ctx, args).await,
        Commands::Config(args) => commands::config::execute(ctx, args).await,
    }
}

/// Per-user data directory used when no base directory is given.
pub fn default_base_dir() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("io", "rootlink", "rootlink")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory; pass --base-dir"))?;
    Ok(dirs.data_dir().to_path_buf())
}

/// Log to stderr; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "rootlink=debug,warn" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
