//! ogag - CI maintenance tools for the Of Gold and Grace theme.
//!
//! Commands:
//! - `ogag budget` - Check JS/CSS bundle size against the performance budget
//! - `ogag governance` - Report whether rules files were updated alongside triggering changes
//! - `ogag verify-tools` - Check the local toolchain and run theme check
//! - `ogag validate` - Validate theme data files
//! - `ogag config` - Manage configuration
//!
//! The CI commands are report-only: they exit 0 whatever they find and
//! leave their verdict in the step summary.

mod commands;
mod config;
mod context;
mod output;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BudgetArgs, ConfigArgs, GovernanceArgs, ValidateArgs, VerifyToolsArgs};

/// ogag - Theme maintenance tools
#[derive(Parser)]
#[command(name = "ogag")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check asset sizes against the performance budget
    Budget(BudgetArgs),

    /// Check that governance files follow triggering changes
    Governance(GovernanceArgs),

    /// Verify the local toolchain
    VerifyTools(VerifyToolsArgs),

    /// Validate theme data files
    Validate(ValidateArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "ogag=debug" } else { "ogag=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    // Load config
    let config_path = cli.config.as_deref();
    let ctx = context::Context::load(config_path, output)?;

    // Execute command
    let result = match cli.command {
        Commands::Budget(args) => commands::budget::run(args, &ctx).await,
        Commands::Governance(args) => commands::governance::run(args, &ctx).await,
        Commands::VerifyTools(args) => commands::verify::run(args, &ctx).await,
        Commands::Validate(args) => commands::validate::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
