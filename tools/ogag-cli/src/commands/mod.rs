//! CLI command implementations.

pub mod budget;
pub mod config;
pub mod governance;
pub mod validate;
pub mod verify;

use clap::{Args, Subcommand};

/// Arguments for the budget command.
#[derive(Args)]
pub struct BudgetArgs {
    /// Running in CI: write the step summary and comment on the PR.
    #[arg(long)]
    pub ci: bool,

    /// Pull request to comment on (defaults to $PR_NUMBER).
    #[arg(long = "pr", alias = "pr-number", env = "PR_NUMBER")]
    pub pr: Option<u64>,

    /// Repository owning the pull request (defaults to $GITHUB_REPOSITORY).
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repo: Option<String>,

    /// Theme root (default: current directory).
    #[arg(short, long)]
    pub path: Option<String>,
}

/// Arguments for the governance command.
#[derive(Args)]
pub struct GovernanceArgs {
    /// Ref to compare against (default from config: origin/main).
    #[arg(long)]
    pub base: Option<String>,

    /// Use this list of changed files instead of asking git.
    #[arg(long, value_delimiter = ',')]
    pub files: Option<Vec<String>>,
}

/// Arguments for the verify-tools command.
#[derive(Args)]
pub struct VerifyToolsArgs {
    /// Fail when the Shopify CLI is missing.
    #[arg(long)]
    pub strict: bool,

    /// Skip `shopify theme check`.
    #[arg(long)]
    pub no_theme_check: bool,
}

/// Arguments for the validate command.
#[derive(Args)]
pub struct ValidateArgs {
    #[command(subcommand)]
    pub command: ValidateCommand,
}

#[derive(Subcommand)]
pub enum ValidateCommand {
    /// Validate a reviews JSON document.
    Reviews {
        /// Path to the reviews file.
        file: String,
    },
    /// Validate a theme settings JSON document.
    Settings {
        /// Path to the settings file.
        file: String,
    },
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the config file.
    Validate,
}
