//! Configuration management commands.

use std::fs;

use anyhow::{bail, Result};
use dialoguer::Confirm;

use super::{ConfigArgs, ConfigCommand};
use crate::config::generate_default_config;
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx).await,
        ConfigCommand::Init { force } => init_config(force, ctx).await,
        ConfigCommand::Validate => validate_config(ctx).await,
    }
}

async fn show_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Current Configuration");

    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    match ctx.config_path {
        Some(ref path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(defaults)"),
    }

    let budget = &ctx.config.budget;
    ctx.output.info("");
    ctx.output.info("[budget]");
    ctx.output.kv("assets_dir", &budget.assets_dir);
    ctx.output.kv("extensions", &budget.extensions.join(", "));
    ctx.output.kv("exclude", &budget.exclude.join(", "));
    ctx.output.kv("total_kb", &budget.total_kb.to_string());
    ctx.output.kv("warning_kb", &budget.warning_kb.to_string());

    let governance = &ctx.config.governance;
    ctx.output.info("");
    ctx.output.info("[governance]");
    ctx.output.kv("base_ref", &governance.base_ref);
    ctx.output.info("triggers:");
    for trigger in &governance.triggers {
        ctx.output.list_item(trigger);
    }
    ctx.output.info("files:");
    for file in &governance.files {
        ctx.output.list_item(file);
    }

    let verify = &ctx.config.verify;
    ctx.output.info("");
    ctx.output.info("[verify]");
    ctx.output.kv("min_node_major", &verify.min_node_major.to_string());
    ctx.output.kv("theme_check", &verify.theme_check.to_string());
    ctx.output.kv("install_url", &verify.install_url);

    Ok(())
}

async fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join("ogag.toml");

    if config_path.exists() && !force {
        if ctx.output.is_json() {
            bail!(
                "Config file already exists: {}. Use --force to overwrite.",
                config_path.display()
            );
        }
        let overwrite = Confirm::new()
            .with_prompt(format!("{} exists. Overwrite?", config_path.display()))
            .default(false)
            .interact()?;
        if !overwrite {
            ctx.output.info("Keeping existing config");
            return Ok(());
        }
    }

    fs::write(&config_path, generate_default_config())?;
    ctx.output.success(&format!("Created: {}", config_path.display()));

    Ok(())
}

async fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let (errors, warnings) = ctx.config.check();

    if errors.is_empty() && warnings.is_empty() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for error in &errors {
        ctx.output.error(&format!("Error: {}", error));
    }

    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }

    if !errors.is_empty() {
        bail!("Configuration has {} error(s)", errors.len());
    }

    ctx.output.success("Configuration is valid (with warnings)");

    Ok(())
}
