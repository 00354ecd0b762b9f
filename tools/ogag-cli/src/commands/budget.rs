//! Bundle-size budget check.
//!
//! Sums the theme's JavaScript and CSS source sizes and compares the total to
//! the budget. Report-only: the command succeeds whatever the total is.

use std::path::Path;
use std::process::Command;

use anyhow::{Context as _, Result};
use serde::Serialize;

use super::BudgetArgs;
use crate::config::BudgetConfig;
use crate::context::Context;
use crate::output::format_bytes;

/// One counted asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetFile {
    /// Path relative to the theme root, `/`-separated.
    pub path: String,
    pub size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    Within,
    Approaching,
    Over,
}

impl BudgetStatus {
    fn icon(&self) -> &'static str {
        match self {
            BudgetStatus::Within => "✅",
            BudgetStatus::Approaching => "⚠️",
            BudgetStatus::Over => "❌",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            BudgetStatus::Within => "Within Budget",
            BudgetStatus::Approaching => "Approaching",
            BudgetStatus::Over => "Over Budget",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetReport {
    pub files: Vec<AssetFile>,
    pub total_bytes: u64,
    pub budget_kb: f64,
    pub warning_kb: f64,
    pub status: BudgetStatus,
}

impl BudgetReport {
    pub fn new(files: Vec<AssetFile>, config: &BudgetConfig) -> Self {
        let total_bytes = files.iter().map(|f| f.size).sum();
        let total_kb = total_bytes as f64 / 1024.0;
        let status = if total_kb >= config.total_kb {
            BudgetStatus::Over
        } else if total_kb >= config.warning_kb {
            BudgetStatus::Approaching
        } else {
            BudgetStatus::Within
        };
        Self {
            files,
            total_bytes,
            budget_kb: config.total_kb,
            warning_kb: config.warning_kb,
            status,
        }
    }

    pub fn total_kb(&self) -> f64 {
        self.total_bytes as f64 / 1024.0
    }

    fn percent(&self) -> f64 {
        self.total_kb() / self.budget_kb * 100.0
    }

    /// One-line verdict.
    pub fn message(&self) -> String {
        let mut message = format!(
            "Bundle size: {:.1}KB (budget: {}KB)",
            self.total_kb(),
            self.budget_kb
        );
        match self.status {
            BudgetStatus::Over => message.push_str(&format!(
                " - OVER BUDGET by {:.1}KB",
                self.total_kb() - self.budget_kb
            )),
            BudgetStatus::Approaching => {
                message.push_str(&format!(" - Approaching budget ({:.0}%)", self.percent()))
            }
            BudgetStatus::Within => {
                message.push_str(&format!(" - Within budget ({:.0}%)", self.percent()))
            }
        }
        message
    }

    /// Only reports at or over the warning threshold reach the PR.
    pub fn should_comment(&self) -> bool {
        self.status != BudgetStatus::Within
    }

    pub fn step_summary(&self) -> String {
        let rows: Vec<String> = self
            .files
            .iter()
            .map(|f| format!("| `{}` | {} |", f.path, format_bytes(f.size)))
            .collect();

        format!(
            "### 📊 Performance Budget Report\n\n\
             | Metric | Value | Status |\n\
             |--------|-------|--------|\n\
             | **Total JS+CSS Size** | {:.1} KB | {} {} |\n\
             | **Budget Limit** | {} KB | - |\n\
             | **Warning Threshold** | {} KB | - |\n\n\
             #### File Breakdown\n\n\
             | File | Size |\n\
             |------|------|\n\
             {}\n\n\
             *Shopify minifies assets on upload. These are source file sizes.*",
            self.total_kb(),
            self.status.icon(),
            self.status.label(),
            self.budget_kb,
            self.warning_kb,
            rows.join("\n"),
        )
    }

    pub fn pr_comment(&self) -> String {
        let details: Vec<String> = self
            .files
            .iter()
            .map(|f| format!("- {}: `{}`", format_bytes(f.size), f.path))
            .collect();
        format!(
            "## 🚀 Performance Budget Report\n\n### Bundle Size Check\n\n{} {}\n\n**Details:**\n{}\n\n\
             *Shopify minifies assets on upload - these are source sizes.*",
            self.status.icon(),
            self.message(),
            details.join("\n"),
        )
    }
}

/// Every asset under `root/assets_dir` with a budgeted extension, sorted by
/// path. A missing assets directory yields no files.
pub fn collect_assets(root: &Path, config: &BudgetConfig) -> Result<Vec<AssetFile>> {
    let assets = root.join(&config.assets_dir);
    let mut files = Vec::new();
    if assets.is_dir() {
        walk(root, &assets, config, &mut files)?;
    } else {
        tracing::warn!(dir = %assets.display(), "assets directory not found");
    }
    files.sort_by(|a, b| a.path.cmp(&b.path));
    files.dedup_by(|a, b| a.path == b.path);
    Ok(files)
}

fn walk(root: &Path, dir: &Path, config: &BudgetConfig, files: &mut Vec<AssetFile>) -> Result<()> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?;

    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        let relative = path
            .strip_prefix(root)
            .unwrap_or(&path)
            .to_string_lossy()
            .replace('\\', "/");
        if config.exclude.iter().any(|excl| relative.contains(excl.as_str())) {
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::warn!(path = %relative, error = %e, "could not read file");
                continue;
            }
        };
        if metadata.is_dir() {
            walk(root, &path, config, files)?;
            continue;
        }

        let counted = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| config.extensions.iter().any(|e| e == ext));
        if counted {
            files.push(AssetFile {
                path: relative,
                size: metadata.len(),
            });
        }
    }
    Ok(())
}

fn post_pr_comment(pr: u64, repo: Option<&str>, body: &str) -> Result<()> {
    let pr = pr.to_string();
    let mut command = Command::new("gh");
    command.args(["pr", "comment", pr.as_str(), "--body", body]);
    if let Some(repo) = repo {
        command.args(["--repo", repo]);
    }
    let status = command.status().context("Failed to run gh")?;
    if !status.success() {
        anyhow::bail!("gh pr comment exited with {}", status);
    }
    Ok(())
}

/// Run the budget command.
pub async fn run(args: BudgetArgs, ctx: &Context) -> Result<()> {
    let root = match args.path {
        Some(ref path) => ctx.resolve_path(path),
        None => ctx.cwd.clone(),
    };
    let config = &ctx.config.budget;

    ctx.output.header("Checking Performance Budget");
    let files = collect_assets(&root, config)?;
    let report = BudgetReport::new(files, config);

    if ctx.output.is_json() {
        ctx.output.json(&report);
    } else {
        ctx.output.line("");
        for file in &report.files {
            ctx.output.table_row(&[format_bytes(file.size).as_str(), file.path.as_str()], &[9, 0]);
        }
        ctx.output.line("  ───────────────────────");
        ctx.output.table_row(&[format_bytes(report.total_bytes).as_str(), "TOTAL"], &[9, 0]);
        ctx.output.line("");

        match report.status {
            BudgetStatus::Within => ctx.output.success(&report.message()),
            _ => ctx.output.warn(&report.message()),
        }
        ctx.output.info("Shopify minifies assets on upload. Local sizes may be larger.");
    }

    if !args.ci {
        return Ok(());
    }

    if report.should_comment() {
        match args.pr {
            Some(pr) => {
                if let Err(e) = post_pr_comment(pr, args.repo.as_deref(), &report.pr_comment()) {
                    ctx.output.warn(&format!("Could not post PR comment: {:#}", e));
                }
            }
            None => ctx.output.debug("No PR number found, skipping comment"),
        }
    }

    if let Some(summary) = ctx.step_summary() {
        if let Err(e) = summary.append(&report.step_summary()) {
            ctx.output.warn(&format!("{:#}", e));
        }
    }

    Ok(())
}
