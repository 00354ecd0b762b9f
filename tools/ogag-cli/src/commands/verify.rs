//! Toolchain verification.
//!
//! Checks Node.js and the Shopify CLI are installed, then runs theme check.
//! Missing tools produce install hints; only `--strict` turns them into a
//! failure.

use std::process::Command;

use anyhow::{bail, Result};

use super::VerifyToolsArgs;
use crate::context::Context;

/// Major version from `node --version` output such as `v20.11.1`.
pub fn parse_node_major(version: &str) -> Option<u32> {
    version
        .trim()
        .trim_start_matches('v')
        .split('.')
        .next()?
        .parse()
        .ok()
}

/// How to install the Shopify CLI on `os` (as in `std::env::consts::OS`).
pub fn install_hints(os: &str, install_url: &str) -> Vec<String> {
    let mut hints = match os {
        "windows" => vec![
            "Install via winget: winget install Shopify.cli".to_string(),
            "Or via npm: npm install -g @shopify/cli@latest".to_string(),
        ],
        "macos" => vec![
            "Install via Homebrew: brew install shopify-cli".to_string(),
            "Or via npm: npm install -g @shopify/cli@latest".to_string(),
        ],
        _ => vec![
            "Install via npm: npm install -g @shopify/cli@latest".to_string(),
            format!("See {}", install_url),
        ],
    };
    hints.push("After installing, run: shopify auth login".to_string());
    hints
}

/// First line of a tool's `--version` style output, or `None` when the tool
/// cannot be run.
fn tool_version(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        tracing::debug!(program, status = %output.status, "version check failed");
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    Some(stdout.lines().next().unwrap_or_default().trim().to_string())
}

/// Run the verify-tools command.
pub async fn run(args: VerifyToolsArgs, ctx: &Context) -> Result<()> {
    let config = &ctx.config.verify;
    ctx.output.header("Verifying toolchain");

    match tool_version("node", &["--version"]) {
        Some(version) => {
            ctx.output.kv("node", &version);
            match parse_node_major(&version) {
                Some(major) if major < config.min_node_major => ctx.output.warn(&format!(
                    "Node.js {} is older than the recommended {}",
                    version, config.min_node_major
                )),
                Some(_) => {}
                None => ctx.output.warn(&format!("Could not parse Node.js version '{}'", version)),
            }
        }
        None => ctx.output.warn("Node.js not found"),
    }

    let shopify = tool_version("shopify", &["version"]);
    match shopify {
        Some(ref version) => ctx.output.kv("shopify", version),
        None => {
            ctx.output.warn("Shopify CLI not found");
            for hint in install_hints(std::env::consts::OS, &config.install_url) {
                ctx.output.list_item(&hint);
            }
        }
    }

    let run_theme_check = config.theme_check && !args.no_theme_check;
    if shopify.is_some() && run_theme_check {
        let spinner = ctx.output.spinner("Running theme check...");
        let output = Command::new("shopify")
            .args(["theme", "check", "--fail-level", "error"])
            .current_dir(&ctx.cwd)
            .output();
        spinner.finish_and_clear();
        match output {
            Ok(output) if output.status.success() => ctx.output.success("Theme check passed"),
            Ok(output) => {
                for line in String::from_utf8_lossy(&output.stdout).lines() {
                    ctx.output.line(line);
                }
                ctx.output.warn(&format!("Theme check reported errors ({})", output.status));
            }
            Err(e) => ctx.output.warn(&format!("Could not run theme check: {}", e)),
        }
    }

    if shopify.is_none() && args.strict {
        bail!("Shopify CLI is required");
    }
    ctx.output.success("Toolchain check complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_node_major() {
        assert_eq!(parse_node_major("v20.11.1\n"), Some(20));
        assert_eq!(parse_node_major("18.0.0"), Some(18));
        assert_eq!(parse_node_major("nightly"), None);
    }

    #[test]
    fn test_install_hints() {
        let url = "https://shopify.dev/docs/themes/tools/cli/install";
        let windows = install_hints("windows", url);
        assert!(windows[0].contains("winget install Shopify.cli"));

        let mac = install_hints("macos", url);
        assert!(mac[0].contains("brew install shopify-cli"));

        let linux = install_hints("linux", url);
        assert!(linux.iter().any(|h| h.contains(url)));
        assert_eq!(linux.last().unwrap(), "After installing, run: shopify auth login");
    }
}
