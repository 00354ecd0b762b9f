//! CLI configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Config file names searched from the working directory upwards.
pub const CONFIG_NAMES: [&str; 3] = ["ogag.toml", ".ogag.toml", "ogag.json"];

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Bundle-size budget.
    #[serde(default)]
    pub budget: BudgetConfig,

    /// Rules governance.
    #[serde(default)]
    pub governance: GovernanceConfig,

    /// Toolchain verification.
    #[serde(default)]
    pub verify: VerifyConfig,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }

    /// Problems that make the configuration unusable, then advisories.
    pub fn check(&self) -> (Vec<String>, Vec<String>) {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if self.budget.total_kb <= 0.0 {
            errors.push("budget.total_kb must be positive".to_string());
        }
        if self.budget.warning_kb > self.budget.total_kb {
            errors.push("budget.warning_kb must not exceed budget.total_kb".to_string());
        }
        if self.budget.extensions.is_empty() {
            warnings.push("budget.extensions is empty; no assets will be counted".to_string());
        }
        if self.governance.files.is_empty() {
            warnings.push("governance.files is empty; governance checks always pass".to_string());
        }
        if self.governance.base_ref.trim().is_empty() {
            errors.push("governance.base_ref is required".to_string());
        }
        if self.verify.min_node_major == 0 {
            warnings.push("verify.min_node_major of 0 disables the Node version check".to_string());
        }

        (errors, warnings)
    }
}

/// Bundle-size budget configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    /// Directory scanned recursively.
    pub assets_dir: String,
    /// File extensions counted.
    pub extensions: Vec<String>,
    /// Paths containing any of these are skipped.
    pub exclude: Vec<String>,
    /// Total budget in KB.
    pub total_kb: f64,
    /// Warning threshold in KB.
    pub warning_kb: f64,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            assets_dir: "assets".to_string(),
            extensions: vec!["js".to_string(), "css".to_string()],
            exclude: vec!["__tests__".to_string(), "test-runner.html".to_string()],
            total_kb: 100.0,
            warning_kb: 80.0,
        }
    }
}

/// Rules governance configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernanceConfig {
    /// Ref the branch is compared against.
    pub base_ref: String,
    /// Path prefixes whose changes call for a rules review.
    pub triggers: Vec<String>,
    /// Files expected to change when a trigger fires.
    pub files: Vec<String>,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            base_ref: "origin/main".to_string(),
            triggers: [
                ".cursorrules",
                "assets/",
                ".github/workflows/",
                "scripts/",
                "config/settings_schema.json",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            files: vec![".cursorrules".to_string(), "docs/rules-changelog.md".to_string()],
        }
    }
}

/// Toolchain verification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    /// Lowest recommended Node.js major version.
    pub min_node_major: u32,
    /// Run `shopify theme check` when the CLI is present.
    pub theme_check: bool,
    /// Documentation link shown with install hints.
    pub install_url: String,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            min_node_major: 20,
            theme_check: true,
            install_url: "https://shopify.dev/docs/themes/tools/cli/install".to_string(),
        }
    }
}

/// Generate a default ogag.toml config file.
pub fn generate_default_config() -> String {
    r#"# Of Gold and Grace theme tooling

[budget]
assets_dir = "assets"
extensions = ["js", "css"]
exclude = ["__tests__", "test-runner.html"]
total_kb = 100.0
warning_kb = 80.0

[governance]
base_ref = "origin/main"
triggers = [".cursorrules", "assets/", ".github/workflows/", "scripts/", "config/settings_schema.json"]
files = [".cursorrules", "docs/rules-changelog.md"]

[verify]
min_node_major = 20
theme_check = true
"#
    .to_string()
}
