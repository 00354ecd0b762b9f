//! Theme data validation.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context as _, Result};
use ogag_widgets::reviews::{ReviewsDocument, ValidationIssue};
use ogag_widgets::ThemeSettings;

use super::{ValidateArgs, ValidateCommand};
use crate::context::Context;

/// Run the validate command.
pub async fn run(args: ValidateArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ValidateCommand::Reviews { file } => validate_reviews(&ctx.resolve_path(&file), ctx),
        ValidateCommand::Settings { file } => validate_settings(&ctx.resolve_path(&file), ctx),
    }
}

/// Parse and check a reviews feed, returning the problems found.
pub fn check_reviews(path: &Path) -> Result<Vec<ValidationIssue>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read reviews file: {}", path.display()))?;
    let document = ReviewsDocument::from_json(&content)
        .with_context(|| format!("Failed to parse reviews file: {}", path.display()))?;
    tracing::debug!(reviews = document.reviews.len(), "reviews parsed");
    Ok(document.validate())
}

fn validate_reviews(path: &Path, ctx: &Context) -> Result<()> {
    ctx.output.header(&format!("Validating {}", path.display()));
    let issues = check_reviews(path)?;

    if ctx.output.is_json() {
        let issues: Vec<serde_json::Value> = issues
            .iter()
            .map(|issue| serde_json::json!({ "path": issue.path, "message": issue.message }))
            .collect();
        ctx.output.json(&serde_json::json!({
            "file": path.display().to_string(),
            "valid": issues.is_empty(),
            "issues": issues,
        }));
    } else {
        for issue in &issues {
            ctx.output.list_item(&issue.to_string());
        }
    }

    if !issues.is_empty() {
        bail!("Reviews file has {} issue(s)", issues.len());
    }
    ctx.output.success("Reviews file is valid");
    Ok(())
}

fn validate_settings(path: &Path, ctx: &Context) -> Result<()> {
    ctx.output.header(&format!("Validating {}", path.display()));
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
    let settings = ThemeSettings::from_json(&content)
        .with_context(|| format!("Failed to parse settings file: {}", path.display()))?;

    if ctx.output.is_json() {
        ctx.output.json(&settings);
    } else {
        ctx.output.kv("currency", settings.currency.code());
        ctx.output.kv("wishlist.storage_key", &settings.wishlist.storage_key);
        ctx.output.kv("reviews.per_page", &settings.reviews.per_page.to_string());
        ctx.output.kv("quick_view.max_quantity", &settings.quick_view.max_quantity.to_string());
    }
    ctx.output.success("Settings file is valid");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_reviews() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reviews.json");
        fs::write(
            &path,
            r#"{
                "aggregateRating": {"ratingValue": 4.0, "reviewCount": 1},
                "reviews": [
                    {"id": "review-1", "author": {"name": "Amara"}, "reviewRating": {"ratingValue": 4},
                     "reviewBody": "Gorgeous and sturdy.", "datePublished": "2024-03-02"}
                ]
            }"#,
        )
        .unwrap();
        assert!(check_reviews(&path).unwrap().is_empty());

        fs::write(
            &path,
            r#"{
                "aggregateRating": {"ratingValue": 4.0, "reviewCount": 3},
                "reviews": [
                    {"id": "r1", "author": {"name": "Amara"}, "reviewRating": {"ratingValue": 4},
                     "reviewBody": "Gorgeous and sturdy.", "datePublished": "2024-03-02"}
                ]
            }"#,
        )
        .unwrap();
        let issues = check_reviews(&path).unwrap();
        let paths: Vec<&str> = issues.iter().map(|i| i.path.as_str()).collect();
        assert!(paths.contains(&"reviews[0].id"));
        assert!(paths.contains(&"aggregateRating.reviewCount"));
    }

    #[test]
    fn test_check_reviews_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(check_reviews(&missing).is_err());

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        let err = check_reviews(&broken).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse reviews file"));
    }
}
