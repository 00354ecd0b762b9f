use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn ogag(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ogag"))
        .current_dir(dir)
        .args(args)
        .env_remove("GITHUB_STEP_SUMMARY")
        .env_remove("PR_NUMBER")
        .env_remove("RUST_LOG")
        .output()
        .expect("run ogag")
}

fn theme() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("assets/__tests__")).unwrap();
    fs::write(dir.path().join("assets/theme.js"), vec![b'x'; 3 * 1024]).unwrap();
    fs::write(dir.path().join("assets/base.css"), vec![b'x'; 1024]).unwrap();
    fs::write(dir.path().join("assets/__tests__/theme.test.js"), vec![b'x'; 8 * 1024]).unwrap();
    dir
}

#[test]
fn budget_prints_a_table() {
    let dir = theme();
    let output = ogag(dir.path(), &["budget"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("TOTAL"));
    assert!(stdout.contains("assets/theme.js"));
    assert!(!stdout.contains("__tests__"));
}

#[test]
fn budget_json_and_step_summary() {
    let dir = theme();
    let summary = dir.path().join("summary.md");
    let output = Command::new(env!("CARGO_BIN_EXE_ogag"))
        .current_dir(dir.path())
        .args(["--json", "budget", "--ci"])
        .env("GITHUB_STEP_SUMMARY", &summary)
        .env_remove("PR_NUMBER")
        .output()
        .expect("run ogag");
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(report["total_bytes"], 4096);
    assert_eq!(report["status"], "within");

    let markdown = fs::read_to_string(summary).unwrap();
    assert!(markdown.starts_with("### 📊 Performance Budget Report"));
}

#[test]
fn governance_with_explicit_files() {
    let dir = tempfile::tempdir().unwrap();
    let summary = dir.path().join("summary.md");
    let output = Command::new(env!("CARGO_BIN_EXE_ogag"))
        .current_dir(dir.path())
        .args(["governance", "--files", "assets/wishlist.js,README.md"])
        .env("GITHUB_STEP_SUMMARY", &summary)
        .output()
        .expect("run ogag");
    assert!(output.status.success());

    let markdown = fs::read_to_string(summary).unwrap();
    assert!(markdown.contains("## 📋 Rules Governance Check"));
    assert!(markdown.contains("- `assets/wishlist.js`"));
    assert!(markdown.contains("**Attention Required:**"));
}

#[test]
fn validate_reviews_rejects_a_bad_feed() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("reviews.json"),
        r#"{"aggregateRating": {"ratingValue": 9, "reviewCount": 0}, "reviews": []}"#,
    )
    .unwrap();

    let output = ogag(dir.path(), &["validate", "reviews", "reviews.json"]);
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("aggregateRating.ratingValue"));
}

#[test]
fn validate_settings_accepts_partial_settings() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("settings.json"), r#"{"reviews": {"per_page": 8}}"#).unwrap();

    let output = ogag(dir.path(), &["validate", "settings", "settings.json"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("reviews.per_page: 8"));
}

#[test]
fn config_init_then_validate() {
    let dir = tempfile::tempdir().unwrap();

    let output = ogag(dir.path(), &["config", "init"]);
    assert!(output.status.success());
    assert!(dir.path().join("ogag.toml").exists());

    // Refuses to overwrite without a terminal to confirm on.
    let output = ogag(dir.path(), &["--json", "config", "init"]);
    assert!(!output.status.success());

    let output = ogag(dir.path(), &["config", "validate"]);
    assert!(output.status.success());
}

#[test]
fn config_validate_reports_errors() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("ogag.toml"), "[budget]\ntotal_kb = 50.0\nwarning_kb = 80.0\n").unwrap();

    let output = ogag(dir.path(), &["config", "validate"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("budget.warning_kb must not exceed budget.total_kb"));
}
