//! Configuration and CLI command tests
//!
//! Exercises the lister configuration file and the command functions behind
//! the `cel2pg` binary, using temp files for every input.

use std::fs;
use std::path::PathBuf;

use cel2pg::cli::{self, Command, ResourceKind};
use cel2pg::config::{ConfigError, ListerConfig};
use cel2pg::expr::{Environment, ExprBuilder};
use serde_json::json;
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_partial_config_keeps_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "lister.json", r#"{"default_page_size": 25}"#);

    let config = ListerConfig::load(&path).unwrap();
    assert_eq!(config.default_page_size, 25);
    assert_eq!(config.max_page_size, 10000);
    assert_eq!(config.results_order_by, ListerConfig::default().results_order_by);
}

#[test]
fn test_invalid_config_is_rejected() {
    let dir = TempDir::new().unwrap();

    let path = write_file(&dir, "sizes.json", r#"{"default_page_size": 200, "max_page_size": 100}"#);
    assert!(matches!(
        ListerConfig::load(&path),
        Err(ConfigError::Invalid(_))
    ));

    let path = write_file(
        &dir,
        "columns.json",
        r#"{"records_order_by": {"name": "name; DROP TABLE records"}}"#,
    );
    let err = ListerConfig::load(&path).unwrap_err();
    assert!(err.to_string().contains("not a plain column name"));

    let path = write_file(&dir, "broken.json", "{");
    assert!(matches!(ListerConfig::load(&path), Err(ConfigError::Parse(_))));

    let missing = dir.path().join("missing.json");
    assert!(matches!(ListerConfig::load(&missing), Err(ConfigError::Read(_))));
}

// =============================================================================
// Commands
// =============================================================================

#[test]
fn test_translate_command() {
    let env = Environment::results();
    let b = ExprBuilder::new(&env);
    let root = b.eq(b.select(b.ident("summary"), "type"), b.ident("TASK_RUN"));
    let checked = b.build(root);

    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "expr.json", &serde_json::to_string(&checked).unwrap());

    let data = cli::run_command(Command::Translate { input: Some(path) }).unwrap();
    assert_eq!(data, json!({ "sql": "recordsummary_type = 'tekton.dev/v1beta1.TaskRun'" }));
}

#[test]
fn test_translate_command_reports_unsupported() {
    let env = Environment::records();
    let b = ExprBuilder::new(&env);
    let root = b.member(b.ident("name"), "size", vec![]);
    let checked = b.build(root);

    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "expr.json", &serde_json::to_string(&checked).unwrap());

    let err = cli::run_command(Command::Translate { input: Some(path) }).unwrap_err();
    assert_eq!(err.code_str(), "CEL2PG_CLI_TRANSLATE_FAILED");
    assert!(err.message().contains("CEL_UNSUPPORTED_EXPRESSION"));
}

#[test]
fn test_token_commands() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "token.json",
        &json!({ "parent": "foo", "filter": "", "last_item": { "id": "7" } }).to_string(),
    );

    let encoded = cli::run_command(Command::EncodeToken { input: Some(path) }).unwrap();
    let token = encoded["token"].as_str().unwrap().to_string();

    let decoded = cli::run_command(Command::DecodeToken { token }).unwrap();
    assert_eq!(
        decoded,
        json!({ "parent": "foo", "filter": "", "last_item": { "id": "7", "order_by": null } })
    );
}

#[test]
fn test_order_by_command_with_config() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "lister.json",
        &json!({ "results_order_by": { "summary.end_time": "recordsummary_end_time" } }).to_string(),
    );

    let data = cli::run_command(Command::OrderBy {
        expr: "summary.end_time DESC".into(),
        kind: ResourceKind::Results,
        config: Some(path.clone()),
    })
    .unwrap();
    assert_eq!(data["field"], "summary.end_time");
    assert_eq!(data["sql"], "ORDER BY recordsummary_end_time DESC,id DESC");

    let err = cli::run_command(Command::OrderBy {
        expr: "create_time".into(),
        kind: ResourceKind::Results,
        config: Some(path),
    })
    .unwrap_err();
    assert!(err.message().contains("LIST_UNKNOWN_ORDER_BY_FIELD"));
}
