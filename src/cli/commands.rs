//! CLI command implementations
//!
//! Each command returns the `data` payload of the JSON envelope; [`run`]
//! writes it to stdout.

use std::path::Path;

use serde_json::{json, Value};

use crate::config::ListerConfig;
use crate::expr::CheckedExpr;
use crate::lister::{self, parse_order_by, Clause, Ordering, PageToken, QueryBuilder, Statement};
use crate::observability::{log_event_with_fields, Event, Logger};
use crate::translate;

use super::args::{Command, ResourceKind};
use super::errors::CliResult;
use super::io::{read_input, write_error, write_response};

/// Main entry point for CLI
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    match run_command(cli.command) {
        Ok(data) => write_response(data),
        Err(err) => {
            log_event_with_fields(
                Event::CommandFailed,
                &[("code", err.code_str()), ("message", err.message())],
            );
            write_error(err.code_str(), err.message())?;
            Err(err)
        }
    }
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<Value> {
    match cmd {
        Command::Translate { input } => translate_expr(input.as_deref()),
        Command::EncodeToken { input } => encode_token(input.as_deref()),
        Command::DecodeToken { token } => decode_token(&token),
        Command::OrderBy { expr, kind, config } => order_by(&expr, kind, config.as_deref()),
    }
}

/// Translate a checked expression read as JSON
pub fn translate_expr(input: Option<&Path>) -> CliResult<Value> {
    let content = read_input(input)?;
    let checked: CheckedExpr = serde_json::from_str(&content)?;
    let sql = translate::translate(&checked)?;
    Ok(json!({ "sql": sql }))
}

/// Encode a page token read as JSON
pub fn encode_token(input: Option<&Path>) -> CliResult<Value> {
    let content = read_input(input)?;
    let token: PageToken = serde_json::from_str(&content)?;
    Ok(json!({ "token": lister::encode(&token) }))
}

/// Decode a page token into its JSON form
pub fn decode_token(token: &str) -> CliResult<Value> {
    let token = lister::decode(token.trim())?;
    Ok(serde_json::to_value(token)?)
}

/// Parse an order-by expression and show the ORDER BY it produces
pub fn order_by(expr: &str, kind: ResourceKind, config: Option<&Path>) -> CliResult<Value> {
    let config = match config {
        Some(path) => {
            let config = ListerConfig::load(path)?;
            Logger::set_min_severity(config.severity());
            let shown = path.display().to_string();
            log_event_with_fields(Event::ConfigLoaded, &[("path", shown.as_str())]);
            config
        }
        None => ListerConfig::default(),
    };

    let allowed = match kind {
        ResourceKind::Results => &config.results_order_by,
        ResourceKind::Records => &config.records_order_by,
    };
    let parsed = parse_order_by(expr, allowed)?;
    let statement = Ordering::new(parsed.clone()).build(Statement::new())?;

    Ok(json!({
        "field": parsed.as_ref().map(|o| o.field_name.clone()),
        "column": parsed.as_ref().map(|o| o.column.clone()),
        "direction": parsed.as_ref().map(|o| o.direction.sql()).unwrap_or("ASC"),
        "sql": statement.build(&[Clause::OrderBy]),
    }))
}
