//! Lister configuration
//!
//! Loaded from a JSON file. Every field is optional; missing fields take the
//! defaults below.
//!
//! ```json
//! {
//!   "default_page_size": 50,
//!   "max_page_size": 10000,
//!   "log_level": "info",
//!   "results_order_by": { "create_time": "created_time" },
//!   "records_order_by": { "create_time": "created_time" }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::Severity;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Read(_) => "CONFIG_READ_FAILED",
            ConfigError::Parse(_) => "CONFIG_PARSE_FAILED",
            ConfigError::Invalid(_) => "CONFIG_INVALID",
        }
    }
}

/// Settings for building list queries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListerConfig {
    /// Page size used when a request asks for 0 items
    #[serde(default = "default_page_size")]
    pub default_page_size: i32,

    /// Upper bound for requested page sizes
    #[serde(default = "default_max_page_size")]
    pub max_page_size: i32,

    /// Minimum log severity (trace, info, warn, error, fatal)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// order_by field → column for results
    #[serde(default = "default_results_order_by")]
    pub results_order_by: BTreeMap<String, String>,

    /// order_by field → column for records
    #[serde(default = "default_records_order_by")]
    pub records_order_by: BTreeMap<String, String>,
}

fn default_page_size() -> i32 {
    50
}

fn default_max_page_size() -> i32 {
    10000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn time_columns() -> BTreeMap<String, String> {
    [
        // legacy names
        ("created_time", "created_time"),
        ("updated_time", "updated_time"),
        ("create_time", "created_time"),
        ("update_time", "updated_time"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn default_results_order_by() -> BTreeMap<String, String> {
    let mut fields = time_columns();
    fields.insert("summary.start_time".into(), "recordsummary_start_time".into());
    fields.insert("summary.end_time".into(), "recordsummary_end_time".into());
    fields
}

fn default_records_order_by() -> BTreeMap<String, String> {
    time_columns()
}

impl Default for ListerConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            log_level: default_log_level(),
            results_order_by: default_results_order_by(),
            records_order_by: default_records_order_by(),
        }
    }
}

impl ListerConfig {
    /// Load and validate configuration from a file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: ListerConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_page_size <= 0 {
            return Err(ConfigError::Invalid("max_page_size must be > 0".into()));
        }
        if self.default_page_size <= 0 || self.default_page_size > self.max_page_size {
            return Err(ConfigError::Invalid(format!(
                "default_page_size must be in 1..={}, got {}",
                self.max_page_size, self.default_page_size
            )));
        }
        if Severity::parse(&self.log_level).is_none() {
            return Err(ConfigError::Invalid(format!(
                "unknown log_level '{}'",
                self.log_level
            )));
        }

        for (kind, fields) in [
            ("results_order_by", &self.results_order_by),
            ("records_order_by", &self.records_order_by),
        ] {
            if let Some((field, _)) = fields.iter().find(|(_, column)| !is_column_name(column)) {
                return Err(ConfigError::Invalid(format!(
                    "{}: column for `{}` is not a plain column name",
                    kind, field
                )));
            }
        }

        Ok(())
    }

    /// Parsed minimum log severity
    pub fn severity(&self) -> Severity {
        Severity::parse(&self.log_level).unwrap_or(Severity::Info)
    }
}

/// Columns end up in ORDER BY and keyset predicates unquoted
fn is_column_name(s: &str) -> bool {
    !s.is_empty()
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !s.starts_with(|c: char| c.is_ascii_digit())
}
