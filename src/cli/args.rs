//! CLI argument definitions using clap
//!
//! Commands:
//! - cel2pg translate [--input <path>]
//! - cel2pg encode-token [--input <path>]
//! - cel2pg decode-token <token>
//! - cel2pg order-by <expr> [--kind results|records] [--config <path>]
//!
//! Inputs read from `--input` default to stdin.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// cel2pg - CEL filters to Postgres predicates, plus list pagination tools
#[derive(Parser, Debug)]
#[command(name = "cel2pg")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Listable resource kind
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Results,
    Records,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Translate a checked expression (JSON) into a SQL predicate
    Translate {
        /// File holding the checked expression
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Encode a page token given as JSON
    EncodeToken {
        /// File holding the token JSON
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Decode a page token into JSON
    DecodeToken {
        /// Encoded token
        token: String,
    },

    /// Parse an order-by expression against the allow-list
    OrderBy {
        /// Order-by text, e.g. "create_time desc"
        expr: String,

        #[arg(long, value_enum, default_value = "results")]
        kind: ResourceKind,

        /// Path to lister configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
