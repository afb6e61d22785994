//! CLI module for cel2pg
//!
//! Provides command-line access to:
//! - translate: checked expression JSON → SQL predicate
//! - encode-token / decode-token: page token codec
//! - order-by: order-by parsing against the allow-list

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, ResourceKind};
pub use commands::{decode_token, encode_token, order_by, run, run_command, translate_expr};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_input, write_error, write_response};
