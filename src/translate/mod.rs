//! CEL filter → Postgres WHERE predicate
//!
//! Consumes checked expressions (see [`crate::expr`]) and produces a SQL
//! boolean expression over the results/records tables. Translation is a pure
//! function of the checked tree: no I/O, no shared state.

mod coercion;
mod errors;
mod functions;
mod index;
mod interpreter;
mod naming;
mod operators;
mod select;

pub use coercion::{coercion, side_cast, TIMESTAMP_CAST};
pub use errors::{TranslateError, TranslateResult};
pub use interpreter::{translate, Interpreter};
pub use naming::snake_case;
pub use operators::{symbol_for, BinaryOperator};
pub use select::column_prefix;

use crate::expr::ExprCompiler;

/// Compiles `filter` with `compiler` and translates the result.
///
/// Compilation failures surface as [`TranslateError::Compile`].
pub fn convert(compiler: &dyn ExprCompiler, filter: &str) -> TranslateResult<String> {
    let checked = compiler.compile(filter)?;
    translate(&checked)
}
