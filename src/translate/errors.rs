//! Translation error types
//!
//! Error codes:
//! - CEL_UNSUPPORTED_EXPRESSION
//! - CEL_UNRECOGNIZED_FIELD
//! - CEL_MISSING_TYPE
//! - CEL_COMPILE_FAILED
//!
//! Every variant except compilation failures belongs to the "unsupported"
//! category, so callers can tell a filter this translator cannot express
//! apart from a filter the front end rejected.

use thiserror::Error;

use crate::expr::CompileError;

/// Result type for translation
pub type TranslateResult<T> = Result<T, TranslateError>;

/// Failure to turn a checked expression into SQL
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    /// A construct outside the supported grammar
    #[error("unsupported CEL {construct} at line {line}, column {column}")]
    Unsupported {
        construct: String,
        line: usize,
        column: usize,
    },

    /// A select path rooted in something that is neither dyn nor a known
    /// record type
    #[error("unsupported CEL: unrecognized field `{field}` at line {line}, column {column}")]
    UnrecognizedField {
        field: String,
        line: usize,
        column: usize,
    },

    /// The checker left no type for a node the translator needs to coerce
    #[error("unsupported CEL: missing type information for expression {id}")]
    MissingType { id: i64 },

    /// The front end rejected the filter text
    #[error("error compiling CEL filters: {0}")]
    Compile(#[from] CompileError),
}

impl TranslateError {
    /// Returns the error code string
    pub fn code(&self) -> &'static str {
        match self {
            TranslateError::Unsupported { .. } => "CEL_UNSUPPORTED_EXPRESSION",
            TranslateError::UnrecognizedField { .. } => "CEL_UNRECOGNIZED_FIELD",
            TranslateError::MissingType { .. } => "CEL_MISSING_TYPE",
            TranslateError::Compile(_) => "CEL_COMPILE_FAILED",
        }
    }

    /// Returns true if the filter is valid CEL that has no SQL rendering
    pub fn is_unsupported(&self) -> bool {
        !matches!(self, TranslateError::Compile(_))
    }

    /// Returns the 1-based (line, column) if the error points into the source
    pub fn location(&self) -> Option<(usize, usize)> {
        match self {
            TranslateError::Unsupported { line, column, .. }
            | TranslateError::UnrecognizedField { line, column, .. } => Some((*line, *column)),
            _ => None,
        }
    }
}
