//! Lister error types
//!
//! Error codes:
//! - LIST_INVALID_PAGE_TOKEN
//! - LIST_INVALID_ORDER_BY
//! - LIST_UNKNOWN_ORDER_BY_FIELD
//! - LIST_INVALID_FILTER
//! - LIST_INVALID_PAGE_SIZE
//! - LIST_INVALID_PARENT
//! - LIST_TOKEN_DECODE_FAILED
//! - LIST_MISSING_ORDER_VALUE
//!
//! Every lister error is caused by the request, so all of them classify as
//! invalid arguments.

use std::fmt;

use thiserror::Error;

use crate::translate::TranslateError;

/// Result type for lister operations
pub type ListerResult<T> = Result<T, ListerError>;

/// Status class reported to the caller of a list RPC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    InvalidArgument,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorClass::InvalidArgument => write!(f, "INVALID_ARGUMENT"),
        }
    }
}

/// Failure to turn a list request into a query
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListerError {
    /// The page token does not belong to this query
    #[error("invalid page token: {0}")]
    InvalidPageToken(String),

    #[error("invalid order by statement")]
    InvalidOrderBy,

    #[error("{0}: field is unknown or cannot be used in the order by clause")]
    UnknownOrderByField(String),

    #[error("{0}")]
    InvalidFilter(#[from] TranslateError),

    #[error("invalid page size {0}: must not be negative")]
    InvalidPageSize(i32),

    #[error("invalid parent `{0}`")]
    InvalidParent(String),

    /// The page token text is not a token this crate produced
    #[error("invalid page token: {0}")]
    Decode(String),

    /// An ordered page ended on an item with no value in the order column
    #[error("{0}: the last item has no value for the order by field")]
    MissingOrderValue(String),
}

impl ListerError {
    /// Returns the error code string
    pub fn code(&self) -> &'static str {
        match self {
            ListerError::InvalidPageToken(_) => "LIST_INVALID_PAGE_TOKEN",
            ListerError::InvalidOrderBy => "LIST_INVALID_ORDER_BY",
            ListerError::UnknownOrderByField(_) => "LIST_UNKNOWN_ORDER_BY_FIELD",
            ListerError::InvalidFilter(_) => "LIST_INVALID_FILTER",
            ListerError::InvalidPageSize(_) => "LIST_INVALID_PAGE_SIZE",
            ListerError::InvalidParent(_) => "LIST_INVALID_PARENT",
            ListerError::Decode(_) => "LIST_TOKEN_DECODE_FAILED",
            ListerError::MissingOrderValue(_) => "LIST_MISSING_ORDER_VALUE",
        }
    }

    /// Returns the status class for this error
    pub fn class(&self) -> ErrorClass {
        ErrorClass::InvalidArgument
    }

    pub(crate) fn decode(reason: impl Into<String>) -> Self {
        ListerError::Decode(reason.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            ListerError::InvalidOrderBy.to_string(),
            "invalid order by statement"
        );
        assert_eq!(
            ListerError::UnknownOrderByField("name".into()).to_string(),
            "name: field is unknown or cannot be used in the order by clause"
        );
        let err = ListerError::InvalidPageToken(
            "the filter in the token differs from the filter used in the previous query".into(),
        );
        assert!(err.to_string().starts_with("invalid page token"));
    }

    #[test]
    fn test_every_error_is_invalid_argument() {
        let errors = [
            ListerError::InvalidPageToken("x".into()),
            ListerError::InvalidOrderBy,
            ListerError::UnknownOrderByField("x".into()),
            ListerError::InvalidFilter(TranslateError::MissingType { id: 1 }),
            ListerError::InvalidPageSize(-1),
            ListerError::InvalidParent("x".into()),
            ListerError::Decode("x".into()),
            ListerError::MissingOrderValue("x".into()),
        ];
        for err in errors {
            assert_eq!(err.class(), ErrorClass::InvalidArgument);
            assert!(err.code().starts_with("LIST_"));
        }
        assert_eq!(ErrorClass::InvalidArgument.to_string(), "INVALID_ARGUMENT");
    }
}
