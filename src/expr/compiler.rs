//! Seam to the external CEL front end
//!
//! Parsing and type-checking live outside this crate. Anything that turns
//! filter text into a [`CheckedExpr`] implements [`ExprCompiler`].

use std::collections::HashMap;

use thiserror::Error;

use super::builder::ExprBuilder;
use super::checked::CheckedExpr;
use super::env::Environment;

/// Result type for compilation
pub type CompileResult<T> = Result<T, CompileError>;

/// Compilation failures reported by the front end
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("type error: {0}")]
    Type(String),

    #[error("undeclared filter: {0}")]
    UnknownFilter(String),
}

/// Parses and type-checks filter text
pub trait ExprCompiler {
    fn compile(&self, source: &str) -> CompileResult<CheckedExpr>;
}

/// Compiler backed by filters checked ahead of time.
///
/// Lookups are keyed by the trimmed source text.
#[derive(Debug, Clone)]
pub struct FilterCatalog {
    env: Environment,
    filters: HashMap<String, CheckedExpr>,
}

impl FilterCatalog {
    /// Creates an empty catalog over `env`
    pub fn new(env: Environment) -> Self {
        Self {
            env,
            filters: HashMap::new(),
        }
    }

    /// Registers a filter built with an [`ExprBuilder`] bound to this
    /// catalog's environment
    pub fn register<F>(&mut self, source: &str, build: F) -> &mut Self
    where
        F: FnOnce(&ExprBuilder<'_>) -> crate::expr::Expr,
    {
        let builder = ExprBuilder::new(&self.env).with_source(source);
        let root = build(&builder);
        let checked = builder.build(root);
        self.filters.insert(source.trim().to_string(), checked);
        self
    }

    /// Registers an already checked filter
    pub fn insert(&mut self, source: &str, checked: CheckedExpr) -> &mut Self {
        self.filters.insert(source.trim().to_string(), checked);
        self
    }

    /// Number of registered filters
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl ExprCompiler for FilterCatalog {
    fn compile(&self, source: &str) -> CompileResult<CheckedExpr> {
        self.filters
            .get(source.trim())
            .cloned()
            .ok_or_else(|| CompileError::UnknownFilter(source.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_lookup_is_trimmed() {
        let mut catalog = FilterCatalog::new(Environment::records());
        catalog.register(r#"name == "foo""#, |b| b.eq(b.ident("name"), b.string("foo")));

        assert_eq!(catalog.len(), 1);
        assert!(catalog.compile(r#"  name == "foo"  "#).is_ok());
    }

    #[test]
    fn test_catalog_unknown_filter() {
        let catalog = FilterCatalog::new(Environment::records());
        let err = catalog.compile("name == \"bar\"").unwrap_err();
        assert_eq!(err, CompileError::UnknownFilter("name == \"bar\"".into()));
    }
}
