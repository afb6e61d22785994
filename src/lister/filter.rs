//! WHERE stage: fixed equality clauses plus the client's CEL filter

use crate::expr::ExprCompiler;
use crate::translate;

use super::errors::{ListerError, ListerResult};
use super::query::QueryBuilder;
use super::page_token::PageToken;
use super::statement::{SqlValue, Statement};

/// `column = ?` bound to `value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EqualityClause {
    pub column: String,
    pub value: SqlValue,
}

pub struct Filter<'c> {
    compiler: &'c dyn ExprCompiler,
    expr: String,
    equality: Vec<EqualityClause>,
}

impl<'c> Filter<'c> {
    pub fn new(compiler: &'c dyn ExprCompiler, expr: impl Into<String>) -> Self {
        Self {
            compiler,
            expr: expr.into(),
            equality: Vec::new(),
        }
    }

    /// Adds an equality clause, rendered before the CEL filter
    pub fn with_equality(mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.equality.push(EqualityClause {
            column: column.into(),
            value: value.into(),
        });
        self
    }
}

impl QueryBuilder for Filter<'_> {
    fn validate_token(&self, token: &PageToken) -> ListerResult<()> {
        if self.expr.trim() != token.filter.trim() {
            return Err(ListerError::InvalidPageToken(
                "the filter in the token differs from the filter used in the previous query".into(),
            ));
        }
        Ok(())
    }

    fn build(&self, mut statement: Statement) -> ListerResult<Statement> {
        for clause in &self.equality {
            statement = statement.where_clause(
                format!("{} = ?", clause.column),
                vec![clause.value.clone()],
            );
        }

        let expr = self.expr.trim();
        if !expr.is_empty() {
            let sql = translate::convert(self.compiler, expr)?;
            statement = statement.where_clause(sql, Vec::new());
        }
        Ok(statement)
    }
}
