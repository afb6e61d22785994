//! SQL statement assembled by the query builder stages
//!
//! Stages append predicates, order terms and a limit; [`Statement::build`]
//! renders the requested clauses with `?` placeholders. Bound values are
//! returned separately by [`Statement::vars`], in placeholder order.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A value bound to a `?` placeholder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Text(String),
    Int(i64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Text(s.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        SqlValue::Text(s)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(ts: DateTime<Utc>) -> Self {
        SqlValue::Timestamp(ts)
    }
}

/// One WHERE predicate and the values bound to its placeholders
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Predicate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// Clause selector for [`Statement::build`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clause {
    Where,
    OrderBy,
    Limit,
}

/// Accumulated query clauses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Statement {
    predicates: Vec<Predicate>,
    order_by: Vec<String>,
    limit: Option<usize>,
}

impl Statement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a WHERE predicate
    pub fn where_clause(mut self, sql: impl Into<String>, values: Vec<SqlValue>) -> Self {
        self.predicates.push(Predicate {
            sql: sql.into(),
            values,
        });
        self
    }

    /// Appends an ORDER BY term such as `created_time DESC`
    pub fn order(mut self, term: impl Into<String>) -> Self {
        self.order_by.push(term.into());
        self
    }

    /// Sets the row limit, replacing any earlier one
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn order_terms(&self) -> &[String] {
        &self.order_by
    }

    pub fn limit_value(&self) -> Option<usize> {
        self.limit
    }

    /// Bound values in placeholder order
    pub fn vars(&self) -> Vec<SqlValue> {
        self.predicates
            .iter()
            .flat_map(|p| p.values.iter().cloned())
            .collect()
    }

    /// Renders the selected clauses, skipping empty ones.
    ///
    /// With more than one predicate, a predicate that contains a top-level
    /// looking `AND`/`OR` is wrapped in parentheses.
    pub fn build(&self, clauses: &[Clause]) -> String {
        let mut parts = Vec::with_capacity(clauses.len());

        for clause in clauses {
            match clause {
                Clause::Where if !self.predicates.is_empty() => {
                    let wrap = self.predicates.len() > 1;
                    let rendered: Vec<String> = self
                        .predicates
                        .iter()
                        .map(|p| {
                            if wrap && needs_parentheses(&p.sql) {
                                format!("({})", p.sql)
                            } else {
                                p.sql.clone()
                            }
                        })
                        .collect();
                    parts.push(format!("WHERE {}", rendered.join(" AND ")));
                }
                Clause::OrderBy if !self.order_by.is_empty() => {
                    parts.push(format!("ORDER BY {}", self.order_by.join(",")));
                }
                Clause::Limit => {
                    if let Some(limit) = self.limit {
                        parts.push(format!("LIMIT {}", limit));
                    }
                }
                _ => {}
            }
        }

        parts.join(" ")
    }

    /// Renders every clause
    pub fn sql(&self) -> String {
        self.build(&[Clause::Where, Clause::OrderBy, Clause::Limit])
    }
}

fn needs_parentheses(sql: &str) -> bool {
    let upper = sql.to_ascii_uppercase();
    upper.contains(" AND ") || upper.contains(" OR ")
}
