//! ORDER BY stage
//!
//! Client order-by text is `<field> [ASC|DESC]`. The field must be on the
//! resource kind's allow-list, which maps it to a column. Results are always
//! ordered by `id` last so pages are stable.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use super::errors::{ListerError, ListerResult};
use super::query::QueryBuilder;
use super::page_token::Direction;
use super::statement::Statement;

/// A parsed, allow-listed order-by request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// Field name as the client wrote it
    pub field_name: String,
    /// Column the field maps to
    pub column: String,
    pub direction: Direction,
}

fn order_by_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^([A-Za-z0-9_.]+)\s*(ASC|asc|DESC|desc)?$").ok())
        .as_ref()
}

/// Parses client order-by text against `allowed` (field → column).
///
/// Blank input means "no explicit order".
pub fn parse_order_by(
    input: &str,
    allowed: &BTreeMap<String, String>,
) -> ListerResult<Option<OrderBy>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }

    let captures = order_by_pattern()
        .and_then(|re| re.captures(input))
        .ok_or(ListerError::InvalidOrderBy)?;

    let field_name = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
    let column = allowed
        .get(field_name)
        .ok_or_else(|| ListerError::UnknownOrderByField(field_name.to_string()))?;

    let direction = captures
        .get(2)
        .and_then(|m| Direction::from_sql(m.as_str()))
        .unwrap_or(Direction::Ascending);

    Ok(Some(OrderBy {
        field_name: field_name.to_string(),
        column: column.clone(),
        direction,
    }))
}

/// Appends `<column> <dir>` (if any) and `id <dir>`
#[derive(Debug, Clone, Default)]
pub struct Ordering {
    order_by: Option<OrderBy>,
}

impl Ordering {
    pub fn new(order_by: Option<OrderBy>) -> Self {
        Self { order_by }
    }
}

impl QueryBuilder for Ordering {
    fn build(&self, statement: Statement) -> ListerResult<Statement> {
        let (statement, direction) = match &self.order_by {
            Some(order) => (
                statement.order(format!("{} {}", order.column, order.direction.sql())),
                order.direction,
            ),
            None => (statement, Direction::Ascending),
        };
        Ok(statement.order(format!("id {}", direction.sql())))
    }
}
