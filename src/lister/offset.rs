//! Keyset offset stage
//!
//! Resumes after the last item of the previous page. With an order column
//! the comparison is on the `(column, id)` tuple so ties on the column are
//! broken by id; without one only the id is compared.

use super::errors::{ListerError, ListerResult};
use super::query::QueryBuilder;
use super::order::OrderBy;
use super::page_token::{Direction, Item, PageToken};
use super::statement::{SqlValue, Statement};

#[derive(Debug, Clone, Default)]
pub struct Offset {
    order_by: Option<OrderBy>,
    last_item: Option<Item>,
}

impl Offset {
    pub fn new(order_by: Option<OrderBy>, last_item: Option<Item>) -> Self {
        Self {
            order_by,
            last_item,
        }
    }
}

impl QueryBuilder for Offset {
    fn validate_token(&self, token: &PageToken) -> ListerResult<()> {
        let token_order = token.last_item.as_ref().and_then(|item| item.order_by.as_ref());
        let consistent = match (token_order, &self.order_by) {
            (None, None) => true,
            (Some(token_order), Some(order_by)) => {
                token_order.field_name == order_by.field_name
                    && token_order.direction == order_by.direction
            }
            // a token minted before the first page carries no item yet
            (None, Some(_)) => token.last_item.is_none(),
            (Some(_), None) => false,
        };

        if consistent {
            Ok(())
        } else {
            Err(ListerError::InvalidPageToken(
                "the order in the token differs from the order used in the previous query".into(),
            ))
        }
    }

    fn build(&self, statement: Statement) -> ListerResult<Statement> {
        let Some(item) = &self.last_item else {
            return Ok(statement);
        };

        let statement = match (&item.order_by, &self.order_by) {
            (Some(order), Some(order_by)) => {
                let operator = match order.direction {
                    Direction::Ascending => ">",
                    Direction::Descending => "<",
                };
                statement.where_clause(
                    format!("({}, id) {} (?, ?)", order_by.column, operator),
                    vec![SqlValue::Timestamp(order.value), SqlValue::from(item.id.as_str())],
                )
            }
            _ => statement.where_clause("id > ?", vec![SqlValue::from(item.id.as_str())]),
        };
        Ok(statement)
    }
}
