//! List query assembly
//!
//! A [`Lister`] is a fixed sequence of [`QueryBuilder`] stages. Building a
//! query first checks the page token against every stage, then lets each
//! stage extend the statement in order. The canonical sequence for a list
//! request is offset, filter, order, limit.

use chrono::{DateTime, Utc};

use crate::config::ListerConfig;
use crate::expr::ExprCompiler;
use crate::observability::{log_event_with_fields, Event};

use super::errors::{ListerError, ListerResult};
use super::filter::Filter;
use super::offset::Offset;
use super::order::{parse_order_by, OrderBy, Ordering};
use super::page_token::{self, Item, Order, PageToken};
use super::statement::Statement;

/// Parent value meaning "any"
pub const WILDCARD: &str = "-";

/// One step of query assembly
pub trait QueryBuilder {
    /// Checks that `token` was minted for a query this stage would build
    fn validate_token(&self, _token: &PageToken) -> ListerResult<()> {
        Ok(())
    }

    /// Extends `statement`
    fn build(&self, statement: Statement) -> ListerResult<Statement>;
}

/// `LIMIT n`
#[derive(Debug, Clone, Copy)]
pub struct Limit(pub usize);

impl QueryBuilder for Limit {
    fn build(&self, statement: Statement) -> ListerResult<Statement> {
        Ok(statement.limit(self.0))
    }
}

/// Client list request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRequest {
    pub parent: String,
    pub filter: String,
    pub order_by: String,
    pub page_size: i32,
    pub page_token: String,
}

pub struct Lister<'a> {
    builders: Vec<Box<dyn QueryBuilder + 'a>>,
    page_token: Option<PageToken>,
    parent: String,
    filter: String,
    order_by: Option<OrderBy>,
    page_size: usize,
}

impl<'a> Lister<'a> {
    /// Lister over explicit stages
    pub fn new(builders: Vec<Box<dyn QueryBuilder + 'a>>, page_token: Option<PageToken>) -> Self {
        Self {
            builders,
            page_token,
            parent: String::new(),
            filter: String::new(),
            order_by: None,
            page_size: 0,
        }
    }

    /// Lister for a results request. `parent` scopes to one parent unless it
    /// is `-`.
    pub fn of_results(
        request: &ListRequest,
        compiler: &'a dyn ExprCompiler,
        config: &ListerConfig,
    ) -> ListerResult<Self> {
        let mut equality = Vec::new();
        if request.parent != WILDCARD {
            equality.push(("parent", request.parent.clone()));
        }
        Self::assemble(request, compiler, config, &config.results_order_by, equality)
    }

    /// Lister for a records request. `parent` must be
    /// `<parent>/results/<result>`; either part may be `-`.
    pub fn of_records(
        request: &ListRequest,
        compiler: &'a dyn ExprCompiler,
        config: &ListerConfig,
    ) -> ListerResult<Self> {
        let (parent, result) = split_result_name(&request.parent)?;

        let mut equality = Vec::new();
        if parent != WILDCARD {
            equality.push(("parent", parent.to_string()));
        }
        if result != WILDCARD {
            equality.push(("result_name", result.to_string()));
        }
        Self::assemble(request, compiler, config, &config.records_order_by, equality)
    }

    fn assemble(
        request: &ListRequest,
        compiler: &'a dyn ExprCompiler,
        config: &ListerConfig,
        allowed: &std::collections::BTreeMap<String, String>,
        equality: Vec<(&str, String)>,
    ) -> ListerResult<Self> {
        let page_size = page_size(request.page_size, config)?;
        let page_token = match request.page_token.trim() {
            "" => None,
            token => Some(page_token::decode(token)?),
        };
        let order_by = parse_order_by(&request.order_by, allowed)?;

        let last_item = page_token.as_ref().and_then(|t| t.last_item.clone());
        let mut filter = Filter::new(compiler, request.filter.clone());
        for (column, value) in equality {
            filter = filter.with_equality(column, value);
        }

        let builders: Vec<Box<dyn QueryBuilder + 'a>> = vec![
            Box::new(Offset::new(order_by.clone(), last_item)),
            Box::new(filter),
            Box::new(Ordering::new(order_by.clone())),
            Box::new(Limit(page_size + 1)),
        ];

        Ok(Self {
            builders,
            page_token,
            parent: request.parent.clone(),
            filter: request.filter.clone(),
            order_by,
            page_size,
        })
    }

    /// Effective page size; the query fetches one extra row
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Validates the page token against every stage, then builds the
    /// statement stage by stage.
    pub fn build_query(&self) -> ListerResult<Statement> {
        if let Some(token) = &self.page_token {
            for builder in &self.builders {
                if let Err(err) = builder.validate_token(token) {
                    let reason = err.to_string();
                    log_event_with_fields(Event::PageTokenRejected, &[("reason", reason.as_str())]);
                    return Err(err);
                }
            }
        }

        let mut statement = Statement::new();
        for builder in &self.builders {
            statement = builder.build(statement)?;
        }

        let stages = self.builders.len().to_string();
        let predicates = statement.predicates().len().to_string();
        log_event_with_fields(
            Event::ListQueryBuilt,
            &[("stages", stages.as_str()), ("predicates", predicates.as_str())],
        );

        Ok(statement)
    }

    /// Cursor that resumes after the item with `id`. `order_value` is the
    /// item's order column value; it is ignored without an order-by and
    /// required with one.
    pub fn next_page_token(
        &self,
        id: &str,
        order_value: Option<DateTime<Utc>>,
    ) -> ListerResult<PageToken> {
        let order_by = match (&self.order_by, order_value) {
            (Some(order_by), Some(value)) => Some(Order {
                field_name: order_by.field_name.clone(),
                value,
                direction: order_by.direction,
            }),
            (Some(order_by), None) => {
                return Err(ListerError::MissingOrderValue(order_by.field_name.clone()))
            }
            (None, _) => None,
        };

        Ok(PageToken {
            parent: self.parent.clone(),
            filter: self.filter.clone(),
            last_item: Some(Item {
                id: id.to_string(),
                order_by,
            }),
        })
    }
}

/// Normalizes a requested page size
fn page_size(requested: i32, config: &ListerConfig) -> ListerResult<usize> {
    let size = match requested {
        n if n < 0 => return Err(ListerError::InvalidPageSize(n)),
        0 => config.default_page_size,
        n => n.min(config.max_page_size),
    };
    Ok(size as usize)
}

/// Splits `<parent>/results/<result>`
fn split_result_name(name: &str) -> ListerResult<(&str, &str)> {
    match name.split_once("/results/") {
        Some((parent, result))
            if !parent.is_empty() && !result.is_empty() && !result.contains('/') =>
        {
            Ok((parent, result))
        }
        _ => Err(ListerError::InvalidParent(name.to_string())),
    }
}
