//! Paginated list queries
//!
//! Turns a list request (parent, CEL filter, order-by, page size, page token)
//! into a parameterized SQL statement over the results or records table, and
//! mints the opaque page tokens that resume it.
//!
//! ```ignore
//! let lister = Lister::of_results(&request, &compiler, &config)?;
//! let statement = lister.build_query()?;
//! let sql = statement.sql();
//! let vars = statement.vars();
//! ```

mod errors;
mod filter;
mod offset;
mod order;
mod page_token;
mod query;
mod statement;

pub use errors::{ErrorClass, ListerError, ListerResult};
pub use filter::{EqualityClause, Filter};
pub use offset::Offset;
pub use order::{parse_order_by, OrderBy, Ordering};
pub use page_token::{decode, encode, Direction, Item, Order, PageToken};
pub use query::{Limit, ListRequest, Lister, QueryBuilder, WILDCARD};
pub use statement::{Clause, Predicate, SqlValue, Statement};
