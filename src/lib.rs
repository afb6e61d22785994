//! cel2pg - CEL list filters as Postgres predicates
//!
//! Translates type-checked CEL filter expressions into SQL and builds the
//! paginated list queries that use them.

pub mod cli;
pub mod config;
pub mod expr;
pub mod lister;
pub mod observability;
pub mod translate;
