//! Checked CEL expressions
//!
//! Data model consumed by the translator: the node tree, the checker's type
//! and reference maps, source positions, and the declarations the front end
//! is configured with.

mod ast;
mod builder;
mod checked;
mod compiler;
mod env;
pub mod symbols;
mod types;

pub use ast::{Constant, Expr, ExprKind};
pub use builder::ExprBuilder;
pub use checked::{CheckedExpr, Reference, SourceInfo};
pub use compiler::{CompileError, CompileResult, ExprCompiler, FilterCatalog};
pub use env::{Declaration, Environment, MessageDecl, RECORD_SUMMARY, RESOURCE_KINDS, SUMMARY_STATUSES};
pub use types::{ExprType, PrimitiveType, WellKnownType};
