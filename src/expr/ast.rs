//! Checked expression tree
//!
//! The tree is produced by the external CEL front end. The translator only
//! reads it. Every node carries the id used to look up its static type,
//! its resolved reference and its source position.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A literal value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constant {
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    /// Duration split into whole seconds and the nanosecond remainder
    Duration { seconds: i64, nanos: i32 },
    Timestamp(DateTime<Utc>),
}

impl Constant {
    /// Returns the string payload for string constants
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Constant::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the kind name used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Constant::Null => "null",
            Constant::Bool(_) => "bool",
            Constant::Int(_) => "int",
            Constant::Uint(_) => "uint",
            Constant::Double(_) => "double",
            Constant::String(_) => "string",
            Constant::Bytes(_) => "bytes",
            Constant::Duration { .. } => "duration",
            Constant::Timestamp(_) => "timestamp",
        }
    }
}

/// A single node of the checked tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    /// Stable node id
    pub id: i64,
    /// Node variant
    pub kind: ExprKind,
}

/// Node variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExprKind {
    /// Literal
    Const(Constant),

    /// Bound variable or declared constant name
    Ident { name: String },

    /// Field access `operand.field`
    Select { operand: Box<Expr>, field: String },

    /// Operator or function call; `target` is set for receiver-style calls
    Call {
        function: String,
        #[serde(default)]
        target: Option<Box<Expr>>,
        #[serde(default)]
        args: Vec<Expr>,
    },

    /// List literal
    List { elements: Vec<Expr> },

    /// Message construction `Type{field: value}`
    Struct {
        message_name: String,
        #[serde(default)]
        fields: Vec<(String, Expr)>,
    },

    /// Macro expansion such as `all`, `exists` or `map`
    Comprehension {
        iter_var: String,
        iter_range: Box<Expr>,
        result: Box<Expr>,
    },
}

impl Expr {
    /// Creates a node
    pub fn new(id: i64, kind: ExprKind) -> Self {
        Self { id, kind }
    }

    /// Returns the literal if this is a constant node
    pub fn as_const(&self) -> Option<&Constant> {
        match &self.kind {
            ExprKind::Const(c) => Some(c),
            _ => None,
        }
    }

    /// Returns the call parts if this is a call node
    pub fn as_call(&self) -> Option<(&str, Option<&Expr>, &[Expr])> {
        match &self.kind {
            ExprKind::Call {
                function,
                target,
                args,
            } => Some((function.as_str(), target.as_deref(), args.as_slice())),
            _ => None,
        }
    }

    /// Returns true if this node is a field selection
    pub fn is_select(&self) -> bool {
        matches!(self.kind, ExprKind::Select { .. })
    }

    /// Returns the identifier name if this is an ident node
    pub fn as_ident(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Ident { name } => Some(name),
            _ => None,
        }
    }
}
