//! Static types attached to checked nodes

use serde::{Deserialize, Serialize};

/// Well-known protobuf types the checker understands natively
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WellKnownType {
    Timestamp,
    Duration,
    Any,
}

/// Scalar types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveType {
    Bool,
    Int,
    Uint,
    Double,
    String,
    Bytes,
}

/// Static type of a node as computed by the checker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExprType {
    /// Untyped JSON-like data
    Dyn,
    Null,
    Primitive(PrimitiveType),
    WellKnown(WellKnownType),
    /// Fully qualified message name
    Message(String),
    Map(Box<ExprType>, Box<ExprType>),
    List(Box<ExprType>),
}

impl ExprType {
    pub fn string() -> Self {
        ExprType::Primitive(PrimitiveType::String)
    }

    pub fn int() -> Self {
        ExprType::Primitive(PrimitiveType::Int)
    }

    pub fn bool() -> Self {
        ExprType::Primitive(PrimitiveType::Bool)
    }

    pub fn timestamp() -> Self {
        ExprType::WellKnown(WellKnownType::Timestamp)
    }

    pub fn message(name: impl Into<String>) -> Self {
        ExprType::Message(name.into())
    }

    pub fn map(key: ExprType, value: ExprType) -> Self {
        ExprType::Map(Box::new(key), Box::new(value))
    }

    pub fn is_dyn(&self) -> bool {
        matches!(self, ExprType::Dyn)
    }

    /// Returns the message name for message types
    pub fn message_name(&self) -> Option<&str> {
        match self {
            ExprType::Message(name) => Some(name),
            _ => None,
        }
    }

    /// Element type produced by indexing into a value of this type
    pub fn index_result(&self) -> Option<ExprType> {
        match self {
            ExprType::Dyn => Some(ExprType::Dyn),
            ExprType::Map(_, value) => Some((**value).clone()),
            ExprType::List(elem) => Some((**elem).clone()),
            _ => None,
        }
    }
}
