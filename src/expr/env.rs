//! Declarations the CEL front end is configured with
//!
//! Two environments exist, one per listable resource kind:
//!
//! - results: resource-kind string constants, the summary status enum as
//!   integer constants, `summary` (a `RecordSummary` message) and
//!   `annotations` (`map<string, string>`)
//! - records: `name` and `data_type` strings and the freeform `data` (dyn)

use std::collections::BTreeMap;

use super::ast::Constant;
use super::types::{ExprType, PrimitiveType};

/// Fully qualified name of the summary message
pub const RECORD_SUMMARY: &str = "tekton.results.v1alpha2.RecordSummary";

/// Resource kind constants exposed to results filters
pub const RESOURCE_KINDS: &[(&str, &str)] = &[
    ("PIPELINE_RUN", "tekton.dev/v1beta1.PipelineRun"),
    ("TASK_RUN", "tekton.dev/v1beta1.TaskRun"),
];

/// Summary status enum members exposed as integer constants
pub const SUMMARY_STATUSES: &[(&str, i64)] = &[
    ("UNKNOWN", 0),
    ("SUCCESS", 1),
    ("FAILURE", 2),
    ("TIMEOUT", 3),
    ("CANCELLED", 4),
];

/// Field layout of a message type
#[derive(Debug, Clone, PartialEq)]
pub struct MessageDecl {
    pub name: String,
    pub fields: Vec<(String, ExprType)>,
}

impl MessageDecl {
    /// Static type of `field`
    pub fn field_type(&self, field: &str) -> Option<&ExprType> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, ty)| ty)
    }
}

/// What a bare identifier refers to
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration<'a> {
    Variable(&'a ExprType),
    Constant(&'a ExprType, &'a Constant),
}

/// Set of declarations visible to filters
#[derive(Debug, Clone, Default)]
pub struct Environment {
    variables: BTreeMap<String, ExprType>,
    constants: BTreeMap<String, (ExprType, Constant)>,
    messages: BTreeMap<String, MessageDecl>,
}

impl Environment {
    /// Creates an empty environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Environment used to filter results
    pub fn results() -> Self {
        let mut env = Self::new()
            .with_message(record_summary())
            .with_variable("annotations", ExprType::map(ExprType::string(), ExprType::string()))
            .with_variable("summary", ExprType::message(RECORD_SUMMARY));

        for (name, value) in RESOURCE_KINDS {
            env = env.with_constant(*name, ExprType::string(), Constant::String(value.to_string()));
        }
        for (name, value) in SUMMARY_STATUSES {
            env = env.with_constant(*name, ExprType::int(), Constant::Int(*value));
        }
        env
    }

    /// Environment used to filter records
    pub fn records() -> Self {
        Self::new()
            .with_variable("name", ExprType::string())
            .with_variable("data_type", ExprType::string())
            .with_variable("data", ExprType::Dyn)
    }

    /// Declares a variable
    pub fn with_variable(mut self, name: impl Into<String>, ty: ExprType) -> Self {
        self.variables.insert(name.into(), ty);
        self
    }

    /// Declares a named constant
    pub fn with_constant(mut self, name: impl Into<String>, ty: ExprType, value: Constant) -> Self {
        self.constants.insert(name.into(), (ty, value));
        self
    }

    /// Registers a message type
    pub fn with_message(mut self, message: MessageDecl) -> Self {
        self.messages.insert(message.name.clone(), message);
        self
    }

    /// Resolves a bare identifier
    pub fn lookup(&self, name: &str) -> Option<Declaration<'_>> {
        if let Some(ty) = self.variables.get(name) {
            return Some(Declaration::Variable(ty));
        }
        self.constants
            .get(name)
            .map(|(ty, value)| Declaration::Constant(ty, value))
    }

    /// Static type of `message.field`
    pub fn field_type(&self, message: &str, field: &str) -> Option<&ExprType> {
        self.messages.get(message).and_then(|m| m.field_type(field))
    }
}

fn record_summary() -> MessageDecl {
    MessageDecl {
        name: RECORD_SUMMARY.to_string(),
        fields: vec![
            ("record".into(), ExprType::string()),
            ("type".into(), ExprType::string()),
            ("start_time".into(), ExprType::timestamp()),
            ("end_time".into(), ExprType::timestamp()),
            ("status".into(), ExprType::Primitive(PrimitiveType::Int)),
            (
                "annotations".into(),
                ExprType::map(ExprType::string(), ExprType::string()),
            ),
        ],
    }
}
