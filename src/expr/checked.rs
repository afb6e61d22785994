//! Checked expression: tree plus the checker's side tables

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::ast::{Constant, Expr};
use super::types::ExprType;

/// What an identifier resolved to during checking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    /// Fully qualified name of the declaration
    pub name: String,
    /// Value for declared constants
    #[serde(default)]
    pub value: Option<Constant>,
}

impl Reference {
    pub fn variable(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    pub fn constant(name: impl Into<String>, value: Constant) -> Self {
        Self {
            name: name.into(),
            value: Some(value),
        }
    }
}

/// Source positions of the checked text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Byte offset at which each line ends, one past the newline.
    /// Monotonically increasing.
    #[serde(default)]
    pub line_offsets: Vec<i32>,
    /// Byte offset of each node in the source text
    #[serde(default)]
    pub positions: HashMap<i64, i32>,
}

impl SourceInfo {
    /// Builds the line offset table for `source`
    pub fn from_source(source: &str) -> Self {
        let mut line_offsets: Vec<i32> = source
            .bytes()
            .enumerate()
            .filter(|(_, b)| *b == b'\n')
            .map(|(i, _)| i as i32 + 1)
            .collect();
        line_offsets.push(source.len() as i32 + 1);

        Self {
            line_offsets,
            positions: HashMap::new(),
        }
    }

    /// Returns the 1-based line and column of node `id`.
    ///
    /// The line is the first entry of the offset table that exceeds the
    /// node's offset; nodes past the table land on the last line.
    pub fn location(&self, id: i64) -> (usize, usize) {
        let offset = self.positions.get(&id).copied().unwrap_or(0);

        let idx = self
            .line_offsets
            .iter()
            .position(|&line_end| line_end > offset)
            .unwrap_or(self.line_offsets.len().saturating_sub(1));

        let line_start = if idx == 0 {
            0
        } else {
            self.line_offsets[idx - 1]
        };

        (idx + 1, (offset - line_start).max(0) as usize + 1)
    }
}

/// A type-checked expression as handed over by the front end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckedExpr {
    pub expr: Expr,
    #[serde(default)]
    pub type_map: HashMap<i64, ExprType>,
    #[serde(default)]
    pub reference_map: HashMap<i64, Reference>,
    #[serde(default)]
    pub source_info: SourceInfo,
}

impl CheckedExpr {
    /// Static type of node `id`
    pub fn type_of(&self, id: i64) -> Option<&ExprType> {
        self.type_map.get(&id)
    }

    /// Returns true if node `id` is statically `dyn`
    pub fn is_dyn(&self, id: i64) -> bool {
        self.type_of(id).map(ExprType::is_dyn).unwrap_or(false)
    }

    /// Compile-time value bound to node `id`, if the checker resolved one
    pub fn constant_of(&self, id: i64) -> Option<&Constant> {
        self.reference_map.get(&id).and_then(|r| r.value.as_ref())
    }
}
