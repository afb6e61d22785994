//! Field selection
//!
//! A select chain is flattened to its root identifier plus the selected
//! field names. The root's static type decides the rendering:
//!
//! - dyn root: a JSON path over the root column,
//!   `(data->'metadata'->>'name')`
//! - known record message root: the flattened column for the first field,
//!   `recordsummary_start_time`, with any further segments as JSON accessors
//!
//! Any other root is an unrecognized field.

use crate::expr::{Expr, ExprKind, ExprType, RECORD_SUMMARY};

use super::errors::{TranslateError, TranslateResult};
use super::interpreter::{push_quoted, Interpreter};
use super::naming::snake_case;
use super::operators;

/// Message types stored as flattened column groups
const RECORD_TYPES: &[&str] = &[RECORD_SUMMARY];

/// Column prefix for a record message: the lowercased last name segment
pub fn column_prefix(message: &str) -> String {
    message
        .rsplit('.')
        .next()
        .unwrap_or(message)
        .to_ascii_lowercase()
}

impl Interpreter<'_> {
    /// Renders `expr` (a select node) with `extra` path segments appended
    /// after its own fields.
    pub(super) fn interpret_select(
        &self,
        expr: &Expr,
        extra: &[&str],
        out: &mut String,
    ) -> TranslateResult<()> {
        let (root, mut path) = self.field_path(expr)?;
        path.extend_from_slice(extra);

        match self.checked.type_of(root.id) {
            Some(ExprType::Dyn) => {
                push_json_path(out, &path);
                Ok(())
            }
            Some(ExprType::Message(name)) if RECORD_TYPES.contains(&name.as_str()) => {
                let Some((first, rest)) = path.split_first() else {
                    return Err(self.unsupported(expr.id, "empty field selection"));
                };
                out.push_str(&column_prefix(name));
                out.push('_');
                out.push_str(&snake_case(first));
                push_accessors(out, rest);
                Ok(())
            }
            _ => {
                let (line, column) = self.checked.source_info.location(root.id);
                Err(TranslateError::UnrecognizedField {
                    field: root.as_ident().unwrap_or_default().to_string(),
                    line,
                    column,
                })
            }
        }
    }

    /// Root identifier and the field names selected from it, in order.
    /// String-keyed index steps count as fields.
    fn field_path<'e>(&'e self, expr: &'e Expr) -> TranslateResult<(&'e Expr, Vec<&'e str>)> {
        let mut fields = Vec::new();
        let mut current = expr;
        loop {
            match &current.kind {
                ExprKind::Select { operand, field } => {
                    fields.push(field.as_str());
                    current = operand;
                }
                ExprKind::Call { function, args, .. }
                    if operators::is_index(function) && args.len() == 2 =>
                {
                    let key = self
                        .string_constant(&args[1])
                        .ok_or_else(|| self.unsupported(args[1].id, "index with a non-string key"))?;
                    fields.push(key);
                    current = &args[0];
                }
                ExprKind::Ident { .. } => break,
                _ => {
                    return Err(self.unsupported(
                        current.id,
                        "field selection on a non-identifier operand",
                    ))
                }
            }
        }
        fields.reverse();
        Ok((current, fields))
    }
}

/// `(root->'a'->>'b')` for `[root, a, b]`
fn push_json_path(out: &mut String, path: &[&str]) {
    let Some((root, rest)) = path.split_first() else {
        return;
    };
    out.push('(');
    out.push_str(root);
    push_accessors(out, rest);
    out.push(')');
}

/// `->'a'->>'b'` for `[a, b]`; the last key extracts text
pub(super) fn push_accessors(out: &mut String, keys: &[&str]) {
    for (i, key) in keys.iter().enumerate() {
        if i + 1 == keys.len() {
            out.push_str("->>");
        } else {
            out.push_str("->");
        }
        push_quoted(out, key);
    }
}
