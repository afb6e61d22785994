//! CEL → Postgres predicate interpreter
//!
//! Walks a checked tree and writes SQL into a buffer owned by a single
//! top-level [`Interpreter::interpret`] call. The buffer is handed down the
//! recursion by `&mut` and never outlives that call.
//!
//! | CEL                                      | SQL                                             |
//! |------------------------------------------|-------------------------------------------------|
//! | `name == "foo"`                          | `name = 'foo'`                                  |
//! | `data.metadata.namespace == "default"`   | `(data->'metadata'->>'namespace') = 'default'`  |
//! | `summary.start_time > timestamp(x)`      | `recordsummary_start_time > x::TIMESTAMP WITH TIME ZONE` |
//! | `annotations["repo"] == "a/b"`           | `annotations @> '{"repo":"a/b"}'::jsonb`        |
//! | `!deleted`                               | `NOT deleted`                                   |

use std::fmt::Write as _;

use chrono::SecondsFormat;

use crate::expr::{CheckedExpr, Constant, Expr, ExprKind};

use super::coercion;
use super::errors::{TranslateError, TranslateResult};
use super::operators::{self, BinaryOperator, NOT_PRECEDENCE};

/// Identifiers whose user-facing name differs from the storage column
const LEGACY_COLUMNS: &[(&str, &str)] = &[("data_type", "type")];

/// Precedence given to predicates rendered by string functions
/// (`POSITION(..) <> 0`, `LIKE`, `~`)
pub(super) const PREDICATE_PRECEDENCE: u8 = 4;

/// Translates a checked expression into a Postgres boolean expression.
pub fn translate(checked: &CheckedExpr) -> TranslateResult<String> {
    Interpreter::new(checked).interpret()
}

/// Single-use translator for one checked expression
pub struct Interpreter<'a> {
    pub(super) checked: &'a CheckedExpr,
}

impl<'a> Interpreter<'a> {
    pub fn new(checked: &'a CheckedExpr) -> Self {
        Self { checked }
    }

    /// Produces the predicate text, trimmed of surrounding whitespace.
    pub fn interpret(self) -> TranslateResult<String> {
        let mut query = String::with_capacity(128);
        self.interpret_expr(&self.checked.expr, &mut query)?;
        Ok(query.trim().to_string())
    }

    pub(super) fn interpret_expr(&self, expr: &Expr, out: &mut String) -> TranslateResult<()> {
        match &expr.kind {
            ExprKind::Const(value) => self.interpret_const(expr.id, value, out),
            ExprKind::Ident { name } => self.interpret_ident(expr.id, name, out),
            ExprKind::Select { .. } => self.interpret_select(expr, &[], out),
            ExprKind::Call {
                function,
                target,
                args,
            } => self.interpret_call(expr.id, function, target.as_deref(), args, out),
            ExprKind::List { elements } => self.interpret_list(elements, out),
            ExprKind::Struct { .. } => Err(self.unsupported(expr.id, "struct")),
            ExprKind::Comprehension { .. } => Err(self.unsupported(expr.id, "comprehension")),
        }
    }

    /// Builds an "unsupported" error pointing at node `id`
    pub(super) fn unsupported(&self, id: i64, construct: impl Into<String>) -> TranslateError {
        let (line, column) = self.checked.source_info.location(id);
        TranslateError::Unsupported {
            construct: construct.into(),
            line,
            column,
        }
    }

    /// Argument `index` of call `id`
    pub(super) fn arg<'e>(&self, id: i64, args: &'e [Expr], index: usize) -> TranslateResult<&'e Expr> {
        args.get(index)
            .ok_or_else(|| self.unsupported(id, format!("call with {} argument(s)", args.len())))
    }

    fn interpret_const(&self, id: i64, value: &Constant, out: &mut String) -> TranslateResult<()> {
        match value {
            Constant::Null => out.push_str("NULL"),
            Constant::Bool(true) => out.push_str("TRUE"),
            Constant::Bool(false) => out.push_str("FALSE"),
            Constant::Int(v) => {
                let _ = write!(out, "{}", v);
            }
            Constant::Uint(v) => {
                let _ = write!(out, "{}", v);
            }
            Constant::Double(v) => {
                if !v.is_finite() {
                    return Err(self.unsupported(id, "non-finite double constant"));
                }
                let _ = write!(out, "{}", v);
            }
            Constant::String(s) => push_quoted(out, s),
            Constant::Bytes(bytes) => {
                out.push_str("'\\x");
                for b in bytes {
                    let _ = write!(out, "{:02x}", b);
                }
                out.push_str("'::bytea");
            }
            Constant::Duration { seconds, nanos } => {
                if *nanos == 0 {
                    let _ = write!(out, "'{} SECONDS'", seconds);
                } else {
                    let fraction = format!("{:09}", nanos.unsigned_abs());
                    let sign = if *seconds == 0 && *nanos < 0 { "-" } else { "" };
                    let _ = write!(
                        out,
                        "'{}{}.{} SECONDS'",
                        sign,
                        seconds,
                        fraction.trim_end_matches('0')
                    );
                }
            }
            Constant::Timestamp(ts) => {
                let _ = write!(
                    out,
                    "TIMESTAMP WITH TIME ZONE '{}'",
                    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
                );
            }
        }
        Ok(())
    }

    pub(super) fn interpret_ident(&self, id: i64, name: &str, out: &mut String) -> TranslateResult<()> {
        if let Some(value) = self.checked.constant_of(id) {
            return self.interpret_const(id, value, out);
        }

        let column = LEGACY_COLUMNS
            .iter()
            .find(|(user_facing, _)| *user_facing == name)
            .map(|(_, column)| *column)
            .unwrap_or(name);
        out.push_str(column);
        Ok(())
    }

    fn interpret_call(
        &self,
        id: i64,
        function: &str,
        target: Option<&Expr>,
        args: &[Expr],
        out: &mut String,
    ) -> TranslateResult<()> {
        if let Some(sql) = operators::unary(function) {
            return self.interpret_unary(id, sql, args, out);
        }
        if let Some(op) = operators::binary(function) {
            return self.interpret_binary(id, op, args, out);
        }
        if operators::is_index(function) {
            return self.interpret_index(id, args, out);
        }
        self.interpret_function(id, function, target, args, out)
    }

    fn interpret_unary(&self, id: i64, sql: &str, args: &[Expr], out: &mut String) -> TranslateResult<()> {
        let operand = self.arg(id, args, 0)?;

        out.push_str(sql);
        out.push(' ');
        let group = self
            .precedence(operand)
            .map(|p| p < NOT_PRECEDENCE)
            .unwrap_or(false);
        self.interpret_grouped(operand, group, out)?;
        out.push(' ');
        Ok(())
    }

    fn interpret_binary(
        &self,
        id: i64,
        op: &BinaryOperator,
        args: &[Expr],
        out: &mut String,
    ) -> TranslateResult<()> {
        let lhs = self.arg(id, args, 0)?;
        let rhs = self.arg(id, args, 1)?;

        if op.symbol == crate::expr::symbols::EQUALS {
            if self.is_containment(lhs, rhs) {
                return self.interpret_containment(lhs, rhs, out);
            }
            if self.is_containment(rhs, lhs) {
                return self.interpret_containment(rhs, lhs, out);
            }
        }

        let (group_lhs, group_rhs) = self.operand_grouping(op, lhs, rhs);

        self.interpret_grouped(lhs, group_lhs, out)?;
        self.coerce(lhs, rhs, out)?;

        out.push(' ');
        out.push_str(op.sql);
        out.push(' ');

        self.interpret_grouped(rhs, group_rhs, out)?;
        self.coerce(rhs, lhs, out)?;
        out.push(' ');

        Ok(())
    }

    /// Appends the cast for `side` if it is dyn and `opposite` has a
    /// concrete well-known type.
    fn coerce(&self, side: &Expr, opposite: &Expr, out: &mut String) -> TranslateResult<()> {
        if !self.checked.is_dyn(side.id) {
            return Ok(());
        }
        let opposite_ty = self
            .checked
            .type_of(opposite.id)
            .ok_or(TranslateError::MissingType { id: opposite.id })?;
        if let Some(cast) = coercion::coercion(opposite_ty) {
            out.push_str(cast);
        }
        Ok(())
    }

    /// SQL binding strength of the rendering of `expr`, or `None` if it
    /// renders as a single term.
    fn precedence(&self, expr: &Expr) -> Option<u8> {
        let (function, _, _) = expr.as_call()?;
        if operators::is_unary(function) {
            return Some(NOT_PRECEDENCE);
        }
        if let Some(op) = operators::binary(function) {
            return Some(op.precedence);
        }
        super::functions::precedence(function)
    }

    fn operand_grouping(&self, op: &BinaryOperator, lhs: &Expr, rhs: &Expr) -> (bool, bool) {
        use crate::expr::symbols::{ADD, LOGICAL_AND, LOGICAL_OR, MULTIPLY};

        let comparison = op.precedence == PREDICATE_PRECEDENCE;
        let associative = [LOGICAL_AND, LOGICAL_OR, ADD, MULTIPLY].contains(&op.symbol);

        let group_lhs = match self.precedence(lhs) {
            Some(p) => p < op.precedence || (comparison && p == op.precedence),
            None => false,
        };
        let same_operator = rhs.as_call().map(|(function, _, _)| function) == Some(op.symbol);
        let group_rhs = match self.precedence(rhs) {
            Some(p) => p < op.precedence || (p == op.precedence && !(associative && same_operator)),
            None => false,
        };
        (group_lhs, group_rhs)
    }

    fn interpret_grouped(&self, expr: &Expr, group: bool, out: &mut String) -> TranslateResult<()> {
        if !group {
            return self.interpret_expr(expr, out);
        }
        out.push('(');
        self.interpret_expr(expr, out)?;
        let trimmed = out.trim_end().len();
        out.truncate(trimmed);
        out.push(')');
        Ok(())
    }

    fn interpret_list(&self, elements: &[Expr], out: &mut String) -> TranslateResult<()> {
        out.push('(');
        for (i, elem) in elements.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.interpret_expr(elem, out)?;
        }
        out.push(')');
        Ok(())
    }

    /// String value of a literal or of an identifier bound to a string
    /// constant
    pub(super) fn string_constant<'e>(&'e self, expr: &'e Expr) -> Option<&'e str> {
        match &expr.kind {
            ExprKind::Const(value) => value.as_str(),
            ExprKind::Ident { .. } => self.checked.constant_of(expr.id).and_then(Constant::as_str),
            _ => None,
        }
    }
}

/// Writes `s` as a single-quoted SQL literal, doubling embedded quotes
pub(super) fn push_quoted(out: &mut String, s: &str) {
    out.push('\'');
    for c in s.chars() {
        if c == '\'' {
            out.push('\'');
        }
        out.push(c);
    }
    out.push('\'');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{Environment, ExprBuilder, ExprType};
    use chrono::{TimeZone, Utc};

    fn records() -> Environment {
        Environment::records()
    }

    fn results() -> Environment {
        Environment::results()
    }

    #[test]
    fn test_simple_equality() {
        let env = records();
        let b = ExprBuilder::new(&env);
        let root = b.eq(b.ident("name"), b.string("foo"));
        assert_eq!(translate(&b.build(root)).unwrap(), "name = 'foo'");
    }

    #[test]
    fn test_constants() {
        let env = records();
        let cases: Vec<(Constant, &str)> = vec![
            (Constant::Null, "NULL"),
            (Constant::Bool(true), "TRUE"),
            (Constant::Bool(false), "FALSE"),
            (Constant::Int(-42), "-42"),
            (Constant::Uint(u64::MAX), "18446744073709551615"),
            (Constant::Double(2.5), "2.5"),
            (Constant::String("it's".into()), "'it''s'"),
            (Constant::Bytes(vec![0xde, 0xad]), "'\\xdead'::bytea"),
            (Constant::Duration { seconds: 90, nanos: 0 }, "'90 SECONDS'"),
            (
                Constant::Duration {
                    seconds: 1,
                    nanos: 500_000_000,
                },
                "'1.5 SECONDS'",
            ),
            (
                Constant::Timestamp(Utc.with_ymd_and_hms(2022, 10, 30, 21, 45, 0).unwrap()),
                "TIMESTAMP WITH TIME ZONE '2022-10-30T21:45:00Z'",
            ),
        ];

        for (value, want) in cases {
            let b = ExprBuilder::new(&env);
            let root = b.constant(value);
            assert_eq!(translate(&b.build(root)).unwrap(), want);
        }
    }

    #[test]
    fn test_non_finite_double_rejected() {
        let env = records();
        let b = ExprBuilder::new(&env);
        let root = b.double(f64::NAN);
        let err = translate(&b.build(root)).unwrap_err();
        assert!(err.is_unsupported());
    }

    #[test]
    fn test_data_type_legacy_column() {
        let env = records();
        let b = ExprBuilder::new(&env);
        let root = b.eq(b.ident("data_type"), b.string("tekton.dev/v1beta1.TaskRun"));
        assert_eq!(
            translate(&b.build(root)).unwrap(),
            "type = 'tekton.dev/v1beta1.TaskRun'"
        );
    }

    #[test]
    fn test_constant_substitution() {
        let env = results();
        let b = ExprBuilder::new(&env);
        let root = b.eq(b.select(b.ident("summary"), "type"), b.ident("PIPELINE_RUN"));
        assert_eq!(
            translate(&b.build(root)).unwrap(),
            "recordsummary_type = 'tekton.dev/v1beta1.PipelineRun'"
        );
    }

    #[test]
    fn test_logical_chain_spacing() {
        let env = results();
        let b = ExprBuilder::new(&env);
        let status = |name: &str| b.eq(b.select(b.ident("summary"), "status"), b.ident(name));
        let root = b.or(status("CANCELLED"), status("TIMEOUT"));
        assert_eq!(
            translate(&b.build(root)).unwrap(),
            "recordsummary_status = 4  OR recordsummary_status = 3"
        );
    }

    #[test]
    fn test_not() {
        let env = records();
        let b = ExprBuilder::new(&env);
        let root = b.not(b.eq(b.ident("name"), b.string("foo")));
        assert_eq!(translate(&b.build(root)).unwrap(), "NOT name = 'foo'");
    }

    #[test]
    fn test_lower_precedence_operand_is_grouped() {
        let env = records();
        let b = ExprBuilder::new(&env);
        let either = b.or(
            b.eq(b.ident("name"), b.string("a")),
            b.eq(b.ident("name"), b.string("b")),
        );
        let root = b.and(either, b.eq(b.ident("data_type"), b.string("c")));
        assert_eq!(
            translate(&b.build(root)).unwrap(),
            "(name = 'a'  OR name = 'b') AND type = 'c'"
        );

        let b = ExprBuilder::new(&env);
        let both = b.and(
            b.eq(b.ident("name"), b.string("a")),
            b.eq(b.ident("data_type"), b.string("b")),
        );
        let root = b.not(both);
        assert_eq!(
            translate(&b.build(root)).unwrap(),
            "NOT (name = 'a'  AND type = 'b')"
        );
    }

    #[test]
    fn test_in_list() {
        let env = records();
        let b = ExprBuilder::new(&env);
        let namespace = b.select(b.select(b.ident("data"), "metadata"), "namespace");
        let root = b.in_list(namespace, b.list(vec![b.string("foo"), b.string("bar")]));
        assert_eq!(
            translate(&b.build(root)).unwrap(),
            "(data->'metadata'->>'namespace') IN ('foo', 'bar')"
        );
    }

    #[test]
    fn test_dyn_coercion_both_sides() {
        let env = records();
        let ts = || "2022/10/30T21:45:00.000Z";

        let b = ExprBuilder::new(&env);
        let completion = b.select(b.select(b.ident("data"), "status"), "completionTime");
        let root = b.gt(completion, b.call("timestamp", vec![b.string(ts())]));
        assert_eq!(
            translate(&b.build(root)).unwrap(),
            "(data->'status'->>'completionTime')::TIMESTAMP WITH TIME ZONE > '2022/10/30T21:45:00.000Z'::TIMESTAMP WITH TIME ZONE"
        );

        let b = ExprBuilder::new(&env);
        let completion = b.select(b.select(b.ident("data"), "status"), "completionTime");
        let root = b.lt(b.call("timestamp", vec![b.string(ts())]), completion);
        assert_eq!(
            translate(&b.build(root)).unwrap(),
            "'2022/10/30T21:45:00.000Z'::TIMESTAMP WITH TIME ZONE < (data->'status'->>'completionTime')::TIMESTAMP WITH TIME ZONE"
        );
    }

    #[test]
    fn test_dyn_against_dyn_has_no_cast() {
        let env = records();
        let b = ExprBuilder::new(&env);
        let lhs = b.select(b.ident("data"), "a");
        let rhs = b.select(b.ident("data"), "b");
        let root = b.eq(lhs, rhs);
        assert_eq!(
            translate(&b.build(root)).unwrap(),
            "(data->>'a') = (data->>'b')"
        );
    }

    #[test]
    fn test_missing_type_on_opposite_side() {
        let env = records();
        let b = ExprBuilder::new(&env);
        let lhs = b.select(b.ident("data"), "a");
        let rhs = b.raw(ExprKind::Const(Constant::Int(1)));
        let rhs_id = rhs.id;
        let root = b.eq(lhs, rhs);
        let err = translate(&b.build(root)).unwrap_err();
        assert_eq!(err, TranslateError::MissingType { id: rhs_id });
    }

    #[test]
    fn test_struct_and_comprehension_rejected() {
        let env = records();
        let b = ExprBuilder::new(&env).with_source("x\n  Foo{}");
        b.at(7);
        let root = b.raw(ExprKind::Struct {
            message_name: "Foo".into(),
            fields: vec![],
        });
        let err = translate(&b.build(root)).unwrap_err();
        assert_eq!(
            err,
            TranslateError::Unsupported {
                construct: "struct".into(),
                line: 2,
                column: 6,
            }
        );

        let b = ExprBuilder::new(&env);
        let range = b.ident("data");
        let result = b.bool(true);
        let root = b.raw(ExprKind::Comprehension {
            iter_var: "x".into(),
            iter_range: Box::new(range),
            result: Box::new(result),
        });
        let err = translate(&b.build(root)).unwrap_err();
        assert!(err.to_string().contains("comprehension"));
    }

    #[test]
    fn test_arithmetic_grouping() {
        let env = records();
        let b = ExprBuilder::new(&env);
        let inner = b.call("_-_", vec![b.int(2), b.int(3)]);
        let diff = b.call("_-_", vec![b.int(1), inner]);
        let root = b.eq(b.typed(diff, ExprType::int()), b.int(0));
        assert_eq!(translate(&b.build(root)).unwrap(), "1 - (2 - 3)  = 0");
    }

    #[test]
    fn test_mixed_multiplicative_operand_is_grouped() {
        let env = records();
        let cases = [("_/_", 3, 2, 2, "2 * (3 / 2)  = 2"), ("_%_", 7, 4, 6, "2 * (7 % 4)  = 6")];

        for (function, lhs, rhs, want, sql) in cases {
            let b = ExprBuilder::new(&env);
            let inner = b.call(function, vec![b.int(lhs), b.int(rhs)]);
            let product = b.call("_*_", vec![b.int(2), inner]);
            let root = b.eq(b.typed(product, ExprType::int()), b.int(want));
            assert_eq!(translate(&b.build(root)).unwrap(), sql, "{}", function);
        }

        let b = ExprBuilder::new(&env);
        let inner = b.call("_*_", vec![b.int(3), b.int(4)]);
        let product = b.call("_*_", vec![b.int(2), inner]);
        let root = b.eq(b.typed(product, ExprType::int()), b.int(24));
        assert_eq!(translate(&b.build(root)).unwrap(), "2 * 3 * 4   = 24");
    }
}
