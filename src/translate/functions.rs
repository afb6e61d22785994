//! Named function calls
//!
//! | CEL                     | SQL                                        |
//! |-------------------------|--------------------------------------------|
//! | `t.contains(x)`         | `POSITION(x IN t) <> 0`                    |
//! | `t.startsWith(x)`       | `t LIKE x \|\| '%'`                        |
//! | `t.endsWith(x)`         | `t LIKE '%' \|\| x`                        |
//! | `t.matches(x)`          | `t ~ x`                                    |
//! | `t.getDate()`           | `EXTRACT(DAY FROM t)`                      |
//! | `t.getDayOfMonth()`     | `(EXTRACT(DAY FROM t) - 1)`                |
//! | `t.getDayOfWeek()`      | `EXTRACT(DOW FROM t)`                      |
//! | `t.getDayOfYear()`      | `(EXTRACT(DOY FROM t) - 1)`                |
//! | `t.getFullYear()`       | `EXTRACT(YEAR FROM t)`                     |
//! | `timestamp(x)`          | `x::TIMESTAMP WITH TIME ZONE`              |
//!
//! Date accessors called with a time zone argument extract from
//! `t AT TIME ZONE 'zone'`.

use crate::expr::symbols;
use crate::expr::Expr;

use super::coercion::TIMESTAMP_CAST;
use super::errors::TranslateResult;
use super::interpreter::{push_quoted, Interpreter, PREDICATE_PRECEDENCE};

/// SQL binding strength of a function's rendering, if it is an infix
/// predicate rather than a single term
pub fn precedence(function: &str) -> Option<u8> {
    match function {
        symbols::CONTAINS | symbols::STARTS_WITH | symbols::ENDS_WITH | symbols::MATCHES => {
            Some(PREDICATE_PRECEDENCE)
        }
        _ => None,
    }
}

/// EXTRACT field and whether the result is shifted to be zero-based
fn extract_field(function: &str) -> Option<(&'static str, bool)> {
    match function {
        symbols::GET_DATE => Some(("DAY", false)),
        symbols::GET_DAY_OF_MONTH => Some(("DAY", true)),
        symbols::GET_DAY_OF_WEEK => Some(("DOW", false)),
        symbols::GET_DAY_OF_YEAR => Some(("DOY", true)),
        symbols::GET_FULL_YEAR => Some(("YEAR", false)),
        _ => None,
    }
}

impl Interpreter<'_> {
    pub(super) fn interpret_function(
        &self,
        id: i64,
        function: &str,
        target: Option<&Expr>,
        args: &[Expr],
        out: &mut String,
    ) -> TranslateResult<()> {
        if let Some((field, zero_based)) = extract_field(function) {
            let target = self.target(id, function, target)?;
            return self.interpret_extract(id, target, args, field, zero_based, out);
        }

        match function {
            symbols::CONTAINS => {
                let target = self.target(id, function, target)?;
                let needle = self.arg(id, args, 0)?;
                out.push_str("POSITION(");
                self.interpret_expr(needle, out)?;
                out.push_str(" IN ");
                self.interpret_expr(target, out)?;
                out.push_str(") <> 0");
                Ok(())
            }
            symbols::ENDS_WITH => self.interpret_infix(id, function, target, args, "LIKE '%' ||", out),
            symbols::STARTS_WITH => {
                self.interpret_infix(id, function, target, args, "LIKE", out)?;
                out.push_str(" || '%'");
                Ok(())
            }
            symbols::MATCHES => self.interpret_infix(id, function, target, args, "~", out),
            symbols::TIMESTAMP => {
                let value = self.arg(id, args, 0)?;
                self.interpret_expr(value, out)?;
                out.push_str(TIMESTAMP_CAST);
                Ok(())
            }
            _ => Err(self.unsupported(id, format!("`{}` function", function))),
        }
    }

    fn target<'e>(&self, id: i64, function: &str, target: Option<&'e Expr>) -> TranslateResult<&'e Expr> {
        target.ok_or_else(|| self.unsupported(id, format!("`{}` function without a receiver", function)))
    }

    /// `target <infix> args[0]`
    fn interpret_infix(
        &self,
        id: i64,
        function: &str,
        target: Option<&Expr>,
        args: &[Expr],
        infix: &str,
        out: &mut String,
    ) -> TranslateResult<()> {
        let target = self.target(id, function, target)?;
        let operand = self.arg(id, args, 0)?;

        self.interpret_expr(target, out)?;
        out.push(' ');
        out.push_str(infix);
        out.push(' ');
        self.interpret_expr(operand, out)
    }

    fn interpret_extract(
        &self,
        id: i64,
        target: &Expr,
        args: &[Expr],
        field: &str,
        zero_based: bool,
        out: &mut String,
    ) -> TranslateResult<()> {
        let zone = match args.first() {
            Some(arg) => Some(
                self.string_constant(arg)
                    .ok_or_else(|| self.unsupported(id, "non-constant time zone"))?,
            ),
            None => None,
        };

        if zero_based {
            out.push('(');
        }
        out.push_str("EXTRACT(");
        out.push_str(field);
        out.push_str(" FROM ");
        self.interpret_expr(target, out)?;
        if self.checked.is_dyn(target.id) {
            out.push_str(TIMESTAMP_CAST);
        }
        if let Some(zone) = zone {
            out.push_str(" AT TIME ZONE ");
            push_quoted(out, zone);
        }
        out.push(')');
        if zero_based {
            out.push_str(" - 1)");
        }
        Ok(())
    }
}
