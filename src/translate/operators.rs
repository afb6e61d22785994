//! CEL operator symbols ↔ Postgres tokens
//!
//! Read-only tables; lookups are linear scans over a handful of entries.

use crate::expr::symbols;

/// A binary operator and its binding strength in SQL (higher binds tighter)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryOperator {
    pub symbol: &'static str,
    pub sql: &'static str,
    pub precedence: u8,
}

static UNARY_OPERATORS: &[(&str, &str)] = &[(symbols::LOGICAL_NOT, "NOT")];

/// Precedence of `NOT` in Postgres
pub const NOT_PRECEDENCE: u8 = 3;

static BINARY_OPERATORS: &[BinaryOperator] = &[
    BinaryOperator { symbol: symbols::LOGICAL_OR, sql: "OR", precedence: 1 },
    BinaryOperator { symbol: symbols::LOGICAL_AND, sql: "AND", precedence: 2 },
    BinaryOperator { symbol: symbols::EQUALS, sql: "=", precedence: 4 },
    BinaryOperator { symbol: symbols::NOT_EQUALS, sql: "<>", precedence: 4 },
    BinaryOperator { symbol: symbols::LESS, sql: "<", precedence: 4 },
    BinaryOperator { symbol: symbols::LESS_EQUALS, sql: "<=", precedence: 4 },
    BinaryOperator { symbol: symbols::GREATER, sql: ">", precedence: 4 },
    BinaryOperator { symbol: symbols::GREATER_EQUALS, sql: ">=", precedence: 4 },
    BinaryOperator { symbol: symbols::IN, sql: "IN", precedence: 4 },
    BinaryOperator { symbol: symbols::ADD, sql: "+", precedence: 5 },
    BinaryOperator { symbol: symbols::SUBTRACT, sql: "-", precedence: 5 },
    BinaryOperator { symbol: symbols::MULTIPLY, sql: "*", precedence: 6 },
    BinaryOperator { symbol: symbols::DIVIDE, sql: "/", precedence: 6 },
    BinaryOperator { symbol: symbols::MODULO, sql: "%", precedence: 6 },
];

/// SQL token for a unary operator symbol
pub fn unary(symbol: &str) -> Option<&'static str> {
    UNARY_OPERATORS
        .iter()
        .find(|(s, _)| *s == symbol)
        .map(|(_, sql)| *sql)
}

/// Table entry for a binary operator symbol
pub fn binary(symbol: &str) -> Option<&'static BinaryOperator> {
    BINARY_OPERATORS.iter().find(|op| op.symbol == symbol)
}

pub fn is_unary(symbol: &str) -> bool {
    unary(symbol).is_some()
}

pub fn is_index(symbol: &str) -> bool {
    symbol == symbols::INDEX
}

/// Reverse lookup: CEL symbol for a SQL token
pub fn symbol_for(sql: &str) -> Option<&'static str> {
    UNARY_OPERATORS
        .iter()
        .find(|(_, token)| token.eq_ignore_ascii_case(sql))
        .map(|(symbol, _)| *symbol)
        .or_else(|| {
            BINARY_OPERATORS
                .iter()
                .find(|op| op.sql.eq_ignore_ascii_case(sql))
                .map(|op| op.symbol)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(unary("!_"), Some("NOT"));
        assert_eq!(binary("_==_").map(|op| op.sql), Some("="));
        assert_eq!(binary("_!=_").map(|op| op.sql), Some("<>"));
        assert_eq!(binary("@in").map(|op| op.sql), Some("IN"));
        assert!(binary("contains").is_none());
        assert!(is_index("_[_]"));
    }

    #[test]
    fn test_reverse_lookup() {
        for op in BINARY_OPERATORS {
            assert_eq!(symbol_for(op.sql), Some(op.symbol));
        }
        assert_eq!(symbol_for("not"), Some("!_"));
        assert_eq!(symbol_for("LIKE"), None);
    }

    #[test]
    fn test_precedence_order() {
        let or = binary(symbols::LOGICAL_OR).unwrap();
        let and = binary(symbols::LOGICAL_AND).unwrap();
        let eq = binary(symbols::EQUALS).unwrap();
        assert!(or.precedence < and.precedence);
        assert!(and.precedence < NOT_PRECEDENCE);
        assert!(NOT_PRECEDENCE < eq.precedence);
    }
}
