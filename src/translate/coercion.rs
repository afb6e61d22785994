//! Implicit coercion of dyn operands
//!
//! A `dyn` operand is JSON text extracted from a `jsonb` column. When it is
//! compared against a value of a concrete well-known type, the extracted text
//! is cast to that type. Each side of a comparison is handled on its own:
//! only a `dyn` side facing a concrete well-known type gets a cast.

use crate::expr::{ExprType, WellKnownType};

/// Postgres cast for timestamps
pub const TIMESTAMP_CAST: &str = "::TIMESTAMP WITH TIME ZONE";

/// Cast suffix that converts JSON text to values of `ty`, if one is defined
pub fn coercion(ty: &ExprType) -> Option<&'static str> {
    match ty {
        ExprType::WellKnown(WellKnownType::Timestamp) => Some(TIMESTAMP_CAST),
        _ => None,
    }
}

/// Cast suffix for one side of a comparison given both static types
pub fn side_cast(side: &ExprType, opposite: &ExprType) -> Option<&'static str> {
    if side.is_dyn() {
        coercion(opposite)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_cast() {
        assert_eq!(coercion(&ExprType::timestamp()), Some(TIMESTAMP_CAST));
        assert_eq!(coercion(&ExprType::string()), None);
        assert_eq!(coercion(&ExprType::Dyn), None);
        assert_eq!(coercion(&ExprType::WellKnown(WellKnownType::Duration)), None);
    }

    #[test]
    fn test_side_cast_is_one_directional() {
        let ts = ExprType::timestamp();
        let dyn_ty = ExprType::Dyn;

        assert_eq!(side_cast(&dyn_ty, &ts), Some(TIMESTAMP_CAST));
        assert_eq!(side_cast(&ts, &dyn_ty), None);
        assert_eq!(side_cast(&dyn_ty, &dyn_ty), None);
        assert_eq!(side_cast(&ts, &ts), None);
    }
}
