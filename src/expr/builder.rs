//! Programmatic construction of checked expressions
//!
//! Assigns node ids and source positions and fills the type and reference
//! maps from an [`Environment`], the way the front end's checker would for
//! the subset of CEL the translator supports. Used by tools and tests that
//! need a checked tree without going through source text.
//!
//! ```ignore
//! let env = Environment::records();
//! let b = ExprBuilder::new(&env);
//! let root = b.eq(b.ident("name"), b.string("foo"));
//! let checked = b.build(root);
//! ```

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::ast::{Constant, Expr, ExprKind};
use super::checked::{CheckedExpr, Reference, SourceInfo};
use super::env::{Declaration, Environment};
use super::symbols;
use super::types::{ExprType, PrimitiveType, WellKnownType};

/// Builds one checked tree
pub struct ExprBuilder<'e> {
    env: &'e Environment,
    next_id: Cell<i64>,
    offset: Cell<i32>,
    types: RefCell<HashMap<i64, ExprType>>,
    references: RefCell<HashMap<i64, Reference>>,
    positions: RefCell<HashMap<i64, i32>>,
    source_info: SourceInfo,
}

impl<'e> ExprBuilder<'e> {
    /// Creates a builder resolving identifiers against `env`
    pub fn new(env: &'e Environment) -> Self {
        Self {
            env,
            next_id: Cell::new(1),
            offset: Cell::new(0),
            types: RefCell::new(HashMap::new()),
            references: RefCell::new(HashMap::new()),
            positions: RefCell::new(HashMap::new()),
            source_info: SourceInfo::default(),
        }
    }

    /// Records the source text so positions can be mapped to lines
    pub fn with_source(mut self, source: &str) -> Self {
        self.source_info = SourceInfo::from_source(source);
        self
    }

    /// Sets the byte offset recorded for the next nodes
    pub fn at(&self, offset: i32) -> &Self {
        self.offset.set(offset);
        self
    }

    fn node(&self, kind: ExprKind, ty: Option<ExprType>) -> Expr {
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        if let Some(ty) = ty {
            self.types.borrow_mut().insert(id, ty);
        }
        self.positions.borrow_mut().insert(id, self.offset.get());

        Expr::new(id, kind)
    }

    fn type_of(&self, expr: &Expr) -> Option<ExprType> {
        self.types.borrow().get(&expr.id).cloned()
    }

    /// Overrides the static type of an already built node
    pub fn typed(&self, expr: Expr, ty: ExprType) -> Expr {
        self.types.borrow_mut().insert(expr.id, ty);
        expr
    }

    // ---- literals ----

    pub fn constant(&self, value: Constant) -> Expr {
        let ty = match &value {
            Constant::Null => ExprType::Null,
            Constant::Bool(_) => ExprType::bool(),
            Constant::Int(_) => ExprType::int(),
            Constant::Uint(_) => ExprType::Primitive(PrimitiveType::Uint),
            Constant::Double(_) => ExprType::Primitive(PrimitiveType::Double),
            Constant::String(_) => ExprType::string(),
            Constant::Bytes(_) => ExprType::Primitive(PrimitiveType::Bytes),
            Constant::Duration { .. } => ExprType::WellKnown(WellKnownType::Duration),
            Constant::Timestamp(_) => ExprType::timestamp(),
        };
        self.node(ExprKind::Const(value), Some(ty))
    }

    pub fn null(&self) -> Expr {
        self.constant(Constant::Null)
    }

    pub fn bool(&self, value: bool) -> Expr {
        self.constant(Constant::Bool(value))
    }

    pub fn int(&self, value: i64) -> Expr {
        self.constant(Constant::Int(value))
    }

    pub fn uint(&self, value: u64) -> Expr {
        self.constant(Constant::Uint(value))
    }

    pub fn double(&self, value: f64) -> Expr {
        self.constant(Constant::Double(value))
    }

    pub fn string(&self, value: impl Into<String>) -> Expr {
        self.constant(Constant::String(value.into()))
    }

    pub fn bytes(&self, value: impl Into<Vec<u8>>) -> Expr {
        self.constant(Constant::Bytes(value.into()))
    }

    pub fn duration(&self, seconds: i64) -> Expr {
        self.constant(Constant::Duration { seconds, nanos: 0 })
    }

    pub fn timestamp(&self, value: DateTime<Utc>) -> Expr {
        self.constant(Constant::Timestamp(value))
    }

    // ---- references ----

    /// Identifier resolved against the environment. Unknown names are left
    /// untyped.
    pub fn ident(&self, name: &str) -> Expr {
        let decl = self.env.lookup(name);
        let ty = match &decl {
            Some(Declaration::Variable(ty)) | Some(Declaration::Constant(ty, _)) => {
                Some((*ty).clone())
            }
            None => None,
        };

        let expr = self.node(ExprKind::Ident { name: name.to_string() }, ty);
        match decl {
            Some(Declaration::Variable(_)) => {
                self.references
                    .borrow_mut()
                    .insert(expr.id, Reference::variable(name));
            }
            Some(Declaration::Constant(_, value)) => {
                self.references
                    .borrow_mut()
                    .insert(expr.id, Reference::constant(name, value.clone()));
            }
            None => {}
        }
        expr
    }

    /// Field selection `operand.field`
    pub fn select(&self, operand: Expr, field: &str) -> Expr {
        let ty = match self.type_of(&operand) {
            Some(ExprType::Dyn) => Some(ExprType::Dyn),
            Some(ExprType::Message(name)) => self.env.field_type(&name, field).cloned(),
            Some(ExprType::Map(_, value)) => Some(*value),
            _ => None,
        };
        self.node(
            ExprKind::Select {
                operand: Box::new(operand),
                field: field.to_string(),
            },
            ty,
        )
    }

    // ---- calls ----

    /// Global function or operator call
    pub fn call(&self, function: &str, args: Vec<Expr>) -> Expr {
        let ty = self.result_type(function, None, &args);
        self.node(
            ExprKind::Call {
                function: function.to_string(),
                target: None,
                args,
            },
            ty,
        )
    }

    /// Receiver-style call `target.function(args)`
    pub fn member(&self, target: Expr, function: &str, args: Vec<Expr>) -> Expr {
        let ty = self.result_type(function, Some(&target), &args);
        self.node(
            ExprKind::Call {
                function: function.to_string(),
                target: Some(Box::new(target)),
                args,
            },
            ty,
        )
    }

    fn result_type(&self, function: &str, target: Option<&Expr>, args: &[Expr]) -> Option<ExprType> {
        match function {
            symbols::LOGICAL_AND
            | symbols::LOGICAL_OR
            | symbols::LOGICAL_NOT
            | symbols::EQUALS
            | symbols::NOT_EQUALS
            | symbols::LESS
            | symbols::LESS_EQUALS
            | symbols::GREATER
            | symbols::GREATER_EQUALS
            | symbols::IN
            | symbols::CONTAINS
            | symbols::STARTS_WITH
            | symbols::ENDS_WITH
            | symbols::MATCHES => Some(ExprType::bool()),
            symbols::GET_DATE
            | symbols::GET_DAY_OF_MONTH
            | symbols::GET_DAY_OF_WEEK
            | symbols::GET_DAY_OF_YEAR
            | symbols::GET_FULL_YEAR => Some(ExprType::int()),
            symbols::TIMESTAMP => Some(ExprType::timestamp()),
            symbols::INDEX => args
                .first()
                .and_then(|base| self.type_of(base))
                .and_then(|ty| ty.index_result()),
            symbols::ADD
            | symbols::SUBTRACT
            | symbols::MULTIPLY
            | symbols::DIVIDE
            | symbols::MODULO => args.first().or(target).and_then(|lhs| self.type_of(lhs)),
            _ => None,
        }
    }

    pub fn not(&self, operand: Expr) -> Expr {
        self.call(symbols::LOGICAL_NOT, vec![operand])
    }

    pub fn and(&self, lhs: Expr, rhs: Expr) -> Expr {
        self.call(symbols::LOGICAL_AND, vec![lhs, rhs])
    }

    pub fn or(&self, lhs: Expr, rhs: Expr) -> Expr {
        self.call(symbols::LOGICAL_OR, vec![lhs, rhs])
    }

    pub fn eq(&self, lhs: Expr, rhs: Expr) -> Expr {
        self.call(symbols::EQUALS, vec![lhs, rhs])
    }

    pub fn ne(&self, lhs: Expr, rhs: Expr) -> Expr {
        self.call(symbols::NOT_EQUALS, vec![lhs, rhs])
    }

    pub fn lt(&self, lhs: Expr, rhs: Expr) -> Expr {
        self.call(symbols::LESS, vec![lhs, rhs])
    }

    pub fn gt(&self, lhs: Expr, rhs: Expr) -> Expr {
        self.call(symbols::GREATER, vec![lhs, rhs])
    }

    pub fn ge(&self, lhs: Expr, rhs: Expr) -> Expr {
        self.call(symbols::GREATER_EQUALS, vec![lhs, rhs])
    }

    /// `base[key]`
    pub fn index(&self, base: Expr, key: Expr) -> Expr {
        self.call(symbols::INDEX, vec![base, key])
    }

    /// `value in list`
    pub fn in_list(&self, value: Expr, list: Expr) -> Expr {
        self.call(symbols::IN, vec![value, list])
    }

    pub fn list(&self, elements: Vec<Expr>) -> Expr {
        let elem = elements
            .first()
            .and_then(|e| self.type_of(e))
            .unwrap_or(ExprType::Dyn);
        self.node(ExprKind::List { elements }, Some(ExprType::List(Box::new(elem))))
    }

    /// Raw node with no type information
    pub fn raw(&self, kind: ExprKind) -> Expr {
        self.node(kind, None)
    }

    /// Finishes the tree rooted at `root`
    pub fn build(self, root: Expr) -> CheckedExpr {
        let mut source_info = self.source_info;
        source_info.positions = self.positions.into_inner();

        CheckedExpr {
            expr: root,
            type_map: self.types.into_inner(),
            reference_map: self.references.into_inner(),
            source_info,
        }
    }
}
