//! CEL operator and overload names as they appear in checked call nodes

pub const LOGICAL_AND: &str = "_&&_";
pub const LOGICAL_OR: &str = "_||_";
pub const LOGICAL_NOT: &str = "!_";
pub const EQUALS: &str = "_==_";
pub const NOT_EQUALS: &str = "_!=_";
pub const LESS: &str = "_<_";
pub const LESS_EQUALS: &str = "_<=_";
pub const GREATER: &str = "_>_";
pub const GREATER_EQUALS: &str = "_>=_";
pub const ADD: &str = "_+_";
pub const SUBTRACT: &str = "_-_";
pub const MULTIPLY: &str = "_*_";
pub const DIVIDE: &str = "_/_";
pub const MODULO: &str = "_%_";
pub const IN: &str = "@in";
pub const INDEX: &str = "_[_]";

pub const CONTAINS: &str = "contains";
pub const ENDS_WITH: &str = "endsWith";
pub const STARTS_WITH: &str = "startsWith";
pub const MATCHES: &str = "matches";
pub const GET_DATE: &str = "getDate";
pub const GET_DAY_OF_MONTH: &str = "getDayOfMonth";
pub const GET_DAY_OF_WEEK: &str = "getDayOfWeek";
pub const GET_DAY_OF_YEAR: &str = "getDayOfYear";
pub const GET_FULL_YEAR: &str = "getFullYear";
pub const TIMESTAMP: &str = "timestamp";
