//! Filter operators
//!
//! Each operator has a short and a long request name; both are matched
//! case-insensitively.

use std::fmt;
use std::str::FromStr;

use crate::errors::SearchError;

/// Number of operands an operator takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Zero,
    One,
    Two,
    AtLeastOne,
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            Arity::Zero => count == 0,
            Arity::One => count == 1,
            Arity::Two => count == 2,
            Arity::AtLeastOne => count >= 1,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Zero => write!(f, "no values"),
            Arity::One => write!(f, "exactly one value"),
            Arity::Two => write!(f, "exactly two values"),
            Arity::AtLeastOne => write!(f, "at least one value"),
        }
    }
}

/// Filter condition operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equal,        // =
    NotEqual,     // <>
    GreaterThan,  // >
    GreaterEqual, // >=
    LessThan,     // <
    LessEqual,    // <=
    Like,         // LIKE
    NotLike,      // NOT LIKE
    In,           // IN
    NotIn,        // NOT IN
    IsNull,       // IS NULL
    NotNull,      // IS NOT NULL
    Between,      // BETWEEN
}

impl Operator {
    pub const ALL: [Operator; 13] = [
        Operator::Equal,
        Operator::NotEqual,
        Operator::GreaterThan,
        Operator::GreaterEqual,
        Operator::LessThan,
        Operator::LessEqual,
        Operator::Like,
        Operator::NotLike,
        Operator::In,
        Operator::NotIn,
        Operator::IsNull,
        Operator::NotNull,
        Operator::Between,
    ];

    /// Short request name, e.g. `gt`
    pub fn short_name(&self) -> &'static str {
        match self {
            Operator::Equal => "eq",
            Operator::NotEqual => "ne",
            Operator::GreaterThan => "gt",
            Operator::GreaterEqual => "ge",
            Operator::LessThan => "lt",
            Operator::LessEqual => "le",
            Operator::Like => "lk",
            Operator::NotLike => "nk",
            Operator::In => "in",
            Operator::NotIn => "ni",
            Operator::IsNull => "nl",
            Operator::NotNull => "nn",
            Operator::Between => "bt",
        }
    }

    /// Long request name, e.g. `greater_than`
    pub fn long_name(&self) -> &'static str {
        match self {
            Operator::Equal => "equal",
            Operator::NotEqual => "not_equal",
            Operator::GreaterThan => "greater_than",
            Operator::GreaterEqual => "greater_equal",
            Operator::LessThan => "less_than",
            Operator::LessEqual => "less_equal",
            Operator::Like => "like",
            Operator::NotLike => "not_like",
            Operator::In => "in",
            Operator::NotIn => "not_in",
            Operator::IsNull => "is_null",
            Operator::NotNull => "not_null",
            Operator::Between => "between",
        }
    }

    /// Look an operator up by its short or long name
    pub fn from_name(name: &str) -> Option<Operator> {
        let name = name.trim();
        Self::ALL.into_iter().find(|op| {
            op.short_name().eq_ignore_ascii_case(name) || op.long_name().eq_ignore_ascii_case(name)
        })
    }

    pub fn arity(&self) -> Arity {
        match self {
            Operator::IsNull | Operator::NotNull => Arity::Zero,
            Operator::In | Operator::NotIn => Arity::AtLeastOne,
            Operator::Between => Arity::Two,
            _ => Arity::One,
        }
    }

    /// Pattern operators always bind their operand as text
    pub fn is_pattern(&self) -> bool {
        matches!(self, Operator::Like | Operator::NotLike)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.long_name())
    }
}

impl FromStr for Operator {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
            .ok_or_else(|| SearchError::invalid_param(format!("unknown operator '{}'", s.trim())))
    }
}
