//! Expr: the predicate expression tree
//!
//! An [`Expr`] is a closed tagged variant: literals, field references, and the
//! three binary operators. Each node owns its children, so a tree is a plain
//! value with no sharing and no cycles.
//!
//! The builder API stands in for native comparison syntax:
//!
//! ```
//! use ordo::Expr;
//!
//! // (level == 80) && (name == "Orc") && (hp == 100)
//! let expr = Expr::field("level").eq(80)
//!     & Expr::field("name").eq("Orc")
//!     & Expr::field("hp").eq(100);
//!
//! assert_eq!(
//!     expr.to_string(),
//!     r#"(((level == 80) && (name == "Orc")) && (hp == 100))"#
//! );
//! assert_eq!(expr.token_count(), 11);
//! ```

use std::fmt;
use std::ops::{BitAnd, BitOr};

use crate::{Operator, Value};

/// A predicate expression node.
///
/// Only `Equal(Field, Literal)` leaves joined by `And`/`Or` are encodable.
/// Other shapes can be built but are rejected by the encoder and evaluator.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A constant operand.
    Literal(Value),
    /// A reference to a registered field, by identifier.
    Field(String),
    /// `lhs == rhs`.
    Equal(Box<Expr>, Box<Expr>),
    /// `lhs && rhs`.
    And(Box<Expr>, Box<Expr>),
    /// `lhs || rhs`.
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// A field reference.
    #[must_use]
    pub fn field(identifier: impl Into<String>) -> Self {
        Self::Field(identifier.into())
    }

    /// A literal operand.
    #[must_use]
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    /// `self == value`, with `value` as a literal.
    #[must_use]
    pub fn eq(self, value: impl Into<Value>) -> Self {
        Self::Equal(Box::new(self), Box::new(Self::literal(value)))
    }

    /// `self && rhs`.
    #[must_use]
    pub fn and(self, rhs: Self) -> Self {
        Self::And(Box::new(self), Box::new(rhs))
    }

    /// `self || rhs`.
    #[must_use]
    pub fn or(self, rhs: Self) -> Self {
        Self::Or(Box::new(self), Box::new(rhs))
    }

    /// Left-fold `exprs` with AND: `[a, b, c]` becomes `(a && b) && c`.
    ///
    /// Returns `None` for an empty input.
    #[must_use]
    pub fn all(exprs: impl IntoIterator<Item = Self>) -> Option<Self> {
        exprs.into_iter().reduce(Self::and)
    }

    /// Left-fold `exprs` with OR. Returns `None` for an empty input.
    #[must_use]
    pub fn any(exprs: impl IntoIterator<Item = Self>) -> Option<Self> {
        exprs.into_iter().reduce(Self::or)
    }

    /// The operator at this node, if it is an operator node.
    #[must_use]
    pub fn operator(&self) -> Option<Operator> {
        match self {
            Self::Equal(..) => Some(Operator::Equal),
            Self::And(..) => Some(Operator::And),
            Self::Or(..) => Some(Operator::Or),
            Self::Literal(_) | Self::Field(_) => None,
        }
    }

    /// Short description of this node's shape, for error messages.
    #[must_use]
    pub fn shape(&self) -> String {
        match self {
            Self::Literal(v) => format!("literal {v}"),
            Self::Field(id) => format!("field reference \"{id}\""),
            Self::Equal(..) => "equality".to_owned(),
            Self::And(..) => "conjunction".to_owned(),
            Self::Or(..) => "disjunction".to_owned(),
        }
    }

    /// Depth of the tree, counting operator nodes. Leaves count as 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Literal(_) | Self::Field(_) => 0,
            Self::Equal(l, r) | Self::And(l, r) | Self::Or(l, r) => 1 + l.depth().max(r.depth()),
        }
    }

    /// Number of `Equal` nodes.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Literal(_) | Self::Field(_) => 0,
            Self::Equal(..) => 1,
            Self::And(l, r) | Self::Or(l, r) => l.leaf_count() + r.leaf_count(),
        }
    }

    /// Number of `And`/`Or` nodes.
    #[must_use]
    pub fn operator_count(&self) -> usize {
        match self {
            Self::Literal(_) | Self::Field(_) | Self::Equal(..) => 0,
            Self::And(l, r) | Self::Or(l, r) => 1 + l.operator_count() + r.operator_count(),
        }
    }

    /// Length of this tree's encoding: three tokens per equality leaf, one per
    /// `And`/`Or`. Only meaningful for encodable trees.
    #[must_use]
    pub fn token_count(&self) -> usize {
        3 * self.leaf_count() + self.operator_count()
    }

    /// Field identifiers referenced by the tree, in prefix order (may repeat).
    #[must_use]
    pub fn fields(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Literal(_) => {}
            Self::Field(id) => out.push(id),
            Self::Equal(l, r) | Self::And(l, r) | Self::Or(l, r) => {
                l.collect_fields(out);
                r.collect_fields(out);
            }
        }
    }
}

impl BitAnd for Expr {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.and(rhs)
    }
}

impl BitOr for Expr {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.or(rhs)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(v) => write!(f, "{v}"),
            Self::Field(id) => f.write_str(id),
            Self::Equal(l, r) => write!(f, "({l} == {r})"),
            Self::And(l, r) => write!(f, "({l} && {r})"),
            Self::Or(l, r) => write!(f, "({l} || {r})"),
        }
    }
}
