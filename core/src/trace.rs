//! Evaluation trace for debugging predicate behavior.
//!
//! [`PredicateTrace`] mirrors the [`Expr`](crate::Expr) tree but captures
//! results instead of inputs: for every equality leaf, the value read from the
//! record next to the literal it was compared with.
//!
//! # Example
//!
//! ```ignore
//! let trace = runner.evaluate_with_trace(&monster);
//! println!("{trace}");
//! // && -> false
//!   == level: 80 vs 80 -> true
//!   == hp: 99 vs 100 -> false
//! ```

use std::fmt;

use crate::Value;

/// Trace of a predicate evaluation.
///
/// In And/Or, BOTH operands are evaluated (no short-circuit) for maximum
/// debugging value. The `matched` result is still correct.
#[derive(Debug, Clone, PartialEq)]
pub enum PredicateTrace {
    /// An equality leaf.
    Equal {
        /// Whether the record's value equals the literal.
        matched: bool,
        /// The field identifier.
        field: String,
        /// The literal from the expression.
        expected: Value,
        /// The value read from the record.
        actual: Value,
    },
    /// AND: both operands must match.
    And {
        /// Whether both operands matched.
        matched: bool,
        /// Trace of the left operand.
        lhs: Box<PredicateTrace>,
        /// Trace of the right operand.
        rhs: Box<PredicateTrace>,
    },
    /// OR: either operand must match.
    Or {
        /// Whether either operand matched.
        matched: bool,
        /// Trace of the left operand.
        lhs: Box<PredicateTrace>,
        /// Trace of the right operand.
        rhs: Box<PredicateTrace>,
    },
}

impl PredicateTrace {
    /// Get the overall match result of this node.
    #[must_use]
    pub fn matched(&self) -> bool {
        match self {
            Self::Equal { matched, .. } | Self::And { matched, .. } | Self::Or { matched, .. } => {
                *matched
            }
        }
    }

    /// Equality leaves that did not match, in prefix order.
    #[must_use]
    pub fn mismatches(&self) -> Vec<&Self> {
        let mut out = Vec::new();
        self.collect_mismatches(&mut out);
        out
    }

    fn collect_mismatches<'a>(&'a self, out: &mut Vec<&'a Self>) {
        match self {
            Self::Equal { matched, .. } => {
                if !matched {
                    out.push(self);
                }
            }
            Self::And { lhs, rhs, .. } | Self::Or { lhs, rhs, .. } => {
                lhs.collect_mismatches(out);
                rhs.collect_mismatches(out);
            }
        }
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let pad = "  ".repeat(indent);
        match self {
            Self::Equal {
                matched,
                field,
                expected,
                actual,
            } => writeln!(f, "{pad}== {field}: {actual} vs {expected} -> {matched}"),
            Self::And { matched, lhs, rhs } | Self::Or { matched, lhs, rhs } => {
                let op = if matches!(self, Self::And { .. }) { "&&" } else { "||" };
                writeln!(f, "{pad}{op} -> {matched}")?;
                lhs.write_indented(f, indent + 1)?;
                rhs.write_indented(f, indent + 1)
            }
        }
    }
}

impl fmt::Display for PredicateTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}
