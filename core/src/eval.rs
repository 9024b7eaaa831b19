//! Predicate evaluation against records.
//!
//! Two entry points:
//!
//! - [`evaluate`] walks any [`Expr`] and reports shape errors as it finds them.
//! - [`PredicateRunner`] validates a tree once, then evaluates infallibly.
//!
//! Evaluation is pure: neither the record nor the tree is mutated, and the
//! same inputs always give the same answer.

use crate::{CodecError, Expr, FieldDescriptor, FieldRegistry, PredicateTrace, Record, Value, MAX_DEPTH};

/// Evaluate `expr` as a predicate over `record`.
///
/// Both operands of `And`/`Or` are always evaluated, so a malformed right
/// operand is reported even when the left operand decides the result.
///
/// # Errors
///
/// - [`CodecError::NotBoolean`]: a bare `Literal`/`Field` in predicate position
/// - [`CodecError::UnsupportedExpression`]: an `Equal` that is not `Field == Literal`
/// - [`CodecError::UnknownField`]: the field is not registered
/// - [`CodecError::TypeMismatch`]: the literal does not fit the field's kind
/// - [`CodecError::DepthExceeded`]: nesting exceeds [`MAX_DEPTH`]
pub fn evaluate<R>(expr: &Expr, registry: &FieldRegistry<R>, record: &R) -> Result<bool, CodecError> {
    evaluate_node(expr, registry, record, 1)
}

fn evaluate_node<R>(
    expr: &Expr,
    registry: &FieldRegistry<R>,
    record: &R,
    depth: usize,
) -> Result<bool, CodecError> {
    match expr {
        Expr::Equal(lhs, rhs) => {
            CodecError::check_depth(depth, MAX_DEPTH)?;
            let (Expr::Field(id), Expr::Literal(value)) = (lhs.as_ref(), rhs.as_ref()) else {
                return Err(unsupported_equality(lhs, rhs));
            };
            let descriptor = registry.lookup(id)?;
            let literal = descriptor.accept_literal(value)?;
            Ok(descriptor.get(record) == literal)
        }
        Expr::And(lhs, rhs) => {
            CodecError::check_depth(depth, MAX_DEPTH)?;
            let l = evaluate_node(lhs, registry, record, depth + 1)?;
            let r = evaluate_node(rhs, registry, record, depth + 1)?;
            Ok(l && r)
        }
        Expr::Or(lhs, rhs) => {
            CodecError::check_depth(depth, MAX_DEPTH)?;
            let l = evaluate_node(lhs, registry, record, depth + 1)?;
            let r = evaluate_node(rhs, registry, record, depth + 1)?;
            Ok(l || r)
        }
        Expr::Literal(_) | Expr::Field(_) => Err(CodecError::NotBoolean {
            shape: expr.shape(),
        }),
    }
}

fn unsupported_equality(lhs: &Expr, rhs: &Expr) -> CodecError {
    CodecError::UnsupportedExpression {
        shape: format!("equality between {} and {}", lhs.shape(), rhs.shape()),
    }
}

/// A validated predicate bound to a record type's registry.
///
/// Construction checks every field and literal once; afterwards
/// [`matches`](Self::matches) cannot fail.
///
/// # Example
///
/// ```
/// use ordo::{Expr, PredicateRunner, RegistryBuilder};
///
/// struct Monster { hp: i64 }
/// let registry = RegistryBuilder::<Monster>::new()
///     .field("hp", |m: &Monster| m.hp)
///     .build()
///     .unwrap();
///
/// let runner = PredicateRunner::new(Expr::field("hp").eq(100), &registry).unwrap();
/// let monsters = [Monster { hp: 100 }, Monster { hp: 99 }];
/// assert_eq!(runner.filter(&monsters).len(), 1);
/// ```
pub struct PredicateRunner<'r, R> {
    expr: Expr,
    root: Node<'r, R>,
}

/// Compiled form of a validated tree: every leaf holds its resolved
/// descriptor and widened literal, so no shape can be left unchecked.
enum Node<'r, R> {
    Equal {
        descriptor: &'r FieldDescriptor<R>,
        literal: Value,
    },
    And(Box<Node<'r, R>>, Box<Node<'r, R>>),
    Or(Box<Node<'r, R>>, Box<Node<'r, R>>),
}

impl<'r, R> PredicateRunner<'r, R> {
    /// Validate `expr` against `registry` and wrap it for evaluation.
    ///
    /// Literals are widened to their field's kind (e.g. an `Int` literal on a
    /// `Float` field becomes a `Float`).
    ///
    /// # Errors
    ///
    /// Same as [`evaluate`], detected up front for the whole tree.
    pub fn new(expr: Expr, registry: &'r FieldRegistry<R>) -> Result<Self, CodecError> {
        let root = Node::compile(&expr, registry, 1)?;
        Ok(Self {
            expr: root.to_expr(),
            root,
        })
    }

    /// The validated expression.
    #[must_use]
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Consume the runner and return the validated expression.
    #[must_use]
    pub fn into_expr(self) -> Expr {
        self.expr
    }

    /// Evaluate against `record`.
    #[must_use]
    pub fn matches(&self, record: &R) -> bool {
        self.root.matches(record)
    }

    /// Evaluate with a full trace. Both operands of every `And`/`Or` are visited.
    ///
    /// INV: `evaluate_with_trace(r).matched() == matches(r)`.
    #[must_use]
    pub fn evaluate_with_trace(&self, record: &R) -> PredicateTrace {
        self.root.trace(record)
    }

    /// The records in `records` that satisfy the predicate, in order.
    #[must_use]
    pub fn filter<'a>(&self, records: &'a [R]) -> Vec<&'a R> {
        records.iter().filter(|record| self.matches(record)).collect()
    }
}

impl<R: Record> PredicateRunner<'static, R> {
    /// Validate `expr` against `R`'s own registry.
    ///
    /// # Errors
    ///
    /// Same as [`PredicateRunner::new`].
    pub fn for_record(expr: Expr) -> Result<Self, CodecError> {
        Self::new(expr, R::registry())
    }
}

impl<R> std::fmt::Debug for PredicateRunner<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredicateRunner")
            .field("expr", &self.expr)
            .finish_non_exhaustive()
    }
}

impl<'r, R> Node<'r, R> {
    fn compile(expr: &Expr, registry: &'r FieldRegistry<R>, depth: usize) -> Result<Self, CodecError> {
        match expr {
            Expr::Equal(lhs, rhs) => {
                CodecError::check_depth(depth, MAX_DEPTH)?;
                let (Expr::Field(id), Expr::Literal(value)) = (lhs.as_ref(), rhs.as_ref()) else {
                    return Err(unsupported_equality(lhs, rhs));
                };
                let descriptor = registry.lookup(id)?;
                let literal = descriptor.accept_literal(value)?;
                Ok(Self::Equal { descriptor, literal })
            }
            Expr::And(lhs, rhs) => {
                CodecError::check_depth(depth, MAX_DEPTH)?;
                Ok(Self::And(
                    Box::new(Self::compile(lhs, registry, depth + 1)?),
                    Box::new(Self::compile(rhs, registry, depth + 1)?),
                ))
            }
            Expr::Or(lhs, rhs) => {
                CodecError::check_depth(depth, MAX_DEPTH)?;
                Ok(Self::Or(
                    Box::new(Self::compile(lhs, registry, depth + 1)?),
                    Box::new(Self::compile(rhs, registry, depth + 1)?),
                ))
            }
            Expr::Literal(_) | Expr::Field(_) => Err(CodecError::NotBoolean {
                shape: expr.shape(),
            }),
        }
    }

    fn to_expr(&self) -> Expr {
        match self {
            Self::Equal { descriptor, literal } => {
                Expr::field(descriptor.identifier()).eq(literal.clone())
            }
            Self::And(lhs, rhs) => lhs.to_expr().and(rhs.to_expr()),
            Self::Or(lhs, rhs) => lhs.to_expr().or(rhs.to_expr()),
        }
    }

    fn matches(&self, record: &R) -> bool {
        match self {
            Self::Equal { descriptor, literal } => descriptor.get(record) == *literal,
            Self::And(lhs, rhs) => lhs.matches(record) && rhs.matches(record),
            Self::Or(lhs, rhs) => lhs.matches(record) || rhs.matches(record),
        }
    }

    fn trace(&self, record: &R) -> PredicateTrace {
        match self {
            Self::Equal { descriptor, literal } => {
                let actual = descriptor.get(record);
                PredicateTrace::Equal {
                    matched: actual == *literal,
                    field: descriptor.identifier().to_owned(),
                    expected: literal.clone(),
                    actual,
                }
            }
            Self::And(lhs, rhs) => {
                let lhs = lhs.trace(record);
                let rhs = rhs.trace(record);
                PredicateTrace::And {
                    matched: lhs.matched() && rhs.matched(),
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                }
            }
            Self::Or(lhs, rhs) => {
                let lhs = lhs.trace(record);
                let rhs = rhs.trace(record);
                PredicateTrace::Or {
                    matched: lhs.matched() || rhs.matched(),
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                }
            }
        }
    }
}
