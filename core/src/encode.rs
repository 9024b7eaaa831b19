//! Encoder: `Expr` → prefix token stream.
//!
//! Operators are written before their operands (Polish notation). Every
//! operator is binary, so no separators, parentheses or lengths are emitted:
//!
//! | Node | Tokens |
//! |------|--------|
//! | `Equal(Field(id), Literal(v))` | `"=="`, `id`, `v` |
//! | `And(l, r)` | `"&&"`, *l*, *r* |
//! | `Or(l, r)` | `"\|\|"`, *l*, *r* |

use crate::{CodecError, Expr, FieldRegistry, Operator, Token, TokenStream, MAX_DEPTH};

/// Encode `expr` into a token stream using `registry` to validate fields.
///
/// Encoding the same tree twice yields identical streams.
///
/// # Errors
///
/// - [`CodecError::UnknownField`]: a leaf names a field absent from `registry`
/// - [`CodecError::TypeMismatch`]: a literal does not fit its field's kind
/// - [`CodecError::NonFiniteFloat`]: a float literal is NaN or infinite
/// - [`CodecError::UnsupportedExpression`]: a bare `Literal`/`Field`, or an
///   `Equal` whose sides are not `Field` and `Literal`
/// - [`CodecError::DepthExceeded`]: nesting exceeds [`MAX_DEPTH`], the same
///   bound the decoder enforces
pub fn encode<R>(expr: &Expr, registry: &FieldRegistry<R>) -> Result<TokenStream, CodecError> {
    let mut stream = TokenStream::new();
    match encode_node(expr, registry, &mut stream, 1) {
        Ok(()) => {
            tracing::debug!(
                tokens = stream.len(),
                depth = expr.depth(),
                "encoded predicate"
            );
            Ok(stream)
        }
        Err(err) => {
            tracing::debug!(error = %err, "predicate encoding failed");
            Err(err)
        }
    }
}

/// Encode `expr` straight to a compact JSON array.
///
/// # Errors
///
/// Same as [`encode`], plus [`CodecError::Wire`] if serialization fails.
pub fn encode_json<R>(expr: &Expr, registry: &FieldRegistry<R>) -> Result<String, CodecError> {
    encode(expr, registry)?.to_json()
}

fn encode_node<R>(
    expr: &Expr,
    registry: &FieldRegistry<R>,
    out: &mut TokenStream,
    depth: usize,
) -> Result<(), CodecError> {
    if expr.operator().is_some() {
        CodecError::check_depth(depth, MAX_DEPTH)?;
    }
    match expr {
        Expr::Equal(lhs, rhs) => {
            let (Expr::Field(id), Expr::Literal(value)) = (lhs.as_ref(), rhs.as_ref()) else {
                return Err(CodecError::UnsupportedExpression {
                    shape: format!("equality between {} and {}", lhs.shape(), rhs.shape()),
                });
            };
            let descriptor = registry.lookup(id)?;
            let literal = descriptor.accept_literal(value)?;
            tracing::trace!(field = %id, literal = %literal, "encode equality");
            out.push(Operator::Equal);
            out.push(Token::Text(id.clone()));
            out.push(literal);
            Ok(())
        }
        Expr::And(lhs, rhs) | Expr::Or(lhs, rhs) => {
            let op = if matches!(expr, Expr::And(..)) {
                Operator::And
            } else {
                Operator::Or
            };
            tracing::trace!(op = %op, "encode operator");
            out.push(op);
            encode_node(lhs, registry, out, depth + 1)?;
            encode_node(rhs, registry, out, depth + 1)
        }
        Expr::Literal(_) | Expr::Field(_) => Err(CodecError::UnsupportedExpression {
            shape: format!("bare {}", expr.shape()),
        }),
    }
}
