//! Decoder: prefix token stream → `Expr`.
//!
//! Recursive descent over a forward-only [`TokenReader`]. Each call reads one
//! operator token and then exactly as many operands as the operator's fixed
//! arity. For `==` the decoder reads the field identifier first, looks up
//! that field's descriptor, and lets the descriptor decode the literal: the
//! value type is discovered from data, not from the stream.

use crate::{
    CodecError, Expr, FieldRegistry, Operator, Token, TokenReader, TokenStream, MAX_DEPTH,
};

/// Decode `stream` into an expression, type-checking literals against `registry`.
///
/// The stream must hold exactly one complete expression.
///
/// # Errors
///
/// - [`CodecError::TruncatedStream`]: the stream ends mid-expression
/// - [`CodecError::UnknownOperator`]: an operator position holds anything else
/// - [`CodecError::UnknownField`]: a field identifier is not registered
/// - [`CodecError::TypeMismatch`]: a literal does not match its field's kind
/// - [`CodecError::TrailingTokens`]: tokens remain after the expression
/// - [`CodecError::DepthExceeded`]: nesting exceeds [`MAX_DEPTH`]
pub fn decode<R>(stream: &TokenStream, registry: &FieldRegistry<R>) -> Result<Expr, CodecError> {
    Decoder::new(registry).decode(stream)
}

/// Parse a JSON array and decode it.
///
/// # Errors
///
/// Same as [`decode`], plus [`CodecError::Wire`] if `json` is not an array of scalars.
pub fn decode_json<R>(json: &str, registry: &FieldRegistry<R>) -> Result<Expr, CodecError> {
    let stream = TokenStream::from_json(json)?;
    decode(&stream, registry)
}

/// A configured decoder bound to one record type's registry.
///
/// ```
/// use ordo::{CodecError, Decoder, RegistryBuilder, TokenStream};
///
/// struct Flag { on: bool }
/// let registry = RegistryBuilder::<Flag>::new()
///     .field("on", |f: &Flag| f.on)
///     .build()
///     .unwrap();
///
/// let stream = TokenStream::from_json(r#"["||", "==", "on", true, "==", "on", false]"#).unwrap();
/// assert!(Decoder::new(&registry).decode(&stream).is_ok());
/// assert!(matches!(
///     Decoder::new(&registry).with_max_depth(1).decode(&stream),
///     Err(CodecError::DepthExceeded { depth: 2, max: 1 })
/// ));
/// ```
pub struct Decoder<'r, R> {
    registry: &'r FieldRegistry<R>,
    max_depth: usize,
}

impl<R> std::fmt::Debug for Decoder<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Decoder")
            .field("registry", &self.registry)
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

impl<'r, R> Decoder<'r, R> {
    /// Create a decoder with the default depth bound ([`MAX_DEPTH`]).
    #[must_use]
    pub fn new(registry: &'r FieldRegistry<R>) -> Self {
        Self {
            registry,
            max_depth: MAX_DEPTH,
        }
    }

    /// Override the maximum operator nesting depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Decode a whole stream.
    ///
    /// # Errors
    ///
    /// See [`decode`].
    pub fn decode(&self, stream: &TokenStream) -> Result<Expr, CodecError> {
        self.decode_tokens(stream.tokens())
    }

    /// Decode a token slice that must hold exactly one expression.
    ///
    /// # Errors
    ///
    /// See [`decode`].
    pub fn decode_tokens(&self, tokens: &[Token]) -> Result<Expr, CodecError> {
        let mut reader = TokenReader::new(tokens);
        let result = self.decode_node(&mut reader, 1).and_then(|expr| {
            if reader.is_exhausted() {
                Ok(expr)
            } else {
                Err(CodecError::TrailingTokens {
                    consumed: reader.position(),
                    remaining: reader.remaining(),
                })
            }
        });
        match &result {
            Ok(expr) => tracing::debug!(
                tokens = tokens.len(),
                depth = expr.depth(),
                "decoded predicate"
            ),
            Err(err) => tracing::debug!(
                position = reader.position(),
                error = %err,
                "predicate decoding failed"
            ),
        }
        result
    }

    fn decode_node(&self, reader: &mut TokenReader<'_>, depth: usize) -> Result<Expr, CodecError> {
        let op = match reader.next("operator")? {
            Token::Text(code) => Operator::parse(code)?,
            other => {
                return Err(CodecError::UnknownOperator {
                    token: other.to_string(),
                })
            }
        };
        CodecError::check_depth(depth, self.max_depth)?;
        tracing::trace!(op = %op, depth, position = reader.position(), "decode node");

        match op {
            Operator::Equal => self.decode_equal(reader),
            Operator::And => {
                let lhs = self.decode_node(reader, depth + 1)?;
                let rhs = self.decode_node(reader, depth + 1)?;
                Ok(Expr::And(Box::new(lhs), Box::new(rhs)))
            }
            Operator::Or => {
                let lhs = self.decode_node(reader, depth + 1)?;
                let rhs = self.decode_node(reader, depth + 1)?;
                Ok(Expr::Or(Box::new(lhs), Box::new(rhs)))
            }
        }
    }

    fn decode_equal(&self, reader: &mut TokenReader<'_>) -> Result<Expr, CodecError> {
        let descriptor = match reader.next("field identifier")? {
            Token::Text(id) => self.registry.lookup(id)?,
            other => self.registry.lookup(&other.to_string())?,
        };
        let literal = descriptor.decode_literal(reader)?;
        Ok(Expr::Equal(
            Box::new(Expr::Field(descriptor.identifier().to_owned())),
            Box::new(Expr::Literal(literal)),
        ))
    }
}
