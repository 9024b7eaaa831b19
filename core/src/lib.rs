//! ordo - Prefix token codec for typed predicate expressions
//!
//! Converts a typed boolean expression (field equality leaves joined by AND/OR)
//! into a flat, prefix-ordered token stream, and rebuilds an equivalent,
//! type-checked, evaluable expression from such a stream.
//!
//! # Architecture
//!
//! - [`Value`] / [`ValueKind`]: Typed scalars and their closed kind set
//! - [`FieldRegistry<R>`]: Per-record-type `identifier → (kind, accessor, literal decoder)`
//! - [`Expr`]: The expression tree: Literal, Field, Equal, And, Or
//! - [`encode`]: `Expr` → [`TokenStream`] (Polish notation, no arity markers)
//! - [`decode`]: [`TokenStream`] → `Expr`, dispatching on field names to value kinds
//! - [`PredicateRunner<R>`]: Validated `Expr` evaluated against records
//!
//! # Key Design Insights
//!
//! 1. **Implicit arity**: every [`Operator`] takes exactly two operands, so the
//!    stream needs no lengths or delimiters. The reader position after the left
//!    operand is where the right operand begins.
//!
//! 2. **Type-directed decode**: the decoder learns a literal's type only after
//!    reading the field identifier, by asking that field's descriptor how to
//!    decode the next token.
//!
//! 3. **Registries are values**: built once per record type, immutable, and
//!    shared freely across threads.
//!
//! # Example
//!
//! ```
//! use ordo::prelude::*;
//!
//! struct Monster { level: i64, name: String }
//!
//! let registry = RegistryBuilder::<Monster>::new()
//!     .field("level", |m: &Monster| m.level)
//!     .field("name", |m: &Monster| m.name.clone())
//!     .build()
//!     .unwrap();
//!
//! let expr = Expr::field("level").eq(80) & Expr::field("name").eq("Orc");
//! let stream = encode(&expr, &registry).unwrap();
//! assert_eq!(stream.to_json().unwrap(), r#"["&&","==","level",80,"==","name","Orc"]"#);
//!
//! let decoded = decode(&stream, &registry).unwrap();
//! assert_eq!(decoded, expr);
//!
//! let runner = PredicateRunner::new(decoded, &registry).unwrap();
//! assert!(runner.matches(&Monster { level: 80, name: "Orc".into() }));
//! assert!(!runner.matches(&Monster { level: 79, name: "Orc".into() }));
//! ```

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod decode;
mod encode;
mod eval;
mod expr;
mod registry;
mod token;
mod trace;
mod value;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

pub use decode::{decode, decode_json, Decoder};
pub use encode::{encode, encode_json};
pub use eval::{evaluate, PredicateRunner};
pub use expr::Expr;
pub use registry::{FieldDescriptor, FieldRegistry, Record, RegistryBuilder};
pub use token::{Operator, Token, TokenReader, TokenStream};
pub use trace::PredicateTrace;
pub use value::{FieldValue, Value, ValueKind};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use ordo::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Codec
        decode,
        encode,
        evaluate,
        // Errors
        CodecError,
        // Core types
        Expr,
        FieldRegistry,
        FieldValue,
        Operator,
        PredicateRunner,
        PredicateTrace,
        Record,
        RegistryBuilder,
        Token,
        TokenStream,
        Value,
        ValueKind,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum operator nesting (`==` counts as one level).
///
/// Every recursive walk checks this bound before descending: the encoder,
/// [`evaluate`], [`PredicateRunner::new`] and the decoder. A tree the encoder
/// accepts therefore always decodes, and neither a long `&&` run in a stream
/// nor a long builder chain can exhaust the stack. The decoder bound can be
/// changed via [`Decoder::with_max_depth`].
pub const MAX_DEPTH: usize = 64;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from encoding, decoding, and evaluating expressions.
///
/// All of these are deterministic structural errors. Retrying with the same
/// input yields the same error; fix the expression, stream, or registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// A field identifier is not registered for the record type.
    #[error("unknown field \"{field}\"{}", list_available(.available))]
    UnknownField {
        /// The unregistered identifier.
        field: String,
        /// Identifiers that ARE registered (for self-correcting error messages).
        available: Vec<String>,
    },

    /// An operator position held something other than `==`, `&&`, `||`.
    #[error("unknown operator \"{token}\", expected one of \"==\", \"&&\", \"||\"")]
    UnknownOperator {
        /// The offending token, rendered as text.
        token: String,
    },

    /// A literal's shape does not match the field's declared kind.
    #[error("field \"{field}\" expects {expected}, found {found}")]
    TypeMismatch {
        /// The field whose kind was violated.
        field: String,
        /// The declared kind.
        expected: ValueKind,
        /// What was found instead (a kind name or `"<kind> out of range"`).
        found: String,
    },

    /// The stream ended before a node was complete.
    #[error("token stream ended at position {position} while expecting {expected}")]
    TruncatedStream {
        /// Tokens consumed before the stream ran out.
        position: usize,
        /// What the decoder was about to read.
        expected: &'static str,
    },

    /// The outermost node was complete but tokens remained.
    #[error("{remaining} trailing token(s) after a complete expression of {consumed} token(s)")]
    TrailingTokens {
        /// Tokens consumed by the complete expression.
        consumed: usize,
        /// Tokens left over.
        remaining: usize,
    },

    /// The expression shape is outside the encodable grammar.
    #[error("unsupported expression: {shape}")]
    UnsupportedExpression {
        /// Description of the offending shape.
        shape: String,
    },

    /// A non-boolean node was used where a predicate was required.
    #[error("{shape} is not a boolean predicate")]
    NotBoolean {
        /// Description of the offending node.
        shape: String,
    },

    /// A registry builder saw the same identifier twice.
    #[error("field \"{field}\" is registered more than once")]
    DuplicateField {
        /// The repeated identifier.
        field: String,
    },

    /// Operator nesting exceeded [`MAX_DEPTH`] (or a decoder's own bound).
    #[error("expression nesting depth exceeds {max} (reached {depth})")]
    DepthExceeded {
        /// Depth at which the walk stopped.
        depth: usize,
        /// Maximum allowed depth.
        max: usize,
    },

    /// A float literal is NaN or infinite and has no wire form.
    #[error("field \"{field}\" has a non-finite float literal")]
    NonFiniteFloat {
        /// The field being compared.
        field: String,
    },

    /// The wire payload could not be parsed or produced.
    #[error("invalid token stream: {reason}")]
    Wire {
        /// The underlying serializer message.
        reason: String,
    },
}

impl CodecError {
    /// Stable `snake_case` code for this error kind, e.g. `"unknown_field"`.
    ///
    /// Used by conformance fixtures and the CLI to name expected failures.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownField { .. } => "unknown_field",
            Self::UnknownOperator { .. } => "unknown_operator",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::TruncatedStream { .. } => "truncated_stream",
            Self::TrailingTokens { .. } => "trailing_tokens",
            Self::UnsupportedExpression { .. } => "unsupported_expression",
            Self::NotBoolean { .. } => "not_boolean",
            Self::DuplicateField { .. } => "duplicate_field",
            Self::DepthExceeded { .. } => "depth_exceeded",
            Self::NonFiniteFloat { .. } => "non_finite_float",
            Self::Wire { .. } => "wire",
        }
    }

    /// `Err(DepthExceeded)` once `depth` is past `max`.
    pub(crate) fn check_depth(depth: usize, max: usize) -> Result<(), Self> {
        if depth > max {
            return Err(Self::DepthExceeded { depth, max });
        }
        Ok(())
    }

    pub(crate) fn wire(err: impl std::fmt::Display) -> Self {
        Self::Wire {
            reason: err.to_string(),
        }
    }
}

fn list_available(available: &[String]) -> String {
    if available.is_empty() {
        "; no fields are registered".to_owned()
    } else {
        format!("; registered: {}", available.join(", "))
    }
}
