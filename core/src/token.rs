//! Wire tokens: the flat, prefix-ordered form of an expression
//!
//! A [`TokenStream`] is a plain sequence of scalars. On the wire it is a JSON
//! array such as:
//!
//! ```json
//! ["&&", "==", "level", 80, "==", "name", "Orc"]
//! ```
//!
//! There are no length prefixes and no delimiters. Every [`Operator`] has a
//! fixed arity, so the stream is consumed strictly left-to-right by a
//! [`TokenReader`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{CodecError, Value};

/// An operator code in the token stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `==`: field equals literal.
    Equal,
    /// `&&`: logical AND.
    And,
    /// `||`: logical OR.
    Or,
}

impl Operator {
    /// The wire spelling of this operator.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "==",
            Self::And => "&&",
            Self::Or => "||",
        }
    }

    /// Parse a wire operator code.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnknownOperator`] for anything outside `==`, `&&`, `||`.
    pub fn parse(code: &str) -> Result<Self, CodecError> {
        match code {
            "==" => Ok(Self::Equal),
            "&&" => Ok(Self::And),
            "||" => Ok(Self::Or),
            other => Err(CodecError::UnknownOperator {
                token: other.to_owned(),
            }),
        }
    }

    /// Number of operands.
    ///
    /// Fixed at 2 for every operator. The wire format relies on this: adding
    /// a variable-arity operator requires an explicit count token.
    #[must_use]
    pub fn arity(self) -> usize {
        2
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scalar unit of the token stream.
///
/// Operators and field identifiers travel as `Text`; literals travel in
/// their native scalar form. Serialized untagged, so `Token::Int(80)` is
/// just `80` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Token {
    /// A string: operator code, field identifier, or text literal.
    Text(String),
    /// A boolean literal.
    Bool(bool),
    /// An integer literal.
    Int(i64),
    /// A float literal.
    Float(f64),
}

impl Token {
    /// Short name of the token's wire shape, for error messages.
    #[must_use]
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
        }
    }

    /// Returns the string if this is a `Text` token.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Interpret this token as an untyped literal value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Text(s) => Value::Text(s.clone()),
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(i) => Value::Int(*i),
            Self::Float(x) => Value::Float(*x),
        }
    }
}

impl From<Operator> for Token {
    fn from(op: Operator) -> Self {
        Self::Text(op.as_str().to_owned())
    }
}

impl From<Value> for Token {
    fn from(value: Value) -> Self {
        match value {
            Value::Int(i) => Self::Int(i),
            Value::Text(s) => Self::Text(s),
            Value::Bool(b) => Self::Bool(b),
            Value::Float(x) => Self::Float(x),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
        }
    }
}

/// An ordered sequence of tokens.
///
/// ```
/// use ordo::{Token, TokenStream};
///
/// let stream = TokenStream::from_json(r#"["==", "level", 80]"#).unwrap();
/// assert_eq!(stream.len(), 3);
/// assert_eq!(stream.tokens()[2], Token::Int(80));
/// assert_eq!(stream.to_json().unwrap(), r#"["==","level",80]"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Create an empty stream.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a token.
    pub fn push(&mut self, token: impl Into<Token>) {
        self.tokens.push(token.into());
    }

    /// The tokens, in order.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Number of tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns `true` if the stream holds no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Iterate over the tokens.
    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    /// Consume the stream and return the underlying tokens.
    #[must_use]
    pub fn into_vec(self) -> Vec<Token> {
        self.tokens
    }

    /// A fresh reader positioned at the first token.
    #[must_use]
    pub fn reader(&self) -> TokenReader<'_> {
        TokenReader::new(&self.tokens)
    }

    /// Parse a stream from a JSON array of scalars.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Wire`] if the input is not a JSON array or holds
    /// a non-scalar element (null, array, object).
    pub fn from_json(json: &str) -> Result<Self, CodecError> {
        serde_json::from_str(json).map_err(CodecError::wire)
    }

    /// Convert an already-parsed JSON value into a stream.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Wire`] under the same conditions as [`Self::from_json`].
    pub fn from_json_value(value: serde_json::Value) -> Result<Self, CodecError> {
        serde_json::from_value(value).map_err(CodecError::wire)
    }

    /// Parse a stream from a YAML sequence of scalars.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Wire`] if the input is not a YAML sequence of scalars.
    #[cfg(feature = "yaml")]
    pub fn from_yaml(yaml: &str) -> Result<Self, CodecError> {
        serde_yaml::from_str(yaml).map_err(CodecError::wire)
    }

    /// Serialize the stream as a compact JSON array.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Wire`] if serialization fails.
    pub fn to_json(&self) -> Result<String, CodecError> {
        serde_json::to_string(self).map_err(CodecError::wire)
    }
}

impl From<Vec<Token>> for TokenStream {
    fn from(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }
}

impl FromIterator<Token> for TokenStream {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

/// Forward-only cursor over a token slice.
///
/// Tokens are handed out strictly left-to-right. There is no rewinding: the
/// position after one operand is where the next operand starts.
#[derive(Debug, Clone)]
pub struct TokenReader<'a> {
    tokens: &'a [Token],
    position: usize,
}

impl<'a> TokenReader<'a> {
    /// Create a reader over `tokens`.
    #[must_use]
    pub fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// Take the next token.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::TruncatedStream`] naming what was `expected`
    /// when the stream is exhausted.
    pub fn next(&mut self, expected: &'static str) -> Result<&'a Token, CodecError> {
        let token = self
            .tokens
            .get(self.position)
            .ok_or(CodecError::TruncatedStream {
                position: self.position,
                expected,
            })?;
        self.position += 1;
        Ok(token)
    }

    /// Number of tokens consumed so far.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of tokens not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.tokens.len() - self.position
    }

    /// Returns `true` once every token has been consumed.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }
}
