//! `Value`: typed scalar data compared by equality leaves
//!
//! Accessors produce `Value`s from a record, and literals carry a `Value` on the
//! right-hand side of an equality. The closed [`ValueKind`] set is what the
//! decoder dispatches on when it turns a wire token back into a literal.
//!
//! # Bridging Rust types
//!
//! [`FieldValue`] maps a concrete Rust field type (`i64`, `String`, ...) onto a
//! `ValueKind`. The registry uses it to monomorphize accessors and literal
//! decoders at registration time.

use std::fmt;

/// The declared kind of a field, and the shape a literal token must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Signed 64-bit integer.
    Int,
    /// UTF-8 text.
    Text,
    /// Boolean.
    Bool,
    /// 64-bit float, compared exactly.
    Float,
}

impl ValueKind {
    /// Stable lower-case name used in error messages.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Text => "text",
            Self::Bool => "bool",
            Self::Float => "float",
        }
    }

    /// Accept `value` as a value of this kind.
    ///
    /// Exact kind matches pass through. The only widening is `Int` → `Float`;
    /// every other cross-kind pair is rejected with `None`.
    ///
    /// ```
    /// use ordo::{Value, ValueKind};
    ///
    /// assert_eq!(ValueKind::Float.accept(&Value::Int(3)), Some(Value::Float(3.0)));
    /// assert_eq!(ValueKind::Int.accept(&Value::Float(3.0)), None);
    /// ```
    #[must_use]
    pub fn accept(self, value: &Value) -> Option<Value> {
        match (self, value) {
            (Self::Int, Value::Int(_))
            | (Self::Text, Value::Text(_))
            | (Self::Bool, Value::Bool(_))
            | (Self::Float, Value::Float(_)) => Some(value.clone()),
            #[allow(clippy::cast_precision_loss)] // JSON producers may drop the ".0"
            (Self::Float, Value::Int(i)) => Some(Value::Float(*i as f64)),
            _ => None,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed scalar value.
///
/// Equality is per-kind native equality: values of different kinds are never
/// equal, and floats compare exactly (no tolerance).
///
/// ```
/// use ordo::Value;
///
/// assert_eq!(Value::from(80), Value::Int(80));
/// assert_ne!(Value::Int(1), Value::Float(1.0));
/// assert_eq!(Value::from("Orc").as_str(), Some("Orc"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Integer data.
    Int(i64),
    /// Text data.
    Text(String),
    /// Boolean data.
    Bool(bool),
    /// Float data.
    Float(f64),
}

impl Value {
    /// The kind of this value.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Int(_) => ValueKind::Int,
            Self::Text(_) => ValueKind::Text,
            Self::Bool(_) => ValueKind::Bool,
            Self::Float(_) => ValueKind::Float,
        }
    }

    /// Returns the integer if this is an `Int`.
    #[inline]
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the text if this is a `Text`.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean if this is a `Bool`.
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the float if this is a `Float`.
    #[inline]
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(x) => Some(*x),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Text(s) => write!(f, "{s:?}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Float(x) => write!(f, "{x:?}"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

/// A Rust type that can back a registered field.
///
/// `from_value` receives a value already accepted by [`Self::KIND`] and
/// returns `None` only when it does not fit the Rust type (e.g. a negative
/// integer for `u32`).
pub trait FieldValue: Sized + Send + Sync + 'static {
    /// The declared kind of fields of this type.
    const KIND: ValueKind;

    /// Convert a field value into a [`Value`].
    fn into_value(self) -> Value;

    /// Narrow an accepted [`Value`] back into this type.
    fn from_value(value: &Value) -> Option<Self>;
}

impl FieldValue for i64 {
    const KIND: ValueKind = ValueKind::Int;

    fn into_value(self) -> Value {
        Value::Int(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_int()
    }
}

impl FieldValue for i32 {
    const KIND: ValueKind = ValueKind::Int;

    fn into_value(self) -> Value {
        Value::from(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_int().and_then(|i| i32::try_from(i).ok())
    }
}

impl FieldValue for u32 {
    const KIND: ValueKind = ValueKind::Int;

    fn into_value(self) -> Value {
        Value::from(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_int().and_then(|i| u32::try_from(i).ok())
    }
}

impl FieldValue for String {
    const KIND: ValueKind = ValueKind::Text;

    fn into_value(self) -> Value {
        Value::Text(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }
}

impl FieldValue for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FieldValue for f64 {
    const KIND: ValueKind = ValueKind::Float;

    fn into_value(self) -> Value {
        Value::Float(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_float()
    }
}
