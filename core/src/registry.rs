//! Field registry for type-directed encoding and decoding.
//!
//! A [`FieldRegistry<R>`] maps each field identifier of record type `R` to a
//! [`FieldDescriptor`]: the field's declared [`ValueKind`], an accessor that
//! reads the field from a record, and a literal decoder that turns the next
//! wire token into a value of that kind.
//!
//! # Architecture (early erasure)
//!
//! Each field registers via [`RegistryBuilder::field`] with a concrete Rust type
//! `T: FieldValue`. At registration time `T` is monomorphized into the accessor
//! closure and into plain `fn` pointers for literal checking and decoding, then
//! erased. At decode time the registry is looked up by *name* and the erased
//! decoder recovers the literal's type; no reflection is involved.
//!
//! # Example
//!
//! ```
//! use ordo::{RegistryBuilder, ValueKind};
//!
//! struct Monster { level: i64, name: String }
//!
//! let registry = RegistryBuilder::<Monster>::new()
//!     .field("level", |m: &Monster| m.level)
//!     .field("name", |m: &Monster| m.name.clone())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(registry.len(), 2);
//! assert_eq!(registry.lookup("level").unwrap().kind(), ValueKind::Int);
//! assert!(registry.lookup("ghost").is_err());
//! ```

use std::collections::HashMap;
use std::fmt;

use crate::{CodecError, FieldValue, TokenReader, Value, ValueKind};

// ═══════════════════════════════════════════════════════════════════════════════
// Record
// ═══════════════════════════════════════════════════════════════════════════════

/// A record type with one process-wide field registry.
///
/// Implement this to get "one definition per type" ergonomics: the registry is
/// built once (typically in a `std::sync::OnceLock`) and handed out by reference.
///
/// ```
/// use std::sync::OnceLock;
/// use ordo::{FieldRegistry, Record, RegistryBuilder};
///
/// struct Point { x: i64 }
///
/// impl Record for Point {
///     fn registry() -> &'static FieldRegistry<Self> {
///         static REGISTRY: OnceLock<FieldRegistry<Point>> = OnceLock::new();
///         REGISTRY.get_or_init(|| {
///             RegistryBuilder::new()
///                 .field("x", |p: &Point| p.x)
///                 .build()
///                 .expect("field identifiers are unique")
///         })
///     }
/// }
///
/// assert!(Point::registry().contains("x"));
/// ```
pub trait Record: Sized + 'static {
    /// The registry describing this type's encodable fields.
    fn registry() -> &'static FieldRegistry<Self>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// Descriptor
// ═══════════════════════════════════════════════════════════════════════════════

/// Type-erased accessor closure.
type BoxedAccessor<R> = Box<dyn Fn(&R) -> Value + Send + Sync>;

/// Checks (and widens) a literal against the field's type.
type LiteralCheck = fn(&str, &Value) -> Result<Value, CodecError>;

/// Consumes the next token(s) as a literal of the field's type.
type LiteralDecoder = fn(&str, &mut TokenReader<'_>) -> Result<Value, CodecError>;

/// Everything the codec needs to know about one field.
pub struct FieldDescriptor<R> {
    identifier: String,
    kind: ValueKind,
    accessor: BoxedAccessor<R>,
    check: LiteralCheck,
    decoder: LiteralDecoder,
}

impl<R> FieldDescriptor<R> {
    /// The field identifier used on the wire.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The declared value kind.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Read this field from a record.
    #[must_use]
    pub fn get(&self, record: &R) -> Value {
        (self.accessor)(record)
    }

    /// Validate a literal for this field, widening it to the declared kind.
    ///
    /// # Errors
    ///
    /// - [`CodecError::TypeMismatch`] if the literal's kind is not accepted, or
    ///   the value does not fit the field's Rust type
    /// - [`CodecError::NonFiniteFloat`] for NaN or infinite floats
    pub fn accept_literal(&self, literal: &Value) -> Result<Value, CodecError> {
        (self.check)(&self.identifier, literal)
    }

    /// Consume the next token from `reader` as a literal of this field's kind.
    ///
    /// # Errors
    ///
    /// - [`CodecError::TruncatedStream`] if no token is left
    /// - [`CodecError::TypeMismatch`] if the token's wire shape does not match
    pub fn decode_literal(&self, reader: &mut TokenReader<'_>) -> Result<Value, CodecError> {
        (self.decoder)(&self.identifier, reader)
    }
}

impl<R> fmt::Debug for FieldDescriptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("identifier", &self.identifier)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

fn check_literal<T: FieldValue>(field: &str, literal: &Value) -> Result<Value, CodecError> {
    let accepted = T::KIND
        .accept(literal)
        .ok_or_else(|| CodecError::TypeMismatch {
            field: field.to_owned(),
            expected: T::KIND,
            found: literal.kind().name().to_owned(),
        })?;
    if accepted.as_float().is_some_and(|x| !x.is_finite()) {
        return Err(CodecError::NonFiniteFloat {
            field: field.to_owned(),
        });
    }
    if T::from_value(&accepted).is_none() {
        return Err(CodecError::TypeMismatch {
            field: field.to_owned(),
            expected: T::KIND,
            found: format!("{} out of range ({accepted})", literal.kind()),
        });
    }
    Ok(accepted)
}

fn decode_literal<T: FieldValue>(
    field: &str,
    reader: &mut TokenReader<'_>,
) -> Result<Value, CodecError> {
    let token = reader.next("literal")?;
    check_literal::<T>(field, &token.to_value())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Builder
// ═══════════════════════════════════════════════════════════════════════════════

/// Builder for constructing a [`FieldRegistry`].
///
/// Register every field that may appear in an encodable predicate, then call
/// [`build()`](Self::build). The registry is immutable afterwards.
pub struct RegistryBuilder<R> {
    fields: HashMap<String, FieldDescriptor<R>>,
    duplicates: Vec<String>,
}

impl<R: 'static> RegistryBuilder<R> {
    /// Create a new empty registry builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            fields: HashMap::new(),
            duplicates: Vec::new(),
        }
    }

    /// Register a field backed by Rust type `T`.
    ///
    /// `T` fixes the field's [`ValueKind`] and how its literals are decoded.
    #[must_use]
    pub fn field<T, F>(mut self, identifier: &str, accessor: F) -> Self
    where
        T: FieldValue,
        F: Fn(&R) -> T + Send + Sync + 'static,
    {
        let descriptor = FieldDescriptor {
            identifier: identifier.to_owned(),
            kind: T::KIND,
            accessor: Box::new(move |record: &R| accessor(record).into_value()),
            check: check_literal::<T>,
            decoder: decode_literal::<T>,
        };
        if self
            .fields
            .insert(identifier.to_owned(), descriptor)
            .is_some()
        {
            self.duplicates.push(identifier.to_owned());
        }
        self
    }

    /// Freeze the registry.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::DuplicateField`] naming the first identifier that
    /// was registered more than once.
    pub fn build(self) -> Result<FieldRegistry<R>, CodecError> {
        if let Some(field) = self.duplicates.into_iter().next() {
            return Err(CodecError::DuplicateField { field });
        }
        tracing::debug!(fields = self.fields.len(), "field registry built");
        Ok(FieldRegistry {
            fields: self.fields,
        })
    }
}

impl<R: 'static> Default for RegistryBuilder<R> {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════════════════════════

/// Immutable mapping from field identifier to [`FieldDescriptor`] for one record type.
///
/// Read-only after [`RegistryBuilder::build`]; `Send + Sync`, so one registry
/// serves any number of concurrent encodes, decodes and evaluations.
pub struct FieldRegistry<R> {
    fields: HashMap<String, FieldDescriptor<R>>,
}

impl<R> FieldRegistry<R> {
    /// Look up a field by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnknownField`] listing the registered identifiers.
    pub fn lookup(&self, identifier: &str) -> Result<&FieldDescriptor<R>, CodecError> {
        self.fields
            .get(identifier)
            .ok_or_else(|| CodecError::UnknownField {
                field: identifier.to_owned(),
                available: self.identifiers().into_iter().map(str::to_owned).collect(),
            })
    }

    /// Look up a field by identifier, returning `None` if it is not registered.
    #[must_use]
    pub fn get(&self, identifier: &str) -> Option<&FieldDescriptor<R>> {
        self.fields.get(identifier)
    }

    /// Returns `true` if the identifier is registered.
    #[must_use]
    pub fn contains(&self, identifier: &str) -> bool {
        self.fields.contains_key(identifier)
    }

    /// Returns the number of registered fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if no fields are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns all registered identifiers (sorted).
    #[must_use]
    pub fn identifiers(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Iterate over descriptors in identifier order.
    pub fn descriptors(&self) -> impl Iterator<Item = &FieldDescriptor<R>> {
        let mut descriptors: Vec<&FieldDescriptor<R>> = self.fields.values().collect();
        descriptors.sort_unstable_by(|a, b| a.identifier.cmp(&b.identifier));
        descriptors.into_iter()
    }
}

impl<R> fmt::Debug for FieldRegistry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.descriptors().map(|d| (d.identifier(), d.kind())))
            .finish()
    }
}
