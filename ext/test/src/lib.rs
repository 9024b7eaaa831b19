//! ordo-test: Reference record domain for conformance testing
//!
//! Provides two record types with process-wide registries, covering every
//! value kind the codec supports:
//!
//! - [`Monster`]: `level: int`, `name: text`, `hp: int`, `mana: int`
//! - [`Relic`]: `name: text`, `weight: float`, `cursed: bool`, `tier: int` (`u32`)
//!
//! # Example
//!
//! ```
//! use ordo_test::prelude::*;
//!
//! let orc = Monster::from_pairs([("level", "80"), ("name", "Orc"), ("hp", "100")]).unwrap();
//! assert_eq!(orc.level, 80);
//!
//! let expr = Expr::field("name").eq("Orc") & Expr::field("hp").eq(100);
//! let runner = PredicateRunner::<Monster>::for_record(expr).unwrap();
//! assert!(runner.matches(&orc));
//! ```

use std::sync::OnceLock;

use ordo::{CodecError, FieldRegistry, FieldValue, Record, RegistryBuilder, Value, ValueKind};

#[cfg(feature = "fixtures")]
pub mod fixture;

// ═══════════════════════════════════════════════════════════════════════════════
// Record assembly
// ═══════════════════════════════════════════════════════════════════════════════

/// A [`Record`] that can be assembled field-by-field from loose values.
///
/// Used by fixtures and the CLI, which receive records as `name → value` maps.
/// Fields not mentioned keep their `Default` value.
pub trait RecordFixture: Record + Default {
    /// Overwrite one field.
    ///
    /// # Errors
    ///
    /// - [`CodecError::UnknownField`] if `field` is not registered
    /// - [`CodecError::TypeMismatch`] if `value` does not fit the field
    fn set_field(&mut self, field: &str, value: Value) -> Result<(), CodecError>;

    /// Build a record from typed values.
    ///
    /// # Errors
    ///
    /// Same as [`set_field`](Self::set_field).
    fn from_values<'a>(
        values: impl IntoIterator<Item = (&'a str, Value)>,
    ) -> Result<Self, CodecError> {
        let mut record = Self::default();
        for (field, value) in values {
            record.set_field(field, value)?;
        }
        Ok(record)
    }

    /// Build a record from raw strings, parsing each by its field's kind.
    ///
    /// # Errors
    ///
    /// Same as [`set_field`](Self::set_field); unparseable text is a
    /// [`CodecError::TypeMismatch`].
    fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<Self, CodecError> {
        let mut record = Self::default();
        for (field, raw) in pairs {
            let kind = Self::registry().lookup(field)?.kind();
            let value = parse_value(kind, raw).ok_or_else(|| CodecError::TypeMismatch {
                field: field.to_owned(),
                expected: kind,
                found: format!("{raw:?}"),
            })?;
            record.set_field(field, value)?;
        }
        Ok(record)
    }
}

/// Parse raw text as a value of `kind`.
///
/// ```
/// use ordo::{Value, ValueKind};
/// use ordo_test::parse_value;
///
/// assert_eq!(parse_value(ValueKind::Int, "80"), Some(Value::Int(80)));
/// assert_eq!(parse_value(ValueKind::Bool, "yes"), None);
/// ```
#[must_use]
pub fn parse_value(kind: ValueKind, raw: &str) -> Option<Value> {
    match kind {
        ValueKind::Int => raw.parse().ok().map(Value::Int),
        ValueKind::Text => Some(Value::Text(raw.to_owned())),
        ValueKind::Bool => raw.parse().ok().map(Value::Bool),
        ValueKind::Float => raw.parse().ok().map(Value::Float),
    }
}

/// Check `value` against `R`'s registered field and narrow it to `T`.
fn take<R: Record, T: FieldValue>(field: &str, value: &Value) -> Result<T, CodecError> {
    let accepted = R::registry().lookup(field)?.accept_literal(value)?;
    T::from_value(&accepted).ok_or_else(|| CodecError::TypeMismatch {
        field: field.to_owned(),
        expected: T::KIND,
        found: accepted.kind().name().to_owned(),
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// Monster
// ═══════════════════════════════════════════════════════════════════════════════

/// A game monster: all-integer stats plus a name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Monster {
    pub level: i64,
    pub name: String,
    pub hp: i64,
    pub mana: i64,
}

impl Monster {
    /// Create a monster.
    pub fn new(level: i64, name: impl Into<String>, hp: i64, mana: i64) -> Self {
        Self {
            level,
            name: name.into(),
            hp,
            mana,
        }
    }
}

impl Record for Monster {
    fn registry() -> &'static FieldRegistry<Self> {
        static REGISTRY: OnceLock<FieldRegistry<Monster>> = OnceLock::new();
        REGISTRY.get_or_init(|| {
            register_monster(RegistryBuilder::new())
                .build()
                .expect("monster field identifiers are unique")
        })
    }
}

impl RecordFixture for Monster {
    fn set_field(&mut self, field: &str, value: Value) -> Result<(), CodecError> {
        match field {
            "level" => self.level = take::<Self, _>(field, &value)?,
            "name" => self.name = take::<Self, _>(field, &value)?,
            "hp" => self.hp = take::<Self, _>(field, &value)?,
            "mana" => self.mana = take::<Self, _>(field, &value)?,
            other => {
                Self::registry().lookup(other)?;
            }
        }
        Ok(())
    }
}

/// Register [`Monster`] fields with the given builder.
///
/// - `level`, `hp`, `mana` → int
/// - `name` → text
#[must_use]
pub fn register_monster(builder: RegistryBuilder<Monster>) -> RegistryBuilder<Monster> {
    builder
        .field("level", |m: &Monster| m.level)
        .field("name", |m: &Monster| m.name.clone())
        .field("hp", |m: &Monster| m.hp)
        .field("mana", |m: &Monster| m.mana)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Relic
// ═══════════════════════════════════════════════════════════════════════════════

/// A loot item, exercising the float, bool and narrow-integer kinds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Relic {
    pub name: String,
    pub weight: f64,
    pub cursed: bool,
    pub tier: u32,
}

impl Record for Relic {
    fn registry() -> &'static FieldRegistry<Self> {
        static REGISTRY: OnceLock<FieldRegistry<Relic>> = OnceLock::new();
        REGISTRY.get_or_init(|| {
            register_relic(RegistryBuilder::new())
                .build()
                .expect("relic field identifiers are unique")
        })
    }
}

impl RecordFixture for Relic {
    fn set_field(&mut self, field: &str, value: Value) -> Result<(), CodecError> {
        match field {
            "name" => self.name = take::<Self, _>(field, &value)?,
            "weight" => self.weight = take::<Self, _>(field, &value)?,
            "cursed" => self.cursed = take::<Self, _>(field, &value)?,
            "tier" => self.tier = take::<Self, _>(field, &value)?,
            other => {
                Self::registry().lookup(other)?;
            }
        }
        Ok(())
    }
}

/// Register [`Relic`] fields with the given builder.
///
/// - `name` → text, `weight` → float, `cursed` → bool, `tier` → int (0..=u32::MAX)
#[must_use]
pub fn register_relic(builder: RegistryBuilder<Relic>) -> RegistryBuilder<Relic> {
    builder
        .field("name", |r: &Relic| r.name.clone())
        .field("weight", |r: &Relic| r.weight)
        .field("cursed", |r: &Relic| r.cursed)
        .field("tier", |r: &Relic| r.tier)
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{parse_value, Monster, RecordFixture, Relic};
    pub use ordo::prelude::*;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monster_registry_fields() {
        let registry = Monster::registry();
        assert_eq!(registry.identifiers(), vec!["hp", "level", "mana", "name"]);
        assert_eq!(registry.lookup("name").unwrap().kind(), ValueKind::Text);
    }

    #[test]
    fn registry_is_built_once() {
        assert!(std::ptr::eq(Monster::registry(), Monster::registry()));
    }

    #[test]
    fn from_pairs_parses_by_kind() {
        let relic = Relic::from_pairs([
            ("name", "Chalice"),
            ("weight", "2.5"),
            ("cursed", "true"),
            ("tier", "3"),
        ])
        .unwrap();
        assert_eq!(
            relic,
            Relic {
                name: "Chalice".into(),
                weight: 2.5,
                cursed: true,
                tier: 3,
            }
        );
    }

    #[test]
    fn from_pairs_errors() {
        assert!(matches!(
            Monster::from_pairs([("level", "high")]),
            Err(CodecError::TypeMismatch { .. })
        ));
        assert!(matches!(
            Monster::from_pairs([("ghost", "1")]),
            Err(CodecError::UnknownField { .. })
        ));
        assert!(matches!(
            Relic::from_pairs([("tier", "-1")]),
            Err(CodecError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn from_values_widens_int_weight() {
        let relic = Relic::from_values([("weight", Value::Int(4))]).unwrap();
        assert!((relic.weight - 4.0).abs() < f64::EPSILON);
        assert_eq!(relic.name, "");
    }

    #[test]
    fn parse_value_kinds() {
        assert_eq!(parse_value(ValueKind::Float, "1"), Some(Value::Float(1.0)));
        assert_eq!(parse_value(ValueKind::Text, "80"), Some(Value::from("80")));
        assert_eq!(parse_value(ValueKind::Int, "1.5"), None);
    }
}
