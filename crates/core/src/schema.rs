//! Schema contracts — how a parsed JSON value becomes a typed result.
//!
//! The retrieval loop treats a schema as an opaque validator: it hands over a
//! parsed [`serde_json::Value`] and receives either the typed output or a
//! [`SchemaViolation`] whose message is shown back to the model.
//!
//! Two ready-made contracts are provided:
//! - [`Typed<T>`] for any `T: DeserializeOwned + Validate` (the common case)
//! - [`FnSchema`] for ad-hoc validator closures

use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Why a JSON value was rejected by a schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct SchemaViolation {
    message: String,
}

impl SchemaViolation {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// A violation attributed to one field.
    pub fn at(field: &str, message: impl fmt::Display) -> Self {
        Self::new(format!("field `{field}`: {message}"))
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<serde_json::Error> for SchemaViolation {
    fn from(err: serde_json::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// A structural contract for the model's output.
pub trait SchemaContract: Send + Sync {
    /// The typed result produced by a successful validation.
    type Output;

    /// Name used in logs.
    fn name(&self) -> &str;

    /// Whether bare JSON values (numbers, strings, arrays, ...) may be
    /// validated. When `false`, anything other than an object is rejected
    /// before [`validate`](Self::validate) is called.
    fn accepts_non_object(&self) -> bool {
        false
    }

    /// Check a parsed value and convert it into the typed output.
    fn validate(&self, value: Value) -> Result<Self::Output, SchemaViolation>;
}

/// Constraints that deserialization alone cannot express
/// (list lengths, cross-field rules).
pub trait Validate {
    fn validate(&self) -> Result<(), SchemaViolation> {
        Ok(())
    }
}

/// Schema contract backed by a serde type.
///
/// The value is deserialized into `T` (types, required fields, enumerations,
/// [`BoundedText`] lengths) and then checked with [`Validate`].
pub struct Typed<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Typed<T> {
    pub fn new() -> Self {
        let full = std::any::type_name::<T>();
        Self {
            name: full.rsplit("::").next().unwrap_or(full),
            _marker: PhantomData,
        }
    }

    pub fn named(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }
}

impl<T> Default for Typed<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Typed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Typed").field("name", &self.name).finish()
    }
}

impl<T: DeserializeOwned + Validate> SchemaContract for Typed<T> {
    type Output = T;

    fn name(&self) -> &str {
        self.name
    }

    fn validate(&self, value: Value) -> Result<T, SchemaViolation> {
        let output: T = serde_json::from_value(value)?;
        Validate::validate(&output)?;
        Ok(output)
    }
}

/// Schema contract backed by a validator closure.
pub struct FnSchema<F> {
    name: String,
    accepts_non_object: bool,
    validator: F,
}

impl<F> FnSchema<F> {
    pub fn from_fn(name: impl Into<String>, validator: F) -> Self {
        Self {
            name: name.into(),
            accepts_non_object: false,
            validator,
        }
    }

    /// Let arrays and scalar values through to the validator.
    pub fn accepting_non_objects(mut self) -> Self {
        self.accepts_non_object = true;
        self
    }
}

impl<F, T> SchemaContract for FnSchema<F>
where
    F: Fn(Value) -> Result<T, SchemaViolation> + Send + Sync,
{
    type Output = T;

    fn name(&self) -> &str {
        &self.name
    }

    fn accepts_non_object(&self) -> bool {
        self.accepts_non_object
    }

    fn validate(&self, value: Value) -> Result<T, SchemaViolation> {
        (self.validator)(value)
    }
}

/// A string trimmed of surrounding whitespace and limited to `MAX` characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BoundedText<const MAX: usize>(String);

impl<const MAX: usize> BoundedText<MAX> {
    pub const MAX_CHARS: usize = MAX;

    pub fn new(value: impl AsRef<str>) -> Result<Self, SchemaViolation> {
        let trimmed = value.as_ref().trim();
        let count = trimmed.chars().count();
        if count > MAX {
            return Err(SchemaViolation::new(format!(
                "string should have at most {MAX} characters, got {count}"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl<const MAX: usize> Deref for BoundedText<MAX> {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl<const MAX: usize> AsRef<str> for BoundedText<MAX> {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<const MAX: usize> fmt::Display for BoundedText<MAX> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<const MAX: usize> Serialize for BoundedText<MAX> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de, const MAX: usize> Deserialize<'de> for BoundedText<MAX> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(de::Error::custom)
    }
}
