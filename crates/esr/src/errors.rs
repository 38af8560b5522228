//! 💀 Errors — the two ways this crate is allowed to ruin your afternoon.
//!
//! 🎬 COLD OPEN — INT. ORM CASTING DEPARTMENT — A TUESDAY
//!
//! A model walks in. It declares `status => 'enum'`. The casting director
//! flips through the binder. There is no `enum`. There has never been an `enum`.
//! Somebody has to tell the model, and that somebody is [`InvalidCastError`].
//!
//! Everything else in this crate is total: missing fields degrade to `None`,
//! unknown suggestion groups come back empty, the show goes on. Only two things
//! can actually fail:
//!
//! - [`SerializationError`]: the items refused to become JSON.
//! - [`InvalidCastError`]: a model asked for a cast nobody has heard of.
//!
//! 🦆 The duck is also immutable. Set once, at construction. Like a tattoo.

use thiserror::Error;

/// 📤 Serializing a collection's items blew up.
///
/// Carries the underlying `serde_json` error as its source so the caller sees
/// exactly which value refused to cooperate. No partial string is ever handed
/// back alongside this; it's all or nothing.
#[derive(Debug, Error)]
#[error("💀 failed to serialize result collection: {source}")]
pub struct SerializationError {
    #[from]
    source: serde_json::Error,
}

impl SerializationError {
    /// 🔍 The serializer's own complaint, for those who like it raw.
    pub fn inner(&self) -> &serde_json::Error {
        &self.source
    }
}

/// 🎭 A model's cast configuration named a cast type that does not exist.
///
/// All four pieces (model type, column, cast type, message) are fixed at
/// construction. There are no setters. Error-reporting pipelines that want
/// fields instead of regexing the message get accessors.
///
/// ```
/// use esr::InvalidCastError;
///
/// let err = InvalidCastError::new("User", "status", "enum");
/// assert_eq!(
///     err.to_string(),
///     "Call to undefined cast [enum] on column [status] in model [User]."
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Call to undefined cast [{cast_kind}] on column [{attribute}] in model [{entity_type}].")]
pub struct InvalidCastError {
    entity_type: String,
    attribute: String,
    cast_kind: String,
}

impl InvalidCastError {
    /// 🏗️ Build one from an already-known model type name.
    pub fn new(
        entity_type: impl Into<String>,
        attribute: impl Into<String>,
        cast_kind: impl Into<String>,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            attribute: attribute.into(),
            cast_kind: cast_kind.into(),
        }
    }

    /// 🏗️ Build one from the offending model itself.
    ///
    /// Only the model's type name is captured, never the model, so the error
    /// outlives whatever instance triggered it. The module path is trimmed off:
    /// `my_app::models::User` is reported as `User`.
    pub fn for_model<M: ?Sized>(
        _model: &M,
        attribute: impl Into<String>,
        cast_kind: impl Into<String>,
    ) -> Self {
        Self::new(short_type_name::<M>(), attribute, cast_kind)
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn cast_kind(&self) -> &str {
        &self.cast_kind
    }

    /// 📜 The formatted diagnostic. Same text as `Display`.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

// -- ✂️ `a::b::Thing<c::D>` → `Thing<c::D>`. Generic args keep their paths; we only trim the head.
fn short_type_name<M: ?Sized>() -> String {
    let full = std::any::type_name::<M>();
    let (path, generics) = full.split_at(full.find('<').unwrap_or(full.len()));
    let base = path.rsplit("::").next().unwrap_or(path);
    format!("{base}{generics}")
}
