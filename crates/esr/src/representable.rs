// ai
//! 🪞 Representable — the opt-in "I know how to become plain JSON" capability.
//!
//! When a collection is exported, every item gets asked one question: do you
//! have a structured form? Items that answer `Some(value)` are replaced by that
//! value. Items that answer `None` (the default) pass through untouched and get
//! serialized as themselves.
//!
//! ```text
//!   item ──▶ to_structured() ──▶ Some(value) ──▶ Exported::Structured(value)
//!                          └──▶ None        ──▶ Exported::Unchanged(&item)
//! ```
//!
//! Raw hits (`serde_json::Value`) are already as plain as it gets, so they take
//! the pass-through branch. Domain types override [`Representable::to_structured`]
//! when their export shape differs from their `Serialize` impl. 🦆

use serde::{Serialize, Serializer};
use serde_json::Value;

/// 🪞 An item that can be exported from a collection.
///
/// `Serialize` is required because pass-through items are serialized as-is.
/// A collection's `to_array` / `to_json` only exist for item types that
/// implement this trait; an empty `impl Representable for MyDoc {}` opts a
/// `Serialize` type into the pass-through branch.
pub trait Representable: Serialize {
    /// 🔄 The item's structured form, or `None` to be exported unchanged.
    fn to_structured(&self) -> Option<Value> {
        None
    }
}

impl Representable for Value {}

/// 📤 One exported item: either converted, or borrowed from the collection as-is.
#[derive(Debug, Clone, PartialEq)]
pub enum Exported<'a, T> {
    Structured(Value),
    Unchanged(&'a T),
}

impl<'a, T: Representable> Exported<'a, T> {
    pub(crate) fn from_item(item: &'a T) -> Self {
        match item.to_structured() {
            Some(value) => Exported::Structured(value),
            None => Exported::Unchanged(item),
        }
    }
}

impl<T: Serialize> Serialize for Exported<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Exported::Structured(value) => value.serialize(serializer),
            Exported::Unchanged(item) => item.serialize(serializer),
        }
    }
}
