// ai
//! 📦 ResultCollection — the hits, plus everything ES whispered alongside them.
//!
//! 🎬 COLD OPEN — INT. SEARCH RESULTS PAGE — PRODUCTION — 11:58 PM
//!
//! The page shows ten results. The footer says "about 0 results." The scroll
//! cursor fell on the floor somewhere between the controller and the template.
//! The aggregations were "too nested" so someone `json_encode`d them into a
//! string and left. The suggestions never made it at all.
//!
//! This module is the container that doesn't lose things. A raw search
//! response goes in; out comes an ordered list of hits plus a frozen
//! [`SearchMetadata`] carrying total, max score, took, timed_out, the scroll
//! id, shard stats, suggestion groups and aggregations.
//!
//! ## Knowledge Graph 🧠
//! - Decoding rules: `response.rs` ([`SearchMetadata::from_response`])
//! - Suggestion containers: `suggestions.rs` ([`SuggestionGroup`])
//! - Export: `representable.rs` ([`Representable`], [`Exported`])
//! - Failure: only [`ResultCollection::to_json`] can fail ([`SerializationError`])
//!
//! ## The metadata rule 📜
//! Metadata is read-only. `map` and `filter` hand back a collection with NO
//! metadata: a filtered page of 3 hits does not get to claim `total = 10000`.
//! If you want the metadata on the derived collection, re-attach it yourself
//! with [`ResultCollection::with_metadata`]. Explicit beats surprising. 🦆

use std::time::Duration;

use serde_json::{Map, Value};
use tracing::trace;

use crate::errors::SerializationError;
use crate::representable::{Exported, Representable};
use crate::response::{MissingFieldPolicy, SearchMetadata, ShardStats, TotalField, TotalRelation};
use crate::suggestions::SuggestionGroup;

/// 📦 A page of search hits and the response metadata that came with it.
///
/// `T` defaults to raw hits (`serde_json::Value`). Swap in domain types with
/// [`from_response_with_items`](Self::from_response_with_items), or any
/// `T: From<Value>` with [`from_response`](Self::from_response).
#[derive(Debug, Clone, PartialEq)]
pub struct ResultCollection<T = Value> {
    items: Vec<T>,
    meta: SearchMetadata,
}

impl<T> Default for ResultCollection<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T: From<Value>> ResultCollection<T> {
    /// 📡 Build a collection from a raw search response.
    ///
    /// Items come from `items` if given, otherwise from `hits.hits` (each hit
    /// converted with `T::from`), otherwise nothing. Metadata always comes from
    /// the response. Never fails; missing fields are simply absent.
    pub fn from_response(response: &Value, items: Option<Vec<T>>) -> Self {
        Self::from_response_with_policy(response, items, MissingFieldPolicy::default())
    }

    /// 🎛️ Same as [`from_response`](Self::from_response), with an explicit
    /// answer to "what does a missing field become?".
    pub fn from_response_with_policy(
        response: &Value,
        items: Option<Vec<T>>,
        policy: MissingFieldPolicy,
    ) -> Self {
        let items = items.unwrap_or_else(|| {
            response
                .get("hits")
                .and_then(|hits| hits.get("hits"))
                .and_then(Value::as_array)
                .map(|hits| hits.iter().cloned().map(T::from).collect())
                .unwrap_or_default()
        });
        Self::from_parts(items, SearchMetadata::from_response(response, policy))
    }
}

impl<T> ResultCollection<T> {
    /// 🫙 Items only. No metadata, because nobody told us any.
    pub fn new(items: Vec<T>) -> Self {
        Self::from_parts(items, SearchMetadata::default())
    }

    /// 🧩 Items and metadata, assembled by hand.
    pub fn from_parts(items: Vec<T>, meta: SearchMetadata) -> Self {
        trace!(
            "📦 result collection assembled: {} items, total {:?}",
            items.len(),
            meta.total()
        );
        Self { items, meta }
    }

    /// 🔀 Caller-supplied items (already-hydrated domain objects, usually) with
    /// every bit of metadata inherited from the raw response.
    pub fn from_response_with_items(response: &Value, items: Vec<T>) -> Self {
        Self::from_response_with_items_and_policy(response, items, MissingFieldPolicy::default())
    }

    /// 🎛️ [`from_response_with_items`](Self::from_response_with_items), with the
    /// missing-field policy spelled out.
    pub fn from_response_with_items_and_policy(
        response: &Value,
        items: Vec<T>,
        policy: MissingFieldPolicy,
    ) -> Self {
        Self::from_parts(items, SearchMetadata::from_response(response, policy))
    }

    /// 🔁 Re-attach metadata to a derived collection. On purpose. With intent.
    pub fn with_metadata(self, meta: SearchMetadata) -> Self {
        Self { items: self.items, meta }
    }

    pub fn into_parts(self) -> (Vec<T>, SearchMetadata) {
        (self.items, self.meta)
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    // ===== Items =====

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// 🔄 Transform every item. The result carries NO metadata.
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> ResultCollection<U> {
        ResultCollection::new(self.items.into_iter().map(f).collect())
    }

    /// 🧹 Keep the items you like. The result carries NO metadata.
    pub fn filter<P: FnMut(&T) -> bool>(self, mut predicate: P) -> Self {
        Self::new(self.items.into_iter().filter(|item| predicate(item)).collect())
    }

    // ===== Metadata =====

    pub fn metadata(&self) -> &SearchMetadata {
        &self.meta
    }

    /// 🔢 Total matching documents, from either `hits.total` shape.
    pub fn total(&self) -> Option<u64> {
        self.meta.total()
    }

    pub fn total_field(&self) -> Option<TotalField> {
        self.meta.total_field()
    }

    /// 📏 `Some(Gte)` when ES stopped counting and `total` is a lower bound.
    pub fn total_relation(&self) -> Option<TotalRelation> {
        self.meta.total_relation()
    }

    pub fn max_score(&self) -> Option<f64> {
        self.meta.max_score()
    }

    /// ⏱️ `took`, in milliseconds.
    pub fn duration(&self) -> Option<f64> {
        self.meta.duration()
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.meta.elapsed()
    }

    pub fn is_timed_out(&self) -> Option<bool> {
        self.meta.is_timed_out()
    }

    pub fn scroll_id(&self) -> Option<&str> {
        self.meta.scroll_id()
    }

    pub fn shards(&self) -> Option<&ShardStats> {
        self.meta.shards()
    }

    pub fn aggregations(&self) -> &Map<String, Value> {
        self.meta.aggregations()
    }

    pub fn aggregation(&self, name: &str) -> Option<&Value> {
        self.meta.aggregations().get(name)
    }

    // ===== Suggestions =====

    /// 💡 Every suggestion group, in response order, each as a [`SuggestionGroup`].
    pub fn all_suggestions(&self) -> Vec<(&str, SuggestionGroup)> {
        self.meta
            .suggestions()
            .iter()
            .map(|(name, group)| (name.as_str(), SuggestionGroup::from_json(group)))
            .collect()
    }

    /// 💡 One suggestion group by name. Unknown names get an empty group, not `None`.
    pub fn suggestions(&self, name: &str) -> SuggestionGroup {
        self.meta
            .suggestions()
            .get(name)
            .map(SuggestionGroup::from_json)
            .unwrap_or_default()
    }
}

// -- 📤 export needs `T: Representable`, which needs `Serialize`: "pass through unchanged" means
// -- "serialized as itself", so item types that can't serialize can't be exported at all.
// -- Opting in is one line: `impl Representable for MyDoc {}`.
impl<T: Representable> ResultCollection<T> {
    /// 📤 Every item in its exported form, in order.
    ///
    /// Items with a structured form are converted; the rest pass through as-is
    /// and get serialized with their own `Serialize` impl.
    pub fn to_array(&self) -> Vec<Exported<'_, T>> {
        self.items.iter().map(Exported::from_item).collect()
    }

    /// 📤 [`to_array`](Self::to_array), as a JSON string.
    ///
    /// If any item refuses to serialize, the whole thing fails with
    /// [`SerializationError`]. There is no partial output.
    pub fn to_json(&self) -> Result<String, SerializationError> {
        Ok(serde_json::to_string(&self.to_array())?)
    }

    /// 📤 Same as [`to_json`](Self::to_json), but for humans.
    pub fn to_json_pretty(&self) -> Result<String, SerializationError> {
        Ok(serde_json::to_string_pretty(&self.to_array())?)
    }
}

impl<T> IntoIterator for ResultCollection<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a ResultCollection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> FromIterator<T> for ResultCollection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
