//! 💡 Suggestions — "did you mean...?" with a container around it.
//!
//! Every suggestion group in `suggest` is handed out as a [`SuggestionGroup`],
//! never as a raw JSON array and never as an `Option`. Asking for a group that
//! doesn't exist gets you an empty group. No null checks at the call site. 🦆

use std::ops::Deref;

use serde::Serialize;
use serde_json::Value;

/// 💡 One named suggestion group: an ordered run of suggestion entries.
///
/// Each entry is kept as ES sent it (`{"text", "offset", "length", "options": [...]}`
/// for term/phrase suggesters, something else for completion suggesters).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SuggestionGroup {
    entries: Vec<Value>,
}

impl SuggestionGroup {
    pub fn new(entries: Vec<Value>) -> Self {
        Self { entries }
    }

    /// 🔄 Wrap whatever ES put under a group name. Arrays become the entries;
    /// a lone non-array value becomes a single entry; null becomes nothing.
    pub fn from_json(node: &Value) -> Self {
        match node {
            Value::Array(entries) => Self::new(entries.clone()),
            Value::Null => Self::default(),
            other => Self::new(vec![other.clone()]),
        }
    }

    pub fn entries(&self) -> &[Value] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<Value> {
        self.entries
    }

    /// 🎯 Every `options[].text` across every entry, in order.
    ///
    /// This is the list you'd show under "did you mean". Entries without
    /// options (or options without text) are skipped quietly.
    pub fn option_texts(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|entry| entry.get("options").and_then(Value::as_array))
            .flatten()
            .filter_map(|option| option.get("text").and_then(Value::as_str))
            .collect()
    }
}

impl Deref for SuggestionGroup {
    type Target = [Value];

    fn deref(&self) -> &Self::Target {
        &self.entries
    }
}

impl IntoIterator for SuggestionGroup {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a SuggestionGroup {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<Value> for SuggestionGroup {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
