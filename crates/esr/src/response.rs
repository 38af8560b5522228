// ai
//! 📡 Response decoding — turning Elasticsearch's JSON soup into something with types.
//!
//! 🎬 COLD OPEN — INT. CLUSTER UPGRADE WAR ROOM — 6.8 → 7.0
//!
//! Yesterday `hits.total` was `42`. Today it is `{"value": 42, "relation": "eq"}`.
//! Nobody sent a memo. Half the dashboards now say `[object Object]`. The other
//! half say `0`. Somewhere a product manager asks why search "lost all the results."
//!
//! This module is where every metadata field of a search response gets looked
//! at, shape-checked, and decoded into an explicit Rust type. No implicit
//! "null means zero" magic: every field is an `Option`, and the only way a
//! missing value becomes `0` is if the caller asks for it via
//! [`MissingFieldPolicy::Zeroed`].
//!
//! ## Knowledge Graph 🧠
//! - `hits.total`   → [`TotalField`] (scalar on ES < 7, `{value, relation}` on 7+)
//! - `hits.max_score` → `f64` via [`coerce_f64`]
//! - `took`         → `f64` via [`coerce_f64`] (milliseconds)
//! - `timed_out`    → `bool` via [`coerce_bool`]
//! - `_scroll_id`   → `String` via [`coerce_string`]
//! - `_shards`      → [`ShardStats`]
//! - `suggest`, `aggregations` → passed through as JSON maps
//!
//! ⚠️ Nothing in here returns an error. A weird field is logged at `debug` and
//! dropped. The response always decodes. That is the whole promise. 🦆

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, trace};

// ============================================================
// 🎛️ MissingFieldPolicy — who decides that "absent" means "zero"?
// ============================================================

/// 🎛️ What to do when a scalar metadata field is missing or undecodable.
///
/// `Absent` keeps the truth: no value → `None`. `Zeroed` reproduces the old
/// permissive behaviour where a missing score was `0.0`, a missing scroll id
/// was `""` and a missing total was `0`. Pick one on purpose.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingFieldPolicy {
    #[default]
    Absent,
    Zeroed,
}

// ============================================================
// 🔢 TotalField — the tagged union ES 7 forced upon us
// ============================================================

/// 📏 How precise a structured total is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalRelation {
    /// ✅ Exact count.
    #[default]
    Eq,
    /// 📉 Lower bound; ES stopped counting (see `track_total_hits`).
    Gte,
}

/// 🔢 `hits.total`, in whichever shape the cluster felt like sending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TotalField {
    /// 📦 Pre-7.0: a bare number.
    Scalar(u64),
    /// 📦 7.0+: `{"value": N, "relation": "eq" | "gte"}`.
    Structured { value: u64, relation: TotalRelation },
}

impl TotalField {
    /// 🔍 Inspect the node's shape, then pick the variant.
    ///
    /// Objects become [`TotalField::Structured`] (if their `value` decodes);
    /// numbers and numeric strings become [`TotalField::Scalar`]. Anything else
    /// is `None`.
    pub fn from_json(node: &Value) -> Option<Self> {
        match node {
            Value::Object(fields) => {
                let value = fields.get("value").and_then(coerce_u64)?;
                let relation = match fields.get("relation").and_then(Value::as_str) {
                    Some("gte") => TotalRelation::Gte,
                    // -- 🎯 "eq", absent, or something from a future ES version: treat as exact
                    _ => TotalRelation::Eq,
                };
                Some(TotalField::Structured { value, relation })
            }
            other => coerce_u64(other).map(TotalField::Scalar),
        }
    }

    /// 🔢 The count, regardless of shape.
    pub fn value(&self) -> u64 {
        match self {
            TotalField::Scalar(value) | TotalField::Structured { value, .. } => *value,
        }
    }

    /// 📏 Only structured totals know their relation. Scalars were always exact-ish.
    pub fn relation(&self) -> Option<TotalRelation> {
        match self {
            TotalField::Scalar(_) => None,
            TotalField::Structured { relation, .. } => Some(*relation),
        }
    }
}

// ============================================================
// 🔧 Scalar coercion — the polite version of PHP's casting operators
// ============================================================

/// 🔢 Numbers, numeric strings (trimmed) and booleans become `f64`. Nothing else does.
pub fn coerce_f64(node: &Value) -> Option<f64> {
    match node {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// 🔢 Non-negative integers. Floats truncate toward zero; negatives are rejected.
pub fn coerce_u64(node: &Value) -> Option<u64> {
    match node {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f.trunc() as u64)),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed.parse::<u64>().ok().or_else(|| {
                trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite() && *f >= 0.0)
                    .map(|f| f.trunc() as u64)
            })
        }
        _ => None,
    }
}

/// ✅ Booleans as-is; numbers are truthy when non-zero; strings are truthy unless `""` or `"0"`.
pub fn coerce_bool(node: &Value) -> Option<bool> {
    match node {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => Some(!(s.is_empty() || s == "0")),
        _ => None,
    }
}

/// 📜 Strings as-is; numbers and booleans get stringified; null, arrays and objects don't.
pub fn coerce_string(node: &Value) -> Option<String> {
    match node {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// ============================================================
// 🧩 ShardStats — how many partitions showed up to work
// ============================================================

/// 🧩 Per-shard execution statistics from `_shards`.
///
/// A missing `_shards` block decodes to the all-zero default. `failures` is kept
/// raw because ES packs a different reason structure into every failure type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShardStats {
    pub total: u64,
    pub successful: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped: Option<u64>,
    pub failed: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<Value>,
}

impl ShardStats {
    /// 🔍 Field-by-field, forgiving. Non-objects give the default record.
    pub fn from_json(node: &Value) -> Self {
        let Some(fields) = node.as_object() else {
            if !node.is_null() {
                debug!("🧩 `_shards` was not an object ({node}), using an empty shard record");
            }
            return ShardStats::default();
        };
        let count = |key: &str| fields.get(key).and_then(coerce_u64).unwrap_or(0);
        ShardStats {
            total: count("total"),
            successful: count("successful"),
            skipped: fields.get("skipped").and_then(coerce_u64),
            failed: count("failed"),
            failures: fields
                .get("failures")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
        }
    }

    /// 💔 Did any shard fail?
    pub fn has_failures(&self) -> bool {
        self.failed > 0 || !self.failures.is_empty()
    }
}

// ============================================================
// 📦 SearchMetadata — everything in the response except the hits
// ============================================================

/// 📦 The side channels of a search response, frozen at construction.
///
/// Built either by [`SearchMetadata::from_response`] or field by field with the
/// `with_*` setters (which consume and return `self`, so nothing is ever
/// mutated after it's handed to a collection).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchMetadata {
    total: Option<TotalField>,
    max_score: Option<f64>,
    duration: Option<f64>,
    timed_out: Option<bool>,
    scroll_id: Option<String>,
    shards: Option<ShardStats>,
    suggestions: Map<String, Value>,
    aggregations: Map<String, Value>,
}

impl SearchMetadata {
    /// 🫙 Nothing known. Every scalar `None`, every map empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// 📡 Decode every metadata field of a raw response.
    ///
    /// Never fails. Missing scalars follow `policy`; missing `_shards` becomes
    /// the default record; missing `suggest` / `aggregations` become empty maps.
    pub fn from_response(response: &Value, policy: MissingFieldPolicy) -> Self {
        let hits = response.get("hits");
        trace!("📡 decoding search response metadata");

        let mut total = hits
            .and_then(|h| h.get("total"))
            .and_then(|node| decode_or_log(node, "hits.total", TotalField::from_json));
        let mut max_score = hits
            .and_then(|h| h.get("max_score"))
            .and_then(|node| decode_or_log(node, "hits.max_score", coerce_f64));
        let mut duration = response
            .get("took")
            .and_then(|node| decode_or_log(node, "took", coerce_f64));
        let mut timed_out = response
            .get("timed_out")
            .and_then(|node| decode_or_log(node, "timed_out", coerce_bool));
        let mut scroll_id = response
            .get("_scroll_id")
            .and_then(|node| decode_or_log(node, "_scroll_id", coerce_string));

        if policy == MissingFieldPolicy::Zeroed {
            // -- 🧟 legacy mode: absent and zero become indistinguishable again, on request
            total.get_or_insert(TotalField::Scalar(0));
            max_score.get_or_insert(0.0);
            duration.get_or_insert(0.0);
            timed_out.get_or_insert(false);
            scroll_id.get_or_insert_with(String::new);
        }

        SearchMetadata {
            total,
            max_score,
            duration,
            timed_out,
            scroll_id,
            shards: Some(
                response
                    .get("_shards")
                    .map(ShardStats::from_json)
                    .unwrap_or_default(),
            ),
            suggestions: object_or_empty(response.get("suggest"), "suggest"),
            aggregations: object_or_empty(response.get("aggregations"), "aggregations"),
        }
    }

    pub fn with_total(mut self, total: TotalField) -> Self {
        self.total = Some(total);
        self
    }

    pub fn with_max_score(mut self, max_score: f64) -> Self {
        self.max_score = Some(max_score);
        self
    }

    /// ⏱️ `took`, in milliseconds.
    pub fn with_duration(mut self, duration_ms: f64) -> Self {
        self.duration = Some(duration_ms);
        self
    }

    pub fn with_timed_out(mut self, timed_out: bool) -> Self {
        self.timed_out = Some(timed_out);
        self
    }

    pub fn with_scroll_id(mut self, scroll_id: impl Into<String>) -> Self {
        self.scroll_id = Some(scroll_id.into());
        self
    }

    pub fn with_shards(mut self, shards: ShardStats) -> Self {
        self.shards = Some(shards);
        self
    }

    pub fn with_suggestions(mut self, suggestions: Map<String, Value>) -> Self {
        self.suggestions = suggestions;
        self
    }

    pub fn with_aggregations(mut self, aggregations: Map<String, Value>) -> Self {
        self.aggregations = aggregations;
        self
    }

    pub fn total(&self) -> Option<u64> {
        self.total.map(|t| t.value())
    }

    pub fn total_field(&self) -> Option<TotalField> {
        self.total
    }

    pub fn total_relation(&self) -> Option<TotalRelation> {
        self.total.and_then(|t| t.relation())
    }

    pub fn max_score(&self) -> Option<f64> {
        self.max_score
    }

    /// ⏱️ Engine-reported query time in milliseconds.
    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// ⏱️ Same as [`duration`](Self::duration), as a real `Duration`.
    /// Negative, NaN, or too big for a `Duration`: `None`.
    pub fn elapsed(&self) -> Option<Duration> {
        self.duration
            .and_then(|ms| Duration::try_from_secs_f64(ms / 1000.0).ok())
    }

    pub fn is_timed_out(&self) -> Option<bool> {
        self.timed_out
    }

    pub fn scroll_id(&self) -> Option<&str> {
        self.scroll_id.as_deref()
    }

    pub fn shards(&self) -> Option<&ShardStats> {
        self.shards.as_ref()
    }

    pub fn suggestions(&self) -> &Map<String, Value> {
        &self.suggestions
    }

    pub fn aggregations(&self) -> &Map<String, Value> {
        &self.aggregations
    }
}

// -- 🔍 decode, and if the shape was wrong, say so at debug and move on with our lives
fn decode_or_log<T>(node: &Value, name: &str, decode: impl Fn(&Value) -> Option<T>) -> Option<T> {
    let decoded = decode(node);
    if decoded.is_none() && !node.is_null() {
        debug!("⚠️ `{name}` had an unexpected shape ({node}), treating it as absent");
    }
    decoded
}

fn object_or_empty(node: Option<&Value>, name: &str) -> Map<String, Value> {
    match node {
        Some(Value::Object(map)) => map.clone(),
        None | Some(Value::Null) => Map::new(),
        Some(other) => {
            debug!("⚠️ `{name}` was not an object ({other}), treating it as empty");
            Map::new()
        }
    }
}
