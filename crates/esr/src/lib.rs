//! 🔍 esr — Elasticsearch search responses, but with types.
//!
//! A raw `_search` response goes in. A [`ResultCollection`] comes out: the hits
//! in order, plus total, max score, took, timed_out, scroll id, shard stats,
//! suggestion groups and aggregations, none of them lost along the way.
//! Also home to [`InvalidCastError`], for models that ask for casts nobody
//! has heard of. 🦆

pub mod app_config;
pub mod collection;
pub mod errors;
pub mod inspect;
pub mod representable;
pub mod response;
pub mod suggestions;

pub use collection::ResultCollection;
pub use errors::{InvalidCastError, SerializationError};
pub use representable::{Exported, Representable};
pub use response::{MissingFieldPolicy, SearchMetadata, ShardStats, TotalField, TotalRelation};
pub use suggestions::SuggestionGroup;

use anyhow::{Context, Result};
use app_config::AppConfig;

/// 🚀 Load the configured response, parse it, render it. Returns the rendered report.
pub fn run(config: AppConfig) -> Result<String> {
    let response = inspect::load_response(&config.input.path, config.input.gzip)
        .context("💀 Couldn't load the search response")?;
    inspect::inspect(&response, config.parse.missing_fields, &config.output)
        .context("💀 Loaded the response, but couldn't render it")
}
