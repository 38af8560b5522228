//! 🔍 Inspect — read a response dump off disk, make a collection, show it to a human.
//!
//! 🎬 COLD OPEN — INT. ON-CALL LAPTOP — 2:13 AM
//!
//! Someone pasted a 40MB `_search` response into a ticket. Gzipped. Of course
//! it's gzipped. The question in the ticket is "why does the UI say 0 results?"
//! and the answer is somewhere in `hits.total`. This module is how you find out
//! without scrolling through 40MB of JSON in `less`.
//!
//! ## Knowledge Graph 🧠
//! - [`load_response`]: file or stdin → `serde_json::Value` (gunzips when told to, or when it smells gzip)
//! - [`render`]: `ResultCollection` → summary table / items JSON / metadata JSON
//! - Used by: `crate::run`, which the `esr-cli` binary calls
//!
//! 🦆 The duck reads JSON faster than you. The duck is not on call though.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table, presets::UTF8_FULL};
use flate2::read::GzDecoder;
use serde_json::Value;
use tracing::{debug, info};

use crate::app_config::{GzipMode, OutputConfig, OutputFormat};
use crate::collection::ResultCollection;
use crate::response::{MissingFieldPolicy, TotalRelation};

// -- 🫁 the two bytes every gzip stream starts with. RFC 1952, section 2.3.1, for the curious.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// 📥 Read and parse a raw search response.
///
/// `-` reads stdin. With [`GzipMode::Auto`], the payload is gunzipped only when
/// the bytes start with the gzip magic number; a `.gz` extension on plain JSON
/// is logged and otherwise ignored.
pub fn load_response(path: &Path, gzip: GzipMode) -> Result<Value> {
    let mut the_raw_bytes = Vec::new();
    if path == Path::new("-") {
        std::io::stdin()
            .lock()
            .read_to_end(&mut the_raw_bytes)
            .context("💀 Failed to read the search response from stdin. The pipe ran dry before it ran at all.")?;
    } else {
        BufReader::new(File::open(path).with_context(|| {
            format!(
                "💀 Couldn't open the response file '{}'. Check the path, check the cwd, check your faith.",
                path.display()
            )
        })?)
        .read_to_end(&mut the_raw_bytes)
        .with_context(|| format!("💀 Opened '{}' but couldn't read it to the end.", path.display()))?;
    }
    debug!("📦 Read {} raw bytes from {}", the_raw_bytes.len(), path.display());

    let looks_gzipped = match gzip {
        GzipMode::Always => true,
        GzipMode::Never => false,
        GzipMode::Auto => {
            let has_the_magic = the_raw_bytes.starts_with(&GZIP_MAGIC);
            if !has_the_magic && path.extension().is_some_and(|ext| ext == "gz") {
                debug!(
                    "🫁 '{}' says .gz on the label but not in the bytes, reading it as plain JSON",
                    path.display()
                );
            }
            has_the_magic
        }
    };

    let the_json_bytes = if looks_gzipped {
        let mut the_inflated = Vec::new();
        GzDecoder::new(the_raw_bytes.as_slice())
            .read_to_end(&mut the_inflated)
            .with_context(|| {
                format!(
                    "💀 '{}' was supposed to be gzip, but the decoder disagreed. Squishy bytes, unsquishable.",
                    path.display()
                )
            })?;
        debug!("🫁 Inflated {} → {} bytes", the_raw_bytes.len(), the_inflated.len());
        the_inflated
    } else {
        the_raw_bytes
    };

    serde_json::from_slice(&the_json_bytes).with_context(|| {
        format!(
            "💀 '{}' is not valid JSON. Elasticsearch speaks JSON. Whatever this is, it's not that.",
            path.display()
        )
    })
}

/// 📤 Render a collection the way the output config asks for.
pub fn render(collection: &ResultCollection, output: &OutputConfig) -> Result<String> {
    match output.format {
        OutputFormat::Summary => Ok(summary_table(collection).to_string()),
        OutputFormat::Items => {
            let rendered = if output.pretty {
                collection.to_json_pretty()
            } else {
                collection.to_json()
            };
            rendered.context("💀 The hits refused to become JSON on the way out.")
        }
        OutputFormat::Metadata => {
            let rendered = if output.pretty {
                serde_json::to_string_pretty(collection.metadata())
            } else {
                serde_json::to_string(collection.metadata())
            };
            rendered.context("💀 The metadata refused to become JSON. It was JSON a minute ago.")
        }
    }
}

// -- 🍽️ one row per side channel. "-" means ES didn't say, which is different from ES saying 0.
fn summary_table(collection: &ResultCollection) -> Table {
    let or_dash = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["field", "value"]);

    let total = collection.total().map(|total| match collection.total_relation() {
        Some(relation) => format!("{total} ({})", relation_label(relation)),
        None => total.to_string(),
    });
    let shards = collection.shards().map(|s| {
        format!(
            "{} total / {} ok / {} skipped / {} failed",
            s.total,
            s.successful,
            s.skipped.unwrap_or(0),
            s.failed
        )
    });
    let suggestion_groups: Vec<String> = collection
        .all_suggestions()
        .into_iter()
        .map(|(name, group)| format!("{name} ({})", group.len()))
        .collect();
    let aggregation_names: Vec<&str> = collection.aggregations().keys().map(String::as_str).collect();

    let rows: Vec<(&str, String)> = vec![
        ("hits", collection.len().to_string()),
        ("total", or_dash(total)),
        ("max_score", or_dash(collection.max_score().map(|s| s.to_string()))),
        ("took (ms)", or_dash(collection.duration().map(|d| d.to_string()))),
        ("timed_out", or_dash(collection.is_timed_out().map(|t| t.to_string()))),
        ("scroll_id", or_dash(collection.scroll_id().map(str::to_string))),
        ("shards", or_dash(shards)),
        ("suggestions", or_dash(non_empty(suggestion_groups.join(", ")))),
        ("aggregations", or_dash(non_empty(aggregation_names.join(", ")))),
    ];
    for (field, value) in rows {
        table.add_row(vec![Cell::new(field), Cell::new(value).set_alignment(CellAlignment::Left)]);
    }
    table
}

fn relation_label(relation: TotalRelation) -> &'static str {
    match relation {
        TotalRelation::Eq => "exact",
        TotalRelation::Gte => "lower bound",
    }
}

fn non_empty(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}

/// 🚀 Parse a loaded response with the configured policy and render it.
pub fn inspect(
    response: &Value,
    parse_policy: MissingFieldPolicy,
    output: &OutputConfig,
) -> Result<String> {
    let collection = ResultCollection::<Value>::from_response_with_policy(response, None, parse_policy);
    info!(
        "🔍 Parsed response: {} hits, total {:?}, took {:?}ms",
        collection.len(),
        collection.total(),
        collection.duration()
    );
    render(&collection, output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::{Compression, write::GzEncoder};
    use serde_json::json;
    use std::io::Write;

    fn a_small_response() -> Value {
        json!({
            "took": 3,
            "timed_out": false,
            "_shards": {"total": 1, "successful": 1, "skipped": 0, "failed": 0},
            "hits": {
                "total": {"value": 10000, "relation": "gte"},
                "max_score": 2.0,
                "hits": [{"_id": "a", "_source": {"n": 1}}]
            },
            "suggest": {"spell": [{"text": "teh", "options": [{"text": "the"}]}]},
            "aggregations": {"by_day": {"buckets": []}}
        })
    }

    fn write_temp(suffix: &str, bytes: &[u8]) -> Result<tempfile::NamedTempFile> {
        let mut the_file = tempfile::Builder::new().suffix(suffix).tempfile()?;
        the_file.write_all(bytes)?;
        Ok(the_file)
    }

    fn gzipped(bytes: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(bytes)?;
        Ok(encoder.finish()?)
    }

    #[test]
    fn the_one_where_a_plain_json_dump_loads() -> Result<()> {
        let the_file = write_temp(".json", a_small_response().to_string().as_bytes())?;
        let loaded = load_response(the_file.path(), GzipMode::Auto)?;
        assert_eq!(loaded, a_small_response());
        Ok(())
    }

    #[test]
    fn the_one_where_gzip_is_sniffed_without_the_extension() -> Result<()> {
        let the_squished = gzipped(a_small_response().to_string().as_bytes())?;
        let the_file = write_temp(".bin", &the_squished)?;
        assert_eq!(load_response(the_file.path(), GzipMode::Auto)?, a_small_response());
        assert!(
            load_response(the_file.path(), GzipMode::Never).is_err(),
            "gzip bytes read as JSON should fail"
        );
        Ok(())
    }

    #[test]
    fn the_one_where_plain_json_wears_a_gz_costume() -> Result<()> {
        let the_file = write_temp(".json.gz", a_small_response().to_string().as_bytes())?;
        assert_eq!(load_response(the_file.path(), GzipMode::Auto)?, a_small_response());

        let the_real_gzip = write_temp(".json.gz", &gzipped(b"{\"took\": 1}")?)?;
        assert_eq!(load_response(the_real_gzip.path(), GzipMode::Auto)?, json!({"took": 1}));
        Ok(())
    }

    #[test]
    fn the_one_where_always_gzip_meets_plain_text_and_says_so() -> Result<()> {
        let the_file = write_temp(".json", b"{}")?;
        assert!(load_response(the_file.path(), GzipMode::Always).is_err());
        Ok(())
    }

    #[test]
    fn the_one_where_the_file_is_not_json_at_all() -> Result<()> {
        let the_file = write_temp(".json", b"<html>502 Bad Gateway</html>")?;
        let err = load_response(the_file.path(), GzipMode::Auto)
            .expect_err("💀 HTML is not a search response, no matter how hard it tries");
        assert!(err.to_string().contains("is not valid JSON"));
        Ok(())
    }

    #[test]
    fn the_one_where_the_summary_table_tells_the_whole_story() -> Result<()> {
        let rendered = inspect(&a_small_response(), MissingFieldPolicy::Absent, &OutputConfig::default())?;
        assert!(rendered.contains("10000 (lower bound)"));
        assert!(rendered.contains("spell (1)"));
        assert!(rendered.contains("by_day"));
        assert!(rendered.contains("1 total / 1 ok / 0 skipped / 0 failed"));
        Ok(())
    }

    #[test]
    fn the_one_where_missing_fields_show_up_as_dashes_not_zeroes() -> Result<()> {
        let rendered = inspect(&json!({}), MissingFieldPolicy::Absent, &OutputConfig::default())?;
        assert!(rendered.contains('-'));
        assert!(!rendered.contains("false"), "absent timed_out must not be shown as false");
        Ok(())
    }

    #[test]
    fn the_one_where_items_come_out_as_json() -> Result<()> {
        let output = OutputConfig { format: OutputFormat::Items, pretty: false };
        let rendered = inspect(&a_small_response(), MissingFieldPolicy::Absent, &output)?;
        assert_eq!(serde_json::from_str::<Value>(&rendered)?, a_small_response()["hits"]["hits"]);
        Ok(())
    }

    #[test]
    fn the_one_where_metadata_comes_out_as_json() -> Result<()> {
        let output = OutputConfig { format: OutputFormat::Metadata, pretty: true };
        let rendered = inspect(&json!({}), MissingFieldPolicy::Zeroed, &output)?;
        let the_meta: Value = serde_json::from_str(&rendered)?;
        assert_eq!(the_meta["total"], json!(0));
        assert_eq!(the_meta["scroll_id"], json!(""));
        assert_eq!(the_meta["timed_out"], json!(false));
        Ok(())
    }
}
