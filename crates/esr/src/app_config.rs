//! 🔧 App Configuration — the sacred TOML-to-struct pipeline.
//!
//! 📡 "Config not found: We looked everywhere. Under the couch. Behind the fridge.
//! In the junk drawer. Nothing." — every developer at 3am 🦆
//!
//! 🏗️ Powered by Figment, because manually parsing env vars is a form of
//! self-harm that even the borrow checker wouldn't approve of.

use anyhow::Context;
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::response::MissingFieldPolicy;

/// 📦 Everything the inspector needs to know: where the response lives,
/// how to decode it, and how to show it.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub parse: ParseConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// 📥 Where the raw search response comes from.
#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    /// 📁 Path to a response dump. `-` means stdin, for the pipe enthusiasts.
    #[serde(default = "default_input_path")]
    pub path: PathBuf,
    #[serde(default)]
    pub gzip: GzipMode,
}

fn default_input_path() -> PathBuf {
    PathBuf::from("-")
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: default_input_path(),
            gzip: GzipMode::default(),
        }
    }
}

/// 🫁 Whether the input is gzip-compressed.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GzipMode {
    /// 🔍 Sniff the `.gz` extension or the magic bytes.
    #[default]
    Auto,
    Always,
    Never,
}

/// 🎛️ Decoding knobs.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ParseConfig {
    #[serde(default)]
    pub missing_fields: MissingFieldPolicy,
}

/// 📤 How the parsed collection gets shown.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default)]
    pub pretty: bool,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// 🍽️ A comfy table of the metadata.
    #[default]
    Summary,
    /// 📦 The hits, exported as JSON.
    Items,
    /// 📡 The metadata, as JSON.
    Metadata,
}

/// 🚀 Load the config — from a file, from env vars, or from the sheer power of hoping.
///
/// 🔧 Merges environment variables (`ESR_*`, with `__` separating nested keys,
/// e.g. `ESR_OUTPUT__FORMAT=items`) with an optional TOML file. TOML wins on conflicts.
/// No file? Env vars and defaults only. No assumptions, no pizza defaults.
pub fn load_config(config_file_name: Option<&Path>) -> anyhow::Result<AppConfig> {
    info!(
        "🔧 Loading configuration: {:#?}",
        config_file_name.unwrap_or(Path::new(""))
    );

    let config = Figment::new().merge(Env::prefixed("ESR_").split("__"));

    let config = match config_file_name {
        Some(file_name) => config.merge(Toml::file(file_name)),
        None => config,
    };

    let context_msg = match config_file_name {
        Some(path) => format!(
            "💀 Failed to parse configuration from file '{}' and environment variables (ESR_*). \
             The file exists in our hearts, but apparently not in a shape we understand.",
            path.display()
        ),
        None => "💀 Failed to parse configuration from environment variables (ESR_*). \
                 No file was provided — this one's all on the environment. Classic."
            .to_string(),
    };

    config.extract().context(context_msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_test_config(contents: &str) -> tempfile::NamedTempFile {
        let mut the_file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("💀 Failed to create a temp config. The filesystem said 'new phone who dis'.");
        the_file
            .write_all(contents.as_bytes())
            .expect("💀 Failed to write test config. The disk is having a moment.");
        the_file
    }

    #[test]
    fn the_one_where_every_knob_gets_turned() {
        let mut the_output = toml::Table::new();
        the_output.insert("format".into(), toml::Value::String("metadata".into()));
        the_output.insert("pretty".into(), toml::Value::Boolean(true));
        let mut the_parse = toml::Table::new();
        the_parse.insert("missing_fields".into(), toml::Value::String("zeroed".into()));
        let mut the_input = toml::Table::new();
        the_input.insert("path".into(), toml::Value::String("dump.json.gz".into()));
        the_input.insert("gzip".into(), toml::Value::String("always".into()));

        let mut the_root = toml::Table::new();
        the_root.insert("output".into(), toml::Value::Table(the_output));
        the_root.insert("parse".into(), toml::Value::Table(the_parse));
        the_root.insert("input".into(), toml::Value::Table(the_input));

        let the_file = write_test_config(
            &toml::to_string(&the_root).expect("💀 toml refused to write toml"),
        );
        let app_config = load_config(Some(the_file.path()))
            .expect("💀 Config should parse. The schema drift goblin does not get this win.");

        assert_eq!(app_config.output.format, OutputFormat::Metadata);
        assert!(app_config.output.pretty);
        assert_eq!(app_config.parse.missing_fields, MissingFieldPolicy::Zeroed);
        assert_eq!(app_config.input.path, PathBuf::from("dump.json.gz"));
        assert_eq!(app_config.input.gzip, GzipMode::Always);
    }

    #[test]
    fn the_one_where_defaults_show_up_uninvited_but_helpful() {
        let the_file = write_test_config("");
        let app_config: AppConfig = Figment::new()
            .merge(Toml::file(the_file.path()))
            .extract()
            .expect("💀 Empty config should fall back to defaults. Serde left us on read otherwise.");

        assert_eq!(app_config.input.path, PathBuf::from("-"));
        assert_eq!(app_config.input.gzip, GzipMode::Auto);
        assert_eq!(app_config.output.format, OutputFormat::Summary);
        assert!(!app_config.output.pretty);
        assert_eq!(app_config.parse.missing_fields, MissingFieldPolicy::Absent);
    }

    #[test]
    fn the_one_where_a_typo_in_the_format_gets_called_out() {
        let the_file = write_test_config(
            r#"
            [output]
            format = "spreadsheet"
            "#,
        );
        let err = load_config(Some(the_file.path()))
            .expect_err("💀 'spreadsheet' is not a format. It is a lifestyle.");
        assert!(err.to_string().contains("Failed to parse configuration"));
    }
}
