//! 🚀 esr-cli — the front door for poking at search responses.
//!
//! 🎬 *[narrator voice]* "It all started with a `curl ... > response.json`..."
//! 📦 This binary crate is the thin CLI wrapper that loads config,
//! sets up logging, and then lets the library do the heavy lifting.
//! Like a manager. 🦆

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use esr::app_config::{OutputFormat, load_config};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// 🔍 Inspect a raw Elasticsearch search response.
#[derive(Debug, Parser)]
#[command(name = "esr", version, about)]
struct Args {
    /// 📁 Response file to read (`-` for stdin, `.gz` is gunzipped). Overrides `input.path`.
    response: Option<PathBuf>,

    /// 🔧 TOML config file. Env vars (`ESR_*`) are always merged in.
    #[arg(short, long, env = "ESR_CONFIG")]
    config: Option<PathBuf>,

    /// 📤 What to print. Overrides `output.format`.
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,

    /// 🎨 Pretty-print JSON output.
    #[arg(short, long)]
    pretty: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Summary,
    Items,
    Metadata,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Summary => OutputFormat::Summary,
            FormatArg::Items => OutputFormat::Items,
            FormatArg::Metadata => OutputFormat::Metadata,
        }
    }
}

/// 🚀 main() — where it all begins.
///
/// 🔧 Steps:
/// 1. Init tracing (so we can see what goes wrong, and when)
/// 2. Parse args
/// 3. Load config, let the flags have the last word
/// 4. Run the thing, print the report
/// 5. Handle errors (cry, then print the cause chain)
fn main() -> Result<()> {
    // 📡 Set up tracing — logs go to stderr so the report on stdout stays pipeable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // 🔒 Validate the config file exists before we get too emotionally attached
    if let Some(config_file) = args.config.as_deref() {
        let exists = config_file.try_exists().with_context(|| {
            format!(
                "💀 Couldn't even check whether the config file exists. Was checking here: '{}'",
                config_file.display()
            )
        })?;
        if !exists {
            anyhow::bail!(
                "💀 Configuration file '{}' does not exist. Relative paths are relative to the cwd, \
                 not to your hopes. Use an absolute path to be absolutely certain.",
                config_file.display()
            );
        }
    }

    let mut app_config = load_config(args.config.as_deref())
        .context("💀 In esr-cli, main, we couldn't load the configuration. Take a look at the file and the ESR_* env vars")?;

    // 🎛️ flags beat files beat env beat defaults
    if let Some(response) = args.response {
        app_config.input.path = response;
    }
    if let Some(format) = args.format {
        app_config.output.format = format.into();
    }
    if args.pretty {
        app_config.output.pretty = true;
    }

    match esr::run(app_config) {
        Ok(report) => {
            println!("{report}");
            Ok(())
        }
        Err(err) => {
            error!("💀 error: {}", err);
            // -- 🧅 peel the onion of sadness, one tear-jerking layer at a time
            for cause in err.chain().skip(1) {
                error!("⚠️  cause: {}", cause);
            }
            // 🗑️ Exit with prejudice. Process exitus maximus.
            std::process::exit(1);
        }
    }
}
