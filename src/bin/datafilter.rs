use clap::{Parser, ValueEnum};
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{error, info};

use datafilter::config::Config;
use datafilter::services::{FetchApplied, FilterSession};
use datafilter::ConditionSet;

/// Fetch a JSON array of flat records and print the rows passing the conditions
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Source URL; falls back to `source_url` from the config
    url: Option<String>,
    /// Condition groups as JSON5, e.g. [[{left:'name',operator:'equals',value:'John'}]]
    /// Groups are ANDed, conditions inside a group are ORed.
    #[arg(long = "conditions", short = 'c', value_name = "JSON5")]
    conditions: Option<String>,
    /// Print the inferred columns instead of rows
    #[arg(long = "columns")]
    columns: bool,
    /// Print the full view (all rows, columns, filtered rows)
    #[arg(long = "snapshot", conflicts_with = "columns")]
    snapshot: bool,
    /// Enable file logging at the given level (overrides config and RUST_LOG)
    #[arg(long = "logging", value_enum)]
    logging: Option<LogLevel>,
    /// Path to a config file (overrides default config discovery)
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum LogLevel { Error, Warn, Info, Debug, Trace }

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let config = Config::from_path(args.config.as_ref())
        .wrap_err("failed to load configuration")?;
    let level = args.logging.map(tracing::Level::from).or_else(|| config.log_level());
    datafilter::logging::init_with(Some(config.data_dir.clone()), level)?;

    let url = args
        .url
        .clone()
        .or_else(|| config.source_url.clone())
        .ok_or_else(|| eyre!("no source URL given and none configured"))?;

    let conditions = match &args.conditions {
        Some(text) => json5::from_str::<ConditionSet>(text).wrap_err("invalid --conditions")?,
        None => ConditionSet::new(),
    };

    let source = config.http_source()?;
    let mut session = FilterSession::new();
    match session.load(&source, &url).await {
        FetchApplied::Loaded { rows } => info!("{} rows available", rows),
        FetchApplied::Failed => {
            eprintln!("{}", session.view.error());
            std::process::exit(1);
        }
        FetchApplied::Skipped | FetchApplied::Stale => {
            error!("nothing fetched for '{}'", url);
            return Err(eyre!("nothing fetched for '{url}'"));
        }
    }
    // Adopting the URL reset the conditions; install the requested ones now
    session.conditions = conditions;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.columns {
        serde_json::to_writer_pretty(&mut out, session.view.columns())?;
    } else if args.snapshot {
        serde_json::to_writer_pretty(&mut out, &session.snapshot())?;
    } else {
        serde_json::to_writer_pretty(&mut out, &session.filtered_data())?;
    }
    writeln!(out)?;
    Ok(())
}
