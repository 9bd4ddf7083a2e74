//! isbn-prices - Enrich a CSV of books with prices scraped per ISBN
//!
//! Reads CSV on stdin and writes it to stdout with five extra columns:
//! price_url, min_price, average_price, max_price and list_price.

use anyhow::Result;
use clap::{ArgAction, Parser};
use isbn_prices::commands::EnrichCommand;
use isbn_prices::config::{parse_duration, Config};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "isbn-prices",
    version,
    about = "Enrich a CSV of books with prices scraped per ISBN",
    long_about = "Reads CSV from stdin, looks up every ISBN on isbn.nu one request at a time, \
                  and writes the rows to stdout with min, average, max and list prices appended."
)]
struct Cli {
    /// Column containing the ISBN used to look up prices (first column is 1)
    #[arg(long, alias = "isbnColumn", value_name = "N")]
    isbn_column: Option<NonZeroUsize>,

    /// Read a header row from the input and extend it in the output [default: true]
    #[arg(
        long,
        alias = "withHeaderRow",
        value_name = "BOOL",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    with_header_row: Option<bool>,

    /// Sleep time between calls to the price site, e.g. 15s, 500ms, 1m30s [default: 15s]
    #[arg(short, long, alias = "throttleTime", value_name = "DURATION", value_parser = parse_duration)]
    throttle_time: Option<Duration>,

    /// Site serving the price pages
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, env = "ISBN_PRICES_PROXY")]
    proxy: Option<String>,

    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Applies CLI flags on top of the file and environment layers.
fn apply_overrides(cli: Cli, mut config: Config) -> Config {
    if let Some(column) = cli.isbn_column {
        config.isbn_column = Some(column);
    }
    if let Some(with_header_row) = cli.with_header_row {
        config.with_header_row = with_header_row;
    }
    if let Some(throttle) = cli.throttle_time {
        config.throttle_ms = throttle.as_millis() as u64;
    }
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }

    config
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the CSV
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load config with layered overrides
    let config_path = cli.config.clone();
    let config = apply_overrides(cli, Config::load(config_path.as_deref())?.with_env());

    let cmd = EnrichCommand::new(config)?;
    cmd.execute(std::io::stdin().lock(), std::io::stdout().lock()).await?;

    Ok(())
}
