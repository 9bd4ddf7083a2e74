//! CSV enrichment command implementation.

use crate::config::Config;
use crate::format::Formatter;
use crate::isbn::{IsbnClient, PriceLookup, PricePageSource, Parser};
use anyhow::{Context, Result};
use csv::StringRecord;
use std::io::{Read, Write};
use tracing::{debug, info, warn};

/// Counters for one enrichment run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EnrichStats {
    /// Data rows written (header excluded)
    pub rows: usize,
    /// Pages downloaded
    pub fetched: usize,
    /// Rows with an empty ISBN
    pub skipped: usize,
    /// Fetched rows where no marketplace price was found
    pub missing_prices: usize,
    /// Fetched rows where no list price was found
    pub missing_list_prices: usize,
}

impl EnrichStats {
    fn record(&mut self, lookup: &PriceLookup) {
        self.rows += 1;

        if !lookup.was_fetched() {
            self.skipped += 1;
            return;
        }

        self.fetched += 1;
        if lookup.summary.is_none() {
            self.missing_prices += 1;
        }
        if lookup.list_price.is_none() {
            self.missing_list_prices += 1;
        }
    }
}

/// Reads book rows, looks up prices per ISBN, and writes the extended rows.
pub struct EnrichCommand {
    config: Config,
    column: usize,
    parser: Parser,
    formatter: Formatter,
}

impl EnrichCommand {
    /// Creates a new enrich command, compiling the configured patterns.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let column = config.isbn_column()?.get() - 1;
        let parser = Parser::from_config(&config)?;
        let formatter = Formatter::new(config.currency_symbol.clone());

        Ok(Self { config, column, parser, formatter })
    }

    /// Enriches `input` into `output` using isbn.nu.
    pub async fn execute<R: Read, W: Write>(&self, input: R, output: W) -> Result<EnrichStats> {
        let client = IsbnClient::new(&self.config).context("Failed to create HTTP client")?;

        self.execute_with_client(&client, input, output).await
    }

    /// Enriches with a provided page source (for testing).
    pub async fn execute_with_client<R: Read, W: Write>(
        &self,
        source: &impl PricePageSource,
        input: R,
        output: W,
    ) -> Result<EnrichStats> {
        // Read everything up front so malformed input fails before any request goes out
        let records: Vec<StringRecord> = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(input)
            .records()
            .collect::<Result<Vec<_>, _>>()
            .context("Error parsing csv")?;

        let mut writer = csv::Writer::from_writer(output);
        let mut stats = EnrichStats::default();

        for (i, record) in records.iter().enumerate() {
            if i == 0 && self.config.with_header_row {
                writer
                    .write_record(&self.formatter.header(record))
                    .context("Failed to write header")?;
                writer.flush().context("Failed to flush output")?;
                continue;
            }

            let isbn = record.get(self.column).with_context(|| {
                format!(
                    "Row {} has {} columns, ISBN column {} is out of range",
                    i + 1,
                    record.len(),
                    self.column + 1
                )
            })?;

            let lookup = self.lookup(source, isbn).await?;
            stats.record(&lookup);

            writer
                .write_record(&self.formatter.data_row(record, &lookup))
                .with_context(|| format!("Failed to write row {}", i + 1))?;
            writer.flush().context("Failed to flush output")?;

            self.throttle().await;
        }

        writer.flush().context("Failed to flush output")?;

        info!(
            "Enriched {} rows: {} fetched, {} without ISBN, {} without prices, {} without list price",
            stats.rows, stats.fetched, stats.skipped, stats.missing_prices, stats.missing_list_prices
        );

        Ok(stats)
    }

    /// Fetches and parses the price page for one ISBN. Only a failed fetch is an error.
    async fn lookup(&self, source: &impl PricePageSource, isbn: &str) -> Result<PriceLookup> {
        if isbn.is_empty() {
            debug!("Row has no ISBN, skipping price lookup");
            return Ok(PriceLookup::skipped(isbn));
        }

        let url = source.page_url(isbn);
        info!("Looking up prices for ISBN {}", isbn);

        let page = source
            .fetch(&url)
            .await
            .with_context(|| format!("Error loading url [{}] to get prices", url))?;

        let report = self.parser.parse(&page);

        let summary = match report.summary {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!(
                    "Error getting prices for isbn [{}] from url [{}]: {}, page content:\n{}\n",
                    isbn, url, e, page
                );
                None
            }
        };

        let list_price = match report.list_price {
            Ok(price) => Some(price),
            Err(e) => {
                warn!(
                    "Error getting original list price for isbn [{}] from url [{}]: {}, page content:\n{}\n",
                    isbn, url, e, page
                );
                None
            }
        };

        Ok(PriceLookup { isbn: isbn.to_string(), url: Some(url), summary, list_price })
    }

    /// Fixed pause between rows to go easy on the remote site.
    async fn throttle(&self) {
        let pause = self.config.throttle();
        if pause.is_zero() {
            return;
        }

        debug!("Sleeping {:?} before next row", pause);
        tokio::time::sleep(pause).await;
    }
}
