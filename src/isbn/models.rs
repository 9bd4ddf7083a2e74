//! Data models for scraped price information.

/// Aggregate of every valid price quote found on one page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceSummary {
    /// Lowest quote
    pub min: f64,
    /// Arithmetic mean of all quotes
    pub average: f64,
    /// Highest quote
    pub max: f64,
    /// Number of quotes that went into the summary
    pub count: usize,
}

impl PriceSummary {
    /// Builds a summary from positive quotes. Returns `None` when there are none.
    pub fn from_quotes(quotes: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for quote in quotes {
            count += 1;
            sum += quote;
            min = min.min(quote);
            max = max.max(quote);
        }

        if count == 0 {
            return None;
        }

        Some(Self { min, average: sum / count as f64, max, count })
    }
}

/// Everything learned about one input row's ISBN.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceLookup {
    /// ISBN as it appeared in the input
    pub isbn: String,
    /// Page the prices were scraped from; `None` when nothing was fetched
    pub url: Option<String>,
    /// Marketplace prices, if any were found
    pub summary: Option<PriceSummary>,
    /// Publisher list price, if present and positive
    pub list_price: Option<f64>,
}

impl PriceLookup {
    /// Lookup for a row that had no ISBN to fetch.
    pub fn skipped(isbn: impl Into<String>) -> Self {
        Self { isbn: isbn.into(), ..Self::default() }
    }

    pub fn was_fetched(&self) -> bool {
        self.url.is_some()
    }

    pub fn min_price(&self) -> Option<f64> {
        self.summary.map(|s| s.min)
    }

    pub fn average_price(&self) -> Option<f64> {
        self.summary.map(|s| s.average)
    }

    pub fn max_price(&self) -> Option<f64> {
        self.summary.map(|s| s.max)
    }
}
