//! Regex-based price extraction from raw isbn.nu pages.
//!
//! The page is treated as plain text. No DOM is built: the offer table and
//! the book info block both embed their amounts in predictable substrings.

use crate::config::Config;
use crate::isbn::error::ExtractError;
use crate::isbn::models::PriceSummary;
use crate::isbn::patterns;
use anyhow::{Context, Result};
use regex_lite::Regex;
use tracing::trace;

/// Largest amount accepted, matching a 32-bit float parse. Keeps sums finite.
const MAX_AMOUNT: f64 = f32::MAX as f64;

fn in_range(amount: f64) -> bool {
    amount.is_finite() && amount <= MAX_AMOUNT
}

/// Compiles `pattern`, requiring at least one capture group for the amount.
fn compile(pattern: &str, name: &str) -> Result<Regex> {
    let regex =
        Regex::new(pattern).with_context(|| format!("Invalid {} pattern: {}", name, pattern))?;

    // captures_len counts the implicit whole-match group
    if regex.captures_len() < 2 {
        anyhow::bail!("{} pattern has no capture group for the amount: {}", name, pattern);
    }

    Ok(regex)
}

/// Collects every marketplace offer on a page and summarises them.
#[derive(Debug, Clone)]
pub struct PriceExtractor {
    pattern: Regex,
}

impl PriceExtractor {
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self { pattern: compile(pattern, "price")? })
    }

    /// Valid quotes in page order. Amounts that fail to parse, are not
    /// strictly positive, or exceed the 32-bit float range are skipped.
    pub fn quotes<'a>(&'a self, page: &'a str) -> impl Iterator<Item = f64> + 'a {
        self.pattern.captures_iter(page).filter_map(|caps| {
            let raw = caps.get(1)?.as_str();
            match raw.parse::<f64>() {
                Ok(price) if price > 0.0 && in_range(price) => Some(price),
                _ => {
                    trace!("Skipping price quote {:?}", raw);
                    None
                }
            }
        })
    }

    /// Returns min/average/max over all valid quotes.
    pub fn extract(&self, page: &str) -> Result<PriceSummary, ExtractError> {
        PriceSummary::from_quotes(self.quotes(page)).ok_or(ExtractError::NoPrices)
    }
}

/// Uses [`patterns::PRICE`], which `test_default_patterns_compile` covers.
impl Default for PriceExtractor {
    fn default() -> Self {
        Self::new(patterns::PRICE).expect("default price pattern is valid")
    }
}

/// Finds the publisher list price. First match wins.
#[derive(Debug, Clone)]
pub struct ListPriceExtractor {
    pattern: Regex,
}

impl ListPriceExtractor {
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self { pattern: compile(pattern, "list price")? })
    }

    pub fn extract(&self, page: &str) -> Result<f64, ExtractError> {
        let raw = self
            .pattern
            .captures(page)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .ok_or(ExtractError::NoListPrice)?;

        let price = raw
            .parse::<f64>()
            .map_err(|source| ExtractError::InvalidListPrice { value: raw.to_string(), source })?;

        if !in_range(price) {
            return Err(ExtractError::ListPriceOutOfRange { value: raw.to_string() });
        }

        if price > 0.0 {
            Ok(price)
        } else {
            Err(ExtractError::ListPriceNotAvailable)
        }
    }
}

/// Uses [`patterns::LIST_PRICE`], which `test_default_patterns_compile` covers.
impl Default for ListPriceExtractor {
    fn default() -> Self {
        Self::new(patterns::LIST_PRICE).expect("default list price pattern is valid")
    }
}

/// Outcome of running both extractors over one page.
#[derive(Debug)]
pub struct PageReport {
    pub summary: Result<PriceSummary, ExtractError>,
    pub list_price: Result<f64, ExtractError>,
}

/// Runs the price and list price extractors over a page.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    prices: PriceExtractor,
    list_price: ListPriceExtractor,
}

impl Parser {
    pub fn new(prices: PriceExtractor, list_price: ListPriceExtractor) -> Self {
        Self { prices, list_price }
    }

    /// Builds a parser from the patterns in `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            PriceExtractor::new(&config.price_pattern)?,
            ListPriceExtractor::new(&config.list_price_pattern)?,
        ))
    }

    /// The two extractions are independent; one failing never hides the other.
    pub fn parse(&self, page: &str) -> PageReport {
        PageReport { summary: self.prices.extract(page), list_price: self.list_price.extract(page) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "expected {}, got {}", expected, actual);
    }

    #[test]
    fn test_prices_skip_zero() {
        let page = "row_price_12.50_ ... row_price_8.00_ ... row_price_0.00_";
        let summary = PriceExtractor::default().extract(page).unwrap();

        assert_eq!(summary.min, 8.0);
        assert_eq!(summary.average, 10.25);
        assert_eq!(summary.max, 12.5);
        assert_eq!(summary.count, 2);
    }

    #[test]
    fn test_prices_none_on_page() {
        let page = "<html><body>Sorry, no offers for this book</body></html>";
        let result = PriceExtractor::default().extract(page);
        assert!(matches!(result, Err(ExtractError::NoPrices)));
    }

    #[test]
    fn test_prices_only_zero_is_no_prices() {
        let result = PriceExtractor::default().extract("row_price_0.00_ row_price_0.0_");
        assert!(matches!(result, Err(ExtractError::NoPrices)));
    }

    #[test]
    fn test_prices_unparseable_match_is_skipped() {
        // The separator in the pattern is a wildcard, so this matches but won't parse
        let page = "row_price_12,50_ row_price_5.00_";
        let extractor = PriceExtractor::default();

        assert_eq!(extractor.quotes(page).collect::<Vec<_>>(), vec![5.0]);
        let summary = extractor.extract(page).unwrap();
        assert_eq!(summary.count, 1);
        assert_eq!(summary.average, 5.0);
    }

    #[test]
    fn test_prices_average_of_valid_only() {
        let page = r#"
            <tr id="row_price_3.10_"></tr>
            <tr id="row_price_0.00_"></tr>
            <tr id="row_price_7.25_"></tr>
            <tr id="row_price_1x99_"></tr>
            <tr id="row_price_40.00_"></tr>
        "#;
        let summary = PriceExtractor::default().extract(page).unwrap();

        assert_eq!(summary.count, 3);
        assert_eq!(summary.min, 3.1);
        assert_eq!(summary.max, 40.0);
        assert_close(summary.average, (3.1 + 7.25 + 40.0) / 3.0);
    }

    #[test]
    fn test_prices_keep_page_order() {
        let page = "row_price_9.00_ row_price_1.50_ row_price_4.75_";
        let quotes: Vec<f64> = PriceExtractor::default().quotes(page).collect();
        assert_eq!(quotes, vec![9.0, 1.5, 4.75]);
    }

    #[test]
    fn test_prices_integer_amount_not_matched() {
        // Default pattern requires a fractional part
        let result = PriceExtractor::default().extract("row_price_12_");
        assert!(matches!(result, Err(ExtractError::NoPrices)));
    }

    #[test]
    fn test_list_price_found() {
        let page = r#"<span class="bi_col_value">$19.99</span>"#;
        assert_eq!(ListPriceExtractor::default().extract(page).unwrap(), 19.99);
    }

    #[test]
    fn test_list_price_first_match_wins() {
        let page = r#"
            <span class="bi_col_value">$24.00</span>
            <span class="bi_col_value">$99.00</span>
        "#;
        assert_eq!(ListPriceExtractor::default().extract(page).unwrap(), 24.0);
    }

    #[test]
    fn test_list_price_zero_not_available() {
        let page = r#"<span class="bi_col_value">$0.00</span>"#;
        let result = ListPriceExtractor::default().extract(page);
        assert!(matches!(result, Err(ExtractError::ListPriceNotAvailable)));
    }

    #[test]
    fn test_list_price_zero_first_hides_later_match() {
        let page = r#"
            <span class="bi_col_value">$0.00</span>
            <span class="bi_col_value">$15.00</span>
        "#;
        let result = ListPriceExtractor::default().extract(page);
        assert!(matches!(result, Err(ExtractError::ListPriceNotAvailable)));
    }

    #[test]
    fn test_list_price_overflow_is_rejected() {
        let page = r#"<span class="bi_col_value">$1e999<"#;
        match ListPriceExtractor::default().extract(page) {
            Err(ExtractError::ListPriceOutOfRange { value }) => assert_eq!(value, "1e999"),
            other => panic!("expected ListPriceOutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_list_price_beyond_f32_range_is_rejected() {
        let page = r#"<span class="bi_col_value">$1e308<"#;
        let result = ListPriceExtractor::default().extract(page);
        assert!(matches!(result, Err(ExtractError::ListPriceOutOfRange { .. })));
    }

    #[test]
    fn test_prices_out_of_range_are_skipped() {
        let extractor = PriceExtractor::default();

        let result = extractor.extract("row_price_1e308_ row_price_1e308_ row_price_1e999_");
        assert!(matches!(result, Err(ExtractError::NoPrices)));

        let summary = extractor.extract("row_price_1e308_ row_price_4.00_").unwrap();
        assert_eq!(summary.count, 1);
        assert_eq!(summary.average, 4.0);
    }

    #[test]
    fn test_prices_near_limit_keep_average_finite() {
        let summary = PriceExtractor::default().extract("row_price_3e38_ row_price_3e38_").unwrap();

        assert!(summary.average.is_finite());
        assert!(summary.min <= summary.average);
        assert!(summary.average <= summary.max);
    }

    #[test]
    fn test_list_price_no_match() {
        let result = ListPriceExtractor::default().extract("row_price_12.50_");
        assert!(matches!(result, Err(ExtractError::NoListPrice)));
    }

    #[test]
    fn test_list_price_unparseable() {
        let page = r#"<span class="bi_col_value">$19,99</span>"#;
        match ListPriceExtractor::default().extract(page) {
            Err(ExtractError::InvalidListPrice { value, .. }) => assert_eq!(value, "19,99"),
            other => panic!("expected InvalidListPrice, got {:?}", other),
        }
    }

    #[test]
    fn test_custom_patterns() {
        let prices = PriceExtractor::new(r"data-price=(\d+\.\d+)").unwrap();
        let list = ListPriceExtractor::new(r"MSRP: €(\d+\.\d+)").unwrap();
        let parser = Parser::new(prices, list);

        let report = parser.parse("data-price=5.00 data-price=7.00 MSRP: €30.00");
        let summary = report.summary.unwrap();
        assert_eq!(summary.average, 6.0);
        assert_eq!(report.list_price.unwrap(), 30.0);
    }

    #[test]
    fn test_pattern_invalid_regex() {
        let err = PriceExtractor::new(r"row_price_(\d+").unwrap_err();
        assert!(err.to_string().contains("Invalid price pattern"));
    }

    #[test]
    fn test_pattern_without_capture_group() {
        let err = ListPriceExtractor::new(r"\$\d+\.\d+").unwrap_err();
        assert!(err.to_string().contains("no capture group"));
    }

    #[test]
    fn test_parser_reports_independently() {
        let page = r#"row_price_10.00_ <span class="bi_col_value">$0.00<"#;
        let report = Parser::default().parse(page);

        assert_eq!(report.summary.unwrap().min, 10.0);
        assert!(matches!(report.list_price, Err(ExtractError::ListPriceNotAvailable)));
    }

    #[test]
    fn test_parser_from_default_config() {
        let parser = Parser::from_config(&Config::default()).unwrap();
        let report = parser.parse(r#"row_price_2.50_ <span class="bi_col_value">$9.99<"#);

        assert_eq!(report.summary.unwrap().max, 2.5);
        assert_eq!(report.list_price.unwrap(), 9.99);
    }

    #[test]
    fn test_parser_from_config_bad_pattern() {
        let config = Config { price_pattern: "(".to_string(), ..Config::default() };
        assert!(Parser::from_config(&config).is_err());
    }
}
