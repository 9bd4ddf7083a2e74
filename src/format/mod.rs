//! Output formatting for enriched CSV rows.

use crate::isbn::PriceLookup;
use csv::StringRecord;

/// Columns appended to every output row, in order.
pub const PRICE_COLUMNS: [&str; 5] =
    ["price_url", "min_price", "average_price", "max_price", "list_price"];

/// Builds output records from input records and price lookups.
#[derive(Debug, Clone)]
pub struct Formatter {
    currency_symbol: String,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(currency_symbol: impl Into<String>) -> Self {
        Self { currency_symbol: currency_symbol.into() }
    }

    /// Input header followed by the price column names.
    pub fn header(&self, input: &StringRecord) -> StringRecord {
        let mut header = input.clone();
        for column in PRICE_COLUMNS {
            header.push_field(column);
        }
        header
    }

    /// Input fields, unchanged, followed by the URL and four prices.
    pub fn data_row(&self, input: &StringRecord, lookup: &PriceLookup) -> StringRecord {
        let mut row = input.clone();
        row.push_field(lookup.url.as_deref().unwrap_or_default());
        row.push_field(&self.price(lookup.min_price()));
        row.push_field(&self.price(lookup.average_price()));
        row.push_field(&self.price(lookup.max_price()));
        row.push_field(&self.price(lookup.list_price));
        row
    }

    /// Formats an amount with two decimals; absent amounts become empty cells.
    pub fn price(&self, amount: Option<f64>) -> String {
        match amount {
            Some(value) => format!("{}{:.2}", self.currency_symbol, value),
            None => String::new(),
        }
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new("$")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isbn::PriceSummary;

    fn make_input() -> StringRecord {
        StringRecord::from(vec!["The C Programming Language", "0131103628", "K&R, 2nd ed."])
    }

    fn make_lookup() -> PriceLookup {
        PriceLookup {
            isbn: "0131103628".to_string(),
            url: Some("https://isbn.nu/0131103628".to_string()),
            summary: PriceSummary::from_quotes([12.5, 8.0]),
            list_price: Some(19.99),
        }
    }

    #[test]
    fn test_header() {
        let formatter = Formatter::default();
        let input = StringRecord::from(vec!["title", "isbn"]);
        let header = formatter.header(&input);

        assert_eq!(
            header,
            StringRecord::from(vec![
                "title",
                "isbn",
                "price_url",
                "min_price",
                "average_price",
                "max_price",
                "list_price"
            ])
        );
    }

    #[test]
    fn test_data_row() {
        let formatter = Formatter::default();
        let row = formatter.data_row(&make_input(), &make_lookup());

        assert_eq!(row.len(), 8);
        assert_eq!(&row[3], "https://isbn.nu/0131103628");
        assert_eq!(&row[4], "$8.00");
        assert_eq!(&row[5], "$10.25");
        assert_eq!(&row[6], "$12.50");
        assert_eq!(&row[7], "$19.99");
    }

    #[test]
    fn test_data_row_keeps_input_fields() {
        let formatter = Formatter::default();
        let input = make_input();
        let row = formatter.data_row(&input, &make_lookup());

        for (i, field) in input.iter().enumerate() {
            assert_eq!(&row[i], field);
        }
    }

    #[test]
    fn test_data_row_skipped_lookup() {
        let formatter = Formatter::default();
        let input = StringRecord::from(vec!["Untitled", ""]);
        let row = formatter.data_row(&input, &PriceLookup::skipped(""));

        assert_eq!(row, StringRecord::from(vec!["Untitled", "", "", "", "", "", ""]));
    }

    #[test]
    fn test_data_row_missing_list_price_only() {
        let formatter = Formatter::default();
        let lookup = PriceLookup { list_price: None, ..make_lookup() };
        let row = formatter.data_row(&make_input(), &lookup);

        assert_eq!(&row[6], "$12.50");
        assert_eq!(&row[7], "");
    }

    #[test]
    fn test_price_rounding() {
        let formatter = Formatter::default();
        assert_eq!(formatter.price(Some(10.0)), "$10.00");
        assert_eq!(formatter.price(Some(3.456)), "$3.46");
        assert_eq!(formatter.price(Some(0.5)), "$0.50");
        assert_eq!(formatter.price(Some(1234.5)), "$1234.50");
        assert_eq!(formatter.price(None), "");
    }

    #[test]
    fn test_price_custom_symbol() {
        let formatter = Formatter::new("€");
        assert_eq!(formatter.price(Some(19.99)), "€19.99");
        assert_eq!(formatter.price(None), "");
    }
}
