//! Regular expressions used to scrape isbn.nu price pages.
//!
//! These are the defaults; both can be replaced from the config file
//! (`price_pattern`, `list_price_pattern`) when the site changes its markup.
//!
//! **Update process**: when extraction starts failing for every ISBN,
//! capture a page, adjust the pattern, and refresh `tests/fixtures/`.

/// One marketplace offer. Every offer row on the page carries an id like
/// `row_price_12.50_`; capture group 1 is the amount.
pub const PRICE: &str = r"row_price_(\d+.\d+)_";

/// Publisher list price from the book info block. Only the first match is used.
pub const LIST_PRICE: &str = r#"<span class="bi_col_value">\$(\d+.\d+)<"#;
