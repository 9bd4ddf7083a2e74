//! isbn-prices - Enrich a CSV of books with prices scraped per ISBN
//!
//! Reads book rows, fetches the isbn.nu page for each ISBN one at a time,
//! and appends min/average/max marketplace prices and the list price.

pub mod commands;
pub mod config;
pub mod format;
pub mod isbn;

pub use config::Config;
pub use isbn::models::{PriceLookup, PriceSummary};
pub use isbn::parser::{ListPriceExtractor, Parser, PriceExtractor};
