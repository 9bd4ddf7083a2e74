//! isbn.nu specific modules for HTTP client, price extraction, and data models.

pub mod client;
pub mod error;
pub mod models;
pub mod parser;
pub mod patterns;

pub use client::{IsbnClient, PricePageSource};
pub use error::ExtractError;
pub use models::{PriceLookup, PriceSummary};
pub use parser::{ListPriceExtractor, PageReport, Parser, PriceExtractor};
