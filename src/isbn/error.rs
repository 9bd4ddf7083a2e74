//! Per-page extraction failures.
//!
//! None of these stop a run: the row is still written, with the affected
//! columns left empty.

use std::num::ParseFloatError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    /// No price marker on the page parsed to a positive amount.
    #[error("couldn't find any prices in page")]
    NoPrices,

    /// The list price marker does not appear on the page.
    #[error("can't find match for original list price")]
    NoListPrice,

    /// The list price marker is present but holds zero.
    #[error("list price not available")]
    ListPriceNotAvailable,

    /// The list price parses but is too large to be a real amount.
    #[error("list price {value:?} is out of range")]
    ListPriceOutOfRange { value: String },

    #[error("invalid list price {value:?}: {source}")]
    InvalidListPrice {
        value: String,
        #[source]
        source: ParseFloatError,
    },
}
