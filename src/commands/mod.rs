//! Command implementations.

pub mod enrich;

pub use enrich::{EnrichCommand, EnrichStats};
