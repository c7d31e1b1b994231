// Quote source venues
// External aggregator integrations behind the QuoteSource contract
//
// Numan Thabit 2025 Nov

pub mod adapter;
pub mod oneinch;

pub use adapter::{AdapterResult, DemoQuoteSource, QuoteSource};
pub use oneinch::OneInchQuoteSource;
