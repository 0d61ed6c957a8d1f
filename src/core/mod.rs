//! Provider-agnostic market data building blocks

pub mod cache;
pub mod candle;
pub mod config;
pub mod enrich;
pub mod error;
pub mod log;
pub mod portfolio;
pub mod provider;
pub mod quote;
pub mod timeframe;

// Re-export main types for cleaner imports
pub use candle::{Candle, CandleIndicators};
pub use enrich::{Enricher, NoopEnricher};
pub use error::{EnrichmentError, FetchError};
pub use portfolio::{PortfolioMetrics, Position, PositionMetrics, Recommendation};
pub use provider::MarketDataProvider;
pub use quote::{FailedQuote, Quote, QuoteInsights, QuoteSnapshot};
pub use timeframe::Timeframe;
