//! Provider capability shared by every upstream adapter

use async_trait::async_trait;

use super::candle::Candle;
use super::error::FetchError;
use super::quote::Quote;
use super::timeframe::Timeframe;

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Identifier callers use to select this provider, e.g. `"yahoo"`.
    fn id(&self) -> &str;

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, FetchError>;

    async fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Vec<Candle>, FetchError>;
}
