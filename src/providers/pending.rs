//! Providers that need credentials the crate does not handle yet.
//!
//! They are registered so the router accepts their ids, but quotes come back
//! as a deterministic error quote and charts as an empty series. No network
//! requests are made.

use async_trait::async_trait;

use crate::core::candle::Candle;
use crate::core::error::FetchError;
use crate::core::provider::MarketDataProvider;
use crate::core::quote::Quote;
use crate::core::timeframe::Timeframe;

pub const ALPHA_VANTAGE_ID: &str = "alphavantage";
pub const POLYGON_ID: &str = "polygon";

pub struct PendingProvider {
    id: &'static str,
    name: &'static str,
}

impl PendingProvider {
    pub fn alpha_vantage() -> Self {
        Self {
            id: ALPHA_VANTAGE_ID,
            name: "Alpha Vantage",
        }
    }

    pub fn polygon() -> Self {
        Self {
            id: POLYGON_ID,
            name: "Polygon.io",
        }
    }
}

#[async_trait]
impl MarketDataProvider for PendingProvider {
    fn id(&self) -> &str {
        self.id
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, FetchError> {
        Ok(Quote::failed(symbol, format!("{} not implemented", self.name)))
    }

    async fn fetch_candles(
        &self,
        _symbol: &str,
        _timeframe: Timeframe,
    ) -> Result<Vec<Candle>, FetchError> {
        Ok(Vec::new())
    }
}
