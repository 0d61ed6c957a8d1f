//! Fetch orchestration: cache lookup, provider dispatch, enrichment and
//! cache write behind three calls that never fail outright.

use anyhow::{Context, Result};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::core::cache::{CacheKey, Clock, DataKind, SystemClock, TtlCache};
use crate::core::candle::Candle;
use crate::core::config::AppConfig;
use crate::core::enrich::{Enricher, NoopEnricher};
use crate::core::error::FetchError;
use crate::core::portfolio::{self, PortfolioMetrics, Position};
use crate::core::quote::{Quote, QuoteSnapshot};
use crate::core::timeframe::Timeframe;
use crate::providers::analytics::AnalyticsEnricher;
use crate::providers::pending::PendingProvider;
use crate::providers::router::ProviderRouter;
use crate::providers::yahoo_finance::{self, YahooFinanceProvider};

pub const DEFAULT_PROVIDER: &str = yahoo_finance::PROVIDER_ID;
pub const DEFAULT_TIMEFRAME: &str = "1d";

#[derive(Debug, Clone)]
enum Payload {
    Quote(Quote),
    Candles(Vec<Candle>),
}

pub struct MarketData {
    router: ProviderRouter,
    enricher: Arc<dyn Enricher>,
    cache: TtlCache<Payload>,
    clock: Arc<dyn Clock>,
    cache_failed_quotes: bool,
}

impl MarketData {
    pub fn new(router: ProviderRouter, enricher: Arc<dyn Enricher>, ttl: Duration) -> Self {
        Self {
            router,
            enricher,
            cache: TtlCache::new(ttl),
            clock: Arc::new(SystemClock),
            cache_failed_quotes: true,
        }
    }

    /// Builds the default provider set sharing one HTTP client. The analytics
    /// backend is used for enrichment only when configured.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.http.user_agent.as_str())
            .timeout(config.request_timeout())
            .build()
            .context("Failed to build HTTP client")?;

        let mut router = ProviderRouter::new();
        router.register(Arc::new(YahooFinanceProvider::new(
            &config.providers.yahoo.base_url,
            client.clone(),
        )));
        router.register(Arc::new(PendingProvider::alpha_vantage()));
        router.register(Arc::new(PendingProvider::polygon()));

        let enricher: Arc<dyn Enricher> = match &config.analytics {
            Some(analytics) => Arc::new(AnalyticsEnricher::new(&analytics.base_url, client)),
            None => Arc::new(NoopEnricher),
        };
        debug!(providers = ?router.provider_ids(), "Market data providers registered");

        Ok(Self::new(router, enricher, config.cache_ttl())
            .cache_failed_quotes(config.cache.cache_failed_quotes))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Whether error-flagged quotes are cached like successful ones.
    pub fn cache_failed_quotes(mut self, enabled: bool) -> Self {
        self.cache_failed_quotes = enabled;
        self
    }

    pub async fn get_stock_quote(&self, symbol: &str, provider: &str) -> Quote {
        let now = self.clock.now();
        let key = CacheKey::new(symbol, DataKind::Quote, now);

        if let Some(Payload::Quote(cached)) = self.cache.get_valid(&key, now).await {
            info!("Returning cached quote for {}", symbol);
            return cached;
        }

        let quote = match self.fetch_quote(symbol, provider).await {
            Ok(quote) => quote,
            Err(e @ FetchError::UnsupportedProvider(_)) => {
                error!(symbol, provider, error = %e, "Failed to get quote");
                return Quote::failed_at(symbol, e.to_string(), now);
            }
            Err(e) => {
                error!(symbol, provider, error = %e, "Failed to get quote");
                Quote::failed_at(symbol, e.to_string(), now)
            }
        };

        if !quote.is_error() || self.cache_failed_quotes {
            self.cache.put(key, Payload::Quote(quote.clone()), now).await;
        }
        quote
    }

    /// Candle series for a symbol, or an empty series on any failure.
    pub async fn get_candlestick_data(
        &self,
        symbol: &str,
        timeframe: &str,
        provider: &str,
    ) -> Vec<Candle> {
        match self.try_get_candlestick_data(symbol, timeframe, provider).await {
            Ok(candles) => candles,
            Err(e) => {
                error!(symbol, provider, timeframe, error = %e, "Failed to get chart data");
                Vec::new()
            }
        }
    }

    /// Like [`get_candlestick_data`](Self::get_candlestick_data) but reports
    /// why no candles were produced.
    pub async fn try_get_candlestick_data(
        &self,
        symbol: &str,
        timeframe: &str,
        provider: &str,
    ) -> Result<Vec<Candle>, FetchError> {
        let now = self.clock.now();
        let key = CacheKey::new(symbol, DataKind::Candles(timeframe.to_string()), now);

        if let Some(Payload::Candles(cached)) = self.cache.get_valid(&key, now).await {
            info!("Returning cached candlestick data for {}", symbol);
            return Ok(cached);
        }

        let adapter = self.router.resolve(provider)?;
        let candles = adapter
            .fetch_candles(symbol, Timeframe::resolve(timeframe))
            .await?;
        let candles = self.enrich_candles(candles, symbol).await;

        self.cache
            .put(key, Payload::Candles(candles.clone()), now)
            .await;
        Ok(candles)
    }

    pub fn calculate_portfolio_metrics(&self, positions: &[Position]) -> PortfolioMetrics {
        portfolio::calculate_portfolio_metrics(positions)
    }

    async fn fetch_quote(&self, symbol: &str, provider: &str) -> Result<Quote, FetchError> {
        let adapter = self.router.resolve(provider)?;
        Ok(match adapter.fetch_quote(symbol).await? {
            Quote::Ok(snapshot) => Quote::Ok(self.enrich_quote(snapshot).await),
            failed => failed,
        })
    }

    async fn enrich_quote(&self, snapshot: QuoteSnapshot) -> QuoteSnapshot {
        match self.enricher.enrich_quote(&snapshot).await {
            Ok(enriched) => enriched,
            Err(e) => {
                warn!(symbol = %snapshot.symbol, error = %e, "Failed to enrich quote");
                snapshot
            }
        }
    }

    async fn enrich_candles(&self, candles: Vec<Candle>, symbol: &str) -> Vec<Candle> {
        if candles.is_empty() {
            return candles;
        }
        match self.enricher.enrich_candles(&candles, symbol).await {
            Ok(enriched) => enriched,
            Err(e) => {
                warn!(symbol, error = %e, "Failed to enrich chart data");
                candles
            }
        }
    }
}
