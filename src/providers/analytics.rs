use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::core::candle::Candle;
use crate::core::enrich::{Enricher, IndicatorSeries, align_indicators};
use crate::core::error::EnrichmentError;
use crate::core::quote::{QuoteInsights, QuoteSnapshot};

#[derive(Debug, Deserialize)]
struct ContextResponse {
    #[serde(default)]
    sentiment: f64,
    #[serde(default)]
    news_count: u32,
    #[serde(default = "default_rating")]
    analyst_rating: String,
    #[serde(default = "default_volatility")]
    volatility_score: f64,
    #[serde(default = "default_trend")]
    trend: String,
}

fn default_rating() -> String {
    "HOLD".to_string()
}

fn default_volatility() -> f64 {
    0.5
}

fn default_trend() -> String {
    "NEUTRAL".to_string()
}

impl From<ContextResponse> for QuoteInsights {
    fn from(ctx: ContextResponse) -> Self {
        QuoteInsights {
            sentiment: ctx.sentiment,
            news_count: ctx.news_count,
            analyst_rating: ctx.analyst_rating,
            volatility: ctx.volatility_score,
            trend: ctx.trend,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct TechnicalResponse {
    #[serde(default)]
    sma_20: Vec<f64>,
    #[serde(default)]
    rsi: Vec<f64>,
    #[serde(default)]
    macd: Vec<f64>,
}

/// Enricher backed by an HTTP analytics service exposing
/// `GET /context/{symbol}` and `POST /technical/{symbol}`.
pub struct AnalyticsEnricher {
    base_url: String,
    client: Client,
}

impl AnalyticsEnricher {
    pub fn new(base_url: &str, client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, EnrichmentError> {
        let status = response.status();
        if !status.is_success() {
            return Err(EnrichmentError::Status(status.as_u16()));
        }
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| EnrichmentError::Parse(e.to_string()))
    }
}

#[async_trait]
impl Enricher for AnalyticsEnricher {
    #[instrument(name = "AnalyticsQuoteEnrich", skip_all, fields(symbol = %quote.symbol))]
    async fn enrich_quote(&self, quote: &QuoteSnapshot) -> Result<QuoteSnapshot, EnrichmentError> {
        let url = format!("{}/context/{}", self.base_url, quote.symbol);
        debug!("Requesting stock context from {}", url);

        let response = self.client.get(&url).send().await?;
        let context: ContextResponse = Self::read_json(response).await?;

        let mut enriched = quote.clone();
        enriched.insights = Some(context.into());
        Ok(enriched)
    }

    #[instrument(name = "AnalyticsCandleEnrich", skip(self, candles), fields(count = candles.len()))]
    async fn enrich_candles(
        &self,
        candles: &[Candle],
        symbol: &str,
    ) -> Result<Vec<Candle>, EnrichmentError> {
        let url = format!("{}/technical/{}", self.base_url, symbol);
        debug!("Requesting technical analysis from {}", url);

        let response = self.client.post(&url).json(candles).send().await?;
        let technical: TechnicalResponse = Self::read_json(response).await?;

        let series = IndicatorSeries {
            sma_20: technical.sma_20,
            rsi: technical.rsi,
            macd: technical.macd,
        };
        Ok(align_indicators(candles, &series))
    }
}
