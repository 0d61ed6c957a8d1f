//! Optional analytics enrichment of fetched quotes and candles

use async_trait::async_trait;

use super::candle::{Candle, CandleIndicators};
use super::error::EnrichmentError;
use super::quote::QuoteSnapshot;

/// Indicator series returned by an analytics backend, index-aligned with
/// the candles that were submitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorSeries {
    pub sma_20: Vec<f64>,
    pub rsi: Vec<f64>,
    pub macd: Vec<f64>,
}

#[async_trait]
pub trait Enricher: Send + Sync {
    async fn enrich_quote(&self, quote: &QuoteSnapshot) -> Result<QuoteSnapshot, EnrichmentError>;

    async fn enrich_candles(
        &self,
        candles: &[Candle],
        symbol: &str,
    ) -> Result<Vec<Candle>, EnrichmentError>;
}

/// Enricher used when no analytics backend is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEnricher;

#[async_trait]
impl Enricher for NoopEnricher {
    async fn enrich_quote(&self, quote: &QuoteSnapshot) -> Result<QuoteSnapshot, EnrichmentError> {
        Ok(quote.clone())
    }

    async fn enrich_candles(
        &self,
        candles: &[Candle],
        _symbol: &str,
    ) -> Result<Vec<Candle>, EnrichmentError> {
        Ok(candles.to_vec())
    }
}

/// Attaches each indicator series to the candles by index. A series shorter
/// than the candle list leaves the trailing candles without that value.
pub fn align_indicators(candles: &[Candle], series: &IndicatorSeries) -> Vec<Candle> {
    candles
        .iter()
        .enumerate()
        .map(|(i, candle)| {
            let indicators = CandleIndicators {
                sma_20: series.sma_20.get(i).copied(),
                rsi: series.rsi.get(i).copied(),
                macd: series.macd.get(i).copied(),
            };
            let mut candle = candle.clone();
            if !indicators.is_empty() {
                candle.indicators = Some(indicators);
            }
            candle
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn candles(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| Candle {
                timestamp: Utc.timestamp_opt(1_700_000_000 + i as i64 * 60, 0).unwrap(),
                open: 1.0,
                high: 2.0,
                low: 0.5,
                close: 1.5,
                volume: 100,
                indicators: None,
            })
            .collect()
    }

    #[test]
    fn test_align_stops_at_shorter_series() {
        let series = IndicatorSeries {
            sma_20: vec![10.0, 11.0],
            rsi: vec![50.0, 55.0, 60.0, 65.0, 70.0],
            macd: vec![],
        };
        let enriched = align_indicators(&candles(3), &series);

        assert_eq!(enriched.len(), 3);
        let first = enriched[0].indicators.as_ref().unwrap();
        assert_eq!(first.sma_20, Some(10.0));
        assert_eq!(first.rsi, Some(50.0));
        assert_eq!(first.macd, None);

        let last = enriched[2].indicators.as_ref().unwrap();
        assert_eq!(last.sma_20, None);
        assert_eq!(last.rsi, Some(60.0));
    }

    #[test]
    fn test_align_empty_series_leaves_candles_untouched() {
        let input = candles(2);
        let enriched = align_indicators(&input, &IndicatorSeries::default());
        assert_eq!(enriched, input);
    }

    #[tokio::test]
    async fn test_noop_enricher_returns_input() {
        let input = candles(4);
        let output = NoopEnricher.enrich_candles(&input, "AAPL").await.unwrap();
        assert_eq!(output, input);
    }
}
