use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::core::candle::Candle;
use crate::core::error::FetchError;
use crate::core::provider::MarketDataProvider;
use crate::core::quote::{self, DEFAULT_CURRENCY, Quote, QuoteSnapshot};
use crate::core::timeframe::Timeframe;

pub const PROVIDER_ID: &str = "yahoo";

/// Maps a timeframe to Yahoo's `(interval, range)` query parameters.
pub fn interval_and_range(timeframe: Timeframe) -> (&'static str, &'static str) {
    match timeframe {
        Timeframe::OneMinute => ("1m", "1d"),
        Timeframe::FiveMinutes => ("5m", "1d"),
        Timeframe::FifteenMinutes => ("15m", "1d"),
        Timeframe::ThirtyMinutes => ("30m", "1d"),
        Timeframe::OneHour => ("1h", "1d"),
        Timeframe::OneDay => ("1d", "1d"),
        Timeframe::OneWeek => ("1wk", "5d"),
        Timeframe::OneMonth => ("1mo", "1mo"),
    }
}

#[derive(Deserialize, Debug)]
struct YahooChartResponse {
    chart: ChartResult,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    result: Option<Vec<ChartItem>>,
}

#[derive(Deserialize, Debug)]
struct ChartItem {
    #[serde(default)]
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    previous_close: Option<f64>,
    currency: Option<String>,
    regular_market_price: Option<f64>,
}

#[derive(Deserialize, Debug)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteBars>,
}

#[derive(Deserialize, Debug, Default)]
struct QuoteBars {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

fn value_at(series: &[Option<f64>], index: usize) -> Option<f64> {
    series.get(index).copied().flatten()
}

fn to_datetime(ts: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(ts, 0).single()
}

impl ChartItem {
    /// Timestamps and the first bar set, or `None` when either is missing.
    fn series(&self) -> Option<(&[i64], &QuoteBars)> {
        let timestamps = self.timestamp.as_deref().filter(|ts| !ts.is_empty())?;
        let bars = self.indicators.as_ref()?.quote.first()?;
        Some((timestamps, bars))
    }
}

fn parse_quote(data: YahooChartResponse, symbol: &str) -> Result<Quote, FetchError> {
    let item = data
        .chart
        .result
        .and_then(|items| items.into_iter().next())
        .ok_or_else(|| FetchError::Parse(format!("No data available for symbol: {symbol}")))?;

    let (timestamps, bars) = item
        .series()
        .ok_or_else(|| FetchError::Parse(format!("No quote data for symbol: {symbol}")))?;

    let latest = timestamps.len() - 1;
    let timestamp = to_datetime(timestamps[latest])
        .ok_or_else(|| FetchError::Parse(format!("Invalid timestamp {}", timestamps[latest])))?;

    let current_price = value_at(&bars.close, latest)
        .or(item.meta.regular_market_price)
        .ok_or_else(|| {
            FetchError::Parse(format!("No price data available for symbol: {symbol}"))
        })?;
    let previous_close = item.meta.previous_close.unwrap_or(current_price);
    let (day_change, day_change_percent) = quote::day_change(current_price, previous_close);

    Ok(Quote::Ok(QuoteSnapshot {
        symbol: symbol.to_string(),
        current_price,
        open_price: value_at(&bars.open, latest).unwrap_or(0.0),
        high_price: value_at(&bars.high, latest).unwrap_or(0.0),
        low_price: value_at(&bars.low, latest).unwrap_or(0.0),
        volume: value_at(&bars.volume, latest).unwrap_or(0.0) as u64,
        day_change,
        day_change_percent,
        timestamp,
        currency: item
            .meta
            .currency
            .clone()
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        provider: PROVIDER_ID.to_string(),
        insights: None,
    }))
}

/// Builds candles from the parallel bar arrays. A row is kept only when all
/// four prices are present and the volume array reaches that index; no
/// values are synthesised for missing rows.
fn parse_candles(data: YahooChartResponse) -> Vec<Candle> {
    let Some(item) = data.chart.result.and_then(|items| items.into_iter().next()) else {
        return Vec::new();
    };
    let Some((timestamps, bars)) = item.series() else {
        return Vec::new();
    };

    let mut candles: Vec<Candle> = timestamps
        .iter()
        .enumerate()
        .filter_map(|(i, ts)| {
            let volume = bars.volume.get(i)?;
            Some(Candle {
                timestamp: to_datetime(*ts)?,
                open: value_at(&bars.open, i)?,
                high: value_at(&bars.high, i)?,
                low: value_at(&bars.low, i)?,
                close: value_at(&bars.close, i)?,
                volume: volume.unwrap_or(0.0) as u64,
                indicators: None,
            })
        })
        .collect();

    candles.sort_by_key(|c| c.timestamp);
    candles
}

/// Primary adapter for Yahoo's public chart API.
pub struct YahooFinanceProvider {
    base_url: String,
    client: Client,
}

impl YahooFinanceProvider {
    pub fn new(base_url: &str, client: Client) -> Self {
        YahooFinanceProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn chart_url(&self, symbol: &str) -> String {
        format!("{}/v8/finance/chart/{}", self.base_url, symbol)
    }

    async fn get_chart(&self, url: &str) -> Result<YahooChartResponse, FetchError> {
        debug!("Requesting chart data from {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UpstreamStatus(status.as_u16()));
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            FetchError::Parse(format!("Failed to parse chart response from {url}: {e}"))
        })
    }
}

#[async_trait]
impl MarketDataProvider for YahooFinanceProvider {
    fn id(&self) -> &str {
        PROVIDER_ID
    }

    #[instrument(name = "YahooQuoteFetch", skip(self), fields(symbol = %symbol))]
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, FetchError> {
        let data = self.get_chart(&self.chart_url(symbol)).await?;
        parse_quote(data, symbol)
    }

    #[instrument(
        name = "YahooCandleFetch",
        skip(self),
        fields(symbol = %symbol, timeframe = %timeframe)
    )]
    async fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Vec<Candle>, FetchError> {
        let (interval, range) = interval_and_range(timeframe);
        let url = format!(
            "{}?interval={}&range={}",
            self.chart_url(symbol),
            interval,
            range
        );
        let data = self.get_chart(&url).await?;
        Ok(parse_candles(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_mock_server(symbol: &str, mock_response: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        let request_path = format!("/v8/finance/chart/{symbol}");

        Mock::given(method("GET"))
            .and(path(request_path))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    fn provider(mock_server: &MockServer) -> YahooFinanceProvider {
        YahooFinanceProvider::new(&mock_server.uri(), Client::new())
    }

    const QUOTE_RESPONSE: &str = r#"{
        "chart": {
            "result": [{
                "meta": {
                    "previousClose": 100.0,
                    "currency": "EUR",
                    "regularMarketPrice": 109.0
                },
                "timestamp": [1700000000, 1700000060],
                "indicators": {
                    "quote": [{
                        "open": [99.0, 104.0],
                        "high": [105.0, 112.0],
                        "low": [98.0, 103.5],
                        "close": [104.0, 110.0],
                        "volume": [1000, 2500]
                    }]
                }
            }]
        }
    }"#;

    #[test]
    fn test_interval_and_range_table() {
        let expected = [
            ("1m", ("1m", "1d")),
            ("5m", ("5m", "1d")),
            ("15m", ("15m", "1d")),
            ("30m", ("30m", "1d")),
            ("1h", ("1h", "1d")),
            ("1d", ("1d", "1d")),
            ("1w", ("1wk", "5d")),
            ("1M", ("1mo", "1mo")),
            ("bogus", ("1d", "1d")),
        ];
        for (token, pair) in expected {
            assert_eq!(interval_and_range(Timeframe::resolve(token)), pair, "{token}");
        }
    }

    #[tokio::test]
    async fn test_successful_quote_fetch() {
        let mock_server = create_mock_server("AAPL", QUOTE_RESPONSE).await;

        let quote = provider(&mock_server).fetch_quote("AAPL").await.unwrap();
        let snapshot = quote.snapshot().expect("expected a successful quote");

        assert_eq!(snapshot.symbol, "AAPL");
        assert_eq!(snapshot.current_price, 110.0);
        assert_eq!(snapshot.open_price, 104.0);
        assert_eq!(snapshot.high_price, 112.0);
        assert_eq!(snapshot.low_price, 103.5);
        assert_eq!(snapshot.volume, 2500);
        assert_eq!(snapshot.day_change, 10.0);
        assert!((snapshot.day_change_percent - 10.0).abs() < 1e-9);
        assert_eq!(snapshot.timestamp.timestamp(), 1700000060);
        assert_eq!(snapshot.currency, "EUR");
        assert_eq!(snapshot.provider, "yahoo");
    }

    #[tokio::test]
    async fn test_quote_without_previous_close_has_zero_change() {
        let mock_response = r#"{
            "chart": {
                "result": [{
                    "meta": {},
                    "timestamp": [1700000000],
                    "indicators": {"quote": [{"close": [42.0]}]}
                }]
            }
        }"#;
        let mock_server = create_mock_server("MSFT", mock_response).await;

        let quote = provider(&mock_server).fetch_quote("MSFT").await.unwrap();
        assert_eq!(quote.current_price(), 42.0);
        assert_eq!(quote.day_change(), 0.0);
        assert_eq!(quote.day_change_percent(), 0.0);
        let snapshot = quote.snapshot().unwrap();
        assert_eq!(snapshot.currency, "USD");
        assert_eq!(snapshot.open_price, 0.0);
        assert_eq!(snapshot.volume, 0);
    }

    #[tokio::test]
    async fn test_quote_without_latest_close_or_market_price_is_parse_error() {
        let mock_response = r#"{
            "chart": {
                "result": [{
                    "meta": {"previousClose": 100.0},
                    "timestamp": [1700000000, 1700000060],
                    "indicators": {"quote": [{"close": [100.5]}]}
                }]
            }
        }"#;
        let mock_server = create_mock_server("MSFT", mock_response).await;

        let result = provider(&mock_server).fetch_quote("MSFT").await;
        assert_eq!(
            result.unwrap_err(),
            FetchError::Parse("No price data available for symbol: MSFT".to_string())
        );
    }

    #[tokio::test]
    async fn test_null_latest_close_falls_back_to_market_price() {
        let mock_response = r#"{
            "chart": {
                "result": [{
                    "meta": {"previousClose": 100.0, "regularMarketPrice": 104.0},
                    "timestamp": [1700000000, 1700000060],
                    "indicators": {"quote": [{"close": [100.5, null]}]}
                }]
            }
        }"#;
        let mock_server = create_mock_server("MSFT", mock_response).await;

        let quote = provider(&mock_server).fetch_quote("MSFT").await.unwrap();
        assert_eq!(quote.current_price(), 104.0);
        assert_eq!(quote.day_change(), 4.0);
    }

    #[tokio::test]
    async fn test_no_result_data_is_parse_error() {
        let mock_server = create_mock_server("INVALID", r#"{"chart": {"result": []}}"#).await;

        let result = provider(&mock_server).fetch_quote("INVALID").await;
        assert_eq!(
            result.unwrap_err(),
            FetchError::Parse("No data available for symbol: INVALID".to_string())
        );
    }

    #[tokio::test]
    async fn test_missing_timestamps_is_parse_error() {
        let mock_response = r#"{"chart": {"result": [{"meta": {"currency": "USD"}}]}}"#;
        let mock_server = create_mock_server("AAPL", mock_response).await;

        let result = provider(&mock_server).fetch_quote("AAPL").await;
        assert!(matches!(result, Err(FetchError::Parse(msg)) if msg.contains("No quote data")));
    }

    #[tokio::test]
    async fn test_http_error_maps_to_upstream_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/AAPL"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let result = provider(&mock_server).fetch_quote("AAPL").await;
        assert_eq!(result.unwrap_err(), FetchError::UpstreamStatus(500));
    }

    #[tokio::test]
    async fn test_malformed_response_is_parse_error() {
        let mock_server = create_mock_server("AAPL", r#"{"chart": "unavailable"}"#).await;

        let result = provider(&mock_server).fetch_candles("AAPL", Timeframe::OneDay).await;
        assert!(matches!(result, Err(FetchError::Parse(msg)) if msg.contains("Failed to parse")));
    }

    #[tokio::test]
    async fn test_unreachable_upstream() {
        // Nothing listens on port 9 locally
        let provider = YahooFinanceProvider::new("http://127.0.0.1:9", Client::new());
        let result = provider.fetch_quote("AAPL").await;
        assert!(matches!(result, Err(FetchError::UpstreamUnreachable(_))));
    }

    #[tokio::test]
    async fn test_candles_request_uses_interval_and_range() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/AAPL"))
            .and(query_param("interval", "1wk"))
            .and(query_param("range", "5d"))
            .respond_with(ResponseTemplate::new(200).set_body_string(QUOTE_RESPONSE))
            .expect(1)
            .mount(&mock_server)
            .await;

        let candles = provider(&mock_server)
            .fetch_candles("AAPL", Timeframe::OneWeek)
            .await
            .unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].open, 99.0);
        assert_eq!(candles[1].close, 110.0);
        assert_eq!(candles[1].volume, 2500);
        assert!(candles[0].timestamp < candles[1].timestamp);
    }

    #[tokio::test]
    async fn test_candles_stop_at_shortest_volume_series() {
        let mock_response = r#"{
            "chart": {
                "result": [{
                    "meta": {},
                    "timestamp": [1, 2, 3, 4, 5],
                    "indicators": {
                        "quote": [{
                            "open": [1.0, 2.0, 3.0, 4.0, 5.0],
                            "high": [1.0, 2.0, 3.0, 4.0, 5.0],
                            "low": [1.0, 2.0, 3.0, 4.0, 5.0],
                            "close": [1.0, 2.0, 3.0, 4.0, 5.0],
                            "volume": [10, 20, 30]
                        }]
                    }
                }]
            }
        }"#;
        let mock_server = create_mock_server("AAPL", mock_response).await;

        let candles = provider(&mock_server)
            .fetch_candles("AAPL", Timeframe::OneDay)
            .await
            .unwrap();
        assert_eq!(candles.len(), 3);
        assert_eq!(
            candles.iter().map(|c| c.volume).collect::<Vec<_>>(),
            vec![10, 20, 30]
        );
    }

    #[tokio::test]
    async fn test_candles_skip_rows_with_missing_prices() {
        let mock_response = r#"{
            "chart": {
                "result": [{
                    "meta": {},
                    "timestamp": [1, 2, 3],
                    "indicators": {
                        "quote": [{
                            "open": [1.0, null, 3.0],
                            "high": [1.0, 2.0, 3.0],
                            "low": [1.0, 2.0, 3.0],
                            "close": [1.0, 2.0, null],
                            "volume": [10, 20, null]
                        }]
                    }
                }]
            }
        }"#;
        let mock_server = create_mock_server("AAPL", mock_response).await;

        let candles = provider(&mock_server)
            .fetch_candles("AAPL", Timeframe::OneDay)
            .await
            .unwrap();
        assert_eq!(candles.len(), 1);
        assert_eq!(candles[0].timestamp.timestamp(), 1);
    }

    #[tokio::test]
    async fn test_candles_empty_result_is_empty_series() {
        let mock_server = create_mock_server("AAPL", r#"{"chart": {"result": null}}"#).await;

        let candles = provider(&mock_server)
            .fetch_candles("AAPL", Timeframe::OneDay)
            .await
            .unwrap();
        assert!(candles.is_empty());
    }
}
