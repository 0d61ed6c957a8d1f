use anyhow::Result;
use tracing::debug;

use super::print_json;
use crate::market_data::MarketData;

/// Prints the candle series. With `strict`, a failed fetch is reported as an
/// error instead of an empty list.
pub async fn run(
    market_data: &MarketData,
    symbol: &str,
    timeframe: &str,
    provider: &str,
    strict: bool,
) -> Result<()> {
    let candles = if strict {
        market_data
            .try_get_candlestick_data(symbol, timeframe, provider)
            .await?
    } else {
        market_data
            .get_candlestick_data(symbol, timeframe, provider)
            .await
    };
    debug!(symbol, timeframe, count = candles.len(), "Candles ready");
    print_json(&candles)
}
