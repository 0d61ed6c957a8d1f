use anyhow::Result;
use tracing::debug;

use super::print_json;
use crate::market_data::MarketData;

pub async fn run(market_data: &MarketData, symbol: &str, provider: &str) -> Result<()> {
    let quote = market_data.get_stock_quote(symbol, provider).await;
    debug!(symbol, error = quote.is_error(), "Quote ready");
    print_json(&quote)
}
