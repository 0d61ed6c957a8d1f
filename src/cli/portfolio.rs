use anyhow::{Context, Result};
use futures::future::join_all;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use super::print_json;
use crate::core::portfolio::{PortfolioMetrics, Position, PositionInsights};
use crate::core::quote::Quote;
use crate::market_data::MarketData;

pub fn load_positions<P: AsRef<Path>>(path: P) -> Result<Vec<Position>> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read positions file: {}", path.as_ref().display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse positions file: {}", path.as_ref().display()))
}

/// Applies a fetched quote to a position. Failed quotes leave the supplied
/// price untouched.
fn apply_quote(position: &mut Position, quote: &Quote) {
    let Some(snapshot) = quote.snapshot() else {
        warn!(
            symbol = %position.symbol,
            error = quote.error_message().unwrap_or_default(),
            "Keeping supplied price"
        );
        return;
    };
    position.current_price = snapshot.current_price;
    position.day_change = snapshot.day_change;
    if let Some(insights) = &snapshot.insights {
        position.insights = Some(PositionInsights {
            sentiment: Some(insights.sentiment),
            volatility: Some(insights.volatility),
            trend: Some(insights.trend.clone()),
        });
    }
}

/// Fetches current quotes for all positions concurrently and folds them in.
pub async fn refresh_positions(
    market_data: &MarketData,
    positions: &mut [Position],
    provider: &str,
) {
    let quotes = join_all(
        positions
            .iter()
            .map(|p| market_data.get_stock_quote(&p.symbol, provider)),
    )
    .await;

    for (position, quote) in positions.iter_mut().zip(quotes.iter()) {
        apply_quote(position, quote);
    }
    debug!(count = positions.len(), "Positions refreshed");
}

pub async fn evaluate(
    market_data: &MarketData,
    path: &Path,
    refresh: bool,
    provider: &str,
) -> Result<PortfolioMetrics> {
    let mut positions = load_positions(path)?;
    if refresh {
        refresh_positions(market_data, &mut positions, provider).await;
    }
    Ok(market_data.calculate_portfolio_metrics(&positions))
}

pub async fn run(
    market_data: &MarketData,
    path: &Path,
    refresh: bool,
    provider: &str,
) -> Result<()> {
    let metrics = evaluate(market_data, path, refresh, provider).await?;
    print_json(&metrics)
}
