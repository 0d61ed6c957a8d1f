//! Portfolio-level metrics over caller-supplied positions.
//!
//! Everything here is synchronous and pure: positions come in with their
//! current price already filled, metrics go out, nothing is retained.
use serde::{Deserialize, Serialize};

const DEFAULT_VOLATILITY: f64 = 0.5;
const NEUTRAL_TREND: &str = "NEUTRAL";

/// Enrichment data a caller may attach to a position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionInsights {
    pub sentiment: Option<f64>,
    pub volatility: Option<f64>,
    pub trend: Option<String>,
}

/// One holding as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub symbol: String,
    pub quantity: f64,
    pub buying_price: f64,
    #[serde(default)]
    pub current_price: f64,
    /// Per-unit change since the previous close.
    #[serde(default)]
    pub day_change: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insights: Option<PositionInsights>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    Buy,
    Sell,
    TakeProfit,
    StopLoss,
    Hold,
}

/// A position together with the fields derived from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionMetrics {
    #[serde(flatten)]
    pub position: Position,
    pub total_cost: f64,
    pub total_value: f64,
    pub profit_loss: f64,
    pub profit_loss_percent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<Recommendation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioMetrics {
    pub total_value: f64,
    pub total_cost: f64,
    pub total_profit_loss: f64,
    pub total_profit_loss_percent: f64,
    pub day_change: f64,
    pub day_change_percent: f64,
    pub positions: Vec<PositionMetrics>,
}

fn percent_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 { part / whole * 100.0 } else { 0.0 }
}

/// `min(1, volatility * quantity / 100)`; only clamped from above.
pub fn risk_score(volatility: f64, quantity: f64) -> f64 {
    (volatility * (quantity / 100.0)).min(1.0)
}

/// First matching rule wins: sentiment-driven BUY/SELL, then the
/// profit/loss thresholds, then HOLD.
pub fn recommend(sentiment: f64, trend: &str, profit_loss_percent: f64) -> Recommendation {
    if sentiment > 0.3 && matches!(trend, "BULLISH" | "UP") {
        Recommendation::Buy
    } else if sentiment < -0.3 && matches!(trend, "BEARISH" | "DOWN") {
        Recommendation::Sell
    } else if profit_loss_percent > 20.0 {
        Recommendation::TakeProfit
    } else if profit_loss_percent < -20.0 {
        Recommendation::StopLoss
    } else {
        Recommendation::Hold
    }
}

fn evaluate_position(position: &Position) -> PositionMetrics {
    let total_cost = position.quantity * position.buying_price;
    let total_value = position.quantity * position.current_price;
    let profit_loss = total_value - total_cost;
    let profit_loss_percent = percent_of(profit_loss, total_cost);

    let (risk, recommendation) = match &position.insights {
        Some(insights) => {
            let volatility = insights.volatility.unwrap_or(DEFAULT_VOLATILITY);
            let sentiment = insights.sentiment.unwrap_or(0.0);
            let trend = insights.trend.as_deref().unwrap_or(NEUTRAL_TREND);
            (
                Some(risk_score(volatility, position.quantity)),
                Some(recommend(sentiment, trend, profit_loss_percent)),
            )
        }
        None => (None, None),
    };

    PositionMetrics {
        position: position.clone(),
        total_cost,
        total_value,
        profit_loss,
        profit_loss_percent,
        risk_score: risk,
        recommendation,
    }
}

pub fn calculate_portfolio_metrics(positions: &[Position]) -> PortfolioMetrics {
    let mut metrics = PortfolioMetrics::default();

    for position in positions {
        let evaluated = evaluate_position(position);
        metrics.total_cost += evaluated.total_cost;
        metrics.total_value += evaluated.total_value;
        metrics.day_change += position.day_change * position.quantity;
        metrics.positions.push(evaluated);
    }

    metrics.total_profit_loss = metrics.total_value - metrics.total_cost;
    metrics.total_profit_loss_percent = percent_of(metrics.total_profit_loss, metrics.total_cost);
    metrics.day_change_percent = percent_of(metrics.day_change, metrics.total_value);
    metrics
}
