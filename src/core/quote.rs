//! Normalized point-in-time quote

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CURRENCY: &str = "USD";

/// Analytics layered onto a quote by the enrichment stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteInsights {
    pub sentiment: f64,
    pub news_count: u32,
    pub analyst_rating: String,
    pub volatility: f64,
    pub trend: String,
}

/// A successful snapshot for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSnapshot {
    pub symbol: String,
    pub current_price: f64,
    pub open_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub volume: u64,
    pub day_change: f64,
    pub day_change_percent: f64,
    pub timestamp: DateTime<Utc>,
    pub currency: String,
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insights: Option<QuoteInsights>,
}

/// A quote that could not be produced. Numeric accessors on [`Quote`]
/// report zero for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedQuote {
    pub symbol: String,
    pub error_message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Quote {
    Ok(QuoteSnapshot),
    Error(FailedQuote),
}

impl Quote {
    pub fn failed(symbol: &str, message: impl Into<String>) -> Self {
        Self::failed_at(symbol, message, Utc::now())
    }

    /// A failed quote stamped with the caller's notion of now.
    pub fn failed_at(symbol: &str, message: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Quote::Error(FailedQuote {
            symbol: symbol.to_string(),
            error_message: message.into(),
            timestamp,
        })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Quote::Error(_))
    }

    pub fn symbol(&self) -> &str {
        match self {
            Quote::Ok(q) => &q.symbol,
            Quote::Error(e) => &e.symbol,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Quote::Ok(_) => None,
            Quote::Error(e) => Some(&e.error_message),
        }
    }

    pub fn current_price(&self) -> f64 {
        match self {
            Quote::Ok(q) => q.current_price,
            Quote::Error(_) => 0.0,
        }
    }

    pub fn day_change(&self) -> f64 {
        match self {
            Quote::Ok(q) => q.day_change,
            Quote::Error(_) => 0.0,
        }
    }

    pub fn day_change_percent(&self) -> f64 {
        match self {
            Quote::Ok(q) => q.day_change_percent,
            Quote::Error(_) => 0.0,
        }
    }

    pub fn snapshot(&self) -> Option<&QuoteSnapshot> {
        match self {
            Quote::Ok(q) => Some(q),
            Quote::Error(_) => None,
        }
    }
}

/// Returns `(day_change, day_change_percent)` relative to the previous close.
/// The percentage is zero when `previous_close` is not positive.
pub fn day_change(current_price: f64, previous_close: f64) -> (f64, f64) {
    let change = current_price - previous_close;
    let percent = if previous_close > 0.0 {
        change / previous_close * 100.0
    } else {
        0.0
    };
    (change, percent)
}
