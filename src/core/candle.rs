use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Technical indicator values aligned onto a single candle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandleIndicators {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma_20: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd: Option<f64>,
}

impl CandleIndicators {
    pub fn is_empty(&self) -> bool {
        self.sma_20.is_none() && self.rsi.is_none() && self.macd.is_none()
    }
}

/// One OHLCV bar. Series are ordered by ascending timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indicators: Option<CandleIndicators>,
}
