//! Error taxonomy for upstream fetches and enrichment

use thiserror::Error;

/// Failure of a provider adapter or of provider resolution.
///
/// The orchestrator never lets these escape: quotes turn them into an
/// error-flagged [`Quote`](crate::core::quote::Quote) and candles into an
/// empty series. Callers that need the distinction use the strict
/// `try_` variants on [`MarketData`](crate::market_data::MarketData).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("Upstream returned HTTP {0}")]
    UpstreamStatus(u16),

    #[error("Upstream unreachable: {0}")]
    UpstreamUnreachable(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            return FetchError::Parse(e.to_string());
        }
        if let Some(status) = e.status() {
            return FetchError::UpstreamStatus(status.as_u16());
        }
        FetchError::UpstreamUnreachable(e.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Parse(e.to_string())
    }
}

/// Failure of the optional analytics backend. Always swallowed by the
/// orchestrator and logged as a warning.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("Analytics backend unreachable: {0}")]
    Unreachable(String),

    #[error("Analytics backend returned HTTP {0}")]
    Status(u16),

    #[error("Failed to parse analytics response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for EnrichmentError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            EnrichmentError::Parse(e.to_string())
        } else {
            EnrichmentError::Unreachable(e.to_string())
        }
    }
}
