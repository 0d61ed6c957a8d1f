pub mod cli;
pub mod core;
pub mod market_data;
pub mod providers;

pub use crate::core::portfolio::calculate_portfolio_metrics;
pub use market_data::MarketData;

use anyhow::Result;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::core::config::AppConfig;

/// Commands that run against a configured [`MarketData`] service.
#[derive(Debug, Clone)]
pub enum AppCommand {
    Quote {
        symbol: String,
        provider: String,
    },
    Candles {
        symbol: String,
        timeframe: String,
        provider: String,
        strict: bool,
    },
    Portfolio {
        path: PathBuf,
        refresh: bool,
        provider: String,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("stockfeed starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let market_data = MarketData::from_config(&config)?;

    match command {
        AppCommand::Quote { symbol, provider } => {
            cli::quote::run(&market_data, &symbol, &provider).await
        }
        AppCommand::Candles {
            symbol,
            timeframe,
            provider,
            strict,
        } => cli::candles::run(&market_data, &symbol, &timeframe, &provider, strict).await,
        AppCommand::Portfolio {
            path,
            refresh,
            provider,
        } => cli::portfolio::run(&market_data, &path, refresh, &provider).await,
    }
}
