use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};
use stockfeed::core::log::init_logging;
use stockfeed::market_data::{DEFAULT_PROVIDER, DEFAULT_TIMEFRAME};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Fetch the latest quote for a symbol
    Quote {
        symbol: String,
        #[arg(short, long, default_value = DEFAULT_PROVIDER)]
        provider: String,
    },
    /// Fetch OHLCV candles for a symbol
    Candles {
        symbol: String,
        /// One of 1m, 5m, 15m, 30m, 1h, 1d, 1w, 1M
        #[arg(short, long, default_value = DEFAULT_TIMEFRAME)]
        timeframe: String,
        #[arg(short, long, default_value = DEFAULT_PROVIDER)]
        provider: String,
        /// Fail on fetch errors instead of printing an empty list
        #[arg(long)]
        strict: bool,
    },
    /// Compute metrics for the positions in a YAML file
    Portfolio {
        file: PathBuf,
        /// Refresh current prices before computing metrics
        #[arg(short, long)]
        refresh: bool,
        #[arg(short, long, default_value = DEFAULT_PROVIDER)]
        provider: String,
    },
}

impl From<Commands> for stockfeed::AppCommand {
    fn from(cmd: Commands) -> stockfeed::AppCommand {
        match cmd {
            Commands::Quote { symbol, provider } => stockfeed::AppCommand::Quote { symbol, provider },
            Commands::Candles {
                symbol,
                timeframe,
                provider,
                strict,
            } => stockfeed::AppCommand::Candles {
                symbol,
                timeframe,
                provider,
                strict,
            },
            Commands::Portfolio {
                file,
                refresh,
                provider,
            } => stockfeed::AppCommand::Portfolio {
                path: file,
                refresh,
                provider,
            },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;

    let result = match cli.command {
        Some(Commands::Setup) => {
            stockfeed::cli::setup::setup(cli.config_path.as_deref().map(Path::new)).map(|path| {
                println!("Created configuration at {}", path.display());
            })
        }
        Some(cmd) => stockfeed::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
