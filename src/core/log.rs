//! Subscriber setup for the binary. Library code only emits events.
use anyhow::{Context, Result};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

const CRATE_TARGET: &str = env!("CARGO_CRATE_NAME");

/// Crate events at WARN and above are always shown; `verbose` opens up DEBUG.
fn crate_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    }
}

pub fn init_logging(verbose: bool) -> Result<()> {
    let level = crate_level(verbose);
    let targets = Targets::new()
        .with_default(LevelFilter::ERROR)
        .with_target(CRATE_TARGET, level);
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let (pretty, compact) = if verbose {
        let layer = fmt::layer()
            .pretty()
            .without_time()
            .with_writer(std::io::stderr);
        (Some(layer), None)
    } else {
        let layer = fmt::layer()
            .compact()
            .without_time()
            .with_target(false)
            .with_writer(std::io::stderr);
        (None, Some(layer))
    };

    tracing_subscriber::registry()
        .with(pretty)
        .with(compact)
        .with(targets)
        .with(env_filter)
        .try_init()
        .context("Failed to install tracing subscriber")
}
