pub mod candles;
pub mod portfolio;
pub mod quote;
pub mod setup;

use anyhow::{Context, Result};
use serde::Serialize;

/// Writes a value to stdout as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}
