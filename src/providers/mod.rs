pub mod analytics;
pub mod pending;
pub mod router;
pub mod yahoo_finance;

pub use router::ProviderRouter;
