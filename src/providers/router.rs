use std::collections::HashMap;
use std::sync::Arc;

use crate::core::error::FetchError;
use crate::core::provider::MarketDataProvider;

/// Resolves provider identifiers to adapters.
///
/// Resolution happens before any request is built, so an unknown id fails
/// without touching the network.
#[derive(Clone, Default)]
pub struct ProviderRouter {
    providers: HashMap<String, Arc<dyn MarketDataProvider>>,
}

impl ProviderRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a provider under its own id, replacing any previous one.
    pub fn register(&mut self, provider: Arc<dyn MarketDataProvider>) {
        self.providers.insert(provider.id().to_string(), provider);
    }

    pub fn resolve(&self, provider_id: &str) -> Result<Arc<dyn MarketDataProvider>, FetchError> {
        self.providers
            .get(provider_id)
            .cloned()
            .ok_or_else(|| FetchError::UnsupportedProvider(provider_id.to_string()))
    }

    pub fn provider_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}
