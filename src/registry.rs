//! Provider catalog.
//!
//! # Architecture
//!
//! - [`Provider`]: async trait implemented once per upstream integration
//! - [`ProviderRegistry`]: append-only catalog, ordered by rank
//!
//! The registry is built once at startup and shared read-only (usually
//! behind an `Arc`) by every resolution. Nothing is process-global, so tests
//! construct their own registries with fake providers.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use streamseek::{AppConfig, MediaType, ProviderRegistry, ProxiedClient};
//!
//! # fn example() -> anyhow::Result<()> {
//! let fetcher = Arc::new(ProxiedClient::new()?);
//! let registry = ProviderRegistry::builtin(fetcher, &AppConfig::default())?;
//!
//! for provider in registry.list(MediaType::Movie) {
//!     println!("{} (rank {})", provider.display_name(), provider.rank());
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::{Result, ScrapeError};
use crate::fetch::JsonFetcher;
use crate::media::MediaType;
use crate::provider::Provider;
use crate::providers::NetFilmProvider;

/// Append-only catalog of providers.
#[derive(Default)]
pub struct ProviderRegistry {
    /// Kept in trial order: rank descending, then registration order.
    providers: Vec<Arc<dyn Provider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every shipped provider not disabled in `config`.
    pub fn builtin(fetcher: Arc<dyn JsonFetcher>, config: &AppConfig) -> Result<Self> {
        let candidates: Vec<Arc<dyn Provider>> = vec![Arc::new(NetFilmProvider::with_base_url(
            Arc::clone(&fetcher),
            config.netfilm.base_url.clone(),
        ))];

        let mut registry = Self::new();
        for provider in candidates {
            if config.is_disabled(provider.id()) {
                tracing::debug!("Provider {} disabled by config", provider.id());
                continue;
            }
            registry.register(provider)?;
        }
        Ok(registry)
    }

    /// Add `provider`. Fails if its id is already taken.
    pub fn register(&mut self, provider: Arc<dyn Provider>) -> Result<()> {
        if self.providers.iter().any(|p| p.id() == provider.id()) {
            return Err(ScrapeError::DuplicateProvider(provider.id().to_string()));
        }

        // Insert after every provider of equal or higher rank so ties keep
        // registration order.
        let rank = provider.rank();
        let at = self
            .providers
            .iter()
            .position(|p| p.rank() < rank)
            .unwrap_or(self.providers.len());
        tracing::debug!("Registered provider {} (rank {rank})", provider.id());
        self.providers.insert(at, provider);
        Ok(())
    }

    /// Providers supporting `media_type`, in trial order.
    pub fn list(&self, media_type: MediaType) -> Vec<Arc<dyn Provider>> {
        self.providers
            .iter()
            .filter(|p| p.supports(media_type))
            .cloned()
            .collect()
    }

    pub fn get_by_id(&self, id: &str) -> Result<Arc<dyn Provider>> {
        self.providers
            .iter()
            .find(|p| p.id() == id)
            .cloned()
            .ok_or_else(|| ScrapeError::NotFound(format!("no provider with id {id:?}")))
    }

    /// Every provider, in trial order.
    pub fn all(&self) -> impl Iterator<Item = &Arc<dyn Provider>> {
        self.providers.iter()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.providers.iter().map(|p| (p.id(), p.rank())))
            .finish()
    }
}
