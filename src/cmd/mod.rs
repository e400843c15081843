mod providers;
mod resolve;

pub use providers::cmd_providers;
pub use resolve::{cmd_resolve, ResolveTarget};

use std::sync::Arc;

use anyhow::{Context, Result};

use streamseek::{AppConfig, ProviderRegistry};

/// Registry of every enabled built-in provider, wired to the configured client.
fn build_registry(config: &AppConfig) -> Result<Arc<ProviderRegistry>> {
    let fetcher = Arc::new(config.fetch_client()?);
    let registry =
        ProviderRegistry::builtin(fetcher, config).context("failed to register providers")?;
    Ok(Arc::new(registry))
}
