//! Scrape orchestration.
//!
//! The [`Orchestrator`] tries every provider that supports the requested
//! media type, highest rank first and strictly one at a time. The first
//! provider to produce a usable result wins; failures are collected and
//! only reported, as [`ScrapeError::AggregateNoStreamFound`], once the list
//! is exhausted.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use streamseek::{AppConfig, MediaMeta, Orchestrator, ProviderRegistry, ResolveRequest};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = AppConfig::load()?;
//! let fetcher = Arc::new(config.fetch_client()?);
//! let registry = Arc::new(ProviderRegistry::builtin(fetcher, &config)?);
//! let orchestrator = Orchestrator::new(registry);
//!
//! let media = MediaMeta::movie("Heat", "1995");
//! let resolved = orchestrator.resolve(ResolveRequest::new(&media)).await?;
//! println!("{} via {}", resolved.stream_url().unwrap_or("-"), resolved.provider_id);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::{ProviderFailure, Result, ScrapeError};
use crate::generation::GenerationTicket;
use crate::media::MediaMeta;
use crate::provider::{ProgressEvent, ProgressReporter, Provider, ScrapeContext};
use crate::registry::ProviderRegistry;
use crate::stream::ScrapeResult;

/// One resolution request.
#[derive(Debug, Clone)]
pub struct ResolveRequest<'a> {
    pub media: &'a MediaMeta,
    pub episode_id: Option<&'a str>,
    progress: Option<UnboundedSender<ProgressEvent>>,
    ticket: Option<GenerationTicket>,
}

impl<'a> ResolveRequest<'a> {
    pub fn new(media: &'a MediaMeta) -> Self {
        Self {
            media,
            episode_id: None,
            progress: None,
            ticket: None,
        }
    }

    /// Catalog episode id (series only).
    #[must_use]
    pub fn episode(mut self, episode_id: &'a str) -> Self {
        self.episode_id = Some(episode_id);
        self
    }

    /// Receive rescaled progress events on `tx`.
    #[must_use]
    pub fn progress(mut self, tx: UnboundedSender<ProgressEvent>) -> Self {
        self.progress = Some(tx);
        self
    }

    /// Stop early once `ticket` goes stale.
    #[must_use]
    pub fn generation(mut self, ticket: GenerationTicket) -> Self {
        self.ticket = Some(ticket);
        self
    }

    fn ensure_current(&self) -> Result<()> {
        match &self.ticket {
            Some(ticket) if ticket.is_stale() => Err(ScrapeError::Superseded),
            _ => Ok(()),
        }
    }
}

/// A successful resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolved {
    pub provider_id: String,
    #[serde(flatten)]
    pub result: ScrapeResult,
}

impl Resolved {
    pub fn stream_url(&self) -> Option<&str> {
        self.result.stream.as_ref().map(|s| s.stream_url.as_str())
    }
}

/// Drives providers from a shared registry.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    registry: Arc<ProviderRegistry>,
}

impl Orchestrator {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Resolve a stream, trying providers in rank order until one succeeds.
    pub async fn resolve(&self, request: ResolveRequest<'_>) -> Result<Resolved> {
        request.media.validate(request.episode_id)?;

        let candidates = self.registry.list(request.media.media_type);
        let span = info_span!(
            "resolve",
            request_id = %Uuid::new_v4(),
            title = %request.media.title,
            media_type = %request.media.media_type,
        );

        run_candidates(&candidates, &request).instrument(span).await
    }

    /// Run exactly one provider, bypassing rank order.
    pub async fn scrape_with(
        &self,
        provider_id: &str,
        request: ResolveRequest<'_>,
    ) -> Result<Resolved> {
        request.media.validate(request.episode_id)?;

        let provider = self.registry.get_by_id(provider_id)?;
        if !provider.supports(request.media.media_type) {
            return Err(ScrapeError::UnsupportedMediaType {
                provider_id: provider_id.to_string(),
                media_type: request.media.media_type,
            });
        }

        let span = info_span!(
            "scrape_with",
            request_id = %Uuid::new_v4(),
            provider = provider_id,
            title = %request.media.title,
        );
        async {
            request.ensure_current()?;
            let result = attempt(provider.as_ref(), &request, 0, 1).await?;
            request.ensure_current()?;
            Ok::<_, ScrapeError>(Resolved {
                provider_id: provider_id.to_string(),
                result,
            })
        }
        .instrument(span)
        .await
    }
}

async fn run_candidates(
    candidates: &[Arc<dyn Provider>],
    request: &ResolveRequest<'_>,
) -> Result<Resolved> {
    let total = u32::try_from(candidates.len()).unwrap_or(u32::MAX);
    debug!("{total} candidate provider(s)");

    let mut failures = Vec::new();
    for (index, provider) in (0u32..).zip(candidates) {
        request.ensure_current()?;

        debug!("Trying provider {} (rank {})", provider.id(), provider.rank());
        match attempt(provider.as_ref(), request, index, total).await {
            Ok(result) => {
                request.ensure_current()?;
                info!("Resolved via {}", provider.id());
                return Ok(Resolved {
                    provider_id: provider.id().to_string(),
                    result,
                });
            }
            Err(error) => {
                warn!("Provider {} failed: {error}", provider.id());
                failures.push(ProviderFailure {
                    provider_id: provider.id().to_string(),
                    error,
                });
            }
        }
    }

    request.ensure_current()?;
    Err(ScrapeError::AggregateNoStreamFound(failures))
}

async fn attempt(
    provider: &dyn Provider,
    request: &ResolveRequest<'_>,
    index: u32,
    total: u32,
) -> Result<ScrapeResult> {
    let reporter = ProgressReporter::new(provider.id(), request.progress.clone(), index, total);
    let ctx = ScrapeContext::new(request.media, request.episode_id, &reporter);
    let result = provider.scrape(&ctx).await?;
    result.validate()?;
    Ok(result)
}
