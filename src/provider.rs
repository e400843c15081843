//! Provider trait and per-invocation context.
//!
//! A [`Provider`] resolves a playable stream from one upstream catalog.
//! Providers are registered once in a
//! [`ProviderRegistry`](crate::registry::ProviderRegistry) and invoked by the
//! [`Orchestrator`](crate::orchestrator::Orchestrator) with a fresh
//! [`ScrapeContext`] per attempt.

use std::sync::atomic::{AtomicU8, Ordering};

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;

use crate::error::Result;
use crate::media::{MediaMeta, MediaType};
use crate::stream::ScrapeResult;

/// Progress checkpoint forwarded to the caller of a resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub provider_id: String,
    /// Provider-local percentage.
    pub local: u8,
    /// Percentage of the whole resolution.
    pub overall: u8,
}

/// Reports one provider's progress, rescaled into its slice of the overall
/// range.
///
/// Values are clamped to 100 and anything lower than the last reported value
/// is dropped, so receivers see a non-decreasing sequence.
#[derive(Debug)]
pub struct ProgressReporter {
    provider_id: String,
    tx: Option<UnboundedSender<ProgressEvent>>,
    slice_index: u32,
    slice_count: u32,
    last: AtomicU8,
}

impl ProgressReporter {
    /// Reporter for attempt `slice_index` of `slice_count`.
    pub fn new(
        provider_id: impl Into<String>,
        tx: Option<UnboundedSender<ProgressEvent>>,
        slice_index: u32,
        slice_count: u32,
    ) -> Self {
        let slice_count = slice_count.max(1);
        Self {
            provider_id: provider_id.into(),
            tx,
            slice_index: slice_index.min(slice_count - 1),
            slice_count,
            last: AtomicU8::new(0),
        }
    }

    /// Reporter that drops everything.
    pub fn silent(provider_id: impl Into<String>) -> Self {
        Self::new(provider_id, None, 0, 1)
    }

    pub fn report(&self, percent: u8) {
        let percent = percent.min(100);
        let previous = self.last.fetch_max(percent, Ordering::AcqRel);
        if percent <= previous {
            return;
        }

        let Some(tx) = &self.tx else { return };
        let event = ProgressEvent {
            provider_id: self.provider_id.clone(),
            local: percent,
            overall: self.overall(percent),
        };
        // The caller may have stopped listening; progress is advisory.
        let _ = tx.send(event);
    }

    /// Highest value reported so far.
    pub fn last(&self) -> u8 {
        self.last.load(Ordering::Acquire)
    }

    fn overall(&self, local: u8) -> u8 {
        let scaled = (self.slice_index * 100 + u32::from(local)) / self.slice_count;
        u8::try_from(scaled.min(100)).unwrap_or(100)
    }
}

/// Everything a provider gets for one invocation.
#[derive(Debug)]
pub struct ScrapeContext<'a> {
    pub media: &'a MediaMeta,
    /// Catalog episode id, required for series.
    pub episode_id: Option<&'a str>,
    progress: &'a ProgressReporter,
}

impl<'a> ScrapeContext<'a> {
    pub fn new(
        media: &'a MediaMeta,
        episode_id: Option<&'a str>,
        progress: &'a ProgressReporter,
    ) -> Self {
        Self {
            media,
            episode_id,
            progress,
        }
    }

    /// Report a progress checkpoint in `0..=100`.
    pub fn progress(&self, percent: u8) {
        self.progress.report(percent);
    }
}

/// A pluggable upstream integration.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Globally unique, lowercase id (e.g. `"netfilm"`).
    fn id(&self) -> &str;

    /// Human-readable name.
    fn display_name(&self) -> &str;

    /// Trial priority; higher is tried first.
    fn rank(&self) -> i32;

    /// Media types this provider can resolve.
    fn media_types(&self) -> &[MediaType];

    fn supports(&self, media_type: MediaType) -> bool {
        self.media_types().contains(&media_type)
    }

    /// Resolve a stream for `ctx.media`.
    ///
    /// Absence of a stream is an error, never an empty `Ok`.
    async fn scrape(&self, ctx: &ScrapeContext<'_>) -> Result<ScrapeResult>;
}
