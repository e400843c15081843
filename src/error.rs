//! Error types for stream resolution.
//!
//! Provider failures are values, not panics: the orchestrator records each
//! one against the provider id and only surfaces
//! [`ScrapeError::AggregateNoStreamFound`] once every candidate has failed.

use std::fmt;

use thiserror::Error;

use crate::media::MediaType;

/// Failure of a single outbound request made through a
/// [`JsonFetcher`](crate::fetch::JsonFetcher).
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid request URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("upstream returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("request to {url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("transport error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("response from {url} is not valid JSON: {reason}")]
    Decode { url: String, reason: String },
}

/// A provider failure as recorded by the orchestrator.
#[derive(Debug)]
pub struct ProviderFailure {
    pub provider_id: String,
    pub error: ScrapeError,
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.provider_id, self.error)
    }
}

/// Resolution errors.
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// Caller-supplied metadata is malformed.
    #[error("invalid media metadata: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("provider {provider_id} does not support {media_type}")]
    UnsupportedMediaType {
        provider_id: String,
        media_type: MediaType,
    },

    /// A field the provider depends on is missing or has the wrong shape.
    #[error("unexpected upstream response: {0}")]
    UpstreamShape(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Registration-time programming error.
    #[error("provider id {0:?} is already registered")]
    DuplicateProvider(String),

    #[error("no stream found ({} provider(s) tried){}", .0.len(), format_failures(.0))]
    AggregateNoStreamFound(Vec<ProviderFailure>),

    /// The resolution was overtaken by a newer generation.
    #[error("resolution superseded by a newer request")]
    Superseded,
}

impl ScrapeError {
    /// Per-provider failures carried by an aggregate error, empty otherwise.
    pub fn failures(&self) -> &[ProviderFailure] {
        match self {
            Self::AggregateNoStreamFound(failures) => failures,
            _ => &[],
        }
    }
}

fn format_failures(failures: &[ProviderFailure]) -> String {
    failures.iter().fold(String::new(), |mut out, failure| {
        out.push_str("; ");
        out.push_str(&failure.to_string());
        out
    })
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
