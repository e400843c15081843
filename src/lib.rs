//! `StreamSeek` - Resolve playable video streams from pluggable providers
//!
//! # Features
//!
//! - **Providers**: one async trait, one implementation per upstream catalog
//! - **Ranked fallback**: providers are tried highest rank first until one yields a stream
//! - **Progress**: per-provider checkpoints rescaled into one overall percentage
//! - **Last request wins**: generation tickets discard results nobody is waiting for
//! - **Proxy indirection**: upstream requests can be tunnelled through a `destination=` proxy
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use streamseek::{AppConfig, MediaMeta, Orchestrator, ProviderRegistry, ResolveRequest};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::load()?;
//!     let registry = ProviderRegistry::builtin(Arc::new(config.fetch_client()?), &config)?;
//!     let orchestrator = Orchestrator::new(Arc::new(registry));
//!
//!     let media = MediaMeta::movie("Heat", "1995");
//!     let resolved = orchestrator.resolve(ResolveRequest::new(&media)).await?;
//!     println!("{:?}", resolved.stream_url());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod fetch;
pub mod generation;
pub mod media;
pub mod orchestrator;
pub mod provider;
pub mod providers;
pub mod registry;
pub mod stream;

pub use config::{AppConfig, NetFilmConfig};
pub use error::{FetchError, ProviderFailure, Result, ScrapeError};
pub use fetch::{JsonFetcher, ProxiedClient, RequestOptions};
pub use generation::{GenerationTicket, Generations};
pub use media::{EpisodeMeta, MediaMeta, MediaType, SeasonData};
pub use orchestrator::{Orchestrator, ResolveRequest, Resolved};
pub use provider::{ProgressEvent, ProgressReporter, Provider, ScrapeContext};
pub use providers::NetFilmProvider;
pub use registry::ProviderRegistry;
pub use stream::{CaptionType, MwCaption, MwEmbed, MwStream, ScrapeResult, StreamQuality, StreamType};

/// Version of streamseek
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
