//! Proxied JSON fetch client.
//!
//! Providers talk to their upstream catalogs through [`JsonFetcher`], which
//! performs exactly one GET per call and hands back the parsed JSON body.
//! There is no retry or backoff here; a provider that wants one builds it
//! on top.
//!
//! [`ProxiedClient`] is the production implementation. With a proxy
//! configured, the upstream URL is wrapped into the proxy's `destination`
//! parameter so upstream blocking never sees the caller directly:
//!
//! ```text
//! https://proxy.example/?destination=https%3A%2F%2Fnet-film.vercel.app%2Fapi%2Fsearch%3Fkeyword%3DHeat
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::error::FetchError;

/// Default per-request timeout when the caller does not set one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

const DEFAULT_USER_AGENT: &str = concat!("streamseek/", env!("CARGO_PKG_VERSION"));

/// Where and how to send a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    pub base_url: String,
    pub query: Vec<(String, String)>,
    /// Overrides the client's default timeout for this request only.
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            query: Vec::new(),
            timeout: None,
        }
    }

    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Value of the first query parameter named `key`.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Absolute upstream URL for `path`, query string included.
    pub fn upstream_url(&self, path: &str) -> Result<Url, FetchError> {
        let invalid = |reason: String| FetchError::InvalidUrl {
            url: format!("{}{path}", self.base_url),
            reason,
        };

        let base = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        let mut url = base.join(path).map_err(|e| invalid(e.to_string()))?;
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(self.query.iter());
        }
        Ok(url)
    }
}

/// One-shot JSON GET.
#[async_trait]
pub trait JsonFetcher: Send + Sync {
    /// GET `path` relative to `opts.base_url` and parse the body as JSON.
    async fn request(&self, path: &str, opts: &RequestOptions) -> Result<Value, FetchError>;
}

/// [`JsonFetcher`] over `reqwest`, optionally routed through a proxy.
#[derive(Debug, Clone)]
pub struct ProxiedClient {
    client: Client,
    proxy_url: Option<String>,
    default_timeout: Duration,
}

impl ProxiedClient {
    /// Direct client with default settings.
    pub fn new() -> Result<Self, FetchError> {
        Self::builder().build()
    }

    pub fn builder() -> ProxiedClientBuilder {
        ProxiedClientBuilder::default()
    }

    pub fn proxy_url(&self) -> Option<&str> {
        self.proxy_url.as_deref()
    }

    /// URL actually requested on the wire for `upstream`.
    pub fn wire_url(&self, upstream: &Url) -> String {
        match &self.proxy_url {
            Some(proxy) => {
                let sep = if proxy.contains('?') { '&' } else { '?' };
                format!(
                    "{proxy}{sep}destination={}",
                    urlencoding::encode(upstream.as_str())
                )
            }
            None => upstream.to_string(),
        }
    }
}

#[async_trait]
impl JsonFetcher for ProxiedClient {
    #[instrument(skip(self, opts), fields(base = %opts.base_url))]
    async fn request(&self, path: &str, opts: &RequestOptions) -> Result<Value, FetchError> {
        let upstream = opts.upstream_url(path)?;
        let wire = self.wire_url(&upstream);
        let timeout = opts.timeout.unwrap_or(self.default_timeout);
        let url = upstream.to_string();

        debug!(url = %url, proxied = self.proxy_url.is_some(), "Fetching upstream");

        let response = self
            .client
            .get(&wire)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(e, &url, timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| classify(e, &url, timeout))?;

        debug!(url = %url, bytes = body.len(), "Upstream responded");

        serde_json::from_str(&body).map_err(|e| FetchError::Decode {
            url,
            reason: e.to_string(),
        })
    }
}

fn classify(err: reqwest::Error, url: &str, timeout: Duration) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            source: err,
        }
    }
}

/// Builder for [`ProxiedClient`].
#[derive(Debug, Clone)]
pub struct ProxiedClientBuilder {
    proxy_url: Option<String>,
    user_agent: String,
    default_timeout: Duration,
}

impl Default for ProxiedClientBuilder {
    fn default() -> Self {
        Self {
            proxy_url: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            default_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ProxiedClientBuilder {
    /// Route requests through `proxy_url`. Empty strings disable the proxy.
    #[must_use]
    pub fn proxy_url(mut self, proxy_url: Option<String>) -> Self {
        self.proxy_url = proxy_url.filter(|p| !p.trim().is_empty());
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn build(self) -> Result<ProxiedClient, FetchError> {
        let client = Client::builder()
            // Keep connections alive for reuse across the request chain
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .use_rustls_tls()
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .user_agent(self.user_agent)
            .connect_timeout(Duration::from_secs(10))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| FetchError::Transport {
                url: self.proxy_url.clone().unwrap_or_default(),
                source: e,
            })?;

        Ok(ProxiedClient {
            client,
            proxy_url: self.proxy_url,
            default_timeout: self.default_timeout,
        })
    }
}
