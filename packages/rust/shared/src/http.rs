//! HTTP transport used by every pipeline.
//!
//! Pipelines depend on the [`Fetcher`] trait rather than on reqwest directly,
//! so tests can substitute an in-memory transport (`StaticFetcher`, behind
//! the `test-util` feature).

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::config::HttpConfig;
use crate::error::{DataFetchError, Result};

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

/// Default User-Agent string for requests.
pub const DEFAULT_USER_AGENT: &str = concat!("datafetch/", env!("CARGO_PKG_VERSION"));

/// Browser-like User-Agent for sites that reject library clients.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0";

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Capability to GET a resource as text.
///
/// Implementations return the body on a 2xx response and
/// [`DataFetchError::Network`] on transport failure or any other status.
pub trait Fetcher: Send + Sync {
    fn get_text(&self, url: &str) -> impl Future<Output = Result<String>> + Send;
}

// ---------------------------------------------------------------------------
// reqwest implementation
// ---------------------------------------------------------------------------

/// [`Fetcher`] backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher with the given User-Agent and timeout settings.
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS));

        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }

        let client = builder.build().map_err(|e| {
            DataFetchError::Network(format!("failed to build HTTP client: {e}"))
        })?;

        Ok(Self { client })
    }

    /// Same as [`HttpFetcher::new`] but with a different User-Agent.
    pub fn with_user_agent(config: &HttpConfig, user_agent: &str) -> Result<Self> {
        let config = HttpConfig {
            user_agent: user_agent.to_string(),
            ..config.clone()
        };
        Self::new(&config)
    }
}

impl Fetcher for HttpFetcher {
    async fn get_text(&self, url: &str) -> Result<String> {
        debug!(%url, "GET");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DataFetchError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DataFetchError::Network(format!("{url}: HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| DataFetchError::Network(format!("{url}: failed to read body: {e}")))
    }
}
