//! In-memory transport for tests.
//!
//! Compiled only for this crate's own tests or with the `test-util` feature,
//! which member crates enable from their `[dev-dependencies]`.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{DataFetchError, Result};
use crate::http::Fetcher;

/// [`Fetcher`] that serves canned bodies from memory.
///
/// Unknown URLs fail like an HTTP 404. Every request is recorded so callers
/// can assert on fetch counts and order.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    pages: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a body for a URL.
    pub fn with_page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.insert(url.into(), body.into());
        self
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Number of times `url` was requested.
    pub fn request_count(&self, url: &str) -> usize {
        self.requests().iter().filter(|u| *u == url).count()
    }
}

impl Fetcher for StaticFetcher {
    async fn get_text(&self, url: &str) -> Result<String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| DataFetchError::Network(format!("{url}: HTTP 404 Not Found")))
    }
}
