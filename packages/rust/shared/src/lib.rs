//! Shared types, error model, and configuration for datafetch.
//!
//! This crate is the foundation depended on by all other datafetch crates.
//! It provides:
//! - [`DataFetchError`]: the unified error type
//! - [`Table`]: the in-memory tabular result every pipeline produces
//! - [`Fetcher`]: the HTTP transport seam, with [`HttpFetcher`]
//!   (and `StaticFetcher` under the `test-util` feature)
//! - Configuration ([`AppConfig`], config loading)
//! - [`ProgressReporter`] hooks

pub mod config;
pub mod error;
pub mod http;
pub mod progress;
pub mod table;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BoxOfficeSettings, CountriesSettings, HttpConfig, SitemapSettings,
    YEAR_PLACEHOLDER, config_dir, config_file_path, init_config, load_config, load_config_from,
};
pub use error::{DataFetchError, Result};
pub use http::{BROWSER_USER_AGENT, DEFAULT_USER_AGENT, Fetcher, HttpFetcher};
pub use progress::{ProgressReporter, SilentProgress};
pub use table::{Table, render_cell};
#[cfg(any(test, feature = "test-util"))]
pub use testing::StaticFetcher;
