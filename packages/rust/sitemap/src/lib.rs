//! Sitemap discovery and traversal.
//!
//! Starting from a site's `robots.txt`, every `Sitemap:` directive is walked:
//! each sitemap document is fetched once, its `<loc>` values are recorded,
//! and locations ending in `.xml` are followed as nested sitemaps. The walk
//! uses an explicit stack keyed by the [`SitemapIndex`], so shared children
//! are fetched once and cycles terminate.

mod export;
mod index;
mod parser;

use datafetch_shared::{DataFetchError, Fetcher, ProgressReporter, Result, SilentProgress};
use tracing::{debug, info, instrument, warn};
use url::Url;

pub use export::{DEFAULT_EXPORT_DIR, export, file_stem};
pub use index::{SEGMENTS_COLUMN, SitemapEntry, SitemapIndex, URL_COLUMN, url_segments};
pub use parser::{extract_locs, is_sitemap_url, sitemap_directives};

/// Walks the sitemaps of one site through any [`Fetcher`].
pub struct SitemapWalker<F> {
    fetcher: F,
    site_url: String,
}

impl<F: Fetcher> SitemapWalker<F> {
    /// Create a walker for `site_url` (e.g. `https://www.nfl.com`).
    ///
    /// The URL must be absolute http(s); a trailing `/` is dropped.
    pub fn new(fetcher: F, site_url: &str) -> Result<Self> {
        let parsed = Url::parse(site_url)
            .map_err(|e| DataFetchError::config(format!("invalid site URL '{site_url}': {e}")))?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(DataFetchError::config(format!(
                "site URL must be http or https: {site_url}"
            )));
        }

        Ok(Self {
            fetcher,
            site_url: site_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    pub fn robots_url(&self) -> String {
        format!("{}/robots.txt", self.site_url)
    }

    /// Fetch a document as text. Failures are logged and yield `""`.
    pub async fn fetch_text(&self, url: &str) -> String {
        match self.fetcher.get_text(url).await {
            Ok(body) => body,
            Err(e) => {
                warn!(%url, error = %e, "request error");
                String::new()
            }
        }
    }

    /// Walk from one sitemap URL, adding every unvisited document to `index`.
    pub async fn parse_sitemap(&self, index: &mut SitemapIndex, sitemap_url: &str) {
        self.walk(index, sitemap_url, &SilentProgress).await;
    }

    /// Discover sitemaps from `robots.txt` and walk each of them.
    pub async fn gather_sitemaps(&self) -> SitemapIndex {
        self.gather_sitemaps_with_progress(&SilentProgress).await
    }

    /// Same as [`SitemapWalker::gather_sitemaps`], reporting each document.
    #[instrument(skip_all, fields(site = %self.site_url))]
    pub async fn gather_sitemaps_with_progress(
        &self,
        progress: &dyn ProgressReporter,
    ) -> SitemapIndex {
        let mut index = SitemapIndex::new();

        progress.phase("Reading robots.txt");
        let robots_txt = self.fetch_text(&self.robots_url()).await;
        let roots = sitemap_directives(&robots_txt);
        info!(sitemaps = roots.len(), "sitemap directives found");

        progress.phase("Walking sitemaps");
        for root in &roots {
            self.walk(&mut index, root, progress).await;
        }

        info!(
            documents = index.len(),
            urls = index.total_urls(),
            "sitemap walk completed"
        );
        progress.done(&format!(
            "{} URLs in {} sitemaps",
            index.total_urls(),
            index.len()
        ));
        index
    }

    /// Attach path segments, relative to the site URL, to every entry.
    pub fn refine_urls(&self, index: &mut SitemapIndex) {
        index.refine(&self.site_url);
    }

    /// Depth-first walk with an explicit stack; children are visited in
    /// document order and any URL already in `index` is skipped.
    async fn walk(&self, index: &mut SitemapIndex, root: &str, progress: &dyn ProgressReporter) {
        let mut stack = vec![root.to_string()];

        while let Some(url) = stack.pop() {
            if index.contains(&url) {
                debug!(%url, "sitemap already visited");
                continue;
            }

            progress.step(&url, index.len() + 1, None);
            let xml = self.fetch_text(&url).await;
            let locs = extract_locs(&xml);
            let nested: Vec<String> = locs
                .iter()
                .filter(|loc| is_sitemap_url(loc))
                .cloned()
                .collect();

            debug!(%url, urls = locs.len(), nested = nested.len(), "parsed sitemap");
            index.insert(&url, locs);
            stack.extend(nested.into_iter().rev());
        }
    }
}
