//! Collected sitemap entries, keyed by the sitemap they were found in.

use std::collections::BTreeMap;

use datafetch_shared::Table;
use serde_json::Value;

/// Column holding each discovered URL.
pub const URL_COLUMN: &str = "URLs";

/// Column holding the refined path segments.
pub const SEGMENTS_COLUMN: &str = "Subdirectories";

/// One URL listed by a sitemap document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapEntry {
    /// The `<loc>` value.
    pub url: String,
    /// URL of the sitemap document that listed it.
    pub sitemap: String,
    /// Path segments relative to the site URL, set by refinement.
    pub segments: Option<Vec<String>>,
}

/// Mapping from sitemap URL to the entries it lists.
///
/// A key is present once its document has been fetched, even if the fetch
/// failed and the entry list is empty.
#[derive(Debug, Clone, Default)]
pub struct SitemapIndex {
    sitemaps: BTreeMap<String, Vec<SitemapEntry>>,
}

impl SitemapIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the locations listed by `sitemap_url`, replacing any previous list.
    pub fn insert(&mut self, sitemap_url: &str, urls: Vec<String>) {
        let entries = urls
            .into_iter()
            .map(|url| SitemapEntry {
                url,
                sitemap: sitemap_url.to_string(),
                segments: None,
            })
            .collect();
        self.sitemaps.insert(sitemap_url.to_string(), entries);
    }

    pub fn contains(&self, sitemap_url: &str) -> bool {
        self.sitemaps.contains_key(sitemap_url)
    }

    pub fn get(&self, sitemap_url: &str) -> Option<&[SitemapEntry]> {
        self.sitemaps.get(sitemap_url).map(Vec::as_slice)
    }

    /// Number of sitemap documents.
    pub fn len(&self) -> usize {
        self.sitemaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sitemaps.is_empty()
    }

    /// Total number of entries across every sitemap.
    pub fn total_urls(&self) -> usize {
        self.sitemaps.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[SitemapEntry])> {
        self.sitemaps
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Split every entry's URL into path segments relative to `base_url`.
    pub fn refine(&mut self, base_url: &str) {
        for entry in self.sitemaps.values_mut().flatten() {
            entry.segments = Some(url_segments(&entry.url, base_url));
        }
    }

    /// Materialize one sitemap's entries as a table.
    ///
    /// Columns are `URLs`, plus `Subdirectories` once any entry is refined.
    pub fn to_table(&self, sitemap_url: &str) -> Option<Table> {
        let entries = self.sitemaps.get(sitemap_url)?;
        let refined = entries.iter().any(|e| e.segments.is_some());

        let mut table = if refined {
            Table::new([URL_COLUMN, SEGMENTS_COLUMN])
        } else {
            Table::new([URL_COLUMN])
        };

        for entry in entries {
            let mut row = vec![Value::String(entry.url.clone())];
            if refined {
                row.push(
                    entry
                        .segments
                        .as_ref()
                        .map_or(Value::Null, |s| Value::from(s.clone())),
                );
            }
            table.push_row(row).ok()?;
        }

        Some(table)
    }
}

/// Path segments of `url` after removing the `base_url` prefix.
///
/// `{base}/a/b` yields `["", "a", "b"]`. A URL that does not start with
/// `base_url` yields the whole URL as the only segment.
pub fn url_segments(url: &str, base_url: &str) -> Vec<String> {
    match url.strip_prefix(base_url) {
        Some(rest) => rest.split('/').map(str::to_string).collect(),
        None => vec![url.to_string()],
    }
}
