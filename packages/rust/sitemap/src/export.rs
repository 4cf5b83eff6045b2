//! Writing a [`SitemapIndex`] to disk, one CSV per sitemap.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use datafetch_shared::{DataFetchError, Result};
use tracing::{info, warn};

use crate::index::SitemapIndex;

/// Default directory name for exported sitemap tables.
pub const DEFAULT_EXPORT_DIR: &str = "sitemap_data";

/// Extension appended to each exported file.
const EXPORT_EXTENSION: &str = "csv";

/// Write one CSV per sitemap into `directory`, creating it if needed.
///
/// Files are named after the last path segment of each sitemap URL
/// (`https://x.com/sitemaps/news.xml` → `news.xml.csv`). Returns the paths
/// written, in key order.
pub fn export(index: &SitemapIndex, directory: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(directory).map_err(|e| DataFetchError::io(directory, e))?;

    let mut used = HashSet::new();
    let mut written = Vec::with_capacity(index.len());

    for (key, _) in index.iter() {
        let Some(table) = index.to_table(key) else {
            continue;
        };

        let base = file_stem(key);
        let mut name = base.clone();
        let mut n = 2;
        while !used.insert(name.clone()) {
            name = format!("{base}-{n}");
            n += 1;
        }
        if name != base {
            warn!(sitemap = key, file = %name, "file name already used, renamed");
        }

        let path = directory.join(format!("{name}.{EXPORT_EXTENSION}"));
        table.save_csv(&path)?;
        written.push(path);
    }

    info!(
        directory = %directory.display(),
        files = written.len(),
        "sitemap tables exported"
    );
    Ok(written)
}

/// File name stem for a sitemap URL: its last path segment, made filesystem-safe.
pub fn file_stem(sitemap_url: &str) -> String {
    let last = sitemap_url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();

    let cleaned: String = last
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "sitemap".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_from_last_segment() {
        assert_eq!(file_stem("https://www.nfl.com/sitemap.xml"), "sitemap.xml");
        assert_eq!(
            file_stem("https://www.nfl.com/sitemaps/news-2024.xml"),
            "news-2024.xml"
        );
        assert_eq!(file_stem("https://www.nfl.com/sitemap.xml?page=2"), "sitemap.xml_page_2");
        assert_eq!(file_stem("https://www.nfl.com/"), "www.nfl.com");
        assert_eq!(file_stem(""), "sitemap");
    }

    #[test]
    fn writes_one_file_per_sitemap() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("sitemap_data");

        let mut index = SitemapIndex::new();
        index.insert(
            "https://www.nfl.com/sitemap.xml",
            vec!["https://www.nfl.com/news.xml".into()],
        );
        index.insert(
            "https://www.nfl.com/news.xml",
            vec!["https://www.nfl.com/news/a".into(), "https://www.nfl.com/news/b".into()],
        );
        index.refine("https://www.nfl.com");

        let written = export(&index, &out).unwrap();
        assert_eq!(written.len(), 2);
        assert!(out.join("news.xml.csv").exists());
        assert!(out.join("sitemap.xml.csv").exists());

        let news = std::fs::read_to_string(out.join("news.xml.csv")).unwrap();
        let lines: Vec<&str> = news.lines().collect();
        assert_eq!(lines[0], "URLs,Subdirectories");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("https://www.nfl.com/news/a,"));
    }

    #[test]
    fn colliding_names_are_disambiguated() {
        let dir = tempfile::tempdir().unwrap();

        let mut index = SitemapIndex::new();
        index.insert("https://a.test/one/sitemap.xml", vec![]);
        index.insert("https://a.test/two/sitemap.xml", vec![]);

        let written = export(&index, dir.path()).unwrap();
        assert_eq!(written.len(), 2);
        assert!(dir.path().join("sitemap.xml.csv").exists());
        assert!(dir.path().join("sitemap.xml-2.csv").exists());
    }
}
