//! robots.txt and sitemap XML parsing.

use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::warn;

/// Collect the `Sitemap:` directive values from a robots.txt body.
///
/// The directive name is matched case-insensitively; the value is everything
/// after the first `:`, trimmed. Directives with an empty value are skipped.
pub fn sitemap_directives(robots_txt: &str) -> Vec<String> {
    let mut sitemaps = Vec::new();

    for line in robots_txt.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        if !key.trim().eq_ignore_ascii_case("sitemap") {
            continue;
        }

        let value = value.trim();
        if value.is_empty() {
            warn!(line, "sitemap directive without a URL");
            continue;
        }
        sitemaps.push(value.to_string());
    }

    sitemaps
}

/// Extract the text of every `<loc>` element, in document order.
///
/// Elements are matched by local name, so namespace prefixes are ignored.
/// Parsing stops at the first XML error; locations read before it are kept.
pub fn extract_locs(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut locs = Vec::new();
    let mut in_loc = false;
    let mut current = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"loc" => {
                in_loc = true;
                current.clear();
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"loc" => {
                in_loc = false;
                let loc = current.trim();
                if !loc.is_empty() {
                    locs.push(loc.to_string());
                }
            }
            Ok(Event::Text(text)) if in_loc => match text.unescape() {
                Ok(s) => current.push_str(&s),
                Err(e) => warn!(error = %e, "bad escape in <loc>"),
            },
            Ok(Event::CData(data)) if in_loc => {
                current.push_str(&String::from_utf8_lossy(&data));
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!(
                    position = reader.buffer_position(),
                    error = %e,
                    kept = locs.len(),
                    "malformed sitemap XML"
                );
                break;
            }
            _ => {}
        }
    }

    locs
}

/// Whether a location points at another sitemap document.
pub fn is_sitemap_url(loc: &str) -> bool {
    loc.ends_with(".xml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn robots_directives() {
        let robots = "User-agent: *\nDisallow: /admin\n\nSitemap: https://www.nfl.com/sitemap.xml\n# Sitemap: https://commented.out/x.xml\nsitemap:https://www.nfl.com/news.xml\nSitemap:\n";
        assert_eq!(
            sitemap_directives(robots),
            ["https://www.nfl.com/sitemap.xml", "https://www.nfl.com/news.xml"]
        );
    }

    #[test]
    fn robots_without_directives() {
        assert!(sitemap_directives("User-agent: *\nDisallow:").is_empty());
        assert!(sitemap_directives("").is_empty());
    }

    #[test]
    fn locs_in_document_order() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
        <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
          <url><loc>https://example.com/</loc><priority>1.0</priority></url>
          <url><loc> https://example.com/about </loc></url>
          <url><loc>https://example.com/news?a=1&amp;b=2</loc></url>
        </urlset>"#;

        assert_eq!(
            extract_locs(xml),
            [
                "https://example.com/",
                "https://example.com/about",
                "https://example.com/news?a=1&b=2",
            ]
        );
    }

    #[test]
    fn prefixed_and_cdata_locs() {
        let xml = r#"<sm:urlset xmlns:sm="http://www.sitemaps.org/schemas/sitemap/0.9">
          <sm:url><sm:loc>https://example.com/a</sm:loc></sm:url>
          <sm:url><sm:loc><![CDATA[https://example.com/b]]></sm:loc></sm:url>
        </sm:urlset>"#;
        assert_eq!(extract_locs(xml), ["https://example.com/a", "https://example.com/b"]);
    }

    #[test]
    fn empty_and_garbage_input() {
        assert!(extract_locs("").is_empty());
        assert!(extract_locs("not xml at all").is_empty());
        assert!(extract_locs("<urlset><url><loc></loc></url></urlset>").is_empty());
    }

    #[test]
    fn malformed_xml_keeps_earlier_locs() {
        let xml = "<urlset><url><loc>https://example.com/ok</loc></url><url></loc></urlset>";
        assert_eq!(extract_locs(xml), ["https://example.com/ok"]);
    }

    #[test]
    fn sitemap_suffix() {
        assert!(is_sitemap_url("https://www.nfl.com/sitemap/news.xml"));
        assert!(!is_sitemap_url("https://www.nfl.com/news/"));
        assert!(!is_sitemap_url("https://www.nfl.com/feed.xml.gz"));
    }
}
