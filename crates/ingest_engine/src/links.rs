use ingest_core::{canonicalize, is_crawlable_page, CanonicalUrl};
use scraper::{Html, Selector};

const DEFAULT_MAX_LINKS: usize = 5_000;

/// Collects absolute `http(s)` anchor targets from a page, one level deep.
pub struct PageLinkExtractor {
    max_links: usize,
}

impl PageLinkExtractor {
    pub fn new() -> Self {
        Self::with_max_links(DEFAULT_MAX_LINKS)
    }

    pub fn with_max_links(max_links: usize) -> Self {
        Self { max_links }
    }

    /// Canonical, page-classified, de-duplicated link targets in document order.
    ///
    /// Relative links are ignored: only anchors whose `href` already starts
    /// with `http` are considered.
    pub fn extract(&self, html: &str) -> Vec<CanonicalUrl> {
        let document = Html::parse_document(html);
        let Ok(selector) = Selector::parse(r#"a[href^="http"]"#) else {
            return Vec::new();
        };

        let mut links: Vec<CanonicalUrl> = Vec::new();
        for anchor in document.select(&selector) {
            if links.len() >= self.max_links {
                break;
            }
            let Some(href) = anchor.value().attr("href").map(str::trim) else {
                continue;
            };
            if !is_crawlable_page(href) {
                continue;
            }
            if let Ok(url) = canonicalize(href) {
                if !links.contains(&url) {
                    links.push(url);
                }
            }
        }
        links
    }
}

impl Default for PageLinkExtractor {
    fn default() -> Self {
        Self::new()
    }
}
