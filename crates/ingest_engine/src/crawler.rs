//! Domain-scoped sitemap crawler.
//!
//! A crawl starts from a seed URL that is either a sitemap (index or urlset) or
//! an ordinary page. Sitemap indexes are expanded depth-first; urlsets
//! contribute their page locations; an HTML page contributes the absolute links
//! it contains, without following them further.
//!
//! Every target is marked visited before it is fetched, so cyclic or
//! overlapping sitemap indexes fetch each location once. A failed fetch only
//! empties its own branch.

use std::collections::HashSet;
use std::sync::Arc;

use ingest_core::{
    canonicalize, is_crawlable_page, is_webpage, looks_like_sitemap, parse_sitemap,
    same_host, CanonicalUrl, SitemapDocument, UrlError,
};
use ingest_logging::{ingest_debug, ingest_info, ingest_warn};

use crate::links::PageLinkExtractor;
use crate::{decode_body_lossy, FetchSettings, Fetcher, ReqwestFetcher};

/// Seeds ending with this name are sitemap files, not pages worth ingesting.
pub const SITEMAP_FILENAME: &str = "sitemap.xml";

#[derive(Clone)]
pub struct SitemapCrawler {
    fetcher: Arc<dyn Fetcher>,
    links: Arc<PageLinkExtractor>,
}

/// Counters for one finished crawl.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStats {
    pub fetched: usize,
    pub failed: usize,
    pub sitemaps: usize,
    pub html_pages: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    pub urls: Vec<String>,
    pub stats: CrawlStats,
}

/// State owned by a single crawl invocation.
struct CrawlContext {
    /// Canonical seed; pages must share its host.
    seed: CanonicalUrl,
    visited: HashSet<CanonicalUrl>,
    found: Vec<CanonicalUrl>,
    found_set: HashSet<CanonicalUrl>,
    stats: CrawlStats,
}

impl CrawlContext {
    fn new(seed: CanonicalUrl) -> Self {
        Self {
            seed,
            visited: HashSet::new(),
            found: Vec::new(),
            found_set: HashSet::new(),
            stats: CrawlStats::default(),
        }
    }

    /// Returns false when the target was seen before.
    fn mark_visited(&mut self, target: &CanonicalUrl) -> bool {
        self.visited.insert(target.clone())
    }

    fn on_seed_host(&self, url: &CanonicalUrl) -> bool {
        same_host(url.as_str(), self.seed.as_str())
    }

    fn in_scope(&self, url: &CanonicalUrl) -> bool {
        self.on_seed_host(url) && is_webpage(url.as_str())
    }

    fn add_page(&mut self, url: CanonicalUrl) {
        if self.in_scope(&url) && self.found_set.insert(url.clone()) {
            self.found.push(url);
        }
    }
}

impl SitemapCrawler {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            links: Arc::new(PageLinkExtractor::new()),
        }
    }

    pub fn with_settings(settings: FetchSettings) -> Self {
        Self::new(Arc::new(ReqwestFetcher::new(settings)))
    }

    /// Discover the in-domain pages reachable from `seed`.
    ///
    /// Only a malformed seed is an error; unreachable branches just contribute
    /// nothing.
    pub async fn crawl(&self, seed: &str) -> Result<Vec<String>, UrlError> {
        Ok(self.crawl_with_stats(seed).await?.urls)
    }

    pub async fn crawl_with_stats(&self, seed: &str) -> Result<CrawlReport, UrlError> {
        let seed = seed.trim();
        let seed_canonical = canonicalize(seed)?;
        let host = seed_canonical.host().ok_or_else(|| UrlError::InvalidUrl {
            url: seed.to_string(),
            message: "missing host".to_string(),
        })?;
        ingest_info!("crawl start seed={} host={}", seed, host);

        let mut ctx = CrawlContext::new(seed_canonical.clone());
        let mut worklist: Vec<(String, CanonicalUrl)> = vec![(seed.to_string(), seed_canonical)];

        while let Some((target, key)) = worklist.pop() {
            if !ctx.mark_visited(&key) {
                ingest_debug!("skip visited {}", key);
                continue;
            }
            let children = self.visit(&target, &mut ctx).await;
            // Reversed so the first child is popped next, keeping document order.
            for child in children.into_iter().rev() {
                worklist.push(child);
            }
        }

        let found = std::mem::take(&mut ctx.found);
        let mut urls: Vec<String> = found
            .into_iter()
            .filter(|url| ctx.on_seed_host(url))
            .map(CanonicalUrl::into_string)
            .collect();
        if !seed.ends_with(SITEMAP_FILENAME) && !urls.iter().any(|url| url == seed) {
            urls.push(seed.to_string());
        }

        ingest_info!(
            "crawl done seed={} urls={} fetched={} failed={} sitemaps={}",
            seed,
            urls.len(),
            ctx.stats.fetched,
            ctx.stats.failed,
            ctx.stats.sitemaps
        );
        Ok(CrawlReport {
            urls,
            stats: ctx.stats,
        })
    }

    /// Fetch one target, record its pages and return child sitemaps to visit.
    async fn visit(&self, target: &str, ctx: &mut CrawlContext) -> Vec<(String, CanonicalUrl)> {
        let output = match self.fetcher.fetch(target).await {
            Ok(output) => output,
            Err(err) => {
                ingest_warn!("crawl branch dropped url={} err={}", target, err);
                ctx.stats.failed += 1;
                return Vec::new();
            }
        };
        ctx.stats.fetched += 1;
        let body = decode_body_lossy(&output.bytes, output.metadata.content_type.as_deref());

        if !looks_like_sitemap(&body) {
            ctx.stats.html_pages += 1;
            let links = self.links.extract(&body);
            ingest_debug!("html page url={} links={}", target, links.len());
            for link in links {
                ctx.add_page(link);
            }
            return Vec::new();
        }

        ctx.stats.sitemaps += 1;
        match parse_sitemap(&body) {
            Ok(SitemapDocument::UrlSet(locations)) => {
                ingest_debug!("urlset url={} entries={}", target, locations.len());
                for location in locations {
                    if !is_crawlable_page(&location) {
                        continue;
                    }
                    match canonicalize(&location) {
                        Ok(url) => ctx.add_page(url),
                        Err(err) => ingest_debug!("skip sitemap entry: {}", err),
                    }
                }
                Vec::new()
            }
            Ok(SitemapDocument::SitemapIndex(locations)) => {
                ingest_debug!("sitemap index url={} children={}", target, locations.len());
                locations
                    .into_iter()
                    .filter(|location| is_crawlable_page(location))
                    .filter_map(|location| {
                        let key = canonicalize(&location).ok()?;
                        Some((location, key))
                    })
                    .collect()
            }
            Err(err) => {
                ingest_warn!("unreadable sitemap url={} err={}", target, err);
                Vec::new()
            }
        }
    }
}
