use ingest_core::UrlError;
use ingest_logging::{ingest_info, ingest_warn};

use crate::{FetchSettings, PageExtractor, PageRecord, SitemapCrawler};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestEvent {
    Discovered { seed: String, count: usize },
    PageExtracted { url: String, chars: usize },
    PageFailed { url: String, reason: String },
    Finished { succeeded: usize, failed: usize },
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: IngestEvent);
}

pub struct ChannelProgressSink {
    tx: std::sync::mpsc::Sender<IngestEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: std::sync::mpsc::Sender<IngestEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: IngestEvent) {
        let _ = self.tx.send(event);
    }
}

/// Writes every event to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgressSink;

impl ProgressSink for LogProgressSink {
    fn emit(&self, event: IngestEvent) {
        match event {
            IngestEvent::PageFailed { url, reason } => {
                ingest_warn!("page failed url={} reason={}", url, reason)
            }
            other => ingest_info!("{:?}", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    pub url: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SiteIngest {
    pub pages: Vec<PageRecord>,
    pub failures: Vec<PageFailure>,
}

/// Crawl a site, then extract every discovered page in order.
#[derive(Clone)]
pub struct SiteIngestor {
    crawler: SitemapCrawler,
    extractor: PageExtractor,
}

impl SiteIngestor {
    pub fn new(crawler: SitemapCrawler, extractor: PageExtractor) -> Self {
        Self { crawler, extractor }
    }

    pub fn with_settings(settings: FetchSettings) -> Self {
        Self::new(
            SitemapCrawler::with_settings(settings.clone()),
            PageExtractor::with_settings(settings),
        )
    }

    pub async fn ingest(&self, seed: &str, sink: &dyn ProgressSink) -> Result<SiteIngest, UrlError> {
        let urls = self.crawler.crawl(seed).await?;
        sink.emit(IngestEvent::Discovered {
            seed: seed.to_string(),
            count: urls.len(),
        });

        let mut result = SiteIngest::default();
        for url in urls {
            match self.extractor.extract(&url).await {
                Ok(page) => {
                    sink.emit(IngestEvent::PageExtracted {
                        url: url.clone(),
                        chars: page.data.chars().count(),
                    });
                    result.pages.push(page);
                }
                Err(err) => {
                    let reason = err.to_string();
                    sink.emit(IngestEvent::PageFailed {
                        url: url.clone(),
                        reason: reason.clone(),
                    });
                    result.failures.push(PageFailure { url, reason });
                }
            }
        }

        sink.emit(IngestEvent::Finished {
            succeeded: result.pages.len(),
            failed: result.failures.len(),
        });
        Ok(result)
    }
}
