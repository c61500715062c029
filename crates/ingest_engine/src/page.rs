use std::sync::Arc;

use ingest_core::{build_toc, clean_text};
use ingest_logging::{ingest_debug, ingest_warn};
use url::Url;

use crate::visible::page_parts;
use crate::{
    decode_body_lossy, ExtractError, FailureKind, FetchError, FetchSettings, Fetcher, PageRecord,
    ReqwestFetcher,
};

pub const MISSING_TITLE: &str = "Failed to extract title from the HTML";

/// Live-page extractor: fetch, outline, visible text.
#[derive(Clone)]
pub struct PageExtractor {
    fetcher: Arc<dyn Fetcher>,
}

impl PageExtractor {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    pub fn with_settings(settings: FetchSettings) -> Self {
        Self::new(Arc::new(ReqwestFetcher::new(settings)))
    }

    /// Fetch `url` once and turn it into a [`PageRecord`].
    ///
    /// Every failure, including a malformed URL, comes back as
    /// [`ExtractError::Fetch`].
    pub async fn extract(&self, url: &str) -> Result<PageRecord, ExtractError> {
        let result = self.try_extract(url).await;
        if let Err(err) = &result {
            ingest_warn!("page extraction failed url={} err={}", url, err);
        }
        result
    }

    async fn try_extract(&self, url: &str) -> Result<PageRecord, ExtractError> {
        let parsed = Url::parse(url.trim())
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, format!("{url}: {err}")))?;
        let output = self.fetcher.fetch(url).await?;
        ingest_debug!(
            "fetched page url={} bytes={} redirects={}",
            url,
            output.metadata.byte_len,
            output.metadata.redirect_count
        );

        let html = decode_body_lossy(&output.bytes, output.metadata.content_type.as_deref());
        Ok(build_page_record(url, &parsed, &html))
    }
}

/// Assemble the record for an already-fetched page.
pub fn build_page_record(url: &str, parsed: &Url, html: &str) -> PageRecord {
    let parts = page_parts(html);
    let toc = build_toc(parts.headings);
    let body = clean_text(&parts.text);
    let title = parts.title.unwrap_or_else(|| MISSING_TITLE.to_string());
    let text = format!("{toc}\n{body}");
    let data = format!("URL: {url}\nTitle: {title}\nExtracted Data: {text}");

    PageRecord {
        url: url.to_string(),
        title,
        hostname: parsed.host_str().unwrap_or_default().to_string(),
        path: parsed.path().to_string(),
        toc,
        text,
        data,
    }
}
