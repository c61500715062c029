use std::fmt;

use url::Url;

/// Extensions that never point at an HTML page.
const BINARY_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "zip",
    "rar", "7z", "exe", "dmg", "iso", "tar", "gz", "csv",
];

/// Extensions rejected from the crawl frontier when followed by a trailing slash.
const NON_PAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "ico", "svg", "pdf", "mp3", "mp4", "avi", "mkv", "wav",
    "ogg", "zip", "tar", "gz", "rar", "7z", "doc", "docx", "ppt", "pptx", "xls", "xlsx", "txt",
    "rtf", "csv", "json", "xml",
];

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum UrlError {
    #[error("invalid url {url}: {message}")]
    InvalidUrl { url: String, message: String },
}

/// `scheme://host[:port]/path`, without query or fragment.
///
/// Two URLs with the same canonical form are the same crawl target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalUrl(String);

impl CanonicalUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Host name without port.
    pub fn host(&self) -> Option<String> {
        host_of(&self.0)
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<CanonicalUrl> for String {
    fn from(url: CanonicalUrl) -> Self {
        url.0
    }
}

pub fn canonicalize(raw: &str) -> Result<CanonicalUrl, UrlError> {
    let parsed = parse(raw)?;
    let host = parsed.host_str().ok_or_else(|| UrlError::InvalidUrl {
        url: raw.to_string(),
        message: "missing host".to_string(),
    })?;
    let authority = match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };
    Ok(CanonicalUrl(format!(
        "{}://{}{}",
        parsed.scheme(),
        authority,
        parsed.path()
    )))
}

/// Lower-cased extension of the final path segment, if any.
pub fn url_extension(raw: &str) -> Option<String> {
    let parsed = Url::parse(raw.trim()).ok()?;
    let segment = parsed.path().rsplit('/').next().unwrap_or_default();
    let (_, ext) = segment.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// True unless the URL names a known binary or office document.
pub fn is_crawlable_page(raw: &str) -> bool {
    if parse(raw).is_err() {
        return false;
    }
    match url_extension(raw) {
        Some(ext) => !BINARY_EXTENSIONS.contains(&ext.as_str()),
        None => true,
    }
}

/// Frontier filter: rejects directory-style URLs such as `/feed.json/`.
pub fn is_webpage(raw: &str) -> bool {
    let lower = raw.trim().to_ascii_lowercase();
    let Some(stem) = lower.strip_suffix('/') else {
        return true;
    };
    !NON_PAGE_EXTENSIONS
        .iter()
        .any(|ext| stem.strip_suffix(ext).is_some_and(|rest| rest.ends_with('.')))
}

pub fn host_of(raw: &str) -> Option<String> {
    Url::parse(raw.trim())
        .ok()
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
}

pub fn same_host(a: &str, b: &str) -> bool {
    match (host_of(a), host_of(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn parse(raw: &str) -> Result<Url, UrlError> {
    Url::parse(raw.trim()).map_err(|err| UrlError::InvalidUrl {
        url: raw.to_string(),
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{is_webpage, url_extension};

    #[test]
    fn extension_comes_from_last_segment_only() {
        assert_eq!(url_extension("https://docs.example.com/guide"), None);
        assert_eq!(
            url_extension("https://example.com/a.b/report.PDF?x=1").as_deref(),
            Some("pdf")
        );
        assert_eq!(url_extension("https://example.com/trailing."), None);
    }

    #[test]
    fn webpage_filter_needs_the_dot() {
        // "/blog-json/" is a directory, not a `.json` resource.
        assert!(is_webpage("https://example.com/blog-json/"));
        assert!(!is_webpage("https://example.com/data.JSON/"));
    }
}
