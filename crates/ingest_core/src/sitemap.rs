use quick_xml::events::Event;
use quick_xml::Reader;

const SITEMAP_PROLOGS: &[&str] = &["<?xml", "<urlset", "<sitemapindex"];

// Element depths below the root: root = 1, entry = 2, loc = 3.
const ENTRY_DEPTH: usize = 2;
const LOC_DEPTH: usize = 3;

/// A fetched sitemap body, classified by its root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapDocument {
    /// `<sitemapindex>`: locations of further sitemaps.
    SitemapIndex(Vec<String>),
    /// `<urlset>`: locations of pages.
    UrlSet(Vec<String>),
}

impl SitemapDocument {
    pub fn locations(&self) -> &[String] {
        match self {
            SitemapDocument::SitemapIndex(locs) | SitemapDocument::UrlSet(locs) => locs,
        }
    }
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum SitemapError {
    #[error("malformed sitemap xml: {0}")]
    Malformed(String),
    #[error("unexpected sitemap root element <{0}>")]
    UnexpectedRoot(String),
    #[error("sitemap has no root element")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Root {
    Index,
    UrlSet,
}

impl Root {
    fn from_name(name: &[u8]) -> Result<Self, SitemapError> {
        match name {
            b"sitemapindex" => Ok(Root::Index),
            b"urlset" => Ok(Root::UrlSet),
            other => Err(SitemapError::UnexpectedRoot(
                String::from_utf8_lossy(other).into_owned(),
            )),
        }
    }

    fn entry_tag(self) -> &'static [u8] {
        match self {
            Root::Index => b"sitemap",
            Root::UrlSet => b"url",
        }
    }
}

/// True when the body starts like an XML sitemap rather than an HTML page.
pub fn looks_like_sitemap(body: &str) -> bool {
    let body = body.trim_start_matches('\u{feff}').trim_start();
    SITEMAP_PROLOGS.iter().any(|prolog| body.starts_with(prolog))
}

/// Parse a sitemap body into one of its two shapes.
///
/// Only `<loc>` elements directly inside `<url>` / `<sitemap>` entries are
/// collected, so extension blocks such as `<image:image><image:loc>` are
/// skipped. Namespace prefixes are ignored.
pub fn parse_sitemap(xml: &str) -> Result<SitemapDocument, SitemapError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut root: Option<Root> = None;
    let mut depth = 0usize;
    let mut in_entry = false;
    let mut in_loc = false;
    let mut current = String::new();
    let mut locations = Vec::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|err| SitemapError::Malformed(err.to_string()))?;
        match event {
            Event::Start(tag) => {
                depth += 1;
                let name = tag.local_name();
                match root {
                    None => root = Some(Root::from_name(name.as_ref())?),
                    Some(kind) if depth == ENTRY_DEPTH && name.as_ref() == kind.entry_tag() => {
                        in_entry = true;
                    }
                    Some(_) if in_entry && depth == LOC_DEPTH && name.as_ref() == b"loc" => {
                        in_loc = true;
                        current.clear();
                    }
                    Some(_) => {}
                }
            }
            Event::Empty(tag) if root.is_none() => {
                root = Some(Root::from_name(tag.local_name().as_ref())?);
            }
            Event::Text(text) if in_loc => {
                let text = text
                    .unescape()
                    .map_err(|err| SitemapError::Malformed(err.to_string()))?;
                current.push_str(&text);
            }
            Event::CData(data) if in_loc => {
                current.push_str(&String::from_utf8_lossy(&data));
            }
            Event::End(_) => {
                if in_loc && depth == LOC_DEPTH {
                    in_loc = false;
                    let loc = current.trim();
                    if !loc.is_empty() {
                        locations.push(loc.to_string());
                    }
                } else if depth == ENTRY_DEPTH {
                    in_entry = false;
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    match root {
        Some(Root::Index) => Ok(SitemapDocument::SitemapIndex(locations)),
        Some(Root::UrlSet) => Ok(SitemapDocument::UrlSet(locations)),
        None => Err(SitemapError::Empty),
    }
}
