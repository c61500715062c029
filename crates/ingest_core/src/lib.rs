//! Ingest core: pure, IO-free logic shared by the crawler and the extractors.
mod cmap;
mod glyph;
mod normalize;
mod reflow;
mod sitemap;
mod toc;
mod url;

pub use cmap::ToUnicodeMap;
pub use glyph::glyph_name_to_char;
pub use normalize::clean_text;
pub use reflow::{reflow_runs, GlyphRun};
pub use sitemap::{looks_like_sitemap, parse_sitemap, SitemapDocument, SitemapError};
pub use toc::{build_toc, number_headings, HeadingNode, MAX_HEADING_LEVEL, TOC_BANNER, TOC_TERMINATOR};
pub use url::{
    canonicalize, host_of, is_crawlable_page, is_webpage, same_host, url_extension, CanonicalUrl,
    UrlError,
};
