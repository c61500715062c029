//! Ingest engine: fetching, crawling and per-format text extraction.
mod crawler;
mod decode;
mod docx;
mod error;
mod export;
mod fetch;
mod filename;
mod links;
mod ocr;
mod page;
mod pdf;
mod pdf_font;
mod persist;
mod pipeline;
mod plaintext;
mod profile;
mod source;
mod types;
mod visible;

pub use crawler::{CrawlReport, CrawlStats, SitemapCrawler, SITEMAP_FILENAME};
pub use decode::{decode_body, decode_body_lossy, DecodeError, DecodedText};
pub use docx::{docx_text_from_bytes, DocxExtractor};
pub use error::ExtractError;
pub use export::{export_site, ExportError, ExportSummary, MANIFEST_FILENAME};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use filename::{page_filename, url_slug};
pub use links::PageLinkExtractor;
pub use ocr::{OcrExtractor, OcrSettings};
pub use page::{build_page_record, PageExtractor, MISSING_TITLE};
pub use pdf::{glyph_runs, pdf_text_from_bytes, PdfExtractor};
pub use pdf_font::{FontDecoder, PageFonts};
pub use persist::{ExportDir, PersistError};
pub use pipeline::{
    ChannelProgressSink, IngestEvent, LogProgressSink, PageFailure, ProgressSink, SiteIngest,
    SiteIngestor,
};
pub use plaintext::PlainTextExtractor;
pub use profile::BrowserProfile;
pub use source::{extract_file, FileExtractor, SourceFormat};
pub use types::{FailureKind, FetchError, FetchMetadata, FetchOutput, PageRecord};
pub use visible::{page_parts, visible_text, PageParts};
