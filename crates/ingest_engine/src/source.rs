use std::fmt;
use std::path::Path;

use ingest_logging::{ingest_debug, ingest_warn};

use crate::docx::DocxExtractor;
use crate::ocr::{OcrExtractor, OcrSettings};
use crate::pdf::PdfExtractor;
use crate::plaintext::PlainTextExtractor;
use crate::ExtractError;

/// Kinds of local files we can turn into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    Pdf,
    Docx,
    PlainText,
    Image,
}

impl SourceFormat {
    /// Guess the format from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(SourceFormat::Pdf),
            "docx" => Some(SourceFormat::Docx),
            "txt" | "text" | "md" | "markdown" | "csv" | "json" | "log" => {
                Some(SourceFormat::PlainText)
            }
            "png" | "jpg" | "jpeg" | "tif" | "tiff" | "bmp" | "gif" | "webp" | "pbm" | "pgm"
            | "ppm" => Some(SourceFormat::Image),
            _ => None,
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceFormat::Pdf => "pdf",
            SourceFormat::Docx => "docx",
            SourceFormat::PlainText => "text",
            SourceFormat::Image => "image",
        };
        f.write_str(name)
    }
}

/// Converts one local file into normalized text.
#[async_trait::async_trait]
pub trait FileExtractor: Send + Sync {
    fn format(&self) -> SourceFormat;

    async fn extract(&self, path: &Path) -> Result<String, ExtractError>;
}

/// Route `path` to the extractor matching its extension.
pub async fn extract_file(path: &Path, ocr: &OcrSettings) -> Result<String, ExtractError> {
    let Some(format) = SourceFormat::from_path(path) else {
        return Err(ExtractError::Unsupported {
            path: path.display().to_string(),
            reason: "unknown file extension".to_string(),
        });
    };
    let extractor = extractor_for(format, ocr);

    ingest_debug!("extract file path={} format={}", path.display(), extractor.format());
    let result = extractor.extract(path).await;
    if let Err(err) = &result {
        ingest_warn!("file extraction failed path={} err={}", path.display(), err);
    }
    result
}

fn extractor_for(format: SourceFormat, ocr: &OcrSettings) -> Box<dyn FileExtractor> {
    match format {
        SourceFormat::Pdf => Box::new(PdfExtractor),
        SourceFormat::Docx => Box::new(DocxExtractor),
        SourceFormat::PlainText => Box::new(PlainTextExtractor),
        SourceFormat::Image => Box::new(OcrExtractor::new(ocr.clone())),
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{extractor_for, SourceFormat};
    use crate::OcrSettings;

    #[test]
    fn each_format_routes_to_its_extractor() {
        let ocr = OcrSettings::default();
        for format in [
            SourceFormat::Pdf,
            SourceFormat::Docx,
            SourceFormat::PlainText,
            SourceFormat::Image,
        ] {
            assert_eq!(extractor_for(format, &ocr).format(), format);
        }
    }

    #[test]
    fn format_from_extension_is_case_insensitive() {
        assert_eq!(SourceFormat::from_path(Path::new("a/B.PDF")), Some(SourceFormat::Pdf));
        assert_eq!(SourceFormat::from_path(Path::new("scan.Jpeg")), Some(SourceFormat::Image));
        assert_eq!(SourceFormat::from_path(Path::new("notes.md")), Some(SourceFormat::PlainText));
        assert_eq!(SourceFormat::from_path(Path::new("legacy.doc")), None);
        assert_eq!(SourceFormat::from_path(Path::new("README")), None);
    }
}
