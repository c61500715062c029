use std::path::Path;

use ingest_core::clean_text;

use crate::{decode_body, ExtractError, FileExtractor, SourceFormat};

#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

#[async_trait::async_trait]
impl FileExtractor for PlainTextExtractor {
    fn format(&self) -> SourceFormat {
        SourceFormat::PlainText
    }

    async fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|err| ExtractError::read(SourceFormat::PlainText, err))?;
        let decoded = decode_body(&bytes, None)
            .map_err(|err| ExtractError::read(SourceFormat::PlainText, err))?;
        Ok(clean_text(&decoded.text))
    }
}
