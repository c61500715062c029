use std::io::{Cursor, Read};
use std::path::Path;

use ingest_core::clean_text;
use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use crate::{ExtractError, FileExtractor, SourceFormat};

const DOCUMENT_PART: &str = "word/document.xml";

/// Raw paragraph text from the main document part; styles are ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocxExtractor;

#[async_trait::async_trait]
impl FileExtractor for DocxExtractor {
    fn format(&self) -> SourceFormat {
        SourceFormat::Docx
    }

    async fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|err| ExtractError::read(SourceFormat::Docx, err))?;
        docx_text_from_bytes(&bytes)
    }
}

pub fn docx_text_from_bytes(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|err| ExtractError::parse(SourceFormat::Docx, err))?;
    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|err| ExtractError::parse(SourceFormat::Docx, format!("{DOCUMENT_PART}: {err}")))?
        .read_to_string(&mut xml)
        .map_err(|err| ExtractError::read(SourceFormat::Docx, err))?;

    let raw = paragraph_text(&xml).map_err(|err| ExtractError::parse(SourceFormat::Docx, err))?;
    Ok(clean_text(&raw))
}

/// One line per `w:p`; `w:tab` and `w:br` become whitespace.
///
/// Tabs inside `w:pPr` are tab-stop definitions, not content.
fn paragraph_text(xml: &str) -> Result<String, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_run_text = false;
    let mut in_paragraph_props = false;

    loop {
        match reader.read_event()? {
            Event::Start(tag) => match tag.local_name().as_ref() {
                b"t" => in_run_text = true,
                b"pPr" => in_paragraph_props = true,
                _ => {}
            },
            Event::End(tag) => match tag.local_name().as_ref() {
                b"t" => in_run_text = false,
                b"pPr" => in_paragraph_props = false,
                b"p" => text.push('\n'),
                _ => {}
            },
            Event::Empty(tag) => match tag.local_name().as_ref() {
                b"tab" if !in_paragraph_props => text.push('\t'),
                b"br" | b"cr" => text.push('\n'),
                _ => {}
            },
            Event::Text(run) if in_run_text => text.push_str(&run.unescape()?),
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::paragraph_text;

    #[test]
    fn paragraphs_tabs_and_breaks() {
        let xml = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:body>
<w:p><w:pPr><w:pStyle w:val="Title"/></w:pPr><w:r><w:t>Hello</w:t></w:r><w:r><w:t xml:space="preserve"> world &amp; co</w:t></w:r></w:p>
<w:p><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c</w:t></w:r></w:p>
</w:body></w:document>"#;
        let text = paragraph_text(xml).unwrap();
        assert_eq!(text, "Hello world & co\na\tb\nc\n");
    }

    #[test]
    fn tab_stop_definitions_are_not_text() {
        let xml = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:body>
<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/><w:tab w:val="right" w:pos="9360"/></w:tabs></w:pPr><w:r><w:t>Name</w:t><w:tab/><w:t>Value</w:t></w:r></w:p>
</w:body></w:document>"#;
        let text = paragraph_text(xml).unwrap();
        assert_eq!(text, "Name\tValue\n");
    }
}
