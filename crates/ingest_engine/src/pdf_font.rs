//! Font-aware decoding of the strings shown by PDF text operators.
//!
//! Simple fonts map one byte to one glyph through a base encoding plus an
//! optional `/Differences` array. Composite (`Type0`) fonts use multi-byte
//! codes that only mean something through the font's `/ToUnicode` CMap, which
//! also overrides the encoding of simple fonts when present.

use std::collections::HashMap;

use encoding_rs::{Encoding, MACINTOSH, WINDOWS_1252};
use ingest_core::{glyph_name_to_char, ToUnicodeMap};
use lopdf::{Dictionary, Document, Object, ObjectId};

/// Guards against `/Parent` cycles in malformed page trees.
const MAX_PARENT_DEPTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CodeLayout {
    SingleByte,
    MultiByte(usize),
    /// No font resolved: honour a UTF-16 BOM, otherwise read bytes as WinAnsi.
    Unknown,
}

/// Turns the bytes of one font's strings into text.
#[derive(Debug, Clone)]
pub struct FontDecoder {
    layout: CodeLayout,
    to_unicode: ToUnicodeMap,
    single_byte: [char; 256],
}

impl FontDecoder {
    /// Decoder used when a string is shown with no resolvable font.
    pub fn fallback() -> Self {
        Self {
            layout: CodeLayout::Unknown,
            to_unicode: ToUnicodeMap::default(),
            single_byte: byte_table(WINDOWS_1252),
        }
    }

    pub fn from_font(document: &Document, font: &Dictionary) -> Self {
        let to_unicode = font
            .get(b"ToUnicode")
            .ok()
            .and_then(|obj| resolve(document, obj))
            .and_then(|obj| match obj {
                Object::Stream(stream) => Some(
                    stream
                        .decompressed_content()
                        .unwrap_or_else(|_| stream.content.clone()),
                ),
                _ => None,
            })
            .map(|cmap| ToUnicodeMap::parse(&cmap))
            .unwrap_or_default();

        let is_composite = matches!(font.get(b"Subtype"), Ok(Object::Name(name)) if name == b"Type0");
        if is_composite {
            let width = to_unicode.code_bytes().unwrap_or(2);
            return Self {
                layout: CodeLayout::MultiByte(width),
                to_unicode,
                single_byte: byte_table(WINDOWS_1252),
            };
        }

        let encoding = font.get(b"Encoding").ok().and_then(|obj| resolve(document, obj));
        let mut single_byte = byte_table(base_encoding(document, encoding));
        if let Some(Object::Dictionary(dict)) = encoding {
            if let Some(Object::Array(differences)) =
                dict.get(b"Differences").ok().and_then(|obj| resolve(document, obj))
            {
                apply_differences(&mut single_byte, differences);
            }
        }

        Self {
            layout: CodeLayout::SingleByte,
            to_unicode,
            single_byte,
        }
    }

    pub fn decode(&self, bytes: &[u8]) -> String {
        let width = match self.layout {
            CodeLayout::SingleByte => 1,
            CodeLayout::MultiByte(width) => width,
            CodeLayout::Unknown => {
                if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
                    let units: Vec<u16> = utf16
                        .chunks_exact(2)
                        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                        .collect();
                    return String::from_utf16_lossy(&units);
                }
                1
            }
        };

        let mut text = String::new();
        for chunk in bytes.chunks(width) {
            let code = chunk
                .iter()
                .fold(0u32, |acc, byte| (acc << 8) | u32::from(*byte));
            if let Some(mapped) = self.to_unicode.get(code) {
                text.push_str(mapped);
                continue;
            }
            // Unmapped multi-byte codes are glyph ids with no text meaning.
            if width == 1 {
                let ch = self.single_byte[chunk[0] as usize];
                if !ch.is_control() {
                    text.push(ch);
                }
            }
        }
        text
    }
}

/// Decoders for the fonts named in a page's resources, keyed by resource name.
#[derive(Debug, Clone, Default)]
pub struct PageFonts {
    fonts: HashMap<Vec<u8>, FontDecoder>,
}

impl PageFonts {
    /// Resolve the page's `/Font` resources, inherited through `/Parent` if needed.
    pub fn for_page(document: &Document, page_id: ObjectId) -> Self {
        let mut fonts = HashMap::new();
        let Some(font_resources) = font_resources(document, page_id) else {
            return Self { fonts };
        };
        for (name, font) in font_resources.iter() {
            if let Some(Object::Dictionary(font)) = resolve(document, font) {
                fonts.insert(name.clone(), FontDecoder::from_font(document, font));
            }
        }
        Self { fonts }
    }

    pub fn get(&self, name: &[u8]) -> Option<&FontDecoder> {
        self.fonts.get(name)
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

fn font_resources(document: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    let mut node = document.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_PARENT_DEPTH {
        if let Some(Object::Dictionary(resources)) =
            node.get(b"Resources").ok().and_then(|obj| resolve(document, obj))
        {
            if let Some(Object::Dictionary(fonts)) =
                resources.get(b"Font").ok().and_then(|obj| resolve(document, obj))
            {
                return Some(fonts);
            }
        }
        node = match node.get(b"Parent") {
            Ok(Object::Reference(parent)) => document.get_dictionary(*parent).ok()?,
            _ => return None,
        };
    }
    None
}

fn resolve<'a>(document: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => document.get_object(*id).ok(),
        other => Some(other),
    }
}

fn base_encoding(document: &Document, encoding: Option<&Object>) -> &'static Encoding {
    let name = match encoding {
        Some(Object::Name(name)) => Some(name.as_slice()),
        Some(Object::Dictionary(dict)) => match dict.get(b"BaseEncoding").ok().and_then(|obj| resolve(document, obj)) {
            Some(Object::Name(name)) => Some(name.as_slice()),
            _ => None,
        },
        _ => None,
    };
    match name {
        Some(b"MacRomanEncoding") => MACINTOSH,
        // StandardEncoding differs from WinAnsi only in a few punctuation slots.
        _ => WINDOWS_1252,
    }
}

fn byte_table(encoding: &'static Encoding) -> [char; 256] {
    let mut table = ['\u{fffd}'; 256];
    for (byte, slot) in table.iter_mut().enumerate() {
        let bytes = [byte as u8];
        let (decoded, _) = encoding.decode_without_bom_handling(&bytes);
        if let Some(ch) = decoded.chars().next() {
            *slot = ch;
        }
    }
    table
}

fn apply_differences(table: &mut [char; 256], differences: &[Object]) {
    let mut code: usize = 0;
    for item in differences {
        match item {
            Object::Integer(start) => code = usize::try_from(*start).unwrap_or(usize::MAX),
            Object::Name(name) => {
                if code < table.len() {
                    if let Some(ch) = std::str::from_utf8(name).ok().and_then(glyph_name_to_char) {
                        table[code] = ch;
                    }
                }
                code = code.saturating_add(1);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use lopdf::Object;

    use super::{apply_differences, byte_table, FontDecoder};
    use encoding_rs::WINDOWS_1252;

    #[test]
    fn fallback_reads_winansi_and_utf16() {
        let decoder = FontDecoder::fallback();
        assert_eq!(decoder.decode(&[0x93, b'o', b'k', 0x94, 0x96]), "\u{201c}ok\u{201d}\u{2013}");
        assert_eq!(decoder.decode(&[0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69]), "Hi");
    }

    #[test]
    fn differences_override_the_base_table() {
        let mut table = byte_table(WINDOWS_1252);
        apply_differences(
            &mut table,
            &[
                Object::Integer(65),
                Object::Name(b"Euro".to_vec()),
                Object::Name(b"uni00E9".to_vec()),
                Object::Integer(300),
                Object::Name(b"space".to_vec()),
            ],
        );
        assert_eq!(table[65], '\u{20ac}');
        assert_eq!(table[66], '\u{e9}');
        assert_eq!(table[67], 'C');
    }
}
