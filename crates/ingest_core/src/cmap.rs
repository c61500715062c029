//! `/ToUnicode` CMap parsing.
//!
//! Only the parts that matter for text extraction are read: the width of the
//! first code space range and the `bfchar` / `bfrange` mappings. Everything
//! else in the PostScript wrapper is skipped.

use std::collections::HashMap;

/// Ranges wider than this are truncated.
const MAX_RANGE_LEN: u32 = 0x1_0000;

/// Character code to Unicode text, as declared by a font.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToUnicodeMap {
    code_bytes: Option<usize>,
    entries: HashMap<u32, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Hex(Vec<u8>),
    ArrayStart,
    ArrayEnd,
    Keyword(String),
}

impl ToUnicodeMap {
    /// Parse a decompressed CMap stream. Malformed sections are skipped.
    pub fn parse(data: &[u8]) -> Self {
        let tokens = tokenize(data);
        let mut map = ToUnicodeMap::default();

        let mut i = 0;
        while i < tokens.len() {
            let Token::Keyword(keyword) = &tokens[i] else {
                i += 1;
                continue;
            };
            let end = match keyword.as_str() {
                "begincodespacerange" => "endcodespacerange",
                "beginbfchar" => "endbfchar",
                "beginbfrange" => "endbfrange",
                _ => {
                    i += 1;
                    continue;
                }
            };
            let start = i + 1;
            let len = tokens[start..]
                .iter()
                .position(|t| matches!(t, Token::Keyword(k) if k == end))
                .unwrap_or(tokens.len() - start);
            let section = &tokens[start..start + len];
            match end {
                "endcodespacerange" => map.read_code_space(section),
                "endbfchar" => map.read_bfchar(section),
                _ => map.read_bfrange(section),
            }
            i = start + len + 1;
        }

        map
    }

    /// Code length in bytes from the first code space range, if declared.
    pub fn code_bytes(&self) -> Option<usize> {
        self.code_bytes
    }

    pub fn get(&self, code: u32) -> Option<&str> {
        self.entries.get(&code).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn read_code_space(&mut self, section: &[Token]) {
        if self.code_bytes.is_some() {
            return;
        }
        if let Some(Token::Hex(low)) = section.first() {
            if (1..=4).contains(&low.len()) {
                self.code_bytes = Some(low.len());
            }
        }
    }

    fn read_bfchar(&mut self, section: &[Token]) {
        for pair in section.chunks_exact(2) {
            if let [Token::Hex(src), Token::Hex(dst)] = pair {
                self.entries.insert(code_of(src), utf16_text(dst));
            }
        }
    }

    fn read_bfrange(&mut self, section: &[Token]) {
        let mut i = 0;
        while i + 2 < section.len() {
            let (Token::Hex(low), Token::Hex(high)) = (&section[i], &section[i + 1]) else {
                i += 1;
                continue;
            };
            let low = code_of(low);
            let high = code_of(high).min(low.saturating_add(MAX_RANGE_LEN - 1));
            match &section[i + 2] {
                Token::Hex(dst) => {
                    let base = utf16_units(dst);
                    for (offset, code) in (low..=high).enumerate() {
                        let mut units = base.clone();
                        if let Some(last) = units.last_mut() {
                            *last = last.wrapping_add(offset as u16);
                        }
                        self.entries.insert(code, String::from_utf16_lossy(&units));
                    }
                    i += 3;
                }
                Token::ArrayStart => {
                    let mut j = i + 3;
                    let mut code = low;
                    while let Some(Token::Hex(dst)) = section.get(j) {
                        if code <= high {
                            self.entries.insert(code, utf16_text(dst));
                        }
                        code = code.saturating_add(1);
                        j += 1;
                    }
                    // Skip the closing bracket.
                    i = j + 1;
                }
                _ => i += 3,
            }
        }
    }
}

fn code_of(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .take(4)
        .fold(0u32, |acc, byte| (acc << 8) | u32::from(*byte))
}

fn utf16_units(bytes: &[u8]) -> Vec<u16> {
    if bytes.len() == 1 {
        return vec![u16::from(bytes[0])];
    }
    bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect()
}

fn utf16_text(bytes: &[u8]) -> String {
    String::from_utf16_lossy(&utf16_units(bytes))
}

fn tokenize(data: &[u8]) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < data.len() {
        match data[i] {
            b'%' => {
                while i < data.len() && data[i] != b'\n' && data[i] != b'\r' {
                    i += 1;
                }
            }
            b'[' => {
                tokens.push(Token::ArrayStart);
                i += 1;
            }
            b']' => {
                tokens.push(Token::ArrayEnd);
                i += 1;
            }
            b'<' if data.get(i + 1) == Some(&b'<') => i += 2,
            b'>' if data.get(i + 1) == Some(&b'>') => i += 2,
            b'<' => {
                let end = data[i + 1..]
                    .iter()
                    .position(|b| *b == b'>')
                    .map_or(data.len(), |p| i + 1 + p);
                tokens.push(Token::Hex(hex_bytes(&data[i + 1..end])));
                i = end + 1;
            }
            b'(' => {
                // Literal strings only appear in the CIDSystemInfo header.
                let mut depth = 0usize;
                while i < data.len() {
                    match data[i] {
                        b'\\' => i += 1,
                        b'(' => depth += 1,
                        b')' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                    i += 1;
                }
                i += 1;
            }
            byte if byte.is_ascii_alphabetic() => {
                let start = i;
                while i < data.len() && data[i].is_ascii_alphanumeric() {
                    i += 1;
                }
                let word = String::from_utf8_lossy(&data[start..i]).into_owned();
                tokens.push(Token::Keyword(word));
            }
            _ => i += 1,
        }
    }
    tokens
}

fn hex_bytes(hex: &[u8]) -> Vec<u8> {
    let digits: Vec<u8> = hex
        .iter()
        .filter_map(|b| (*b as char).to_digit(16).map(|d| d as u8))
        .collect();
    digits
        .chunks(2)
        .map(|pair| (pair[0] << 4) | pair.get(1).copied().unwrap_or(0))
        .collect()
}
