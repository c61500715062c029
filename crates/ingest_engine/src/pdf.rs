//! PDF text with reading order rebuilt from glyph positions.
//!
//! Content streams draw text in whatever order the producer chose, which is
//! often not the visual order. We interpret the text-positioning operators to
//! know the baseline of each text-showing operator, then hand the runs to
//! [`reflow_runs`] which starts a new line whenever the baseline moves.
//! Strings are decoded with the font selected by the last `Tf`.

use std::path::Path;

use ingest_core::{clean_text, reflow_runs, GlyphRun};
use ingest_logging::ingest_debug;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object};

use crate::pdf_font::{FontDecoder, PageFonts};
use crate::{ExtractError, FileExtractor, SourceFormat};

/// TJ adjustments (thousandths of text space) at or below this read as a word gap.
const WORD_GAP_ADJUSTMENT: f32 = -200.0;

#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

#[async_trait::async_trait]
impl FileExtractor for PdfExtractor {
    fn format(&self) -> SourceFormat {
        SourceFormat::Pdf
    }

    async fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|err| ExtractError::read(SourceFormat::Pdf, err))?;
        pdf_text_from_bytes(&bytes)
    }
}

pub fn pdf_text_from_bytes(bytes: &[u8]) -> Result<String, ExtractError> {
    let document =
        Document::load_mem(bytes).map_err(|err| ExtractError::parse(SourceFormat::Pdf, err))?;

    let mut pages = Vec::new();
    for (number, page_id) in document.get_pages() {
        let raw = document
            .get_page_content(page_id)
            .map_err(|err| ExtractError::parse(SourceFormat::Pdf, format!("page {number}: {err}")))?;
        let content = Content::decode(&raw)
            .map_err(|err| ExtractError::parse(SourceFormat::Pdf, format!("page {number}: {err}")))?;
        let fonts = PageFonts::for_page(&document, page_id);
        ingest_debug!("pdf page {} fonts={}", number, fonts.len());
        pages.push(reflow_runs(&glyph_runs(&content.operations, &fonts)));
    }

    Ok(clean_text(&pages.join("\n")))
}

/// Affine matrix `[a b c d e f]` as used throughout PDF.
type Matrix = [f32; 6];

const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

fn multiply(m: &Matrix, n: &Matrix) -> Matrix {
    [
        m[0] * n[0] + m[1] * n[2],
        m[0] * n[1] + m[1] * n[3],
        m[2] * n[0] + m[3] * n[2],
        m[2] * n[1] + m[3] * n[3],
        m[4] * n[0] + m[5] * n[2] + n[4],
        m[4] * n[1] + m[5] * n[3] + n[5],
    ]
}

fn translation(tx: f32, ty: f32) -> Matrix {
    [1.0, 0.0, 0.0, 1.0, tx, ty]
}

struct TextState {
    ctm: Matrix,
    font: Option<Vec<u8>>,
    saved: Vec<(Matrix, Option<Vec<u8>>)>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    leading: f32,
}

impl TextState {
    fn new() -> Self {
        Self {
            ctm: IDENTITY,
            font: None,
            saved: Vec::new(),
            text_matrix: IDENTITY,
            line_matrix: IDENTITY,
            leading: 0.0,
        }
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = multiply(&translation(tx, ty), &self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.leading);
    }

    /// Baseline of the next glyph in device space.
    fn baseline(&self) -> f32 {
        multiply(&self.text_matrix, &self.ctm)[5]
    }
}

/// Text-showing operators in stream order, each tagged with its baseline.
///
/// Strings shown with a font missing from `fonts` are read as WinAnsi, or as
/// UTF-16 when they carry a byte order mark.
pub fn glyph_runs(operations: &[Operation], fonts: &PageFonts) -> Vec<GlyphRun> {
    let fallback = FontDecoder::fallback();
    let mut state = TextState::new();
    let mut runs = Vec::new();

    for op in operations {
        let operands = &op.operands;
        let decoder = state
            .font
            .as_deref()
            .and_then(|name| fonts.get(name))
            .unwrap_or(&fallback);
        match op.operator.as_str() {
            "q" => state.saved.push((state.ctm, state.font.clone())),
            "Q" => {
                let (ctm, font) = state.saved.pop().unwrap_or((IDENTITY, None));
                state.ctm = ctm;
                state.font = font;
            }
            "Tf" => {
                if let Some(Object::Name(name)) = operands.first() {
                    state.font = Some(name.clone());
                }
            }
            "cm" => {
                if let Some(m) = matrix_operand(operands) {
                    state.ctm = multiply(&m, &state.ctm);
                }
            }
            "BT" => {
                state.text_matrix = IDENTITY;
                state.line_matrix = IDENTITY;
            }
            "Tm" => {
                if let Some(m) = matrix_operand(operands) {
                    state.text_matrix = m;
                    state.line_matrix = m;
                }
            }
            "Td" => {
                if let (Some(tx), Some(ty)) = (number_at(operands, 0), number_at(operands, 1)) {
                    state.move_line(tx, ty);
                }
            }
            "TD" => {
                if let (Some(tx), Some(ty)) = (number_at(operands, 0), number_at(operands, 1)) {
                    state.leading = -ty;
                    state.move_line(tx, ty);
                }
            }
            "TL" => {
                if let Some(leading) = number_at(operands, 0) {
                    state.leading = leading;
                }
            }
            "T*" => state.next_line(),
            "Tj" => {
                let text = operands.first().map(|obj| decode_string(obj, decoder));
                push_run(&mut runs, &state, text);
            }
            "TJ" => {
                let text = operands.first().map(|obj| decode_array(obj, decoder));
                push_run(&mut runs, &state, text);
            }
            "'" => {
                state.next_line();
                let text = operands.first().map(|obj| decode_string(obj, decoder));
                push_run(&mut runs, &state, text);
            }
            "\"" => {
                state.next_line();
                let text = operands.get(2).map(|obj| decode_string(obj, decoder));
                push_run(&mut runs, &state, text);
            }
            _ => {}
        }
    }

    runs
}

fn push_run(runs: &mut Vec<GlyphRun>, state: &TextState, text: Option<String>) {
    if let Some(text) = text.filter(|t| !t.is_empty()) {
        runs.push(GlyphRun::new(state.baseline(), text));
    }
}

fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(value) => Some(*value as f32),
        Object::Real(value) => Some(*value as f32),
        _ => None,
    }
}

fn number_at(operands: &[Object], index: usize) -> Option<f32> {
    operands.get(index).and_then(number)
}

fn matrix_operand(operands: &[Object]) -> Option<Matrix> {
    if operands.len() < 6 {
        return None;
    }
    let mut m = IDENTITY;
    for (slot, operand) in m.iter_mut().zip(operands) {
        *slot = number(operand)?;
    }
    Some(m)
}

fn decode_array(object: &Object, decoder: &FontDecoder) -> String {
    let Object::Array(items) = object else {
        return decode_string(object, decoder);
    };
    let mut text = String::new();
    for item in items {
        match item {
            Object::String(..) => text.push_str(&decode_string(item, decoder)),
            other => {
                if number(other).is_some_and(|adjust| adjust <= WORD_GAP_ADJUSTMENT)
                    && !text.ends_with(' ')
                {
                    text.push(' ');
                }
            }
        }
    }
    text
}

fn decode_string(object: &Object, decoder: &FontDecoder) -> String {
    match object {
        Object::String(bytes, _) => decoder.decode(bytes),
        _ => String::new(),
    }
}
