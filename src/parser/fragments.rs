//! Text stream extraction: content-stream walk producing positioned
//! fragments per page.
//!
//! Pure transform from decompressed content-stream bytes to [`Fragment`]s in
//! extraction order. Reading order is the layout stage's concern.

use std::collections::HashMap;

use unicode_normalization::UnicodeNormalization;

use crate::error::Result;
use crate::model::{FontFlags, Fragment};

use super::backend::{decode_content, PageId, PdfBackend, PdfValue};

/// Kerning adjustment (in 1/1000 text-space units) treated as a word gap
/// inside a TJ array.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Extracts positioned fragments from one page at a time.
pub struct FragmentExtractor<'a, B: PdfBackend + ?Sized> {
    backend: &'a B,
}

impl<'a, B: PdfBackend + ?Sized> FragmentExtractor<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Extract all fragments for one page, in extraction order.
    ///
    /// Returns an empty vector for pages without text content; the caller
    /// decides whether that is an error.
    pub fn extract_page(&self, page_num: u32, page_id: PageId) -> Result<Vec<Fragment>> {
        // Map font resource names to style flags once per page.
        let mut font_flags: HashMap<Vec<u8>, FontFlags> = HashMap::new();
        if let Ok(fonts) = self.backend.page_fonts(page_id) {
            for font in fonts {
                font_flags.insert(font.name.clone(), FontFlags::from_font_name(&font.base_font));
            }
        }

        let content = self.backend.page_content(page_id)?;
        if content.is_empty() {
            return Ok(Vec::new());
        }
        let ops = decode_content(&content)?;

        let mut fragments = Vec::new();
        let mut matrix = TextMatrix::default();
        let mut current_font: Vec<u8> = Vec::new();
        let mut current_size: f32 = 12.0;
        let mut in_text = false;
        let mut seq: u32 = 0;

        for op in ops {
            match op.operator.as_str() {
                "BT" => {
                    in_text = true;
                    matrix = TextMatrix::default();
                }
                "ET" => {
                    in_text = false;
                }
                "Tf" => {
                    if op.operands.len() >= 2 {
                        if let PdfValue::Name(name) = &op.operands[0] {
                            current_font = name.clone();
                        }
                        current_size = op.operands[1].as_number().unwrap_or(12.0);
                    }
                }
                "Td" => {
                    if op.operands.len() >= 2 {
                        let tx = op.operands[0].as_number().unwrap_or(0.0);
                        let ty = op.operands[1].as_number().unwrap_or(0.0);
                        matrix.translate(tx, ty);
                    }
                }
                "TD" => {
                    if op.operands.len() >= 2 {
                        let tx = op.operands[0].as_number().unwrap_or(0.0);
                        let ty = op.operands[1].as_number().unwrap_or(0.0);
                        matrix.leading = -ty;
                        matrix.translate(tx, ty);
                    }
                }
                "TL" => {
                    if let Some(l) = op.operands.first().and_then(|v| v.as_number()) {
                        matrix.leading = l;
                    }
                }
                "Tm" => {
                    if op.operands.len() >= 6 {
                        let n: Vec<f32> = op
                            .operands
                            .iter()
                            .take(6)
                            .map(|v| v.as_number().unwrap_or(0.0))
                            .collect();
                        matrix.set(n[0], n[1], n[2], n[3], n[4], n[5]);
                    }
                }
                "T*" => {
                    matrix.next_line();
                }
                "Tj" | "TJ" => {
                    if !in_text {
                        continue;
                    }
                    let text = if op.operator == "TJ" {
                        self.decode_tj(page_id, &current_font, op.operands.first())
                    } else if let Some(PdfValue::Str(bytes)) = op.operands.first() {
                        self.backend.decode_text(page_id, &current_font, bytes)
                    } else {
                        String::new()
                    };
                    self.push_fragment(
                        &mut fragments,
                        text,
                        page_num,
                        &matrix,
                        current_size,
                        font_flags.get(&current_font).copied().unwrap_or_default(),
                        &mut seq,
                    );
                }
                "'" | "\"" => {
                    matrix.next_line();
                    if !in_text {
                        continue;
                    }
                    // The " operator prepends word/char spacing operands.
                    let text_idx = if op.operator == "\"" { 2 } else { 0 };
                    if let Some(PdfValue::Str(bytes)) = op.operands.get(text_idx) {
                        let text = self.backend.decode_text(page_id, &current_font, bytes);
                        self.push_fragment(
                            &mut fragments,
                            text,
                            page_num,
                            &matrix,
                            current_size,
                            font_flags.get(&current_font).copied().unwrap_or_default(),
                            &mut seq,
                        );
                    }
                }
                _ => {}
            }
        }

        Ok(fragments)
    }

    /// Decode a TJ array: strings interleaved with kerning adjustments.
    /// Large negative adjustments act as word spaces.
    fn decode_tj(&self, page_id: PageId, font: &[u8], operand: Option<&PdfValue>) -> String {
        let items = match operand {
            Some(PdfValue::Array(items)) => items,
            _ => return String::new(),
        };

        let mut combined = String::new();
        for item in items {
            match item {
                PdfValue::Str(bytes) => {
                    combined.push_str(&self.backend.decode_text(page_id, font, bytes));
                }
                PdfValue::Integer(_) | PdfValue::Real(_) => {
                    let adjustment = -item.as_number().unwrap_or(0.0);
                    if adjustment > TJ_SPACE_THRESHOLD
                        && !combined.is_empty()
                        && !combined.ends_with(' ')
                    {
                        combined.push(' ');
                    }
                }
                _ => {}
            }
        }
        combined
    }

    #[allow(clippy::too_many_arguments)]
    fn push_fragment(
        &self,
        fragments: &mut Vec<Fragment>,
        text: String,
        page: u32,
        matrix: &TextMatrix,
        font_size: f32,
        flags: FontFlags,
        seq: &mut u32,
    ) {
        if text.trim().is_empty() {
            return;
        }
        let normalized: String = text.nfc().collect();
        let (x, y) = matrix.position();
        let effective_size = font_size * matrix.vertical_scale();
        fragments.push(Fragment::new(
            normalized,
            page,
            x,
            y,
            effective_size,
            flags,
            *seq,
        ));
        *seq += 1;
    }
}

/// Simplified text matrix: tracks translation, scale, and line leading.
#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
    leading: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
            leading: 12.0,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        self.a = a;
        self.b = b;
        self.c = c;
        self.d = d;
        self.e = e;
        self.f = f;
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.e += tx * self.a + ty * self.c;
        self.f += tx * self.b + ty * self.d;
    }

    fn next_line(&mut self) {
        let leading = self.leading;
        self.translate(0.0, -leading);
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn vertical_scale(&self) -> f32 {
        (self.b * self.b + self.d * self.d).sqrt()
    }
}
