//! Positioned text fragments and lines.

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in page coordinates (PDF points, y-up).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BBox {
    /// Left edge
    pub x0: f32,
    /// Bottom edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Top edge
    pub y1: f32,
}

impl BBox {
    /// Create a bounding box from its four edges.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Width of the box.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Height of the box.
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Horizontal center.
    pub fn center_x(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }

    /// Smallest box containing both `self` and `other`.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

/// Style flags derived from the fragment's font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FontFlags {
    /// Bold weight
    pub bold: bool,
    /// Italic or oblique slant
    pub italic: bool,
}

impl FontFlags {
    /// Derive flags from a base font name (e.g., "Helvetica-BoldOblique").
    pub fn from_font_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        Self {
            bold: lower.contains("bold") || lower.contains("black") || lower.contains("heavy"),
            italic: lower.contains("italic") || lower.contains("oblique"),
        }
    }
}

/// Minimal positioned unit of extracted text: a run of characters sharing
/// one font, produced in extraction order by the content-stream walk.
///
/// Immutable once created. `seq` preserves extraction order and is the
/// last-resort tie-break for ambiguous reading order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fragment {
    /// Decoded, NFC-normalized text
    pub text: String,
    /// 1-indexed page number
    pub page: u32,
    /// Bounding box in page coordinates
    pub bbox: BBox,
    /// Effective font size in points
    pub font_size: f32,
    /// Bold/italic flags
    pub flags: FontFlags,
    /// Baseline Y coordinate
    pub baseline: f32,
    /// Extraction-order sequence number within the page
    pub seq: u32,
}

impl Fragment {
    /// Create a fragment, deriving the bounding box from position, font
    /// metrics, and an estimated advance width.
    pub fn new(
        text: String,
        page: u32,
        x: f32,
        baseline: f32,
        font_size: f32,
        flags: FontFlags,
        seq: u32,
    ) -> Self {
        // Advance estimated at half an em per char; exact widths would need
        // per-glyph metrics the extractor does not load.
        let est_width = text.chars().count() as f32 * font_size * 0.5;
        let bbox = BBox::new(
            x,
            baseline - font_size * 0.2,
            x + est_width,
            baseline + font_size * 0.8,
        );
        Self {
            text,
            page,
            bbox,
            font_size,
            flags,
            baseline,
            seq,
        }
    }
}

/// Ordered fragments sharing a baseline band on one page. Owns its fragments.
#[derive(Debug, Clone, Default)]
pub struct Line {
    /// Fragments sorted by X position
    pub fragments: Vec<Fragment>,
    /// Baseline Y of the line
    pub baseline: f32,
    /// Leftmost X position
    pub x: f32,
    /// Dominant font size, weighted by text length
    pub font_size: f32,
}

impl Line {
    /// Build a line from fragments, sorting them left-to-right.
    pub fn from_fragments(mut fragments: Vec<Fragment>) -> Self {
        if fragments.is_empty() {
            return Self::default();
        }

        fragments.sort_by(|a, b| {
            a.bbox
                .x0
                .partial_cmp(&b.bbox.x0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.seq.cmp(&b.seq))
        });

        let total_chars: usize = fragments.iter().map(|f| f.text.chars().count()).sum();
        let weighted: f32 = fragments
            .iter()
            .map(|f| f.font_size * f.text.chars().count() as f32)
            .sum();
        let font_size = if total_chars > 0 {
            weighted / total_chars as f32
        } else {
            fragments[0].font_size
        };

        let baseline = fragments[0].baseline;
        let x = fragments[0].bbox.x0;

        Self {
            fragments,
            baseline,
            x,
            font_size,
        }
    }

    /// Combined text of all fragments, inserting a space where the
    /// horizontal gap between neighbors exceeds a word-spacing threshold.
    pub fn text(&self) -> String {
        let mut result = String::new();
        for (i, frag) in self.fragments.iter().enumerate() {
            if i > 0 {
                let prev = &self.fragments[i - 1];
                let gap = frag.bbox.x0 - prev.bbox.x1;
                let threshold = frag.font_size * 0.15;
                if gap > threshold && !result.ends_with(' ') && !frag.text.starts_with(' ') {
                    result.push(' ');
                }
            }
            result.push_str(&frag.text);
        }
        result
    }

    /// Bounding box covering every fragment in the line.
    pub fn bbox(&self) -> BBox {
        self.fragments
            .iter()
            .map(|f| f.bbox)
            .reduce(|a, b| a.union(&b))
            .unwrap_or_default()
    }

    /// Whether the majority of the line's characters are bold.
    pub fn is_bold(&self) -> bool {
        let bold: usize = self
            .fragments
            .iter()
            .filter(|f| f.flags.bold)
            .map(|f| f.text.chars().count())
            .sum();
        let total: usize = self.fragments.iter().map(|f| f.text.chars().count()).sum();
        total > 0 && bold * 2 > total
    }
}
