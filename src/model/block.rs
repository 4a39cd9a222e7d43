//! Blocks: the classifier's unit of structural meaning.

use super::{BBox, Line};

/// Structural role assigned to a block by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    /// A heading at the given level (1 = largest)
    Heading(u8),
    /// A regular paragraph
    Paragraph,
    /// A bulleted or numbered list item
    ListItem,
    /// Running header/footer/page number, excluded from the outline
    Noise,
    /// Not yet classified
    Unclassified,
}

impl BlockType {
    /// Heading level, if this is a heading.
    pub fn heading_level(&self) -> Option<u8> {
        match self {
            BlockType::Heading(level) => Some(*level),
            _ => None,
        }
    }
}

/// Ordered sequence of lines judged spatially and typographically cohesive.
/// Owns its lines; occupies exactly one position in the page reading order.
#[derive(Debug, Clone)]
pub struct Block {
    /// Lines in reading order
    pub lines: Vec<Line>,
    /// 1-indexed page the block appears on
    pub page: u32,
    /// Inferred structural role
    pub block_type: BlockType,
}

impl Block {
    /// Create an unclassified block.
    pub fn new(lines: Vec<Line>, page: u32) -> Self {
        Self {
            lines,
            page,
            block_type: BlockType::Unclassified,
        }
    }

    /// Concatenated text of all lines, single-space joined.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Bounding box covering every line.
    pub fn bbox(&self) -> BBox {
        self.lines
            .iter()
            .map(|l| l.bbox())
            .reduce(|a, b| a.union(&b))
            .unwrap_or_default()
    }

    /// Dominant font size: the length-weighted average across lines.
    pub fn dominant_font_size(&self) -> f32 {
        let total: usize = self
            .lines
            .iter()
            .flat_map(|l| &l.fragments)
            .map(|f| f.text.chars().count())
            .sum();
        if total == 0 {
            return 0.0;
        }
        let weighted: f32 = self
            .lines
            .iter()
            .flat_map(|l| &l.fragments)
            .map(|f| f.font_size * f.text.chars().count() as f32)
            .sum();
        weighted / total as f32
    }

    /// Whether the block carries no visible text.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() || self.text().trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FontFlags, Fragment};

    fn line(text: &str, x: f32, baseline: f32, size: f32) -> Line {
        Line::from_fragments(vec![Fragment::new(
            text.to_string(),
            1,
            x,
            baseline,
            size,
            FontFlags::default(),
            0,
        )])
    }

    #[test]
    fn test_block_text_joins_lines() {
        let block = Block::new(
            vec![
                line("First line", 72.0, 700.0, 12.0),
                line("second line.", 72.0, 686.0, 12.0),
            ],
            1,
        );
        assert_eq!(block.text(), "First line second line.");
    }

    #[test]
    fn test_block_type_heading_level() {
        assert_eq!(BlockType::Heading(2).heading_level(), Some(2));
        assert_eq!(BlockType::Paragraph.heading_level(), None);
    }

    #[test]
    fn test_dominant_font_size() {
        let block = Block::new(
            vec![
                line("a much longer run of body text", 72.0, 700.0, 10.0),
                line("X", 72.0, 686.0, 24.0),
            ],
            1,
        );
        let size = block.dominant_font_size();
        assert!(size > 10.0 && size < 12.0);
    }

    #[test]
    fn test_empty_block() {
        let block = Block::new(vec![], 1);
        assert!(block.is_empty());
    }
}
