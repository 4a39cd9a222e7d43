//! Structure classification: blocks → heading / paragraph / list item / noise.
//!
//! Classification is a whole-document pass so that font-size ranking stays
//! consistent across pages. The pipeline is explicitly two-phase: collect the
//! ranking from every block, then classify each block against it. The ranking
//! is an argument, never shared state.

use std::collections::HashMap;

use regex::Regex;

use crate::model::{Block, BlockType};

/// Bucket resolution for the font-size histogram (0.1pt).
const SIZE_BUCKET: f32 = 10.0;

/// Heading candidates must exceed the body size by this many points.
const HEADING_MIN_DELTA: f32 = 0.5;

/// Tolerance when matching a block's dominant size to a ranked size.
const SIZE_MATCH_TOLERANCE: f32 = 0.25;

/// Headings span at most this many lines.
const HEADING_MAX_LINES: usize = 2;

/// Document-wide font-size ranking.
///
/// The modal size is taken as body text; distinct larger sizes are ranked
/// descending and the top `max_levels` map to heading levels 1..K.
#[derive(Debug, Clone, Default)]
pub struct FontRanking {
    body_size: f32,
    heading_sizes: Vec<f32>,
}

impl FontRanking {
    /// Build the ranking from every block of the document.
    pub fn build(blocks: &[Block], max_levels: usize) -> Self {
        let mut histogram: HashMap<i32, usize> = HashMap::new();
        for block in blocks {
            for line in &block.lines {
                for frag in &line.fragments {
                    let key = (frag.font_size * SIZE_BUCKET).round() as i32;
                    *histogram.entry(key).or_insert(0) += frag.text.chars().count();
                }
            }
        }

        if histogram.is_empty() {
            return Self::default();
        }

        // Modal size weighted by character count; key order breaks ties so
        // repeated runs stay deterministic.
        let body_key = histogram
            .iter()
            .max_by(|(ka, ca), (kb, cb)| ca.cmp(cb).then(ka.cmp(kb)))
            .map(|(k, _)| *k)
            .unwrap_or(120);
        let body_size = body_key as f32 / SIZE_BUCKET;

        let mut larger: Vec<f32> = histogram
            .keys()
            .map(|k| *k as f32 / SIZE_BUCKET)
            .filter(|s| *s > body_size + HEADING_MIN_DELTA)
            .collect();
        larger.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
        larger.truncate(max_levels);

        Self {
            body_size,
            heading_sizes: larger,
        }
    }

    /// Body (modal) font size.
    pub fn body_size(&self) -> f32 {
        self.body_size
    }

    /// Heading level 1..K for a dominant font size, or `None` for body text.
    pub fn heading_level(&self, size: f32) -> Option<u8> {
        self.heading_sizes
            .iter()
            .position(|s| (size - s).abs() <= SIZE_MATCH_TOLERANCE)
            .map(|i| (i + 1) as u8)
    }

    /// True when no heading-eligible sizes exist (uniform document).
    pub fn is_flat(&self) -> bool {
        self.heading_sizes.is_empty()
    }
}

/// Outcome of the classification pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassifyReport {
    /// No font-size hierarchy was found; assembly falls back to a single
    /// root section.
    pub ambiguous: bool,
    /// Number of blocks classified as noise.
    pub noise_count: usize,
}

/// Assigns a [`BlockType`] to every block of a document.
pub struct StructureClassifier {
    max_levels: usize,
    noise_min_pages: usize,
    list_marker: Regex,
}

impl StructureClassifier {
    /// Create a classifier mapping the top `max_levels` font sizes to
    /// heading levels, with noise detected at `noise_min_pages` repeats.
    pub fn new(max_levels: usize, noise_min_pages: usize) -> Self {
        Self {
            max_levels,
            noise_min_pages,
            list_marker: Regex::new(r"^\s*(?:[\u{2022}\u{25E6}\u{25AA}\u{2023}\u{2043}]|\d{1,3}[.)]\s|\(\d{1,3}\)\s)")
                .expect("valid list marker regex"),
        }
    }

    /// Classify all blocks in place. Collect-then-classify: the font ranking
    /// is built first from the full block sequence, then applied.
    pub fn classify(&self, blocks: &mut [Block]) -> ClassifyReport {
        let ranking = FontRanking::build(blocks, self.max_levels);
        self.classify_with_ranking(blocks, &ranking)
    }

    /// Classification phase against an explicit ranking.
    pub fn classify_with_ranking(&self, blocks: &mut [Block], ranking: &FontRanking) -> ClassifyReport {
        let noise_keys = self.collect_noise_keys(blocks);
        let mut noise_count = 0;

        for block in blocks.iter_mut() {
            if noise_keys.contains(&repeat_key(block)) {
                block.block_type = BlockType::Noise;
                noise_count += 1;
                continue;
            }

            let dominant = block.dominant_font_size();
            if block.lines.len() <= HEADING_MAX_LINES {
                if let Some(level) = ranking.heading_level(dominant) {
                    block.block_type = BlockType::Heading(level);
                    continue;
                }
            }

            // Boldness or italics alone never promotes a block to heading.
            if self.list_marker.is_match(&block.text()) {
                block.block_type = BlockType::ListItem;
            } else {
                block.block_type = BlockType::Paragraph;
            }
        }

        if ranking.is_flat() {
            log::debug!("no heading-eligible font sizes; document is flat");
        }

        ClassifyReport {
            ambiguous: ranking.is_flat(),
            noise_count,
        }
    }

    /// Keys (normalized text + quantized position) that repeat on at least
    /// `noise_min_pages` distinct pages: running headers, footers, page
    /// numbers.
    fn collect_noise_keys(&self, blocks: &[Block]) -> Vec<RepeatKey> {
        let mut pages_by_key: HashMap<RepeatKey, Vec<u32>> = HashMap::new();
        for block in blocks {
            let pages = pages_by_key.entry(repeat_key(block)).or_default();
            if !pages.contains(&block.page) {
                pages.push(block.page);
            }
        }
        pages_by_key
            .into_iter()
            .filter(|(_, pages)| pages.len() >= self.noise_min_pages)
            .map(|(key, _)| key)
            .collect()
    }
}

impl Default for StructureClassifier {
    fn default() -> Self {
        Self::new(3, 3)
    }
}

/// Identity of a potentially repeating block: digit-normalized text plus the
/// quantized top-left corner, so "Page 1 of 3" and "Page 2 of 3" at the same
/// footer position collide.
type RepeatKey = (String, i32, i32);

fn repeat_key(block: &Block) -> RepeatKey {
    let normalized: String = block
        .text()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_digit() { '#' } else { c })
        .collect();
    let bbox = block.bbox();
    (
        normalized.trim().to_string(),
        (bbox.x0 / 4.0).round() as i32,
        (bbox.y1 / 4.0).round() as i32,
    )
}
