//! Layout reconstruction: fragments → lines → blocks in reading order.
//!
//! Reading order is recovered per page: fragments are sorted into baseline
//! bands, bands are merged into lines, and consecutive lines with consistent
//! leading and stable indentation become blocks. Pages with a recurring
//! vertical gutter are split into column bands, each processed independently
//! and concatenated left-to-right. Exact ties fall back to extraction order
//! (stable sorts keep `seq` order) — a documented policy, not a guarantee of
//! visual correctness for exotic layouts.

use crate::model::{Block, Fragment, Line};

/// Baseline tolerance for same-line grouping, as a fraction of font size.
const LINE_BAND_RATIO: f32 = 0.3;

/// Line gap beyond this multiple of the typical leading starts a new block.
const BLOCK_SPACING_RATIO: f32 = 1.5;

/// Left-indent drift beyond this many points starts a new block.
const INDENT_DRIFT_PT: f32 = 20.0;

/// Font-size jump beyond this many points starts a new block.
const FONT_JUMP_PT: f32 = 1.0;

/// Occupancy histogram resolution for gutter detection.
const GUTTER_SLICE_PT: f32 = 3.0;

/// Hard floor for a gutter's width.
const MIN_GUTTER_PT: f32 = 12.0;

/// Gutter width must also exceed this fraction of the page's text width.
const GUTTER_PAGE_FRACTION: f32 = 0.04;

/// Minimum width for each resulting column.
const MIN_COLUMN_PT: f32 = 80.0;

/// A detected column band: fragments between two X boundaries.
#[derive(Debug, Clone, Copy)]
struct ColumnBand {
    left: f32,
    right: f32,
}

impl ColumnBand {
    fn contains(&self, frag: &Fragment) -> bool {
        let center = frag.bbox.center_x();
        (self.left..=self.right).contains(&center) || (self.left..=self.right).contains(&frag.bbox.x0)
    }
}

/// Groups a page's fragments into lines and blocks in reading order.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutReconstructor;

impl LayoutReconstructor {
    pub fn new() -> Self {
        Self
    }

    /// Reconstruct one page: returns blocks in inferred reading order.
    pub fn reconstruct_page(&self, fragments: Vec<Fragment>, page: u32) -> Vec<Block> {
        if fragments.is_empty() {
            return Vec::new();
        }

        let bands = self.detect_column_bands(&fragments);
        log::debug!("page {}: {} column band(s)", page, bands.len());

        if bands.len() <= 1 {
            let lines = self.group_into_lines(fragments);
            return self.group_into_blocks(lines, page);
        }

        // Multi-column: each band resolves independently; bands concatenate
        // left-to-right, top-to-bottom.
        let mut banded: Vec<Vec<Fragment>> = vec![Vec::new(); bands.len()];
        for frag in fragments {
            let idx = bands
                .iter()
                .position(|b| b.contains(&frag))
                .unwrap_or(bands.len() - 1);
            banded[idx].push(frag);
        }

        let mut blocks = Vec::new();
        for band_frags in banded {
            let lines = self.group_into_lines(band_frags);
            blocks.extend(self.group_into_blocks(lines, page));
        }
        blocks
    }

    /// Detect a recurring vertical gutter via an occupancy histogram over
    /// fixed-width X slices. Returns one band for single-column pages, two
    /// for a qualifying split.
    fn detect_column_bands(&self, fragments: &[Fragment]) -> Vec<ColumnBand> {
        let min_x = fragments
            .iter()
            .map(|f| f.bbox.x0)
            .fold(f32::INFINITY, f32::min);
        let max_x = fragments
            .iter()
            .map(|f| f.bbox.x1)
            .fold(f32::NEG_INFINITY, f32::max);
        let width = max_x - min_x;

        let whole_page = vec![ColumnBand {
            left: min_x - 10.0,
            right: max_x + 10.0,
        }];

        if width < 2.0 * MIN_COLUMN_PT {
            return whole_page;
        }

        let num_slices = (width / GUTTER_SLICE_PT) as usize + 1;
        let mut occupancy = vec![0usize; num_slices];
        for frag in fragments {
            let start = ((frag.bbox.x0 - min_x) / GUTTER_SLICE_PT) as usize;
            let end = ((frag.bbox.x1 - min_x) / GUTTER_SLICE_PT) as usize;
            for slot in occupancy.iter_mut().take(end.min(num_slices - 1) + 1).skip(start) {
                *slot += 1;
            }
        }

        // Widest run of empty slices in the middle of the page.
        let search_start = num_slices * 15 / 100;
        let search_end = num_slices * 85 / 100;
        let mut best_start = 0usize;
        let mut best_len = 0usize;
        let mut run_start = 0usize;
        let mut run_len = 0usize;
        for i in search_start..search_end {
            if occupancy[i] == 0 {
                if run_len == 0 {
                    run_start = i;
                }
                run_len += 1;
                if run_len > best_len {
                    best_start = run_start;
                    best_len = run_len;
                }
            } else {
                run_len = 0;
            }
        }

        let gutter_width = best_len as f32 * GUTTER_SLICE_PT;
        let min_gutter = MIN_GUTTER_PT.max(width * GUTTER_PAGE_FRACTION);
        if gutter_width < min_gutter {
            return whole_page;
        }

        let gutter_center = min_x + (best_start as f32 + best_len as f32 / 2.0) * GUTTER_SLICE_PT;
        if gutter_center - min_x < MIN_COLUMN_PT || max_x - gutter_center < MIN_COLUMN_PT {
            return whole_page;
        }

        // The gap must recur across multiple lines on both sides, not be a
        // one-line artifact.
        let left: Vec<&Fragment> = fragments
            .iter()
            .filter(|f| f.bbox.center_x() < gutter_center)
            .collect();
        let right: Vec<&Fragment> = fragments
            .iter()
            .filter(|f| f.bbox.center_x() >= gutter_center)
            .collect();
        let min_share = (fragments.len() / 10).max(2);
        if left.len() < min_share
            || right.len() < min_share
            || distinct_baselines(&left) < 2
            || distinct_baselines(&right) < 2
        {
            return whole_page;
        }

        log::debug!(
            "gutter at x={:.1} ({:.1}pt wide), {}/{} fragments",
            gutter_center,
            gutter_width,
            left.len(),
            right.len()
        );

        vec![
            ColumnBand {
                left: min_x - 10.0,
                right: gutter_center,
            },
            ColumnBand {
                left: gutter_center,
                right: max_x + 10.0,
            },
        ]
    }

    /// Merge fragments into lines: sort top-to-bottom (PDF y-up, so baseline
    /// descending) with a left-to-right tie-break, then band by baseline.
    fn group_into_lines(&self, mut fragments: Vec<Fragment>) -> Vec<Line> {
        if fragments.is_empty() {
            return Vec::new();
        }

        fragments.sort_by(|a, b| {
            b.baseline
                .partial_cmp(&a.baseline)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(
                    a.bbox
                        .x0
                        .partial_cmp(&b.bbox.x0)
                        .unwrap_or(std::cmp::Ordering::Equal),
                )
                .then(a.seq.cmp(&b.seq))
        });

        let mut lines = Vec::new();
        let mut current: Vec<Fragment> = Vec::new();
        let mut current_baseline: Option<f32> = None;

        for frag in fragments {
            let tolerance = frag.font_size * LINE_BAND_RATIO;
            match current_baseline {
                Some(baseline) if (frag.baseline - baseline).abs() <= tolerance => {
                    current.push(frag);
                }
                _ => {
                    if !current.is_empty() {
                        lines.push(Line::from_fragments(std::mem::take(&mut current)));
                    }
                    current_baseline = Some(frag.baseline);
                    current.push(frag);
                }
            }
        }
        if !current.is_empty() {
            lines.push(Line::from_fragments(current));
        }

        lines
    }

    /// Merge consecutive lines into blocks while leading stays consistent,
    /// the left indent is stable, and the font size does not jump.
    fn group_into_blocks(&self, lines: Vec<Line>, page: u32) -> Vec<Block> {
        if lines.is_empty() {
            return Vec::new();
        }

        let typical_leading = median_leading(&lines);

        let mut blocks = Vec::new();
        let mut current: Vec<Line> = Vec::new();

        for line in lines {
            let break_before = match current.last() {
                None => false,
                Some(prev) => {
                    let gap = (prev.baseline - line.baseline).abs();
                    gap > typical_leading * BLOCK_SPACING_RATIO
                        || (prev.font_size - line.font_size).abs() > FONT_JUMP_PT
                        || (prev.x - line.x).abs() > INDENT_DRIFT_PT
                }
            };

            if break_before && !current.is_empty() {
                blocks.push(Block::new(std::mem::take(&mut current), page));
            }
            current.push(line);
        }
        if !current.is_empty() {
            blocks.push(Block::new(current, page));
        }

        blocks.retain(|b| !b.is_empty());
        blocks
    }
}

/// Median gap between consecutive baselines; falls back to a default body
/// leading for single-line input.
fn median_leading(lines: &[Line]) -> f32 {
    let mut gaps: Vec<f32> = lines
        .windows(2)
        .map(|w| (w[0].baseline - w[1].baseline).abs())
        .filter(|g| *g > 0.1)
        .collect();
    if gaps.is_empty() {
        return 14.0;
    }
    gaps.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    gaps[gaps.len() / 2]
}

fn distinct_baselines(fragments: &[&Fragment]) -> usize {
    let mut baselines: Vec<i32> = fragments.iter().map(|f| f.baseline.round() as i32).collect();
    baselines.sort_unstable();
    baselines.dedup();
    baselines.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FontFlags;

    fn frag(text: &str, x: f32, baseline: f32, size: f32, seq: u32) -> Fragment {
        Fragment::new(
            text.to_string(),
            1,
            x,
            baseline,
            size,
            FontFlags::default(),
            seq,
        )
    }

    #[test]
    fn test_lines_grouped_by_baseline() {
        let layout = LayoutReconstructor::new();
        let blocks = layout.reconstruct_page(
            vec![
                frag("world", 110.0, 700.0, 12.0, 1),
                frag("Hello", 72.0, 700.0, 12.0, 0),
                frag("Next line here.", 72.0, 686.0, 12.0, 2),
            ],
            1,
        );
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].lines.len(), 2);
        assert_eq!(blocks[0].lines[0].text(), "Hello world");
    }

    #[test]
    fn test_large_gap_splits_blocks() {
        let layout = LayoutReconstructor::new();
        let blocks = layout.reconstruct_page(
            vec![
                frag("Paragraph one line a", 72.0, 700.0, 12.0, 0),
                frag("paragraph one line b", 72.0, 686.0, 12.0, 1),
                frag("paragraph one line c", 72.0, 672.0, 12.0, 2),
                // 42pt gap, three times the 14pt leading
                frag("Paragraph two", 72.0, 630.0, 12.0, 3),
            ],
            1,
        );
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn test_font_jump_splits_blocks() {
        let layout = LayoutReconstructor::new();
        let blocks = layout.reconstruct_page(
            vec![
                frag("Heading", 72.0, 700.0, 24.0, 0),
                frag("Body text follows here", 72.0, 686.0, 12.0, 1),
            ],
            1,
        );
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text(), "Heading");
    }

    #[test]
    fn test_indent_drift_splits_blocks() {
        let layout = LayoutReconstructor::new();
        let blocks = layout.reconstruct_page(
            vec![
                frag("Flush-left line", 72.0, 700.0, 12.0, 0),
                frag("Deeply indented line", 120.0, 686.0, 12.0, 1),
            ],
            1,
        );
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn test_two_columns_concatenate_left_then_right() {
        let layout = LayoutReconstructor::new();
        // Left column at x=0..100, right column at x=300..400, on shared
        // baselines: a one-column reading would interleave them.
        let mut frags = Vec::new();
        let mut seq = 0;
        for i in 0..5 {
            let y = 700.0 - 14.0 * i as f32;
            frags.push(frag(&format!("left{}", i), 0.0, y, 12.0, seq));
            seq += 1;
            frags.push(frag(&format!("right{}", i), 300.0, y, 12.0, seq));
            seq += 1;
        }
        let blocks = layout.reconstruct_page(frags, 1);
        let text: Vec<String> = blocks.iter().map(|b| b.text()).collect();
        let joined = text.join(" ");
        let left_end = joined.find("left4").unwrap();
        let right_start = joined.find("right0").unwrap();
        assert!(
            left_end < right_start,
            "left column must precede right column: {}",
            joined
        );
    }

    #[test]
    fn test_narrow_page_never_splits() {
        let layout = LayoutReconstructor::new();
        let blocks = layout.reconstruct_page(
            vec![
                frag("a", 0.0, 700.0, 12.0, 0),
                frag("b", 100.0, 700.0, 12.0, 1),
            ],
            1,
        );
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn test_empty_page() {
        let layout = LayoutReconstructor::new();
        assert!(layout.reconstruct_page(Vec::new(), 1).is_empty());
    }

    #[test]
    fn test_median_leading() {
        let lines: Vec<Line> = [700.0, 686.0, 672.0, 658.0]
            .iter()
            .map(|&y| Line::from_fragments(vec![frag("x", 72.0, y, 12.0, 0)]))
            .collect();
        assert!((median_leading(&lines) - 14.0).abs() < 0.01);
    }
}
