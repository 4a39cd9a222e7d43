//! Structural extraction pipeline.
//!
//! One document flows through five sequential stages: fragment extraction,
//! layout reconstruction, structure classification, sentence segmentation,
//! and assembly. Classification is a whole-document pass, so the pipeline
//! collects every page's blocks before classifying — an explicit two-phase
//! design rather than shared state.

pub mod backend;
mod classify;
mod fragments;
mod layout;
mod options;

pub use backend::{LopdfBackend, PdfBackend, RecoveredBackend};
pub use classify::{ClassifyReport, FontRanking, StructureClassifier};
pub use fragments::FragmentExtractor;
pub use layout::LayoutReconstructor;
pub use options::{ErrorMode, ParseOptions};

use std::path::Path;

use crate::assemble::DocumentAssembler;
use crate::error::{Error, Result, Warning};
use crate::model::{Block, DocInfo, Document};
use crate::segment::SentenceSegmenter;

/// A page-level failure recorded while sibling pages continued.
#[derive(Debug)]
pub struct PageFailure {
    /// 1-indexed page number
    pub page: u32,
    /// What went wrong on that page
    pub error: Error,
}

/// Result of extracting one document: the outline plus everything the
/// caller needs for its per-document outcome record.
#[derive(Debug)]
pub struct Extraction {
    /// The assembled outline
    pub document: Document,
    /// Info-dictionary metadata
    pub info: DocInfo,
    /// Non-fatal degradations
    pub warnings: Vec<Warning>,
    /// Pages that contributed nothing
    pub page_failures: Vec<PageFailure>,
}

/// PDF structural extraction driver for one document.
pub struct PdfParser {
    backend: Box<dyn PdfBackend>,
    options: ParseOptions,
    recovered: bool,
    /// Title fallback when the Info dictionary has none (file stem)
    stem: Option<String>,
}

impl PdfParser {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Open a PDF file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let path = path.as_ref();
        crate::detect::detect_version_from_path(path)?;

        let data = std::fs::read(path)?;
        let mut parser = Self::from_bytes_with_options(&data, options)?;
        parser.stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string());
        Ok(parser)
    }

    /// Parse a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ParseOptions::default())
    }

    /// Parse a PDF from bytes with custom options.
    ///
    /// A container whose cross-reference table will not load falls back to
    /// the linear-scan recovery backend before giving up.
    pub fn from_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Self> {
        crate::detect::detect_version_from_bytes(&data[..data.len().min(16)])?;

        let (backend, recovered): (Box<dyn PdfBackend>, bool) =
            match LopdfBackend::load_bytes(data) {
                Ok(b) => (Box::new(b), false),
                Err(Error::Encrypted) => return Err(Error::Encrypted),
                Err(e) => {
                    log::warn!("structured load failed ({}), trying linear scan", e);
                    (Box::new(RecoveredBackend::scan(data)?), true)
                }
            };

        Ok(Self {
            backend,
            options,
            recovered,
            stem: None,
        })
    }

    /// Whether the document loaded through the linear-scan recovery path.
    pub fn is_recovered(&self) -> bool {
        self.recovered
    }

    /// Number of pages.
    pub fn page_count(&self) -> u32 {
        self.backend.page_count()
    }

    /// Run the full pipeline and return the extraction.
    pub fn parse(&self) -> Result<Extraction> {
        let pages = self.backend.pages();
        if pages.is_empty() {
            return Err(Error::UnreadablePdf("document has no pages".to_string()));
        }
        let page_count = pages.len() as u32;

        let mut warnings = Vec::new();
        let mut page_failures = Vec::new();
        let mut blocks: Vec<Block> = Vec::new();

        // Phase 1: extract and reconstruct every page, collecting all blocks
        // so classification can rank font sizes across the whole document.
        let extractor = FragmentExtractor::new(self.backend.as_ref());
        let layout = LayoutReconstructor::new();

        for (&page_num, &page_id) in &pages {
            match extractor.extract_page(page_num, page_id) {
                Ok(fragments) if fragments.is_empty() => {
                    log::debug!("page {} has no extractable text", page_num);
                    page_failures.push(PageFailure {
                        page: page_num,
                        error: Error::NoExtractableText { page: page_num },
                    });
                }
                Ok(fragments) => {
                    blocks.extend(layout.reconstruct_page(fragments, page_num));
                }
                Err(e) => {
                    if self.options.error_mode == ErrorMode::Strict {
                        return Err(e);
                    }
                    log::warn!("page {} failed: {}", page_num, e);
                    page_failures.push(PageFailure {
                        page: page_num,
                        error: e,
                    });
                }
            }
        }

        // Every page empty: strict mode treats the document as failed.
        if blocks.is_empty()
            && self.options.error_mode == ErrorMode::Strict
            && page_failures.len() == pages.len()
        {
            let page = page_failures.first().map(|f| f.page).unwrap_or(1);
            return Err(Error::NoExtractableText { page });
        }

        // Phase 2: classify against the document-wide font ranking.
        let classifier =
            StructureClassifier::new(self.options.heading_levels, self.options.noise_min_pages);
        let report = classifier.classify(&mut blocks);
        if report.ambiguous && !blocks.is_empty() {
            warnings.push(Warning::ClassificationAmbiguous);
        }
        log::debug!(
            "{} blocks classified, {} noise",
            blocks.len(),
            report.noise_count
        );

        // Segment and assemble.
        let segmenter = if self.options.segmentation {
            SentenceSegmenter::new()
        } else {
            warnings.push(Warning::SegmentationUnavailable);
            SentenceSegmenter::disabled()
        };

        let info = self.backend.info();
        let title = info
            .title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| self.stem.clone())
            .unwrap_or_default();

        let assembler = DocumentAssembler::new(&segmenter);
        let document = assembler.assemble(&blocks, &title, page_count);

        Ok(Extraction {
            document,
            info,
            warnings,
            page_failures,
        })
    }
}
