//! # pdfstruct
//!
//! Structural extraction from PDF documents: headings, sections, paragraphs,
//! and sentence boundaries, emitted as a normalized hierarchical JSON
//! document model.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfstruct::{parse_file, render};
//!
//! fn main() -> pdfstruct::Result<()> {
//!     // Run the extraction pipeline on one PDF
//!     let extraction = parse_file("document.pdf")?;
//!
//!     // Serialize the outline to the canonical JSON schema
//!     let json = render::to_json(&extraction.document, render::JsonFormat::Pretty)?;
//!     println!("{}", json);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! One document flows through five sequential stages:
//!
//! 1. **Fragment extraction** — content streams decoded into positioned text
//!    fragments with font metadata
//! 2. **Layout reconstruction** — fragments grouped into lines and blocks in
//!    reading order, with column-band handling
//! 3. **Structure classification** — blocks labeled heading / paragraph /
//!    list item / noise against a document-wide font-size ranking
//! 4. **Sentence segmentation** — paragraph text split on abbreviation-aware
//!    sentence boundaries
//! 5. **Assembly** — classified blocks folded into a section tree and
//!    serialized
//!
//! Documents are independent: [`batch::BatchProcessor`] runs many in
//! parallel with per-document timeouts and atomic JSON output.

pub mod assemble;
pub mod batch;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;
pub mod segment;

// Re-export commonly used types
pub use batch::{BatchOptions, BatchProcessor, DocumentOutcome, OutcomeStatus, RunSummary};
pub use detect::{detect_version_from_bytes, detect_version_from_path, is_pdf};
pub use error::{Error, Result, Warning};
pub use model::{
    BBox, Block, BlockType, ContentKind, ContentNode, DocInfo, Document, FontFlags, Fragment,
    Line, Section,
};
pub use parser::{ErrorMode, Extraction, PageFailure, ParseOptions, PdfParser};
pub use render::JsonFormat;
pub use segment::{Sentence, SentenceSegmenter};

use std::path::Path;

/// Run the extraction pipeline on a PDF file.
///
/// # Example
///
/// ```no_run
/// use pdfstruct::parse_file;
///
/// let extraction = parse_file("document.pdf").unwrap();
/// println!("{} sections", extraction.document.section_count());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Extraction> {
    let parser = PdfParser::open(path)?;
    parser.parse()
}

/// Run the extraction pipeline on a PDF file with custom options.
///
/// # Example
///
/// ```no_run
/// use pdfstruct::{parse_file_with_options, ParseOptions};
///
/// let options = ParseOptions::new().lenient().with_heading_levels(4);
/// let extraction = parse_file_with_options("document.pdf", options).unwrap();
/// ```
pub fn parse_file_with_options<P: AsRef<Path>>(
    path: P,
    options: ParseOptions,
) -> Result<Extraction> {
    let parser = PdfParser::open_with_options(path, options)?;
    parser.parse()
}

/// Run the extraction pipeline on in-memory PDF bytes.
pub fn parse_bytes(data: &[u8]) -> Result<Extraction> {
    let parser = PdfParser::from_bytes(data)?;
    parser.parse()
}

/// Run the extraction pipeline on in-memory PDF bytes with custom options.
pub fn parse_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Extraction> {
    let parser = PdfParser::from_bytes_with_options(data, options)?;
    parser.parse()
}

/// Extract a PDF file straight to canonical JSON.
///
/// # Example
///
/// ```no_run
/// use pdfstruct::{to_json, JsonFormat};
///
/// let json = to_json("document.pdf", JsonFormat::Pretty).unwrap();
/// std::fs::write("document.json", json).unwrap();
/// ```
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let extraction = parse_file(path)?;
    render::to_json(&extraction.document, format)
}

/// Builder for configuring and running structural extraction.
///
/// # Example
///
/// ```no_run
/// use pdfstruct::{JsonFormat, Pdfstruct};
///
/// let json = Pdfstruct::new()
///     .lenient()
///     .with_heading_levels(2)
///     .parse("document.pdf")?
///     .to_json(JsonFormat::Compact)?;
/// # Ok::<(), pdfstruct::Error>(())
/// ```
pub struct Pdfstruct {
    options: ParseOptions,
}

impl Pdfstruct {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            options: ParseOptions::default(),
        }
    }

    /// Enable lenient mode (record page failures and continue).
    pub fn lenient(mut self) -> Self {
        self.options = self.options.lenient();
        self
    }

    /// Map the top `levels` font sizes to heading levels.
    pub fn with_heading_levels(mut self, levels: usize) -> Self {
        self.options = self.options.with_heading_levels(levels);
        self
    }

    /// Set the page-repeat threshold for noise classification.
    pub fn with_noise_min_pages(mut self, pages: usize) -> Self {
        self.options = self.options.with_noise_min_pages(pages);
        self
    }

    /// Disable sentence segmentation.
    pub fn without_segmentation(mut self) -> Self {
        self.options = self.options.without_segmentation();
        self
    }

    /// Set the per-document deadline (enforced by the batch layer).
    pub fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.options = self.options.with_timeout(timeout);
        self
    }

    /// Parse a PDF file.
    pub fn parse<P: AsRef<Path>>(self, path: P) -> Result<PdfstructResult> {
        let parser = PdfParser::open_with_options(path, self.options)?;
        Ok(PdfstructResult {
            extraction: parser.parse()?,
        })
    }

    /// Parse in-memory PDF bytes.
    pub fn parse_bytes(self, data: &[u8]) -> Result<PdfstructResult> {
        let parser = PdfParser::from_bytes_with_options(data, self.options)?;
        Ok(PdfstructResult {
            extraction: parser.parse()?,
        })
    }
}

impl Default for Pdfstruct {
    fn default() -> Self {
        Self::new()
    }
}

/// Result wrapper with convenient output accessors.
pub struct PdfstructResult {
    /// The completed extraction
    pub extraction: Extraction,
}

impl PdfstructResult {
    /// Serialize the outline to canonical JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.extraction.document, format)
    }

    /// Render a human-readable outline summary.
    pub fn summary(&self) -> String {
        render::render_summary(&self.extraction.document)
    }

    /// The assembled document.
    pub fn document(&self) -> &Document {
        &self.extraction.document
    }

    /// Warnings recorded during extraction.
    pub fn warnings(&self) -> &[Warning] {
        &self.extraction.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_configures_options() {
        let builder = Pdfstruct::new()
            .lenient()
            .with_heading_levels(2)
            .without_segmentation();

        assert!(matches!(builder.options.error_mode, ErrorMode::Lenient));
        assert_eq!(builder.options.heading_levels, 2);
        assert!(!builder.options.segmentation);
    }

    #[test]
    fn test_parse_bytes_empty_data() {
        let data: [u8; 0] = [];
        assert!(parse_bytes(&data).is_err());
    }

    #[test]
    fn test_parse_bytes_too_short() {
        assert!(parse_bytes(b"%PDF").is_err());
    }

    #[test]
    fn test_parse_bytes_unknown_magic() {
        let data = [0xFF, 0xFE, 0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        let result = parse_bytes(&data);
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_builder_parse_invalid_bytes() {
        let result = Pdfstruct::new().parse_bytes(b"not a pdf");
        assert!(result.is_err());
    }

    #[test]
    fn test_detect_reexports() {
        assert!(detect_version_from_bytes(b"%PDF-1.7\n%x").is_ok());
        assert!(detect_version_from_bytes(b"<html>").is_err());
    }
}
