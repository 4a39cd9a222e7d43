//! Error types for the pdfstruct library.

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Result type alias for pdfstruct operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during structural extraction.
///
/// Document-level errors (`UnreadablePdf`, `Timeout`) abort the pipeline for
/// that document only. Page-level errors (`NoExtractableText`) are recorded
/// on the extraction result while sibling pages continue.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version marker is malformed.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// The byte stream is not a loadable PDF container, even after the
    /// linear-scan recovery pass.
    #[error("Unreadable PDF container: {0}")]
    UnreadablePdf(String),

    /// A page yielded zero text fragments (image-only or empty page).
    #[error("Page {page} has no extractable text")]
    NoExtractableText {
        /// 1-indexed page number
        page: u32,
    },

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// Error during JSON serialization.
    #[error("Rendering error: {0}")]
    Render(String),

    /// Per-document processing deadline exceeded.
    #[error("Document processing timed out after {seconds}s")]
    Timeout {
        /// Configured deadline in seconds
        seconds: u64,
    },

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::UnreadablePdf(err.to_string()),
        }
    }
}

/// Non-fatal conditions recorded during extraction.
///
/// Warnings degrade a stage in place and never abort a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Warning {
    /// No heading-eligible font sizes exist; the document collapsed to a
    /// single root section with a synthetic heading.
    ClassificationAmbiguous,

    /// Sentence segmentation was disabled or unavailable; blocks degrade to
    /// a single whole-block sentence.
    SegmentationUnavailable,
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::ClassificationAmbiguous => {
                write!(f, "no font-size hierarchy; collapsed to a single section")
            }
            Warning::SegmentationUnavailable => {
                write!(f, "sentence segmentation unavailable; whole-block sentences")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NoExtractableText { page: 4 };
        assert_eq!(err.to_string(), "Page 4 has no extractable text");

        let err = Error::Timeout { seconds: 30 };
        assert_eq!(err.to_string(), "Document processing timed out after 30s");

        let err = Error::PageOutOfRange(10, 5);
        assert_eq!(
            err.to_string(),
            "Page 10 is out of range (document has 5 pages)"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_warning_serializes_snake_case() {
        let json = serde_json::to_string(&Warning::ClassificationAmbiguous).unwrap();
        assert_eq!(json, "\"classification_ambiguous\"");
    }
}
