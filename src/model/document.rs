//! Document-level types: the hierarchical outline and its metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of content node within a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// Body paragraph
    Paragraph,
    /// Bulleted or numbered list item
    ListItem,
}

/// A segmented body unit inside a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentNode {
    /// "paragraph" or "list_item"
    #[serde(rename = "type")]
    pub kind: ContentKind,
    /// Ordered sentences covering the unit's full text
    pub sentences: Vec<String>,
}

impl ContentNode {
    /// Create a paragraph node.
    pub fn paragraph(sentences: Vec<String>) -> Self {
        Self {
            kind: ContentKind::Paragraph,
            sentences,
        }
    }

    /// Create a list-item node.
    pub fn list_item(sentences: Vec<String>) -> Self {
        Self {
            kind: ContentKind::ListItem,
            sentences,
        }
    }
}

/// A node in the outline tree.
///
/// Sections nest strictly by heading level: every child's level is greater
/// than its parent's. The document root uses `heading: None`, `level: 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Heading text; `None` only for the synthetic root
    pub heading: Option<String>,
    /// Heading level (0 for the root)
    pub level: u32,
    /// Ordered body content
    pub content: Vec<ContentNode>,
    /// Ordered child sections
    pub children: Vec<Section>,
}

impl Section {
    /// Create a section with a heading at the given level.
    pub fn new(heading: impl Into<String>, level: u32) -> Self {
        Self {
            heading: Some(heading.into()),
            level,
            content: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create the unheaded document root.
    pub fn root() -> Self {
        Self {
            heading: None,
            level: 0,
            content: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Total number of sentences in this section and its descendants.
    pub fn sentence_count(&self) -> usize {
        self.content.iter().map(|c| c.sentences.len()).sum::<usize>()
            + self.children.iter().map(|s| s.sentence_count()).sum::<usize>()
    }

    /// Total number of sections in this subtree, including `self`.
    pub fn subtree_size(&self) -> usize {
        1 + self.children.iter().map(|s| s.subtree_size()).sum::<usize>()
    }
}

/// Root container serialized to the canonical JSON schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document title (may be empty when unknown)
    pub title: String,
    /// Total pages in the source PDF
    pub page_count: u32,
    /// Top-level outline sections
    pub sections: Vec<Section>,
}

impl Document {
    /// Create an empty document.
    pub fn new(title: impl Into<String>, page_count: u32) -> Self {
        Self {
            title: title.into(),
            page_count,
            sections: Vec::new(),
        }
    }

    /// Total number of sections across the outline.
    pub fn section_count(&self) -> usize {
        self.sections.iter().map(|s| s.subtree_size()).sum()
    }

    /// Total number of sentences across the outline.
    pub fn sentence_count(&self) -> usize {
        self.sections.iter().map(|s| s.sentence_count()).sum()
    }
}

/// Metadata pulled from the PDF Info dictionary.
///
/// Internal to extraction: only `title` reaches the canonical schema, as the
/// first link in the title fallback chain (Info title → file stem → empty).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocInfo {
    /// Document title
    pub title: Option<String>,
    /// Document author
    pub author: Option<String>,
    /// Document subject
    pub subject: Option<String>,
    /// Creator application
    pub creator: Option<String>,
    /// PDF producer
    pub producer: Option<String>,
    /// Creation date
    pub created: Option<DateTime<Utc>>,
    /// Last modification date
    pub modified: Option<DateTime<Utc>>,
    /// PDF version (e.g., "1.7")
    pub pdf_version: String,
    /// Whether the document is encrypted
    pub encrypted: bool,
}

impl DocInfo {
    /// Create metadata carrying only the PDF version.
    pub fn with_version(version: impl Into<String>) -> Self {
        Self {
            pdf_version: version.into(),
            ..Default::default()
        }
    }
}
