//! Human-readable outline summary.
//!
//! Read-only view over an assembled (or re-loaded) document: section titles
//! with sentence counts, indented by nesting depth. Used by display
//! consumers; never written back.

use crate::model::{Document, Section};

/// Render an indented outline with per-section sentence counts.
pub fn render_summary(doc: &Document) -> String {
    let mut out = String::new();
    let title = if doc.title.is_empty() {
        "(untitled)"
    } else {
        &doc.title
    };
    out.push_str(&format!(
        "{} — {} page(s), {} section(s), {} sentence(s)\n",
        title,
        doc.page_count,
        doc.section_count(),
        doc.sentence_count()
    ));

    for section in &doc.sections {
        render_section(section, 0, &mut out);
    }
    out
}

fn render_section(section: &Section, depth: usize, out: &mut String) {
    let heading = section.heading.as_deref().unwrap_or("(no heading)");
    let own_sentences: usize = section.content.iter().map(|c| c.sentences.len()).sum();
    out.push_str(&format!(
        "{}{} [{} sentence(s)]\n",
        "  ".repeat(depth),
        heading,
        own_sentences
    ));
    for child in &section.children {
        render_section(child, depth + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentNode, Section};

    #[test]
    fn test_summary_lists_sections_indented() {
        let mut doc = Document::new("Report", 2);
        let mut intro = Section::new("Introduction", 1);
        intro
            .content
            .push(ContentNode::paragraph(vec!["One.".into(), "Two.".into()]));
        let mut sub = Section::new("Background", 2);
        sub.content
            .push(ContentNode::paragraph(vec!["Three.".into()]));
        intro.children.push(sub);
        doc.sections.push(intro);

        let summary = render_summary(&doc);
        assert!(summary.starts_with("Report — 2 page(s), 2 section(s), 3 sentence(s)"));
        assert!(summary.contains("Introduction [2 sentence(s)]"));
        assert!(summary.contains("  Background [1 sentence(s)]"));
    }

    #[test]
    fn test_summary_untitled() {
        let doc = Document::new("", 0);
        assert!(render_summary(&doc).starts_with("(untitled)"));
    }
}
