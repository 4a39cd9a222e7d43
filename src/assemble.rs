//! Document assembly: classified, segmented blocks → outline tree.
//!
//! The assembler keeps an explicit array of section nodes with index-based
//! parent links and a stack of open section indices — no recursive descent,
//! so deeply nested documents cannot grow the call stack. A heading at level
//! L pops the stack until the top's level is below L, then opens a child
//! there; content blocks append to whichever section is open. The stack is
//! fully resolved by construction when the block sequence ends.

use crate::model::{Block, BlockType, ContentNode, Document, Section};
use crate::segment::SentenceSegmenter;

/// Folds the classified block sequence into a [`Document`].
pub struct DocumentAssembler<'a> {
    segmenter: &'a SentenceSegmenter,
}

impl<'a> DocumentAssembler<'a> {
    pub fn new(segmenter: &'a SentenceSegmenter) -> Self {
        Self { segmenter }
    }

    /// Assemble the outline from blocks in document reading order.
    ///
    /// `title` feeds both the document header and the synthetic heading used
    /// when the document has no headings at all.
    pub fn assemble(&self, blocks: &[Block], title: &str, page_count: u32) -> Document {
        // Arena of created sections; index 0 is the root.
        let mut nodes: Vec<Section> = vec![Section::root()];
        let mut parents: Vec<usize> = vec![0];
        let mut stack: Vec<usize> = vec![0];

        for block in blocks {
            match block.block_type {
                BlockType::Noise => continue,
                BlockType::Heading(level) => {
                    let level = level as u32;
                    while stack.len() > 1 && nodes[*stack.last().expect("stack")].level >= level {
                        stack.pop();
                    }
                    let parent = *stack.last().expect("root never pops");
                    let idx = nodes.len();
                    nodes.push(Section::new(block.text(), level));
                    parents.push(parent);
                    stack.push(idx);
                }
                BlockType::Paragraph | BlockType::Unclassified => {
                    self.push_content(&mut nodes, &stack, block, false);
                }
                BlockType::ListItem => {
                    self.push_content(&mut nodes, &stack, block, true);
                }
            }
        }

        let mut root = resolve_tree(nodes, &parents);

        let mut document = Document::new(title, page_count);
        if root.content.is_empty() && !root.children.is_empty() {
            document.sections = std::mem::take(&mut root.children);
        } else if !root.content.is_empty() || !root.children.is_empty() {
            // Content before the first heading (or a document with no
            // headings at all) stays on the root, which is emitted with a
            // synthetic heading equal to the title when one exists.
            if !title.is_empty() {
                root.heading = Some(title.to_string());
            }
            document.sections = vec![root];
        }
        document
    }

    fn push_content(&self, nodes: &mut [Section], stack: &[usize], block: &Block, list: bool) {
        let text = block.text();
        let sentences = self.segmenter.segment_strings(&text);
        if sentences.is_empty() {
            return;
        }
        let node = if list {
            ContentNode::list_item(sentences)
        } else {
            ContentNode::paragraph(sentences)
        };
        nodes[*stack.last().expect("stack")].content.push(node);
    }
}

/// Rebuild the tree from the arena: children were created after their
/// parents, so a single reverse pass moves every node into place.
fn resolve_tree(mut nodes: Vec<Section>, parents: &[usize]) -> Section {
    let mut pending: Vec<Vec<Section>> = (0..nodes.len()).map(|_| Vec::new()).collect();

    for idx in (1..parents.len()).rev() {
        let mut node = nodes.pop().expect("arena node");
        let mut kids = std::mem::take(&mut pending[idx]);
        kids.reverse();
        node.children = kids;
        pending[parents[idx]].push(node);
    }

    let mut root = nodes.pop().expect("root node");
    let mut kids = pending.swap_remove(0);
    kids.reverse();
    root.children = kids;
    root
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FontFlags, Fragment, Line};

    fn block(text: &str, page: u32, block_type: BlockType) -> Block {
        let frag = Fragment::new(
            text.to_string(),
            page,
            72.0,
            700.0,
            12.0,
            FontFlags::default(),
            0,
        );
        let mut b = Block::new(vec![Line::from_fragments(vec![frag])], page);
        b.block_type = block_type;
        b
    }

    fn assemble(blocks: &[Block], title: &str, pages: u32) -> Document {
        let segmenter = SentenceSegmenter::new();
        DocumentAssembler::new(&segmenter).assemble(blocks, title, pages)
    }

    #[test]
    fn test_two_top_level_sections() {
        let blocks = vec![
            block("Introduction", 1, BlockType::Heading(1)),
            block("The opening paragraph.", 1, BlockType::Paragraph),
            block("Conclusion", 3, BlockType::Heading(1)),
            block("The closing paragraph.", 3, BlockType::Paragraph),
        ];
        let doc = assemble(&blocks, "Paper", 3);

        assert_eq!(doc.sections.len(), 2);
        assert_eq!(doc.sections[0].heading.as_deref(), Some("Introduction"));
        assert_eq!(doc.sections[1].heading.as_deref(), Some("Conclusion"));
        for section in &doc.sections {
            assert_eq!(section.content.len(), 1);
            assert!(section.children.is_empty());
        }
    }

    #[test]
    fn test_nesting_by_level() {
        let blocks = vec![
            block("Chapter", 1, BlockType::Heading(1)),
            block("Section A", 1, BlockType::Heading(2)),
            block("Inside A.", 1, BlockType::Paragraph),
            block("Section B", 1, BlockType::Heading(2)),
            block("Inside B.", 1, BlockType::Paragraph),
            block("Next Chapter", 2, BlockType::Heading(1)),
        ];
        let doc = assemble(&blocks, "Book", 2);

        assert_eq!(doc.sections.len(), 2);
        let chapter = &doc.sections[0];
        assert_eq!(chapter.children.len(), 2);
        assert_eq!(chapter.children[0].heading.as_deref(), Some("Section A"));
        assert_eq!(chapter.children[1].heading.as_deref(), Some("Section B"));
        assert_eq!(chapter.children[0].content[0].sentences[0], "Inside A.");
    }

    #[test]
    fn test_level_parent_strictly_less_than_child() {
        fn check(section: &Section) {
            for child in &section.children {
                assert!(section.level < child.level);
                check(child);
            }
        }
        let blocks = vec![
            block("One", 1, BlockType::Heading(1)),
            block("Three under one", 1, BlockType::Heading(3)),
            block("Deep text.", 1, BlockType::Paragraph),
            block("Two", 1, BlockType::Heading(2)),
        ];
        let doc = assemble(&blocks, "Doc", 1);
        for section in &doc.sections {
            check(section);
        }
        // Level 3 then level 2: the level-2 heading pops past level 3 and
        // nests under level 1.
        assert_eq!(doc.sections[0].children.len(), 2);
    }

    #[test]
    fn test_no_headings_collapses_with_synthetic_heading() {
        let blocks = vec![
            block("Only body text here. Two sentences even.", 1, BlockType::Paragraph),
        ];
        let doc = assemble(&blocks, "Plain Document", 1);

        assert_eq!(doc.sections.len(), 1);
        let section = &doc.sections[0];
        assert_eq!(section.heading.as_deref(), Some("Plain Document"));
        assert_eq!(section.level, 0);
        assert!(section.children.is_empty());
        assert_eq!(section.content.len(), 1);
        assert_eq!(section.content[0].sentences.len(), 2);
    }

    #[test]
    fn test_no_headings_empty_title_keeps_null_heading() {
        let blocks = vec![block("Body.", 1, BlockType::Paragraph)];
        let doc = assemble(&blocks, "", 1);
        assert_eq!(doc.sections.len(), 1);
        assert!(doc.sections[0].heading.is_none());
    }

    #[test]
    fn test_noise_blocks_skipped() {
        let blocks = vec![
            block("Heading", 1, BlockType::Heading(1)),
            block("Page 1 of 3", 1, BlockType::Noise),
            block("Real content.", 1, BlockType::Paragraph),
        ];
        let doc = assemble(&blocks, "Doc", 3);
        let all_text: String = format!("{:?}", doc);
        assert!(!all_text.contains("Page 1 of 3"));
        assert_eq!(doc.sections[0].content.len(), 1);
    }

    #[test]
    fn test_list_items_become_list_nodes() {
        let blocks = vec![
            block("Ingredients", 1, BlockType::Heading(1)),
            block("\u{2022} two eggs", 1, BlockType::ListItem),
            block("\u{2022} a cup of flour", 1, BlockType::ListItem),
        ];
        let doc = assemble(&blocks, "Recipe", 1);
        let content = &doc.sections[0].content;
        assert_eq!(content.len(), 2);
        assert!(matches!(
            content[0].kind,
            crate::model::ContentKind::ListItem
        ));
    }

    #[test]
    fn test_empty_document() {
        let doc = assemble(&[], "Empty", 0);
        assert!(doc.sections.is_empty());
        assert_eq!(doc.page_count, 0);
    }

    #[test]
    fn test_sibling_headings_after_deep_nesting() {
        let blocks = vec![
            block("A", 1, BlockType::Heading(1)),
            block("A.1", 1, BlockType::Heading(2)),
            block("A.1 text.", 1, BlockType::Paragraph),
            block("B", 1, BlockType::Heading(1)),
            block("B text.", 1, BlockType::Paragraph),
        ];
        let doc = assemble(&blocks, "Doc", 1);
        assert_eq!(doc.sections.len(), 2);
        assert_eq!(doc.sections[1].heading.as_deref(), Some("B"));
        assert_eq!(doc.sections[1].content.len(), 1);
    }
}
