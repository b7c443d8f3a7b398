//! Paragraph extraction.
//!
//! Walks a subtree in document order and reconstructs the flat text
//! "paragraphs" it represents: block boundaries flush the run in progress,
//! hidden/ruby-text subtrees are pruned, and whitespace is trimmed at the
//! edges so paragraphs never start or end misaligned. Offsets restart at 0
//! for every paragraph.

use crate::dom::{char_len, Document, NodeId};

use super::display::{display_category, DisplayCategory};

/// Host-supplied predicate letting a site adapter exclude subtrees
/// (spoiler-hidden text and the like). Returning `false` prunes the node
/// and everything under it.
pub type NodeFilter = dyn Fn(&Document, NodeId) -> bool;

/// A contiguous run of one live text node, addressed by paragraph-relative
/// character offsets. Fragments of a paragraph are contiguous and
/// non-overlapping; their concatenation is the paragraph's flat text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment {
    pub start: usize,
    pub end: usize,
    pub length: usize,
    pub node: NodeId,
    /// Whether the source page already renders this text inside a ruby
    /// annotation; the overlay engine must not nest furigana into it.
    pub has_ruby: bool,
}

/// One block-bounded run of text, sent to the backend as a single parsing
/// unit.
pub type Paragraph = Vec<Fragment>;

/// Concatenated text of a paragraph's fragments, read from the live nodes.
pub fn flat_text(doc: &Document, paragraph: &[Fragment]) -> String {
    paragraph
        .iter()
        .map(|fragment| doc.text_data(fragment.node))
        .collect()
}

/// Extract all paragraphs under `root`, in document order.
pub fn paragraphs_in_node(
    doc: &Document,
    root: NodeId,
    filter: &NodeFilter,
) -> Vec<Paragraph> {
    let mut walker = Walker {
        doc,
        filter,
        offset: 0,
        fragments: Vec::new(),
        paragraphs: Vec::new(),
    };
    walker.recurse(root, false);
    // Capture a run left open by an inline root.
    walker.break_paragraph();
    walker.paragraphs
}

struct Walker<'a> {
    doc: &'a Document,
    filter: &'a NodeFilter,
    offset: usize,
    fragments: Vec<Fragment>,
    paragraphs: Vec<Paragraph>,
}

impl Walker<'_> {
    fn break_paragraph(&mut self) {
        // Drop fragments from the end that are just whitespace
        // (the ones from the start were never pushed to begin with).
        let mut end = self.fragments.len();
        while end > 0 {
            let data = self.doc.text_data(self.fragments[end - 1].node);
            if !data.trim().is_empty() {
                break;
            }
            end -= 1;
        }
        self.fragments.truncate(end);

        if !self.fragments.is_empty() {
            self.paragraphs.push(std::mem::take(&mut self.fragments));
        }
        self.offset = 0;
    }

    fn push_text(&mut self, node: NodeId, has_ruby: bool) {
        let data = self.doc.text_data(node);
        // Ignore empty text nodes, as well as whitespace at the beginning
        // of a run; interior and trailing whitespace stays so offsets line
        // up with what the backend sees.
        if data.is_empty() || (self.fragments.is_empty() && data.trim().is_empty()) {
            return;
        }
        let length = char_len(data);
        let start = self.offset;
        self.offset += length;
        self.fragments.push(Fragment {
            start,
            end: self.offset,
            length,
            node,
            has_ruby,
        });
    }

    fn recurse(&mut self, node: NodeId, mut has_ruby: bool) {
        let category = display_category(self.doc, node);
        if category == DisplayCategory::Block {
            self.break_paragraph();
        }
        if category == DisplayCategory::None
            || category == DisplayCategory::RubyText
            || !(self.filter)(self.doc, node)
        {
            return;
        }
        if category == DisplayCategory::Text {
            self.push_text(node, has_ruby);
        } else {
            if category == DisplayCategory::Ruby {
                has_ruby = true;
            }
            let doc = self.doc;
            for &child in doc.children(node) {
                self.recurse(child, has_ruby);
            }
            if category == DisplayCategory::Block {
                self.break_paragraph();
            }
        }
    }
}
