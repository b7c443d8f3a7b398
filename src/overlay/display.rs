//! Display classification.
//!
//! Reduces a node's effective display value to the handful of layout
//! categories the extractor cares about. Pure function, no state.

use crate::dom::{Document, NodeId, NodeKind};

/// Effective layout category of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayCategory {
    Text,
    Inline,
    Block,
    Ruby,
    RubyText,
    None,
}

/// Classify a node by its effective display value.
///
/// Ruby markup is special-cased by tag because host-reported computed
/// display values are unreliable for ruby internals (and multi-keyword
/// display values appear in the wild for them).
pub fn display_category(doc: &Document, node: NodeId) -> DisplayCategory {
    let element = match doc.kind(node) {
        NodeKind::Text(_) => return DisplayCategory::Text,
        NodeKind::Element(el) => el,
        _ => return DisplayCategory::None,
    };

    let display = doc.effective_display(node).unwrap_or("");
    let keywords: Vec<&str> = display.split_whitespace().collect();
    let first = keywords.first().copied().unwrap_or("");

    if first == "none" {
        return DisplayCategory::None;
    }

    match element.tag.as_str() {
        "ruby" => return DisplayCategory::Ruby,
        "rp" => return DisplayCategory::None,
        "rt" => return DisplayCategory::RubyText,
        "rb" => return DisplayCategory::Inline,
        _ => {}
    }

    // Roughly ordered by how often the values show up on real pages.
    if keywords.iter().any(|k| k.starts_with("block")) {
        DisplayCategory::Block
    } else if keywords.iter().any(|k| k.starts_with("inline")) {
        DisplayCategory::Inline
    } else if first == "flex" {
        DisplayCategory::Block
    } else if first == "-webkit-box" {
        // Legacy flexbox alias, still reported by some search/portal pages.
        DisplayCategory::Block
    } else if first == "grid" {
        DisplayCategory::Block
    } else if first.starts_with("table") {
        DisplayCategory::Block
    } else if first.starts_with("flow") {
        DisplayCategory::Block
    } else if first == "ruby" {
        DisplayCategory::Ruby
    } else if first.starts_with("ruby-text") {
        DisplayCategory::RubyText
    } else if first.starts_with("ruby-base") {
        DisplayCategory::Inline
    } else if first.starts_with("math") {
        DisplayCategory::Inline
    } else if keywords.contains(&"list-item") {
        DisplayCategory::Block
    } else if first == "contents" {
        // Treated as transparent rather than skipped.
        DisplayCategory::Inline
    } else if first == "run-in" {
        DisplayCategory::Block
    } else {
        // Fail open: hide the subtree instead of breaking the page walk.
        log::warn!("unknown display value {:?}, treating as none", display);
        DisplayCategory::None
    }
}
