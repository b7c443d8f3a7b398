use crate::dom::Document;
use crate::overlay::extract::{flat_text, paragraphs_in_node};

use super::accept_all;

// -------------------------------------------------------------------------
// Paragraph boundaries
// -------------------------------------------------------------------------

#[test]
fn test_sibling_blocks_become_separate_paragraphs() {
    let mut doc = Document::new();
    let root = doc.create_element("div");
    for data in ["A", "B"] {
        let p = doc.create_element("p");
        let text = doc.create_text(data);
        doc.append_child(p, text);
        doc.append_child(root, p);
    }

    let paragraphs = paragraphs_in_node(&doc, root, &accept_all);
    assert_eq!(paragraphs.len(), 2);
    assert_eq!(flat_text(&doc, &paragraphs[0]), "A");
    assert_eq!(flat_text(&doc, &paragraphs[1]), "B");
}

#[test]
fn test_nested_block_splits_surrounding_text() {
    // <div>A<div>B</div>C</div> reads as three paragraphs.
    let mut doc = Document::new();
    let root = doc.create_element("div");
    let a = doc.create_text("A");
    let inner = doc.create_element("div");
    let b = doc.create_text("B");
    let c = doc.create_text("C");
    doc.append_child(root, a);
    doc.append_child(inner, b);
    doc.append_child(root, inner);
    doc.append_child(root, c);

    let paragraphs = paragraphs_in_node(&doc, root, &accept_all);
    let texts: Vec<String> = paragraphs
        .iter()
        .map(|paragraph| flat_text(&doc, paragraph))
        .collect();
    assert_eq!(texts, ["A", "B", "C"]);
}

#[test]
fn test_inline_root_is_flushed_at_the_end() {
    let mut doc = Document::new();
    let root = doc.create_element("span");
    let text = doc.create_text("開いたまま");
    doc.append_child(root, text);

    let paragraphs = paragraphs_in_node(&doc, root, &accept_all);
    assert_eq!(paragraphs.len(), 1);
    assert_eq!(flat_text(&doc, &paragraphs[0]), "開いたまま");
}

#[test]
fn test_inline_elements_do_not_break_paragraphs() {
    // <p>水を<b>飲</b>む</p> is one paragraph with three fragments.
    let mut doc = Document::new();
    let p = doc.create_element("p");
    let first = doc.create_text("水を");
    let b = doc.create_element("b");
    let middle = doc.create_text("飲");
    let last = doc.create_text("む");
    doc.append_child(p, first);
    doc.append_child(b, middle);
    doc.append_child(p, b);
    doc.append_child(p, last);

    let paragraphs = paragraphs_in_node(&doc, p, &accept_all);
    assert_eq!(paragraphs.len(), 1);
    assert_eq!(flat_text(&doc, &paragraphs[0]), "水を飲む");
    assert_eq!(paragraphs[0].len(), 3);
}

// -------------------------------------------------------------------------
// Fragment invariants
// -------------------------------------------------------------------------

#[test]
fn test_fragments_are_contiguous_and_cover_the_text() {
    let mut doc = Document::new();
    let p = doc.create_element("p");
    for data in ["今日は", "いい", "天気"] {
        let text = doc.create_text(data);
        doc.append_child(p, text);
    }

    let paragraphs = paragraphs_in_node(&doc, p, &accept_all);
    let paragraph = &paragraphs[0];

    assert_eq!(paragraph[0].start, 0);
    let mut expected_start = 0;
    for fragment in paragraph {
        assert_eq!(fragment.start, expected_start);
        assert_eq!(fragment.length, fragment.end - fragment.start);
        expected_start = fragment.end;
    }
    assert_eq!(expected_start, 8);
    assert_eq!(flat_text(&doc, paragraph), "今日はいい天気");
}

#[test]
fn test_offsets_restart_per_paragraph() {
    let mut doc = Document::new();
    let root = doc.create_element("div");
    for data in ["ひとつ", "ふたつ"] {
        let p = doc.create_element("p");
        let text = doc.create_text(data);
        doc.append_child(p, text);
        doc.append_child(root, p);
    }

    let paragraphs = paragraphs_in_node(&doc, root, &accept_all);
    assert_eq!(paragraphs[1][0].start, 0);
}

// -------------------------------------------------------------------------
// Whitespace policy
// -------------------------------------------------------------------------

#[test]
fn test_whitespace_only_paragraph_is_discarded() {
    let mut doc = Document::new();
    let p = doc.create_element("p");
    let text = doc.create_text("  \n\t ");
    doc.append_child(p, text);
    assert!(paragraphs_in_node(&doc, p, &accept_all).is_empty());
}

#[test]
fn test_leading_and_trailing_whitespace_nodes_are_dropped() {
    let mut doc = Document::new();
    let p = doc.create_element("p");
    for data in ["  ", "A B", "  "] {
        let text = doc.create_text(data);
        doc.append_child(p, text);
    }

    let paragraphs = paragraphs_in_node(&doc, p, &accept_all);
    assert_eq!(paragraphs.len(), 1);
    assert_eq!(flat_text(&doc, &paragraphs[0]), "A B");
    assert_eq!(paragraphs[0].len(), 1);
}

#[test]
fn test_interior_whitespace_is_preserved() {
    let mut doc = Document::new();
    let p = doc.create_element("p");
    for data in ["A", "  ", "B"] {
        let text = doc.create_text(data);
        doc.append_child(p, text);
    }

    let paragraphs = paragraphs_in_node(&doc, p, &accept_all);
    assert_eq!(flat_text(&doc, &paragraphs[0]), "A  B");
    assert_eq!(paragraphs[0].len(), 3);
}

#[test]
fn test_empty_text_nodes_are_ignored() {
    let mut doc = Document::new();
    let p = doc.create_element("p");
    for data in ["", "A", ""] {
        let text = doc.create_text(data);
        doc.append_child(p, text);
    }

    let paragraphs = paragraphs_in_node(&doc, p, &accept_all);
    assert_eq!(paragraphs[0].len(), 1);
}

// -------------------------------------------------------------------------
// Pruning
// -------------------------------------------------------------------------

#[test]
fn test_hidden_subtrees_are_pruned() {
    let mut doc = Document::new();
    let p = doc.create_element("p");
    let visible = doc.create_text("見える");
    let hidden = doc.create_styled_element("span", "none");
    let hidden_text = doc.create_text("見えない");
    doc.append_child(p, visible);
    doc.append_child(hidden, hidden_text);
    doc.append_child(p, hidden);

    let paragraphs = paragraphs_in_node(&doc, p, &accept_all);
    assert_eq!(flat_text(&doc, &paragraphs[0]), "見える");
}

#[test]
fn test_filter_prunes_whole_subtree() {
    let mut doc = Document::new();
    let p = doc.create_element("p");
    let keep = doc.create_text("本文");
    let spoiler = doc.create_element("span");
    doc.set_class(spoiler, "spoiler");
    let secret = doc.create_text("ネタバレ");
    doc.append_child(p, keep);
    doc.append_child(spoiler, secret);
    doc.append_child(p, spoiler);

    let filter = |doc: &Document, node: crate::dom::NodeId| doc.class(node) != "spoiler";
    let paragraphs = paragraphs_in_node(&doc, p, &filter);
    assert_eq!(flat_text(&doc, &paragraphs[0]), "本文");
}

// -------------------------------------------------------------------------
// Ruby context
// -------------------------------------------------------------------------

#[test]
fn test_ruby_text_is_excluded_and_base_flagged() {
    // <p><ruby>漢<rt>かん</rt></ruby>字</p>
    let mut doc = Document::new();
    let p = doc.create_element("p");
    let ruby = doc.create_element("ruby");
    let base = doc.create_text("漢");
    let rt = doc.create_element("rt");
    let reading = doc.create_text("かん");
    doc.append_child(ruby, base);
    doc.append_child(rt, reading);
    doc.append_child(ruby, rt);
    doc.append_child(p, ruby);
    let plain = doc.create_text("字");
    doc.append_child(p, plain);

    let paragraphs = paragraphs_in_node(&doc, p, &accept_all);
    let paragraph = &paragraphs[0];
    assert_eq!(flat_text(&doc, paragraph), "漢字");
    assert!(paragraph[0].has_ruby, "text under <ruby> is flagged");
    assert!(!paragraph[1].has_ruby);
}
