use crate::dom::Document;
use crate::overlay::display::{display_category, DisplayCategory};

fn category_of(tag: &str, display: Option<&str>) -> DisplayCategory {
    let mut doc = Document::new();
    let node = match display {
        Some(display) => doc.create_styled_element(tag, display),
        None => doc.create_element(tag),
    };
    display_category(&doc, node)
}

#[test]
fn test_text_nodes_are_text() {
    let mut doc = Document::new();
    let text = doc.create_text("hello");
    assert_eq!(display_category(&doc, text), DisplayCategory::Text);
}

#[test]
fn test_comment_nodes_are_none() {
    let mut doc = Document::new();
    let comment = doc.create_comment("nothing to see");
    assert_eq!(display_category(&doc, comment), DisplayCategory::None);
}

#[test]
fn test_display_none_wins_over_tag() {
    assert_eq!(category_of("ruby", Some("none")), DisplayCategory::None);
    assert_eq!(category_of("span", Some("none")), DisplayCategory::None);
}

#[test]
fn test_ruby_tag_overrides() {
    // Host-reported display for ruby internals is unreliable; the tag wins.
    assert_eq!(category_of("ruby", Some("block")), DisplayCategory::Ruby);
    assert_eq!(category_of("ruby", None), DisplayCategory::Ruby);
    assert_eq!(category_of("rp", Some("inline")), DisplayCategory::None);
    assert_eq!(category_of("rt", Some("inline")), DisplayCategory::RubyText);
    assert_eq!(category_of("rb", Some("block")), DisplayCategory::Inline);
}

#[test]
fn test_block_family() {
    assert_eq!(category_of("span", Some("block")), DisplayCategory::Block);
    assert_eq!(category_of("span", Some("flex")), DisplayCategory::Block);
    assert_eq!(category_of("span", Some("-webkit-box")), DisplayCategory::Block);
    assert_eq!(category_of("span", Some("grid")), DisplayCategory::Block);
    assert_eq!(category_of("span", Some("table-cell")), DisplayCategory::Block);
    assert_eq!(category_of("span", Some("flow-root")), DisplayCategory::Block);
    assert_eq!(category_of("span", Some("list-item")), DisplayCategory::Block);
    assert_eq!(category_of("span", Some("run-in")), DisplayCategory::Block);
}

#[test]
fn test_inline_family() {
    assert_eq!(category_of("div", Some("inline")), DisplayCategory::Inline);
    assert_eq!(
        category_of("div", Some("inline-block")),
        DisplayCategory::Inline
    );
    assert_eq!(category_of("div", Some("math")), DisplayCategory::Inline);
    assert_eq!(
        category_of("div", Some("ruby-base-container")),
        DisplayCategory::Inline
    );
    // Transparent boxes still contribute their text.
    assert_eq!(category_of("div", Some("contents")), DisplayCategory::Inline);
}

#[test]
fn test_ruby_display_values() {
    assert_eq!(category_of("span", Some("ruby")), DisplayCategory::Ruby);
    assert_eq!(
        category_of("span", Some("ruby-text")),
        DisplayCategory::RubyText
    );
    assert_eq!(
        category_of("span", Some("ruby-text-container")),
        DisplayCategory::RubyText
    );
}

#[test]
fn test_multi_keyword_display() {
    assert_eq!(
        category_of("span", Some("block flow")),
        DisplayCategory::Block
    );
    assert_eq!(
        category_of("span", Some("inline flow-root")),
        DisplayCategory::Inline
    );
}

#[test]
fn test_unknown_display_fails_open_to_none() {
    // Warns loudly, classifies as hidden, never panics.
    assert_eq!(category_of("span", Some("wibble")), DisplayCategory::None);
}

#[test]
fn test_tag_defaults_apply_without_explicit_display() {
    assert_eq!(category_of("p", None), DisplayCategory::Block);
    assert_eq!(category_of("li", None), DisplayCategory::Block);
    assert_eq!(category_of("span", None), DisplayCategory::Inline);
    assert_eq!(category_of("script", None), DisplayCategory::None);
    assert_eq!(category_of("x-custom", None), DisplayCategory::Inline);
}
