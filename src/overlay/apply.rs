//! Token overlay: splicing backend token spans back into the live DOM.
//!
//! A single left-to-right sweep with two cursors, one over tokens and one
//! over fragments. Fragments are split at token boundaries (splitting keeps
//! node identity for the left half), matched spans are wrapped in
//! interactive elements carrying the word's state class and annotation
//! payload, furigana readings are spliced in as `rt` siblings, and
//! everything no token claimed is marked unparsed.

use crate::dom::{Document, NodeId};
use crate::types::{state_class_string, Token, WordData, FURIGANA_CLASS, UNPARSED_CLASS};

use super::extract::{flat_text, Fragment, Paragraph};
use super::index::{IndexEntry, ReverseIndex};

/// Split the fragment at `index` at the paragraph offset `split_offset`.
///
/// The underlying text node is split in place; the fragment keeps its node
/// and its left half, and a new fragment owning the remainder is inserted
/// right after it. Later fragments keep their positions, so no re-indexing
/// is needed.
fn split_fragment(
    doc: &mut Document,
    fragments: &mut Paragraph,
    index: usize,
    split_offset: usize,
) {
    let old = fragments[index];
    let new_node = doc.split_text(old.node, split_offset - old.start);
    fragments.insert(
        index + 1,
        Fragment {
            start: split_offset,
            end: old.end,
            length: old.end - split_offset,
            node: new_node,
            has_ruby: old.has_ruby,
        },
    );
    let old = &mut fragments[index];
    old.end = split_offset;
    old.length = split_offset - old.start;
}

fn wrap_unparsed(doc: &mut Document, node: NodeId) {
    let wrapper = doc.create_element("span");
    doc.set_class(wrapper, UNPARSED_CLASS);
    doc.wrap(node, wrapper);
}

fn furigana_element(doc: &mut Document, reading: &str) -> NodeId {
    let rt = doc.create_element("rt");
    doc.set_class(rt, FURIGANA_CLASS);
    let text = doc.create_text(reading);
    doc.append_child(rt, text);
    rt
}

/// Destructively rewrite a paragraph's fragments to realize `tokens`.
///
/// Tokens are assumed sorted by start and non-overlapping. Running out of
/// fragments mid-token ends the sweep silently rather than erroring: the
/// backend may have parsed slightly more text than still exists if the host
/// page mutated underneath us.
pub fn apply_tokens(
    doc: &mut Document,
    index: &mut ReverseIndex,
    fragments: &mut Paragraph,
    tokens: &[Token],
) {
    let mut fragment_index = 0usize;
    let mut cur_offset = 0usize;
    let text = flat_text(doc, fragments);

    for token in tokens {
        if fragment_index >= fragments.len() {
            return;
        }

        // Wrap all unparsed fragments that appear before the token.
        while cur_offset < token.start {
            if fragments[fragment_index].end > token.start {
                // Only the beginning of the node is unparsed. Split it.
                split_fragment(doc, fragments, fragment_index, token.start);
            }
            let fragment = fragments[fragment_index];
            wrap_unparsed(doc, fragment.node);
            cur_offset += fragment.length;
            fragment_index += 1;
            if fragment_index >= fragments.len() {
                return;
            }
        }

        // Accumulate fragments until we have enough to fit the token.
        while cur_offset < token.end {
            if fragments[fragment_index].end > token.end {
                // Only the beginning of the node is part of the token.
                split_fragment(doc, fragments, fragment_index, token.end);
            }
            let fragment = fragments[fragment_index];

            let class = state_class_string(&token.card.state);
            // A ruby-capable wrapper, unless the page already renders this
            // text inside its own ruby annotation.
            let wrapper_tag = if !token.rubies.is_empty() && !fragment.has_ruby {
                "ruby"
            } else {
                "span"
            };
            let wrapper = doc.create_element(wrapper_tag);
            doc.set_class(wrapper, &class);

            let key = token.card.key();
            if index.get(&key).is_none() {
                index.set(
                    key,
                    IndexEntry {
                        class: class.clone(),
                        elements: vec![wrapper],
                    },
                );
            } else {
                index.append(&key, wrapper);
            }

            doc.set_word(
                wrapper,
                WordData::new(token.clone(), text.clone(), cur_offset),
            );
            doc.wrap(fragment.node, wrapper);

            if !fragment.has_ruby {
                for ruby in &token.rubies {
                    let fragment = fragments[fragment_index];
                    if ruby.start >= fragment.start && ruby.end <= fragment.end {
                        // Reading is contained in this fragment. Isolate
                        // exactly its sub-span, then splice the reading in
                        // right after the base text.
                        if ruby.start > fragment.start {
                            split_fragment(doc, fragments, fragment_index, ruby.start);
                            let spacer = doc.create_element("rt");
                            doc.insert_after(spacer, fragments[fragment_index].node);
                            fragment_index += 1;
                        }
                        let fragment = fragments[fragment_index];
                        if ruby.end < fragment.end {
                            split_fragment(doc, fragments, fragment_index, ruby.end);
                            let rt = furigana_element(doc, &ruby.text);
                            doc.insert_after(rt, fragments[fragment_index].node);
                            fragment_index += 1;
                        } else {
                            let rt = furigana_element(doc, &ruby.text);
                            doc.insert_after(rt, fragment.node);
                        }
                    }
                }
            }

            cur_offset = fragments[fragment_index].end;
            fragment_index += 1;
            if fragment_index >= fragments.len() {
                break;
            }
        }
    }

    // Wrap any left-over fragments in unparsed markers.
    while fragment_index < fragments.len() {
        wrap_unparsed(doc, fragments[fragment_index].node);
        fragment_index += 1;
    }
}
