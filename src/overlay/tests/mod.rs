//! Overlay test suite.

mod display_tests;
mod extract_tests;

use crate::dom::{Document, NodeId};
use crate::types::{Card, Ruby, Token};

/// Build `<p>{text}</p>` and return the document and the paragraph element.
pub fn paragraph_doc(text: &str) -> (Document, NodeId) {
    let mut doc = Document::new();
    let p = doc.create_element("p");
    let node = doc.create_text(text);
    doc.append_child(p, node);
    (doc, p)
}

pub fn accept_all(_: &Document, _: NodeId) -> bool {
    true
}

pub fn token(start: usize, end: usize, vid: u32, sid: u32, state: &[&str]) -> Token {
    Token {
        start,
        end,
        card: Card {
            vid,
            sid,
            state: state.iter().map(|s| s.to_string()).collect(),
        },
        rubies: vec![],
    }
}

pub fn ruby_token(
    start: usize,
    end: usize,
    vid: u32,
    rubies: &[(usize, usize, &str)],
) -> Token {
    Token {
        rubies: rubies
            .iter()
            .map(|&(start, end, text)| Ruby {
                start,
                end,
                text: text.to_string(),
            })
            .collect(),
        ..token(start, end, vid, 1, &["new"])
    }
}
