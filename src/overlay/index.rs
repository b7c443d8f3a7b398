//! Reverse word index: word identity to the live wrappers displaying it.
//!
//! Lets a word-state update repaint every on-page occurrence without
//! re-parsing anything. Entries are append-only; wrappers whose nodes the
//! host page has since discarded stay behind as dead weight, which is
//! acceptable because the index lives exactly as long as the page.

use std::collections::HashMap;

use crate::dom::{Document, NodeId};
use crate::types::{card_key, state_class_string, WordStateUpdate};

/// Index entry for one `(vid, sid)` identity.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    /// Class string currently painted on every element of this entry.
    pub class: String,
    pub elements: Vec<NodeId>,
}

#[derive(Debug, Default)]
pub struct ReverseIndex {
    entries: HashMap<String, IndexEntry>,
}

impl ReverseIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&IndexEntry> {
        self.entries.get(key)
    }

    pub fn set(&mut self, key: String, entry: IndexEntry) {
        self.entries.insert(key, entry);
    }

    /// Append an element to an existing entry. Unknown keys are ignored;
    /// first occurrences go through [`ReverseIndex::set`].
    pub fn append(&mut self, key: &str, element: NodeId) {
        if let Some(entry) = self.entries.get_mut(key) {
            entry.elements.push(element);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Repaint every occurrence of the updated words in place.
    ///
    /// Words without an entry are not on this page and are skipped, as are
    /// updates whose composed class string matches what is already painted
    /// (no redundant DOM writes).
    pub fn apply_word_states(&mut self, doc: &mut Document, words: &[WordStateUpdate]) {
        for update in words {
            let WordStateUpdate(vid, sid, state) = update;
            let Some(entry) = self.entries.get_mut(&card_key(*vid, *sid)) else {
                continue;
            };
            let class = state_class_string(state);
            if entry.class == class {
                continue;
            }
            for &element in &entry.elements {
                doc.set_class(element, &class);
                if let Some(word) = doc.word_mut(element) {
                    word.token.card.state = state.clone();
                }
            }
            entry.class = class;
        }
    }
}
