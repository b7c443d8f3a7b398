//! Core data structures shared between the overlay engine and the channel.
//!
//! These mirror the wire shapes the parsing backend produces: a `Token` is a
//! span of a paragraph's flat text annotated with a `Card` (the vocabulary
//! entry it belongs to) and zero or more `Ruby` readings. All span offsets
//! are counted in Unicode scalar values, relative to the start of the
//! paragraph the token was parsed from.

use serde::{Deserialize, Serialize};

// ==================== IDENTITY ====================

/// Vocabulary id assigned by the backend. 32 bits so ids stay plain JS
/// numbers at the wasm boundary.
pub type Vid = u32;

/// Sentence/spelling id assigned by the backend. Together with [`Vid`] it
/// identifies one occurrence-class of a word.
pub type Sid = u32;

/// Serialized identity key for a `(vid, sid)` pair, used by the reverse
/// word index and by state-update routing.
pub fn card_key(vid: Vid, sid: Sid) -> String {
    format!("{}/{}", vid, sid)
}

/// CSS class prefix every wrapper element carries.
pub const WORD_CLASS: &str = "yomi-word";

/// Class marking text the backend returned no token for.
pub const UNPARSED_CLASS: &str = "yomi-word unparsed";

/// Class carried by spliced-in furigana text elements.
pub const FURIGANA_CLASS: &str = "yomi-furi";

/// Compose the class string for a card's current review state.
///
/// The state flags come back from the backend as an ordered list of strings
/// (`"new"`, `"learning"`, `"blacklisted"`, `"never-forget"`, ...) and are
/// appended verbatim so the host stylesheet can target them.
pub fn state_class_string(state: &[String]) -> String {
    if state.is_empty() {
        WORD_CLASS.to_string()
    } else {
        format!("{} {}", WORD_CLASS, state.join(" "))
    }
}

// ==================== CARDS AND TOKENS ====================

/// One vocabulary card as the backend reports it alongside a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub vid: Vid,
    pub sid: Sid,
    /// Ordered set of review-state flags.
    pub state: Vec<String>,
}

impl Card {
    /// Identity key for indexing and update routing.
    pub fn key(&self) -> String {
        card_key(self.vid, self.sid)
    }

    /// Class string for the card's current state.
    pub fn class_string(&self) -> String {
        state_class_string(&self.state)
    }
}

/// A phonetic reading covering a sub-span of its token, addressed in the
/// same paragraph-relative coordinates as the token itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ruby {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// Backend annotation for the span `[start, end)` of a paragraph's flat
/// text. Tokens for one paragraph arrive sorted by `start` and
/// non-overlapping; whitespace gaps between them are left unparsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub start: usize,
    pub end: usize,
    pub card: Card,
    #[serde(default)]
    pub rubies: Vec<Ruby>,
}

// ==================== WORD PAYLOAD ====================

/// Annotation payload carried on every interactive wrapper element.
///
/// The popup/dialog layer reads this on hover and click; the engine itself
/// only writes it (and repaints `token.card.state` on word-state updates).
/// `context` is the full flat text of the paragraph the token came from and
/// `context_offset` the wrapped fragment's position within it.
#[derive(Debug, Clone)]
pub struct WordData {
    pub token: Token,
    pub context: String,
    pub context_offset: usize,
    /// Sentence boundary cache, filled lazily by `overlay::context`.
    pub sentence_boundaries: Option<Vec<i64>>,
    pub sentence_index: Option<usize>,
}

impl WordData {
    pub fn new(token: Token, context: String, context_offset: usize) -> Self {
        Self {
            token,
            context,
            context_offset,
            sentence_boundaries: None,
            sentence_index: None,
        }
    }
}

/// One entry of an `updateWordState` push: `[vid, sid, state]` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordStateUpdate(pub Vid, pub Sid, pub Vec<String>);

// ==================== REVIEW OPERATIONS ====================

/// Grades the review endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Nothing,
    Something,
    Hard,
    Okay,
    Easy,
}

/// Deck flags that can be toggled per card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CardFlag {
    Blacklist,
    NeverForget,
    Forq,
}
