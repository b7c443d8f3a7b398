//! Sentence-window context extraction.
//!
//! The mining dialog wants "the sentence this word appeared in, give or
//! take a configurable number of neighbors" rather than the whole
//! paragraph. Boundaries are the Japanese sentence terminators 。！？;
//! the computed boundary list and the word's own sentence index are cached
//! on the word payload so repeated lookups stay cheap.

use crate::dom::char_len;
use crate::types::WordData;

fn is_sentence_terminator(ch: char) -> bool {
    matches!(ch, '。' | '！' | '？')
}

fn ensure_boundaries(word: &mut WordData) {
    if word.sentence_boundaries.is_some() && word.sentence_index.is_some() {
        return;
    }

    let mut boundaries: Vec<i64> = vec![-1];
    for (i, ch) in word.context.chars().enumerate() {
        if is_sentence_terminator(ch) {
            boundaries.push(i as i64);
        }
    }
    boundaries.push(char_len(&word.context) as i64);

    // bisect_right: index of the boundary just left of the token.
    let target = word.context_offset as i64;
    let (mut left, mut right) = (0usize, boundaries.len());
    while left < right {
        let middle = (left + right) / 2;
        if boundaries[middle] <= target {
            left = middle + 1;
        } else {
            right = middle;
        }
    }

    word.sentence_index = Some(left);
    word.sentence_boundaries = Some(boundaries);
}

/// The word's sentence plus `context_width - 1` neighbors on each side,
/// trimmed. A width of 1 returns just the word's own sentence.
pub fn surrounding_sentences(word: &mut WordData, context_width: usize) -> String {
    ensure_boundaries(word);
    let (Some(boundaries), Some(index)) = (&word.sentence_boundaries, word.sentence_index)
    else {
        return String::new();
    };

    let last = boundaries.len() - 1;
    let start = (boundaries[index.saturating_sub(context_width)] + 1) as usize;
    let end = (boundaries[(index + context_width).saturating_sub(1).min(last)] + 1) as usize;
    if end <= start {
        return String::new();
    }

    let chars: Vec<char> = word.context.chars().collect();
    let end = end.min(chars.len());
    let start = start.min(end);
    chars[start..end].iter().collect::<String>().trim().to_string()
}
