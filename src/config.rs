//! Configuration fields the engine reads.
//!
//! The settings store itself (persistence, schema migration, the options
//! page) lives in the host; the engine only receives a ready-made `Config`
//! through the `updateConfig` channel message and reads a handful of fields:
//! `context_width` for sentence-window extraction and `forq_on_mine` for the
//! mine request. The remaining fields are round-tripped for the popup layer.

use serde::{Deserialize, Serialize};

fn default_context_width() -> usize {
    1
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// How many sentences of context to include on each side of a mined
    /// word (1 = just the word's own sentence).
    #[serde(default = "default_context_width")]
    pub context_width: usize,
    /// Whether mined cards are also added to the FORQ (front-of-review
    /// queue) deck.
    #[serde(default = "default_true")]
    pub forq_on_mine: bool,
    pub show_popup_on_hover: bool,
    pub touchscreen_support: bool,
    pub disable_fade_animation: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            context_width: default_context_width(),
            forq_on_mine: default_true(),
            show_popup_on_hover: false,
            touchscreen_support: false,
            disable_fade_animation: false,
        }
    }
}
