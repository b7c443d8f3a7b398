//! Text segmentation and token overlay.
//!
//! - `display.rs` - Display Classifier: node to layout category
//! - `extract.rs` - Paragraph Extractor: subtree to fragment runs
//! - `apply.rs` - Token Overlay Engine: destructive DOM rewrite
//! - `index.rs` - Reverse Word Index: word identity to live wrappers
//! - `context.rs` - Sentence-window context for the mining dialog

pub mod apply;
pub mod context;
pub mod display;
pub mod extract;
pub mod index;

pub use apply::*;
pub use context::*;
pub use display::*;
pub use extract::*;
pub use index::*;

#[cfg(test)]
mod tests;
