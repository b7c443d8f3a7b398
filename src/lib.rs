//! YomiCore: Page Text Segmentation + Token Overlay Engine
//!
//! A Rust/WASM implementation of the reader-extension content engine: walk
//! arbitrary page DOM for renderable text, group it into paragraphs, ship
//! the paragraphs to a parsing backend over a long-lived duplex channel,
//! and splice the returned token spans (dictionary state, furigana) back
//! into the live document without disturbing the page.
//!
//! # Architecture
//!
//! ## Overlay (text segmentation + token splicing)
//! - `dom/` - Owned arena document model standing in for the live page DOM
//! - `overlay/display.rs` - Display Classifier: node to layout category
//! - `overlay/extract.rs` - Paragraph Extractor: subtree to fragment runs
//! - `overlay/apply.rs` - Token Overlay Engine: destructive DOM rewrite
//! - `overlay/index.rs` - Reverse Word Index: word identity to live wrappers
//! - `overlay/context.rs` - Sentence-window context for the mining dialog
//!
//! ## Channel (backend communication)
//! - `channel/messages.rs` - Closed tagged-variant wire envelopes
//! - `channel/port.rs` - BackgroundPort: request/response correlation with
//!   advisory cancellation
//! - `pipeline/batch.rs` - Many paragraphs per network call, per-batch
//!   application futures
//! - `pipeline/scheduler.rs` - Visibility-gated parse scheduling
//!
//! ## Glue
//! - `engine.rs` - Explicitly constructed page-lifetime singleton
//! - `wasm.rs` - JS-facing facade (`EngineHandle`)
//!
//! # Usage (WASM)
//! ```javascript,ignore
//! import init, { EngineHandle } from 'yomicore';
//!
//! await init();
//! const engine = new EngineHandle(
//!     message => port.postMessage(message),
//!     handle => stopWatching(handle),
//! );
//!
//! const root = engine.loadSnapshot({ kind: 'element', tag: 'p', children: [
//!     { kind: 'text', data: '日本語を勉強する' },
//! ]});
//! engine.elementsEntered([root]);
//!
//! // Tokens come back through the channel...
//! engine.handleMessage({ type: 'success', seq: 0, result: [...] });
//! console.log(engine.outerHtml(root));  // annotated markup
//! ```

pub mod channel;
pub mod config;
pub mod dom;
pub mod engine;
pub mod overlay;
pub mod pipeline;
pub mod types;
pub mod wasm;

// Public exports - overlay core
pub use overlay::*;
pub use types::*;

// Public exports - channel + pipeline
pub use channel::*;
pub use pipeline::*;

// Public exports - glue
pub use config::Config;
pub use dom::{Document, NodeId, NodeSnapshot};
pub use engine::Engine;

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    format!("yomicore v{}", env!("CARGO_PKG_VERSION"))
}
