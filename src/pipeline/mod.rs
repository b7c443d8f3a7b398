//! Parse pipeline: batching paragraphs into multiplexed backend requests
//! and gating the work on element visibility.
//!
//! - `batch.rs` - ParseBatch creation, the single multiplexed `parse`
//!   message, per-batch application futures
//! - `scheduler.rs` - Visibility-gated scheduling and cancellation

pub mod batch;
pub mod scheduler;

pub use batch::*;
pub use scheduler::*;
