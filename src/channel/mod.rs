//! Backend channel: wire envelopes and request/response correlation.
//!
//! - `messages.rs` - Closed tagged-variant envelopes for both directions
//! - `port.rs` - BackgroundPort: seq allocation, pending-waiter table,
//!   advisory cancellation, inbound settlement

pub mod messages;
pub mod port;

pub use messages::*;
pub use port::*;
