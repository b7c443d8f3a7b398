//! Wire envelopes for the backend channel.
//!
//! Every message is a tagged variant switched on a `type` string, closed on
//! both directions so dispatch is exhaustive at compile time. The `result`
//! of a success envelope stays a raw JSON value because its shape depends on
//! the originating request; the requesting side decodes it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::Config;
use crate::types::{CardFlag, Rating, Sid, Vid, WordStateUpdate};

/// Correlates an outbound request with its eventual inbound response.
pub type Seq = u32;

/// Minimal structural form every error takes when crossing the channel,
/// whatever the transport can natively carry. Reconstructed into
/// [`crate::channel::PortError::Backend`] on receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct SerializedError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl SerializedError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack: None,
        }
    }

    pub fn with_stack(message: impl Into<String>, stack: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack: Some(stack.into()),
        }
    }
}

/// Requests the engine sends to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutboundMessage {
    /// One network message per pipeline invocation; the actual parse
    /// sub-requests are multiplexed as `(seq, flat_text)` pairs.
    Parse {
        seq: Seq,
        texts: Vec<(Seq, String)>,
    },
    /// Best-effort cancellation of an earlier request; the remote side may
    /// ignore it if the work already completed.
    Cancel { seq: Seq },
    Mine {
        seq: Seq,
        forq: bool,
        vid: Vid,
        sid: Sid,
        sentence: Option<String>,
        translation: Option<String>,
    },
    Review {
        seq: Seq,
        rating: Rating,
        vid: Vid,
        sid: Sid,
    },
    SetFlag {
        seq: Seq,
        vid: Vid,
        sid: Sid,
        flag: CardFlag,
        state: bool,
    },
    UpdateConfig { seq: Seq },
}

/// Messages the backend pushes to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InboundMessage {
    Success { seq: Seq, result: Value },
    Error { seq: Seq, error: SerializedError },
    Canceled { seq: Seq },
    UpdateConfig { config: Config },
    UpdateWordState { words: Vec<WordStateUpdate> },
}
