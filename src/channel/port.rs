//! Request/response correlation over the long-lived backend channel.
//!
//! Every outbound request is tagged with a sequence id and parked in a
//! pending-waiter table; inbound `success`/`error`/`canceled` messages
//! settle the matching waiter. Cancellation is advisory: the handle posts a
//! `cancel` control message and the local future still settles only when a
//! corresponding inbound message arrives, so work that finished before the
//! cancel was observed is delivered as a normal success.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use serde_json::Value;
use thiserror::Error;
use tokio::sync::oneshot;

use super::messages::{OutboundMessage, SerializedError, Seq};

/// Outbound half of the duplex channel. The wasm build posts through a JS
/// callback; tests record.
pub trait Transport {
    fn post(&self, message: &OutboundMessage);
}

/// Failure taxonomy for channel requests.
#[derive(Debug, Clone, Error)]
pub enum PortError {
    /// The request was canceled before the backend finished it. Not a
    /// failure; filtered out of user-visible reporting.
    #[error("canceled")]
    Canceled,
    /// Remote-reported failure, reconstructed from its serialized form.
    #[error(transparent)]
    Backend(#[from] SerializedError),
    /// The waiter was dropped without ever being settled.
    #[error("backend channel closed before the request settled")]
    ChannelClosed,
    /// The response payload did not match what the originating request
    /// expects.
    #[error("malformed response payload: {0}")]
    Protocol(String),
}

impl PortError {
    pub fn is_canceled(&self) -> bool {
        matches!(self, PortError::Canceled)
    }
}

type Waiter = oneshot::Sender<Result<Value, PortError>>;

/// Settles with the correlated inbound message's payload.
pub struct ResponseFuture {
    receiver: oneshot::Receiver<Result<Value, PortError>>,
}

impl Future for ResponseFuture {
    type Output = Result<Value, PortError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(PortError::ChannelClosed)),
            Poll::Pending => Poll::Pending,
        }
    }
}

#[derive(Default)]
struct PortState {
    next_seq: Seq,
    pending: HashMap<Seq, Waiter>,
}

/// Correlates outbound requests with inbound responses by sequence id.
///
/// Clones are cheap and share the pending table. Lifetime is the duration
/// of the page's connection to the backend channel.
#[derive(Clone)]
pub struct BackgroundPort {
    state: Rc<RefCell<PortState>>,
    transport: Rc<dyn Transport>,
}

impl BackgroundPort {
    pub fn new(transport: Rc<dyn Transport>) -> Self {
        Self {
            state: Rc::new(RefCell::new(PortState::default())),
            transport,
        }
    }

    fn register(&self) -> (Seq, ResponseFuture) {
        let mut state = self.state.borrow_mut();
        let seq = state.next_seq;
        state.next_seq += 1;
        let (sender, receiver) = oneshot::channel();
        state.pending.insert(seq, sender);
        (seq, ResponseFuture { receiver })
    }

    /// Send a request with no cancellation path. The closure receives the
    /// allocated sequence id so the message can carry it.
    pub fn request(&self, message: impl FnOnce(Seq) -> OutboundMessage) -> ResponseFuture {
        let (seq, future) = self.register();
        self.transport.post(&message(seq));
        future
    }

    /// Register a request without transmitting anything; the parse pipeline
    /// multiplexes many of these into one network message.
    pub fn register_abortable(&self) -> (Seq, ResponseFuture, CancelHandle) {
        let (seq, future) = self.register();
        let cancel = CancelHandle {
            seq,
            transport: Rc::clone(&self.transport),
            fired: Rc::new(Cell::new(false)),
        };
        (seq, future, cancel)
    }

    fn take_waiter(&self, seq: Seq) -> Option<Waiter> {
        self.state.borrow_mut().pending.remove(&seq)
    }

    /// Inbound `success`: resolve and remove the waiter. A missing waiter
    /// (already settled or unknown) drops the result silently.
    pub fn resolve(&self, seq: Seq, result: Value) {
        match self.take_waiter(seq) {
            Some(waiter) => {
                let _ = waiter.send(Ok(result));
            }
            None => log::warn!("no pending request with seq {}, result dropped", seq),
        }
    }

    /// Inbound `error`: reject with the reconstructed backend error.
    /// Returns the error back when nobody was waiting so the caller can
    /// route it to the error sink instead.
    pub fn reject(&self, seq: Seq, error: SerializedError) -> Option<SerializedError> {
        match self.take_waiter(seq) {
            Some(waiter) => {
                let _ = waiter.send(Err(PortError::Backend(error)));
                None
            }
            None => Some(error),
        }
    }

    /// Inbound `canceled`: reject with the cancellation signal. Only a
    /// waiter still present is affected; an already-settled request is a
    /// no-op.
    pub fn settle_canceled(&self, seq: Seq) {
        if let Some(waiter) = self.take_waiter(seq) {
            let _ = waiter.send(Err(PortError::Canceled));
        }
    }

    /// The backend channel went away. Pending waiters are deliberately left
    /// in place; the page gets reloaded rather than reconnected, so nothing
    /// would ever observe a flush.
    pub fn disconnected(&self) {
        log::error!(
            "backend channel disconnected ({} requests pending)",
            self.state.borrow().pending.len()
        );
    }

    pub fn pending_len(&self) -> usize {
        self.state.borrow().pending.len()
    }
}

/// Advisory cancellation for one registered request. Posts at most one
/// `cancel` control message across all clones; never settles the future
/// locally.
#[derive(Clone)]
pub struct CancelHandle {
    seq: Seq,
    transport: Rc<dyn Transport>,
    fired: Rc<Cell<bool>>,
}

impl CancelHandle {
    pub fn seq(&self) -> Seq {
        self.seq
    }

    pub fn cancel(&self) {
        if !self.fired.replace(true) {
            self.transport.post(&OutboundMessage::Cancel { seq: self.seq });
        }
    }
}

// ==================== TESTS ====================
