//! Parse batching.
//!
//! Each paragraph becomes one abortable sub-request; many sub-requests ride
//! in a single `parse` network message to keep channel overhead off the hot
//! path. When a batch's tokens arrive they are applied to the live
//! fragments; cancellations are suppressed from user-visible reporting,
//! every other failure reaches the error sink exactly once and is re-raised
//! so callers can observe it.

use std::cell::RefCell;
use std::rc::Rc;

use futures_util::future::LocalBoxFuture;
use futures_util::FutureExt;
use serde_json::Value;

use crate::channel::{
    BackgroundPort, CancelHandle, OutboundMessage, PortError, ResponseFuture, Seq,
};
use crate::dom::Document;
use crate::overlay::{apply_tokens, flat_text, Paragraph, ReverseIndex};
use crate::types::Token;

/// Error-reporting collaborator for non-cancellation failures. The host
/// points this at its toast layer; the default just logs.
#[derive(Clone)]
pub struct ErrorSink(Rc<dyn Fn(&PortError)>);

impl ErrorSink {
    pub fn new(report: impl Fn(&PortError) + 'static) -> Self {
        Self(Rc::new(report))
    }

    pub fn report(&self, error: &PortError) {
        (self.0)(error)
    }
}

impl Default for ErrorSink {
    fn default() -> Self {
        Self::new(|error| log::error!("{}", error))
    }
}

/// One paragraph in flight: its fragments, its sub-request id, and the
/// advisory cancellation handle. Clones share the same underlying batch.
#[derive(Clone)]
pub struct ParseBatch {
    pub seq: Seq,
    pub paragraph: Rc<RefCell<Paragraph>>,
    pub cancel: CancelHandle,
}

/// Settles once a batch's tokens have been applied (or its request failed).
pub type AppliedFuture = LocalBoxFuture<'static, Result<(), PortError>>;

fn decode_tokens(value: Value) -> Result<Vec<Token>, PortError> {
    serde_json::from_value(value).map_err(|error| PortError::Protocol(error.to_string()))
}

/// Turn extracted paragraphs into parse batches plus their application
/// futures. Registers the sub-requests but transmits nothing; follow up
/// with [`request_parse`] so every batch shares one network call.
pub fn parse_paragraphs(
    port: &BackgroundPort,
    doc: &Rc<RefCell<Document>>,
    index: &Rc<RefCell<ReverseIndex>>,
    sink: &ErrorSink,
    paragraphs: Vec<Paragraph>,
) -> (Vec<ParseBatch>, Vec<AppliedFuture>) {
    let mut batches = Vec::with_capacity(paragraphs.len());
    let mut applied = Vec::with_capacity(paragraphs.len());

    for paragraph in paragraphs {
        let (seq, future, cancel) = port.register_abortable();
        let paragraph = Rc::new(RefCell::new(paragraph));
        batches.push(ParseBatch {
            seq,
            paragraph: Rc::clone(&paragraph),
            cancel,
        });

        let doc = Rc::clone(doc);
        let index = Rc::clone(index);
        let sink = sink.clone();
        applied.push(
            async move {
                match future.await.and_then(decode_tokens) {
                    Ok(tokens) => {
                        apply_tokens(
                            &mut doc.borrow_mut(),
                            &mut index.borrow_mut(),
                            &mut paragraph.borrow_mut(),
                            &tokens,
                        );
                        Ok(())
                    }
                    Err(error) => {
                        if !error.is_canceled() {
                            sink.report(&error);
                        }
                        Err(error)
                    }
                }
            }
            .boxed_local(),
        );
    }

    (batches, applied)
}

/// Issue the single multiplexed parse request for a set of batches. Flat
/// text is re-read from the live nodes at send time so late mutations are
/// reflected.
pub fn request_parse(
    port: &BackgroundPort,
    doc: &Document,
    batches: &[ParseBatch],
) -> ResponseFuture {
    let texts = batches
        .iter()
        .map(|batch| (batch.seq, flat_text(doc, &batch.paragraph.borrow())))
        .collect();
    port.request(|seq| OutboundMessage::Parse { seq, texts })
}

// ==================== TESTS ====================
