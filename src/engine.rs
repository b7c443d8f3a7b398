//! Engine: the explicitly constructed page-lifetime singleton.
//!
//! Owns the document model, the reverse word index, the configuration
//! snapshot, and the background port, and injects them into the pipeline.
//! Inbound channel messages are dispatched here exhaustively: response
//! envelopes settle the pending table, config pushes replace the snapshot,
//! and word-state pushes repaint through the reverse index.

use std::cell::RefCell;
use std::rc::Rc;

use crate::channel::{
    BackgroundPort, InboundMessage, OutboundMessage, PortError, ResponseFuture, Transport,
};
use crate::config::Config;
use crate::dom::{Document, NodeId};
use crate::overlay::{surrounding_sentences, NodeFilter, ReverseIndex};
use crate::pipeline::{ErrorSink, ObserverHost, Spawner, VisibilityScheduler};
use crate::types::{Card, CardFlag, Rating};

pub struct Engine {
    document: Rc<RefCell<Document>>,
    index: Rc<RefCell<ReverseIndex>>,
    config: Rc<RefCell<Config>>,
    port: BackgroundPort,
    sink: ErrorSink,
}

impl Engine {
    pub fn new(transport: Rc<dyn Transport>, sink: ErrorSink) -> Self {
        Self {
            document: Rc::new(RefCell::new(Document::new())),
            index: Rc::new(RefCell::new(ReverseIndex::new())),
            config: Rc::new(RefCell::new(Config::default())),
            port: BackgroundPort::new(transport),
            sink,
        }
    }

    pub fn document(&self) -> &Rc<RefCell<Document>> {
        &self.document
    }

    pub fn index(&self) -> &Rc<RefCell<ReverseIndex>> {
        &self.index
    }

    pub fn config(&self) -> &Rc<RefCell<Config>> {
        &self.config
    }

    pub fn port(&self) -> &BackgroundPort {
        &self.port
    }

    /// Dispatch one inbound channel message.
    pub fn handle_message(&self, message: InboundMessage) {
        match message {
            InboundMessage::Success { seq, result } => self.port.resolve(seq, result),
            InboundMessage::Error { seq, error } => {
                if let Some(undelivered) = self.port.reject(seq, error) {
                    self.sink.report(&PortError::Backend(undelivered));
                }
            }
            InboundMessage::Canceled { seq } => self.port.settle_canceled(seq),
            InboundMessage::UpdateConfig { config } => {
                *self.config.borrow_mut() = config;
            }
            InboundMessage::UpdateWordState { words } => {
                self.index
                    .borrow_mut()
                    .apply_word_states(&mut self.document.borrow_mut(), &words);
            }
        }
    }

    /// The backend channel dropped; see `BackgroundPort::disconnected`.
    pub fn disconnected(&self) {
        self.port.disconnected();
    }

    // ==================== TYPED REQUESTS ====================

    /// Add the word to the mining deck (and the FORQ deck when the config
    /// says so).
    pub fn request_mine(
        &self,
        card: &Card,
        sentence: Option<String>,
        translation: Option<String>,
    ) -> ResponseFuture {
        let forq = self.config.borrow().forq_on_mine;
        let (vid, sid) = (card.vid, card.sid);
        self.port.request(move |seq| OutboundMessage::Mine {
            seq,
            forq,
            vid,
            sid,
            sentence,
            translation,
        })
    }

    pub fn request_review(&self, card: &Card, rating: Rating) -> ResponseFuture {
        let (vid, sid) = (card.vid, card.sid);
        self.port.request(move |seq| OutboundMessage::Review {
            seq,
            rating,
            vid,
            sid,
        })
    }

    pub fn request_set_flag(&self, card: &Card, flag: CardFlag, state: bool) -> ResponseFuture {
        let (vid, sid) = (card.vid, card.sid);
        self.port.request(move |seq| OutboundMessage::SetFlag {
            seq,
            vid,
            sid,
            flag,
            state,
        })
    }

    pub fn request_update_config(&self) -> ResponseFuture {
        self.port
            .request(|seq| OutboundMessage::UpdateConfig { seq })
    }

    /// Sentence-window context for a wrapper element, at the configured
    /// width. `None` when the element carries no word payload.
    pub fn word_context(&self, element: NodeId) -> Option<String> {
        let width = self.config.borrow().context_width;
        let mut doc = self.document.borrow_mut();
        let word = doc.word_mut(element)?;
        Some(surrounding_sentences(word, width))
    }

    /// Build the visibility-gated scheduler wired to this engine.
    pub fn visibility_scheduler(
        &self,
        filter: Rc<NodeFilter>,
        observer: Rc<dyn ObserverHost>,
        spawner: Spawner,
    ) -> VisibilityScheduler {
        VisibilityScheduler::new(
            Rc::clone(&self.document),
            Rc::clone(&self.index),
            self.port.clone(),
            self.sink.clone(),
            filter,
            observer,
            spawner,
        )
    }
}

// ==================== TESTS ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::SerializedError;
    use crate::overlay::IndexEntry;
    use crate::types::{card_key, Token, WordData, WordStateUpdate};
    use futures::executor::block_on;
    use serde_json::json;

    #[derive(Default)]
    struct RecordingTransport {
        posted: RefCell<Vec<OutboundMessage>>,
    }

    impl Transport for RecordingTransport {
        fn post(&self, message: &OutboundMessage) {
            self.posted.borrow_mut().push(message.clone());
        }
    }

    fn engine() -> (Engine, Rc<RecordingTransport>) {
        let transport = Rc::new(RecordingTransport::default());
        let engine = Engine::new(
            transport.clone() as Rc<dyn Transport>,
            ErrorSink::default(),
        );
        (engine, transport)
    }

    fn card() -> Card {
        Card {
            vid: 1403940,
            sid: 2,
            state: vec!["new".into()],
        }
    }

    #[test]
    fn test_success_settles_pending_request() {
        let (engine, _transport) = engine();
        let future = engine.request_update_config();
        engine.handle_message(InboundMessage::Success {
            seq: 0,
            result: json!(null),
        });
        assert!(block_on(future).is_ok());
    }

    #[test]
    fn test_orphan_error_goes_to_sink() {
        let transport = Rc::new(RecordingTransport::default());
        let reports = Rc::new(RefCell::new(Vec::new()));
        let sink = {
            let reports = Rc::clone(&reports);
            ErrorSink::new(move |error| reports.borrow_mut().push(error.to_string()))
        };
        let engine = Engine::new(transport as Rc<dyn Transport>, sink);

        engine.handle_message(InboundMessage::Error {
            seq: 42,
            error: SerializedError::new("nobody asked"),
        });
        assert_eq!(reports.borrow().as_slice(), &["nobody asked".to_string()]);
    }

    #[test]
    fn test_update_config_replaces_snapshot() {
        let (engine, _transport) = engine();
        let config: Config =
            serde_json::from_value(json!({ "contextWidth": 2, "forqOnMine": false })).unwrap();
        engine.handle_message(InboundMessage::UpdateConfig { config });
        assert_eq!(engine.config().borrow().context_width, 2);
        assert!(!engine.config().borrow().forq_on_mine);
    }

    #[test]
    fn test_update_word_state_repaints_indexed_elements() {
        let (engine, _transport) = engine();
        let wrapper = {
            let mut doc = engine.document().borrow_mut();
            let parent = doc.create_element("p");
            let text = doc.create_text("犬");
            doc.append_child(parent, text);
            let wrapper = doc.create_element("span");
            doc.set_class(wrapper, "yomi-word new");
            doc.set_word(
                wrapper,
                WordData::new(
                    Token {
                        start: 0,
                        end: 1,
                        card: card(),
                        rubies: vec![],
                    },
                    "犬".into(),
                    0,
                ),
            );
            doc.wrap(text, wrapper);
            wrapper
        };
        engine.index().borrow_mut().set(
            card_key(1403940, 2),
            IndexEntry {
                class: "yomi-word new".into(),
                elements: vec![wrapper],
            },
        );

        engine.handle_message(InboundMessage::UpdateWordState {
            words: vec![WordStateUpdate(1403940, 2, vec!["known".into()])],
        });

        let doc = engine.document().borrow();
        assert_eq!(doc.class(wrapper), "yomi-word known");
        assert_eq!(
            doc.word(wrapper).unwrap().token.card.state,
            vec!["known".to_string()]
        );
    }

    #[test]
    fn test_mine_request_reads_forq_from_config() {
        let (engine, transport) = engine();
        let _future = engine.request_mine(&card(), Some("犬が走る。".into()), None);
        let posted = transport.posted.borrow();
        let OutboundMessage::Mine { forq, vid, sid, .. } = &posted[0] else {
            panic!("expected mine");
        };
        assert!(*forq, "default config mines onto the forq deck");
        assert_eq!((*vid, *sid), (1403940, 2));
    }

    #[test]
    fn test_review_and_flag_requests() {
        let (engine, transport) = engine();
        let _r = engine.request_review(&card(), Rating::Okay);
        let _f = engine.request_set_flag(&card(), CardFlag::NeverForget, true);
        let posted = transport.posted.borrow();
        assert!(matches!(
            posted[0],
            OutboundMessage::Review {
                rating: Rating::Okay,
                ..
            }
        ));
        assert!(matches!(
            posted[1],
            OutboundMessage::SetFlag {
                flag: CardFlag::NeverForget,
                state: true,
                ..
            }
        ));
    }

    #[test]
    fn test_word_context_uses_configured_width() {
        let (engine, _transport) = engine();
        let wrapper = {
            let mut doc = engine.document().borrow_mut();
            let wrapper = doc.create_element("span");
            doc.set_word(
                wrapper,
                WordData::new(
                    Token {
                        start: 8,
                        end: 9,
                        card: card(),
                        rubies: vec![],
                    },
                    "朝だ。犬が走る。夜だ。".into(),
                    8,
                ),
            );
            wrapper
        };
        // Token offset 8 is in the final sentence.
        assert_eq!(engine.word_context(wrapper).unwrap(), "夜だ。");
        // No payload, no context.
        let plain = engine.document().borrow_mut().create_element("span");
        assert_eq!(engine.word_context(plain), None);
    }
}
