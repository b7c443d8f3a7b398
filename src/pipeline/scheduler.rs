//! Visibility-gated scheduling.
//!
//! Bounds concurrent backend load to roughly "what is currently visible":
//! elements entering the viewport get extracted and parsed, elements
//! leaving it get their in-flight batches canceled. The intersection
//! observer itself lives host-side; the engine only receives enter/exit
//! notifications and tells the host when an element no longer needs
//! watching.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use futures_util::future::{join_all, LocalBoxFuture};
use futures_util::FutureExt;

use crate::channel::BackgroundPort;
use crate::dom::{Document, NodeId};
use crate::overlay::{paragraphs_in_node, NodeFilter, ReverseIndex};

use super::batch::{parse_paragraphs, request_parse, ErrorSink, ParseBatch};

/// Host half of the intersection observer.
pub trait ObserverHost {
    fn unobserve(&self, element: NodeId);
}

/// Spawns engine futures on the page's single-threaded executor
/// (`wasm_bindgen_futures::spawn_local` in the browser).
pub type Spawner = Rc<dyn Fn(LocalBoxFuture<'static, ()>)>;

pub struct VisibilityScheduler {
    doc: Rc<RefCell<Document>>,
    index: Rc<RefCell<ReverseIndex>>,
    port: BackgroundPort,
    sink: ErrorSink,
    filter: Rc<NodeFilter>,
    observer: Rc<dyn ObserverHost>,
    spawner: Spawner,
    /// Batches still in flight per watched element. Presence here is what
    /// makes re-entry a no-op until everything settles.
    pending: Rc<RefCell<HashMap<NodeId, Vec<ParseBatch>>>>,
}

impl VisibilityScheduler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        doc: Rc<RefCell<Document>>,
        index: Rc<RefCell<ReverseIndex>>,
        port: BackgroundPort,
        sink: ErrorSink,
        filter: Rc<NodeFilter>,
        observer: Rc<dyn ObserverHost>,
        spawner: Spawner,
    ) -> Self {
        Self {
            doc,
            index,
            port,
            sink,
            filter,
            observer,
            spawner,
            pending: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    pub fn is_pending(&self, element: NodeId) -> bool {
        self.pending.borrow().contains_key(&element)
    }

    /// Elements that scrolled into (or near) the viewport.
    pub fn on_enter(&self, elements: &[NodeId]) {
        let mut all: Vec<ParseBatch> = Vec::new();

        for &element in elements {
            if self.pending.borrow().contains_key(&element) {
                continue;
            }
            let paragraphs = paragraphs_in_node(&self.doc.borrow(), element, &*self.filter);
            if paragraphs.is_empty() {
                // Nothing parseable here, ever; stop watching.
                self.observer.unobserve(element);
                continue;
            }

            let (batches, applied) = parse_paragraphs(
                &self.port,
                &self.doc,
                &self.index,
                &self.sink,
                paragraphs,
            );
            self.pending.borrow_mut().insert(element, batches.clone());

            let pending = Rc::clone(&self.pending);
            let observer = Rc::clone(&self.observer);
            (self.spawner)(
                async move {
                    let results = join_all(applied).await;
                    if results.iter().all(|result| result.is_ok()) {
                        observer.unobserve(element);
                    }
                    pending.borrow_mut().remove(&element);
                }
                .boxed_local(),
            );

            all.extend(batches);
        }

        if !all.is_empty() {
            let _ = request_parse(&self.port, &self.doc.borrow(), &all);
        }
    }

    /// Elements that scrolled away: cancel whatever is still in flight for
    /// them.
    pub fn on_exit(&self, elements: &[NodeId]) {
        for &element in elements {
            let handles: Vec<_> = self
                .pending
                .borrow()
                .get(&element)
                .map(|batches| batches.iter().map(|batch| batch.cancel.clone()).collect())
                .unwrap_or_default();
            for handle in handles {
                handle.cancel();
            }
        }
    }
}

// ==================== TESTS ====================
