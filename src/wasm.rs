//! JS boundary glue.
//!
//! The host owns the actual runtime port, the IntersectionObserver, and the
//! page DOM; this facade gives it an engine it can feed: snapshots in,
//! rewritten markup out, channel messages in both directions.

use std::rc::Rc;

use wasm_bindgen::prelude::*;

use crate::channel::{InboundMessage, OutboundMessage, Transport};
use crate::dom::{NodeId, NodeSnapshot};
use crate::engine::Engine;
use crate::pipeline::{ErrorSink, ObserverHost, Spawner, VisibilityScheduler};

/// Posts outbound messages through a host callback.
pub struct JsTransport {
    post: js_sys::Function,
}

impl JsTransport {
    pub fn new(post: js_sys::Function) -> Self {
        Self { post }
    }
}

impl Transport for JsTransport {
    fn post(&self, message: &OutboundMessage) {
        match serde_wasm_bindgen::to_value(message) {
            Ok(value) => {
                if let Err(error) = self.post.call1(&JsValue::NULL, &value) {
                    web_sys::console::error_1(&error);
                }
            }
            Err(error) => web_sys::console::error_1(
                &format!("[yomicore] outbound message serialization failed: {}", error).into(),
            ),
        }
    }
}

struct JsObserver {
    unobserve: js_sys::Function,
}

impl ObserverHost for JsObserver {
    fn unobserve(&self, element: NodeId) {
        if let Err(error) = self
            .unobserve
            .call1(&JsValue::NULL, &JsValue::from(element.index()))
        {
            web_sys::console::error_1(&error);
        }
    }
}

fn local_spawner() -> Spawner {
    Rc::new(|future| wasm_bindgen_futures::spawn_local(future))
}

/// JS-facing engine facade.
///
/// # Usage (JavaScript)
/// ```javascript,ignore
/// import init, { EngineHandle } from 'yomicore';
///
/// await init();
/// const engine = new EngineHandle(
///     message => port.postMessage(message),
///     handle => intersection.unobserve(elementFor(handle)),
/// );
/// port.onMessage.addListener(message => engine.handleMessage(message));
///
/// const root = engine.loadSnapshot(snapshotOf(element));
/// engine.elementsEntered([root]);
/// // ... tokens arrive through handleMessage ...
/// element.innerHTML = engine.outerHtml(root);
/// ```
#[wasm_bindgen]
pub struct EngineHandle {
    engine: Engine,
    scheduler: VisibilityScheduler,
}

#[wasm_bindgen]
impl EngineHandle {
    /// `post` receives every outbound channel message; `unobserve` is
    /// called with an element handle once that element no longer needs
    /// watching.
    #[wasm_bindgen(constructor)]
    pub fn new(post: js_sys::Function, unobserve: js_sys::Function) -> EngineHandle {
        let engine = Engine::new(Rc::new(JsTransport::new(post)), ErrorSink::default());
        // Site-adapter filters stay host-side; the facade parses everything
        // it is handed.
        let filter: Rc<crate::overlay::NodeFilter> = Rc::new(|_, _| true);
        let scheduler = engine.visibility_scheduler(
            filter,
            Rc::new(JsObserver { unobserve }),
            local_spawner(),
        );
        EngineHandle { engine, scheduler }
    }

    /// Hydrate a watched subtree; returns its root handle.
    #[wasm_bindgen(js_name = loadSnapshot)]
    pub fn load_snapshot(&self, snapshot: JsValue) -> Result<u32, JsValue> {
        let snapshot: NodeSnapshot = serde_wasm_bindgen::from_value(snapshot)
            .map_err(|error| JsValue::from_str(&format!("invalid snapshot: {}", error)))?;
        let root = self.engine.document().borrow_mut().load_snapshot(&snapshot);
        Ok(root.index())
    }

    /// Elements that scrolled into (or near) the viewport.
    #[wasm_bindgen(js_name = elementsEntered)]
    pub fn elements_entered(&self, elements: Vec<u32>) {
        let elements: Vec<NodeId> = elements.into_iter().map(NodeId::from_index).collect();
        self.scheduler.on_enter(&elements);
    }

    /// Elements that scrolled away.
    #[wasm_bindgen(js_name = elementsExited)]
    pub fn elements_exited(&self, elements: Vec<u32>) {
        let elements: Vec<NodeId> = elements.into_iter().map(NodeId::from_index).collect();
        self.scheduler.on_exit(&elements);
    }

    /// Feed one inbound channel message to the engine.
    #[wasm_bindgen(js_name = handleMessage)]
    pub fn handle_message(&self, message: JsValue) -> Result<(), JsValue> {
        let message: InboundMessage = serde_wasm_bindgen::from_value(message)
            .map_err(|error| JsValue::from_str(&format!("invalid message: {}", error)))?;
        self.engine.handle_message(message);
        Ok(())
    }

    /// The runtime port to the backend dropped.
    #[wasm_bindgen(js_name = channelDisconnected)]
    pub fn channel_disconnected(&self) {
        self.engine.disconnected();
    }

    /// Materialize a subtree's rewritten markup for splicing back into the
    /// page.
    #[wasm_bindgen(js_name = outerHtml)]
    pub fn outer_html(&self, element: u32) -> String {
        self.engine
            .document()
            .borrow()
            .outer_html(NodeId::from_index(element))
    }

    /// Sentence-window context for a word wrapper, for the mining dialog.
    #[wasm_bindgen(js_name = wordContext)]
    pub fn word_context(&self, element: u32) -> Option<String> {
        self.engine.word_context(NodeId::from_index(element))
    }
}
