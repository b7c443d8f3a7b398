//! Owned document model standing in for the live page DOM.
//!
//! The engine cannot hold references into a real browser DOM, so the host
//! hydrates this arena once per watched subtree and materializes the
//! rewritten markup back out after overlay. Nodes live in a flat arena and
//! are addressed by stable [`NodeId`] handles; splitting a text node keeps
//! the original node's identity for the left half and allocates a new node
//! for the remainder, which is what lets fragment lists stay valid across
//! splits.
//!
//! All text offsets taken by this module are counted in Unicode scalar
//! values, never bytes.

use serde::{Deserialize, Serialize};

use crate::types::WordData;

// ==================== HANDLES ====================

/// Stable handle to a node in a [`Document`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Raw index, for handing across the JS boundary.
    pub fn index(self) -> u32 {
        self.0
    }

    /// Rebuild a handle from a raw index previously given out by
    /// [`NodeId::index`]. The caller is responsible for pairing it with the
    /// document that produced it.
    pub fn from_index(raw: u32) -> Self {
        NodeId(raw)
    }
}

// ==================== NODES ====================

#[derive(Debug, Clone)]
pub struct ElementData {
    pub tag: String,
    /// Explicit computed-display override. When absent the tag-default
    /// table below stands in for the UA stylesheet.
    pub display: Option<String>,
    pub class: String,
    pub children: Vec<NodeId>,
    /// Annotation payload for interactive word wrappers.
    pub word: Option<WordData>,
}

#[derive(Debug, Clone)]
pub struct TextData {
    pub data: String,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Element(ElementData),
    Text(TextData),
    Comment(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    kind: NodeKind,
}

// ==================== SNAPSHOT ====================

/// Serializable tree the host sends to hydrate a document subtree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NodeSnapshot {
    Element {
        tag: String,
        #[serde(default)]
        display: Option<String>,
        #[serde(default)]
        children: Vec<NodeSnapshot>,
    },
    Text {
        data: String,
    },
    Comment {
        #[serde(default)]
        data: String,
    },
}

// ==================== DOCUMENT ====================

/// Arena of DOM nodes with the mutation primitives the overlay engine
/// needs: text splitting, sibling insertion, and wrapper splicing.
#[derive(Debug, Default)]
pub struct Document {
    nodes: Vec<Node>,
}

const NO_CHILDREN: &[NodeId] = &[];

impl Document {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node { parent: None, kind });
        id
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }

    // ==================== CREATION ====================

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeKind::Element(ElementData {
            tag: tag.to_string(),
            display: None,
            class: String::new(),
            children: Vec::new(),
            word: None,
        }))
    }

    /// Create an element with an explicit computed-display value, as the
    /// host reports it for styled page elements.
    pub fn create_styled_element(&mut self, tag: &str, display: &str) -> NodeId {
        let id = self.create_element(tag);
        if let NodeKind::Element(el) = &mut self.node_mut(id).kind {
            el.display = Some(display.to_string());
        }
        id
    }

    pub fn create_text(&mut self, data: &str) -> NodeId {
        self.alloc(NodeKind::Text(TextData {
            data: data.to_string(),
        }))
    }

    pub fn create_comment(&mut self, data: &str) -> NodeId {
        self.alloc(NodeKind::Comment(data.to_string()))
    }

    /// Hydrate a subtree from a host snapshot, returning its root.
    pub fn load_snapshot(&mut self, snapshot: &NodeSnapshot) -> NodeId {
        match snapshot {
            NodeSnapshot::Element {
                tag,
                display,
                children,
            } => {
                let id = match display {
                    Some(display) => self.create_styled_element(tag, display),
                    None => self.create_element(tag),
                };
                for child in children {
                    let child_id = self.load_snapshot(child);
                    self.append_child(id, child_id);
                }
                id
            }
            NodeSnapshot::Text { data } => self.create_text(data),
            NodeSnapshot::Comment { data } => self.create_comment(data),
        }
    }

    // ==================== ACCESSORS ====================

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.node(id).kind, NodeKind::Text(_))
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.node(id).kind, NodeKind::Element(_))
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Element(el) => Some(&el.tag),
            _ => None,
        }
    }

    /// Character data of a text node. Panics on non-text nodes; fragment
    /// bookkeeping guarantees the ids it holds stay text nodes.
    pub fn text_data(&self, id: NodeId) -> &str {
        match &self.node(id).kind {
            NodeKind::Text(text) => &text.data,
            _ => panic!("node {:?} is not a text node", id),
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match &self.node(id).kind {
            NodeKind::Element(el) => &el.children,
            _ => NO_CHILDREN,
        }
    }

    pub fn class(&self, id: NodeId) -> &str {
        match &self.node(id).kind {
            NodeKind::Element(el) => &el.class,
            _ => "",
        }
    }

    pub fn set_class(&mut self, id: NodeId, class: &str) {
        if let NodeKind::Element(el) = &mut self.node_mut(id).kind {
            el.class = class.to_string();
        }
    }

    pub fn word(&self, id: NodeId) -> Option<&WordData> {
        match &self.node(id).kind {
            NodeKind::Element(el) => el.word.as_ref(),
            _ => None,
        }
    }

    pub fn word_mut(&mut self, id: NodeId) -> Option<&mut WordData> {
        match &mut self.node_mut(id).kind {
            NodeKind::Element(el) => el.word.as_mut(),
            _ => None,
        }
    }

    pub fn set_word(&mut self, id: NodeId, word: WordData) {
        if let NodeKind::Element(el) = &mut self.node_mut(id).kind {
            el.word = Some(word);
        }
    }

    /// Effective display string of an element: the explicit host-reported
    /// value when present, else the tag default.
    pub fn effective_display(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Element(el) => Some(
                el.display
                    .as_deref()
                    .unwrap_or_else(|| default_display(&el.tag)),
            ),
            _ => None,
        }
    }

    // ==================== MUTATION ====================

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.node(id).parent {
            if let NodeKind::Element(el) = &mut self.node_mut(parent).kind {
                el.children.retain(|&child| child != id);
            }
            self.node_mut(id).parent = None;
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        if let NodeKind::Element(el) = &mut self.node_mut(parent).kind {
            el.children.push(child);
        } else {
            panic!("append_child target {:?} is not an element", parent);
        }
        self.node_mut(child).parent = Some(parent);
    }

    /// Insert `new` as a sibling immediately before `reference`.
    pub fn insert_before(&mut self, new: NodeId, reference: NodeId) {
        let parent = self
            .node(reference)
            .parent
            .expect("insert_before reference has no parent");
        self.detach(new);
        if let NodeKind::Element(el) = &mut self.node_mut(parent).kind {
            let position = el
                .children
                .iter()
                .position(|&child| child == reference)
                .expect("reference is not a child of its parent");
            el.children.insert(position, new);
        }
        self.node_mut(new).parent = Some(parent);
    }

    /// Insert `new` as a sibling immediately after `reference`.
    pub fn insert_after(&mut self, new: NodeId, reference: NodeId) {
        let parent = self
            .node(reference)
            .parent
            .expect("insert_after reference has no parent");
        self.detach(new);
        if let NodeKind::Element(el) = &mut self.node_mut(parent).kind {
            let position = el
                .children
                .iter()
                .position(|&child| child == reference)
                .expect("reference is not a child of its parent");
            el.children.insert(position + 1, new);
        }
        self.node_mut(new).parent = Some(parent);
    }

    /// Replace `node` in the tree with `wrapper` and move `node` inside it.
    pub fn wrap(&mut self, node: NodeId, wrapper: NodeId) {
        self.insert_before(wrapper, node);
        self.append_child(wrapper, node);
    }

    /// Split a text node at a character offset. The original node keeps the
    /// text before the offset (and its identity); the remainder moves into a
    /// freshly allocated node inserted as the next sibling. Returns the new
    /// node.
    pub fn split_text(&mut self, id: NodeId, char_offset: usize) -> NodeId {
        let remainder = match &mut self.node_mut(id).kind {
            NodeKind::Text(text) => {
                let byte = byte_offset(&text.data, char_offset);
                text.data.split_off(byte)
            }
            _ => panic!("split_text on non-text node {:?}", id),
        };
        let new_id = self.create_text(&remainder);
        if self.node(id).parent.is_some() {
            self.insert_after(new_id, id);
        }
        new_id
    }

    // ==================== READERS ====================

    /// Concatenated text of a subtree in document order. Comments contribute
    /// nothing.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out, false);
        out
    }

    /// Subtree text as it read before annotation: spliced-in furigana
    /// (`rt` elements) is skipped, so overlaying must leave this unchanged.
    pub fn base_text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out, true);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String, skip_ruby_text: bool) {
        match &self.node(id).kind {
            NodeKind::Text(text) => out.push_str(&text.data),
            NodeKind::Comment(_) => {}
            NodeKind::Element(el) => {
                if skip_ruby_text && el.tag == "rt" {
                    return;
                }
                for &child in &el.children {
                    self.collect_text(child, out, skip_ruby_text);
                }
            }
        }
    }

    /// Materialize a subtree as markup for the host to splice back into the
    /// page.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        match &self.node(id).kind {
            NodeKind::Text(text) => escape_into(out, &text.data),
            NodeKind::Comment(data) => {
                out.push_str("<!--");
                out.push_str(data);
                out.push_str("-->");
            }
            NodeKind::Element(el) => {
                out.push('<');
                out.push_str(&el.tag);
                if !el.class.is_empty() {
                    out.push_str(" class=\"");
                    escape_into(out, &el.class);
                    out.push('"');
                }
                if let Some(display) = &el.display {
                    out.push_str(" style=\"display:");
                    escape_into(out, display);
                    out.push('"');
                }
                out.push('>');
                for &child in &el.children {
                    self.write_html(child, out);
                }
                out.push_str("</");
                out.push_str(&el.tag);
                out.push('>');
            }
        }
    }
}

// ==================== DISPLAY DEFAULTS ====================

/// UA-stylesheet stand-in: the display value an unstyled element of this
/// tag would compute to. Unknown tags behave like custom elements (inline).
pub fn default_display(tag: &str) -> &'static str {
    match tag {
        "ruby" => "ruby",
        "rt" => "ruby-text",
        "rb" => "inline",
        "rp" => "none",
        "address" | "article" | "aside" | "blockquote" | "body" | "dd" | "details" | "dialog"
        | "div" | "dl" | "dt" | "fieldset" | "figcaption" | "figure" | "footer" | "form"
        | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "header" | "hgroup" | "hr" | "html"
        | "main" | "menu" | "nav" | "ol" | "p" | "pre" | "section" | "ul" => "block",
        "li" => "list-item",
        "table" => "table",
        "caption" => "table-caption",
        "thead" | "tbody" | "tfoot" => "table-row-group",
        "tr" => "table-row",
        "td" | "th" => "table-cell",
        "button" | "input" | "select" | "textarea" | "img" => "inline-block",
        "head" | "link" | "meta" | "noscript" | "script" | "style" | "template" | "title" => {
            "none"
        }
        _ => "inline",
    }
}

// ==================== TEXT HELPERS ====================

/// Length of a string in Unicode scalar values.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte index of the given character offset (saturating at the end).
pub fn byte_offset(s: &str, chars: usize) -> usize {
    s.char_indices().nth(chars).map(|(i, _)| i).unwrap_or(s.len())
}

fn escape_into(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

// ==================== TESTS ====================
