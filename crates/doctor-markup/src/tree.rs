//! Arena-backed markup tree.

use crate::parser::MarkupParser;
use crate::serializer::MarkupSerializer;

/// Handle to a node in a [`Document`].
///
/// Handles stay valid for the lifetime of the document. A node removed by
/// [`Document::replace_with_markup`] keeps its handle but is no longer
/// attached to the root, so queries stop returning it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Element attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name, case preserved.
    pub name: String,
    /// Raw value as written, empty for a bare attribute (`<x hidden>`).
    pub value: String,
}

impl Attribute {
    /// Create an attribute.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Attribute value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// How an element ends in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Closing {
    /// `<name ... />`
    SelfClosing,
    /// HTML void element written without a slash (`<br>`).
    Void,
    /// Closed by an end tag; holds the end tag as written.
    Explicit(String),
    /// Never closed before its parent or the document ended.
    Unterminated,
}

/// Element node payload.
#[derive(Debug, Clone)]
pub struct Element {
    /// Tag name, case preserved.
    pub name: String,
    /// Attributes in source order.
    pub attrs: Vec<Attribute>,
    /// How the element ends.
    pub closing: Closing,
    /// Start tag exactly as written. Cleared once attributes change.
    pub(crate) source: Option<String>,
}

impl Element {
    /// Get an attribute value by name (case-sensitive).
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|attr| attr.name == name)
            .map(Attribute::value)
    }

    /// Check whether the `class` attribute lists `class`.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    /// Start tag as written in the source, if unchanged since parsing.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

/// Node payload.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Document root or a detached fragment holder.
    Document,
    /// Element with attributes and children.
    Element(Element),
    /// Text, stored raw (entities untouched).
    Text(String),
    /// Verbatim markup the tree does not model: comments, CDATA, doctype,
    /// processing instructions and stray end tags.
    Raw(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Parsed markup document.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Parse markup into a document.
    #[must_use]
    pub fn parse(markup: &str) -> Self {
        MarkupParser::new().parse(markup)
    }

    /// Serialize the document back to markup.
    #[must_use]
    pub fn to_markup(&self) -> String {
        MarkupSerializer::new().serialize(self)
    }

    /// Root node handle.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Node payload.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    /// Element payload, `None` for non-element nodes.
    #[must_use]
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Child handles in document order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Parent handle, `None` for the root and detached nodes.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Append a new node under `parent`.
    pub(crate) fn push(&mut self, kind: NodeKind, parent: NodeId) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Append text under `parent`, extending a trailing text node.
    pub(crate) fn push_text(&mut self, parent: NodeId, text: &str) {
        let last = self.nodes[parent.0].children.last().copied();
        if let Some(last) = last
            && let NodeKind::Text(existing) = &mut self.nodes[last.0].kind
        {
            existing.push_str(text);
            return;
        }
        self.push(NodeKind::Text(text.to_owned()), parent);
    }

    /// Create a node that is not attached anywhere.
    fn push_detached(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    pub(crate) fn set_closing(&mut self, id: NodeId, closing: Closing) {
        if let Some(element) = self.element_mut(id) {
            element.closing = closing;
        }
    }

    /// All attached elements named `tag`, in document order.
    ///
    /// Matching is case-sensitive. The returned list is a snapshot: mutating
    /// the document afterwards does not change it.
    #[must_use]
    pub fn elements_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.descendants_matching(self.root(), |element| element.name == tag)
    }

    /// All attached elements carrying `class`, in document order.
    #[must_use]
    pub fn elements_by_class(&self, class: &str) -> Vec<NodeId> {
        self.descendants_by_class(self.root(), class)
    }

    /// Descendants of `id` carrying `class`, in document order.
    #[must_use]
    pub fn descendants_by_class(&self, id: NodeId, class: &str) -> Vec<NodeId> {
        self.descendants_matching(id, |element| element.has_class(class))
    }

    fn descendants_matching(&self, id: NodeId, matches: impl Fn(&Element) -> bool) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            if let Some(element) = self.element(current)
                && matches(element)
            {
                found.push(current);
            }
            stack.extend(self.children(current).iter().rev());
        }
        found
    }

    /// Serialized children of `id`, `None` when it has no children.
    #[must_use]
    pub fn inner_markup(&self, id: NodeId) -> Option<String> {
        if self.children(id).is_empty() {
            return None;
        }
        let serializer = MarkupSerializer::new();
        let mut out = String::new();
        for &child in self.children(id) {
            serializer.write_node(self, child, &mut out);
        }
        Some(out)
    }

    /// Replace `id` with the nodes parsed from `markup`.
    ///
    /// The markup is inserted as-is. Returns the handles of the inserted
    /// top-level nodes. The root cannot be replaced; replacing a node that
    /// has no parent is a no-op.
    pub fn replace_with_markup(&mut self, id: NodeId, markup: &str) -> Vec<NodeId> {
        let Some(parent) = self.parent(id) else {
            tracing::debug!(node = id.0, "Skipping replacement of parentless node");
            return Vec::new();
        };

        let holder = self.push_detached(NodeKind::Document);
        MarkupParser::new().parse_into(self, holder, markup);
        let inserted = std::mem::take(&mut self.nodes[holder.0].children);
        for &node in &inserted {
            self.nodes[node.0].parent = Some(parent);
        }

        let siblings = &mut self.nodes[parent.0].children;
        if let Some(index) = siblings.iter().position(|&child| child == id) {
            siblings.splice(index..=index, inserted.iter().copied());
        }
        self.nodes[id.0].parent = None;

        inserted
    }

    /// Copy `id` and its subtree into new nodes that are not attached anywhere.
    pub fn deep_clone(&mut self, id: NodeId) -> NodeId {
        let copy = self.push_detached(self.nodes[id.0].kind.clone());
        for child in self.nodes[id.0].children.clone() {
            let child_copy = self.deep_clone(child);
            self.nodes[child_copy.0].parent = Some(copy);
            self.nodes[copy.0].children.push(child_copy);
        }
        copy
    }

    /// Move `child` to be the first child of `parent`.
    ///
    /// Ignored when the move would place a node inside itself.
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) {
        if child == self.root() || self.is_ancestor_or_self(child, parent) {
            return;
        }
        self.detach(child);
        self.nodes[parent.0].children.insert(0, child);
        self.nodes[child.0].parent = Some(parent);
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&child| child != id);
        }
    }

    /// Add `class` to the element's `class` attribute.
    ///
    /// Returns `false` when the class is already present or `id` is not an
    /// element.
    pub fn add_class(&mut self, id: NodeId, class: &str) -> bool {
        let Some(element) = self.element_mut(id) else {
            return false;
        };
        if element.has_class(class) {
            return false;
        }

        match element.attrs.iter_mut().find(|attr| attr.name == "class") {
            Some(attr) => {
                if !attr.value.trim().is_empty() {
                    attr.value.push(' ');
                }
                attr.value.push_str(class);
            }
            None => element.attrs.push(Attribute::new("class", class)),
        }
        element.source = None;
        true
    }
}
