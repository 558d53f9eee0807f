//! Markup serializer.
//!
//! Elements whose start tag is unchanged since parsing are written back
//! verbatim; modified or synthesized elements are written from their
//! attributes.

#![allow(clippy::unused_self)] // Unit struct methods have &self for API consistency

use std::fmt::Write;

use crate::tree::{Attribute, Closing, Document, Element, NodeId, NodeKind};

/// Serialize a [`Document`] back to markup.
pub struct MarkupSerializer;

impl MarkupSerializer {
    /// Create a new serializer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Serialize the whole document.
    #[must_use]
    pub fn serialize(&self, doc: &Document) -> String {
        let mut out = String::with_capacity(4096);
        self.write_node(doc, doc.root(), &mut out);
        out
    }

    /// Serialize a single node and its subtree.
    pub(crate) fn write_node(&self, doc: &Document, id: NodeId, out: &mut String) {
        match doc.kind(id) {
            NodeKind::Document => self.write_children(doc, id, out),
            NodeKind::Text(text) | NodeKind::Raw(text) => out.push_str(text),
            NodeKind::Element(element) => {
                let has_children = !doc.children(id).is_empty();
                write_start_tag(element, has_children, out);
                self.write_children(doc, id, out);
                match &element.closing {
                    Closing::Explicit(end) => out.push_str(end),
                    Closing::SelfClosing | Closing::Void if has_children => {
                        let _ = write!(out, "</{}>", element.name);
                    }
                    Closing::SelfClosing | Closing::Void | Closing::Unterminated => {}
                }
            }
        }
    }

    fn write_children(&self, doc: &Document, id: NodeId, out: &mut String) {
        for &child in doc.children(id) {
            self.write_node(doc, child, out);
        }
    }
}

impl Default for MarkupSerializer {
    fn default() -> Self {
        Self::new()
    }
}

fn write_start_tag(element: &Element, has_children: bool, out: &mut String) {
    let self_closing = element.closing == Closing::SelfClosing && !has_children;
    if let Some(source) = element.source()
        && (self_closing || element.closing != Closing::SelfClosing)
    {
        out.push_str(source);
        return;
    }

    out.push('<');
    out.push_str(&element.name);
    for attr in &element.attrs {
        write_attribute(attr, out);
    }
    out.push_str(if self_closing { " />" } else { ">" });
}

fn write_attribute(attr: &Attribute, out: &mut String) {
    let quote = if attr.value.contains('"') && !attr.value.contains('\'') {
        '\''
    } else {
        '"'
    };
    let _ = write!(out, " {}={quote}{}{quote}", attr.name, attr.value);
}
