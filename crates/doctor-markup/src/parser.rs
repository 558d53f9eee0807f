//! Lenient markup parser on top of `quick-xml`.
//!
//! Works on raw markdown as well as HTML. The reader only tokenizes: the text
//! of every node is sliced from the input by reader position, so nothing is
//! decoded and untouched markup is written back byte-for-byte. Markup the
//! reader rejects, such as a `<` that does not open a tag, is kept as text
//! and reading resumes after it.

#![allow(clippy::unused_self)] // Unit struct methods have &self for API consistency

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::tree::{Attribute, Closing, Document, Element, NodeId, NodeKind};

/// HTML elements that never have content.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Parse markup into a [`Document`].
pub struct MarkupParser;

impl MarkupParser {
    /// Create a new parser.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Parse markup into a new document. Parsing never fails.
    #[must_use]
    pub fn parse(&self, markup: &str) -> Document {
        let mut doc = Document::new();
        let root = doc.root();
        self.parse_into(&mut doc, root, markup);
        doc
    }

    /// Parse markup and append the resulting nodes under `parent`.
    pub(crate) fn parse_into(&self, doc: &mut Document, parent: NodeId, markup: &str) {
        let mut builder = TreeBuilder {
            parent,
            open: Vec::new(),
        };
        let mut offset = 0;
        while offset < markup.len() {
            offset = self.read_events(doc, &mut builder, markup, offset);
        }
    }

    /// Read events from `offset` until the input ends or the reader rejects
    /// something. Returns the offset to resume from.
    fn read_events(
        &self,
        doc: &mut Document,
        builder: &mut TreeBuilder,
        markup: &str,
        offset: usize,
    ) -> usize {
        let input = &markup[offset..];
        let mut reader = Reader::from_str(input);
        let config = reader.config_mut();
        config.trim_text(false);
        config.check_end_names = false;
        config.allow_unmatched_ends = true;

        loop {
            let start = offset + position(&reader, input.len());
            let event = match reader.read_event() {
                Ok(Event::Eof) => return markup.len(),
                Ok(event) => event,
                Err(e) => {
                    tracing::trace!(offset = start, error = %e, "Keeping unreadable markup as text");
                    return keep_as_text(doc, builder, markup, start);
                }
            };
            let end = offset + position(&reader, input.len());

            if !builder.event(doc, event, &markup[start..end]) {
                return keep_as_text(doc, builder, markup, start);
            }
        }
    }
}

impl Default for MarkupParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Reader position as an offset into its input.
fn position(reader: &Reader<&[u8]>, len: usize) -> usize {
    usize::try_from(reader.buffer_position()).map_or(len, |pos| pos.min(len))
}

/// Store the text from `start` up to the next `<` or `&` as a text node and
/// return where to resume.
fn keep_as_text(doc: &mut Document, builder: &TreeBuilder, markup: &str, start: usize) -> usize {
    if start >= markup.len() {
        return markup.len();
    }
    let first = markup[start..].chars().next().map_or(1, char::len_utf8);
    let resume = markup[start + first..]
        .find(['<', '&'])
        .map_or(markup.len(), |index| start + first + index);
    builder.text(doc, &markup[start..resume]);
    resume
}

/// Appends nodes while tracking the currently open elements.
struct TreeBuilder {
    parent: NodeId,
    open: Vec<(NodeId, String)>,
}

impl TreeBuilder {
    fn current(&self) -> NodeId {
        self.open.last().map_or(self.parent, |(id, _)| *id)
    }

    fn text(&self, doc: &mut Document, text: &str) {
        doc.push_text(self.current(), text);
    }

    /// Add the node for one reader event spanning `raw`.
    ///
    /// Returns `false` when the event is not usable markup; the caller then
    /// keeps `raw` as text.
    fn event(&mut self, doc: &mut Document, event: Event<'_>, raw: &str) -> bool {
        match event {
            Event::Text(_) => self.text(doc, raw),
            Event::GeneralRef(_) => {
                if !is_reference(raw) {
                    return false;
                }
                self.text(doc, raw);
            }
            Event::CData(_)
            | Event::Comment(_)
            | Event::Decl(_)
            | Event::PI(_)
            | Event::DocType(_) => {
                doc.push(NodeKind::Raw(raw.to_owned()), self.current());
            }
            Event::Empty(start) => {
                let Some(element) = element(&start, Closing::SelfClosing, raw) else {
                    return false;
                };
                doc.push(NodeKind::Element(element), self.current());
            }
            Event::Start(start) => {
                let Some(mut element) = element(&start, Closing::Unterminated, raw) else {
                    return false;
                };
                if is_void(&element.name) {
                    element.closing = Closing::Void;
                    doc.push(NodeKind::Element(element), self.current());
                } else {
                    let name = element.name.clone();
                    let id = doc.push(NodeKind::Element(element), self.current());
                    self.open.push((id, name));
                }
            }
            Event::End(end) => {
                let name = end.name();
                let Some(name) = std::str::from_utf8(name.as_ref())
                    .ok()
                    .filter(|name| is_tag_name(name))
                else {
                    return false;
                };
                match self.open.iter().rposition(|(_, open_name)| open_name == name) {
                    Some(index) => {
                        // Elements opened after the match stay `Unterminated`.
                        let (id, _) = self.open[index];
                        doc.set_closing(id, Closing::Explicit(raw.to_owned()));
                        self.open.truncate(index);
                    }
                    None => {
                        doc.push(NodeKind::Raw(raw.to_owned()), self.current());
                    }
                }
            }
            Event::Eof => {}
        }
        true
    }
}

/// Build an element from a start tag, `None` if the tag is not usable.
fn element(start: &BytesStart<'_>, closing: Closing, raw: &str) -> Option<Element> {
    let name = start.name();
    let name = std::str::from_utf8(name.as_ref())
        .ok()
        .filter(|name| is_tag_name(name))?
        .to_owned();

    let mut attributes = start.html_attributes();
    attributes.with_checks(false);
    let mut attrs = Vec::new();
    for attr in attributes {
        let attr = attr.ok()?;
        let key = std::str::from_utf8(attr.key.as_ref()).ok()?;
        let value = std::str::from_utf8(&attr.value).ok()?;
        attrs.push(Attribute::new(key, value));
    }

    Some(Element {
        name,
        attrs,
        closing,
        source: Some(raw.to_owned()),
    })
}

fn is_void(name: &str) -> bool {
    VOID_ELEMENTS
        .iter()
        .any(|void| void.eq_ignore_ascii_case(name))
}

/// Check for a tag name such as `div`, `ac:link` or `my-macro`.
fn is_tag_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
}

/// Check for a complete entity or character reference such as `&amp;`.
fn is_reference(raw: &str) -> bool {
    raw.strip_prefix('&')
        .and_then(|rest| rest.strip_suffix(';'))
        .is_some_and(|name| {
            !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '#')
        })
}
