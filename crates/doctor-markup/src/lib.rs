//! Structure-preserving markup tree.
//!
//! Tokenizes markdown or HTML with `quick-xml` and builds a mutable tree of
//! elements, text and raw segments without touching anything it does not
//! understand:
//!
//! - entities are never decoded or re-encoded
//! - tag and attribute names keep their case
//! - attribute values are stored exactly as written
//! - a `<` or `&` that does not start well-formed markup stays text
//!
//! Untouched elements serialize back byte-for-byte, so a document without
//! any mutation round-trips to its input.
//!
//! # Example
//!
//! ```
//! use doctor_markup::Document;
//!
//! let mut doc = Document::parse(r#"<p>Hi <icon name="Globe" /></p>"#);
//! let icons = doc.elements_by_tag("icon");
//! assert_eq!(icons.len(), 1);
//!
//! doc.replace_with_markup(icons[0], "<i>globe</i>");
//! assert_eq!(doc.to_markup(), "<p>Hi <i>globe</i></p>");
//! ```

mod parser;
mod serializer;
mod tree;

pub use parser::MarkupParser;
pub use serializer::MarkupSerializer;
pub use tree::{Attribute, Closing, Document, Element, NodeId, NodeKind};
