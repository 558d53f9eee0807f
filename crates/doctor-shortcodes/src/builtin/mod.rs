//! Built-in shortcodes.
//!
//! All three expand after markdown conversion. A plugin with the same name
//! replaces the built-in entry.

mod callout;
mod icon;
mod toc;

pub use callout::CalloutRenderer;
pub use icon::IconRenderer;
pub use toc::TableOfContentsRenderer;

use crate::{RendererDescriptor, ShortcodeSource};

/// Tag name of the icon shortcode.
pub const ICON: &str = "icon";
/// Tag name of the callout shortcode.
pub const CALLOUT: &str = "callout";
/// Tag name of the table-of-contents shortcode.
///
/// The resolver runs the layout step after this tag when a `position`
/// attribute asks for it.
pub const TOC: &str = "toc";

/// Built-in descriptors in registry order.
pub(crate) fn descriptors() -> Vec<RendererDescriptor> {
    vec![
        RendererDescriptor::new(ICON, IconRenderer, false),
        RendererDescriptor::new(CALLOUT, CalloutRenderer, false),
        RendererDescriptor::new(TOC, TableOfContentsRenderer, false),
    ]
    .into_iter()
    .map(|descriptor| descriptor.with_source(ShortcodeSource::Builtin))
    .collect()
}
