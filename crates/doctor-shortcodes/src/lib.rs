//! Shortcode macro expansion.
//!
//! Shortcodes are custom tags such as `<callout type="info">…</callout>` that
//! are replaced by the markup their renderer produces. Expansion runs in two
//! phases per document: [`Phase::Pre`] on the raw markdown and
//! [`Phase::Post`] on the converted HTML.
//!
//! # Architecture
//!
//! - [`ShortcodeRegistry`]: ordered name → [`RendererDescriptor`] mapping,
//!   seeded with the built-in `icon`, `callout` and `toc` shortcodes.
//! - [`PluginLoader`]: scans a directory for `*.toml` plugin manifests and
//!   merges them into the registry (later entries override earlier ones).
//! - [`ShortcodeResolver`]: owns the sealed registry and expands a markup
//!   string for one phase.
//! - [`apply_toc_position`]: layout step run after `toc` shortcodes that ask
//!   for a left or right position.
//!
//! Renderers run one at a time, in registry order and then document order.
//! A `toc` position hint is therefore always the last one in the document.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use doctor_shortcodes::{
//!     NoopTelemetry, Phase, RendererDescriptor, ShortcodeRegistry, ShortcodeResolver, renderer_fn,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut registry = ShortcodeRegistry::new();
//! registry.insert(RendererDescriptor::new(
//!     "kbd",
//!     renderer_fn(|_attrs, content| {
//!         Ok(format!(r#"<kbd class="key">{}</kbd>"#, content.unwrap_or_default()))
//!     }),
//!     false,
//! ));
//!
//! let resolver = ShortcodeResolver::new(registry, Arc::new(NoopTelemetry));
//! let html = resolver.resolve("<p>Press <kbd>Ctrl</kbd></p>", Phase::Post).await.unwrap();
//! assert_eq!(html, r#"<p>Press <kbd class="key">Ctrl</kbd></p>"#);
//! # }
//! ```

mod attributes;
pub mod builtin;
mod error;
mod layout;
mod loader;
mod registry;
mod renderer;
mod resolver;
mod telemetry;

#[cfg(test)]
mod testing;

pub use attributes::{AttributeBag, extract_attributes};
pub use error::{PluginError, RenderError, ShortcodeError};
pub use layout::{
    CONTAINER_CLASS, MARKDOWN_CLASS, TOC_CLASS, TocPosition, apply_toc_position,
};
pub use loader::{LoadReport, PluginLoader, RejectedPlugin};
pub use registry::{RendererDescriptor, ShortcodeRegistry, ShortcodeSource};
pub use renderer::{CommandRenderer, FnRenderer, Renderer, TemplateRenderer, renderer_fn};
pub use resolver::{Phase, ShortcodeResolver};
pub use telemetry::{NoopTelemetry, Telemetry, TelemetryEvent, TracingTelemetry};
