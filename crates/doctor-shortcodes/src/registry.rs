//! Ordered shortcode registry.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::builtin;
use crate::{Phase, Renderer};

/// Where a registry entry came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShortcodeSource {
    /// Shipped with the engine.
    Builtin,
    /// Loaded from a plugin manifest.
    Plugin(PathBuf),
    /// Registered programmatically.
    Custom,
}

impl fmt::Display for ShortcodeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin => f.write_str("built-in"),
            Self::Plugin(path) => write!(f, "{}", path.display()),
            Self::Custom => f.write_str("custom"),
        }
    }
}

/// Registry entry for one shortcode.
#[derive(Clone)]
pub struct RendererDescriptor {
    /// Tag name, unique within a registry.
    pub name: String,
    /// Renderer, `None` when the entry was declared without a usable one.
    pub renderer: Option<Arc<dyn Renderer>>,
    /// Expand before markdown conversion instead of after.
    pub before_markdown: bool,
    /// Origin of the entry.
    pub source: ShortcodeSource,
}

impl RendererDescriptor {
    /// Create a descriptor for a programmatic renderer.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        renderer: impl Renderer + 'static,
        before_markdown: bool,
    ) -> Self {
        Self::from_arc(name, Arc::new(renderer), before_markdown)
    }

    /// Create a descriptor from a shared renderer.
    #[must_use]
    pub fn from_arc(
        name: impl Into<String>,
        renderer: Arc<dyn Renderer>,
        before_markdown: bool,
    ) -> Self {
        Self {
            name: name.into(),
            renderer: Some(renderer),
            before_markdown,
            source: ShortcodeSource::Custom,
        }
    }

    /// Create a descriptor without a renderer.
    ///
    /// Such an entry makes every resolve pass fail until it is overwritten.
    #[must_use]
    pub fn unbound(name: impl Into<String>, before_markdown: bool) -> Self {
        Self {
            name: name.into(),
            renderer: None,
            before_markdown,
            source: ShortcodeSource::Custom,
        }
    }

    /// Set the entry's origin.
    #[must_use]
    pub fn with_source(mut self, source: ShortcodeSource) -> Self {
        self.source = source;
        self
    }

    /// Check whether the entry has a renderer.
    #[must_use]
    pub fn is_callable(&self) -> bool {
        self.renderer.is_some()
    }

    /// Phase in which this shortcode is expanded.
    #[must_use]
    pub fn phase(&self) -> Phase {
        Phase::from_before_markdown(self.before_markdown)
    }
}

impl fmt::Debug for RendererDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererDescriptor")
            .field("name", &self.name)
            .field("callable", &self.is_callable())
            .field("before_markdown", &self.before_markdown)
            .field("source", &self.source)
            .finish()
    }
}

/// Insertion-ordered mapping of tag name to [`RendererDescriptor`].
///
/// Order decides the processing order of a resolve pass. Overwriting an
/// entry keeps its original position.
#[derive(Debug, Clone, Default)]
pub struct ShortcodeRegistry {
    entries: Vec<RendererDescriptor>,
}

impl ShortcodeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry seeded with the built-in shortcodes.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for descriptor in builtin::descriptors() {
            registry.insert(descriptor);
        }
        registry
    }

    /// Insert or overwrite an entry by name.
    ///
    /// Returns the replaced entry, if any.
    pub fn insert(&mut self, descriptor: RendererDescriptor) -> Option<RendererDescriptor> {
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.name == descriptor.name)
        {
            Some(entry) => Some(std::mem::replace(entry, descriptor)),
            None => {
                self.entries.push(descriptor);
                None
            }
        }
    }

    /// Get an entry by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RendererDescriptor> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// Check whether a name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Registered names in registry order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.name.as_str()).collect()
    }

    /// Iterate over entries in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &RendererDescriptor> {
        self.entries.iter()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
