//! Two-phase shortcode resolver.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use doctor_markup::Document;

use crate::builtin::TOC;
use crate::{
    Renderer, ShortcodeError, ShortcodeRegistry, Telemetry, TelemetryEvent, TocPosition,
    apply_toc_position, extract_attributes,
};

/// Resolve pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Before markdown conversion, on raw markdown.
    Pre,
    /// After markdown conversion, on HTML.
    Post,
}

impl Phase {
    /// Phase selected by a descriptor's `before_markdown` flag.
    #[must_use]
    pub fn from_before_markdown(before_markdown: bool) -> Self {
        if before_markdown { Self::Pre } else { Self::Post }
    }

    /// Check whether this phase runs before markdown conversion.
    #[must_use]
    pub fn is_before_markdown(self) -> bool {
        self == Self::Pre
    }

    /// Phase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pre => "pre",
            Self::Post => "post",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pre" => Ok(Self::Pre),
            "post" => Ok(Self::Post),
            other => Err(format!("unknown phase \"{other}\", expected \"pre\" or \"post\"")),
        }
    }
}

/// Expands shortcodes in markup.
///
/// Owns its registry: once a resolver exists the set of shortcodes can no
/// longer change.
pub struct ShortcodeResolver {
    registry: ShortcodeRegistry,
    telemetry: Arc<dyn Telemetry>,
}

impl ShortcodeResolver {
    /// Create a resolver over a fully loaded registry.
    #[must_use]
    pub fn new(registry: ShortcodeRegistry, telemetry: Arc<dyn Telemetry>) -> Self {
        Self {
            registry,
            telemetry,
        }
    }

    /// The sealed registry.
    #[must_use]
    pub fn registry(&self) -> &ShortcodeRegistry {
        &self.registry
    }

    /// Expand shortcodes that run before markdown conversion.
    ///
    /// # Errors
    ///
    /// Same as [`resolve`](Self::resolve).
    pub async fn resolve_before_markdown(&self, markdown: &str) -> Result<String, ShortcodeError> {
        self.resolve(markdown, Phase::Pre).await
    }

    /// Expand shortcodes that run after markdown conversion.
    ///
    /// # Errors
    ///
    /// Same as [`resolve`](Self::resolve).
    pub async fn resolve_after_markdown(&self, html: &str) -> Result<String, ShortcodeError> {
        self.resolve(html, Phase::Post).await
    }

    /// Expand every shortcode registered for `phase`.
    ///
    /// Every registry entry must have a renderer, whatever its phase;
    /// otherwise the call fails before anything is rendered. Tags are then
    /// processed in registry order and elements in document order, one
    /// render at a time. Each element is replaced by its renderer's output
    /// as-is; that output is not scanned again for the same tag.
    ///
    /// # Errors
    ///
    /// Returns [`ShortcodeError::Configuration`] for an entry without a
    /// renderer and [`ShortcodeError::Renderer`] when a renderer fails. Both
    /// abort the whole pass.
    pub async fn resolve(&self, markup: &str, phase: Phase) -> Result<String, ShortcodeError> {
        if let Some(entry) = self.registry.iter().find(|entry| !entry.is_callable()) {
            return Err(ShortcodeError::Configuration {
                tag: entry.name.clone(),
            });
        }

        let selected: Vec<(&str, &Arc<dyn Renderer>)> = self
            .registry
            .iter()
            .filter(|entry| entry.phase() == phase)
            .filter_map(|entry| {
                entry
                    .renderer
                    .as_ref()
                    .map(|renderer| (entry.name.as_str(), renderer))
            })
            .collect();

        tracing::debug!(%phase, count = selected.len(), "Using shortcodes");
        self.telemetry
            .track(TelemetryEvent::ShortcodeUsage, selected.len());

        if selected.is_empty() {
            return Ok(markup.to_owned());
        }

        let mut doc = Document::parse(markup);
        for (tag, renderer) in selected {
            // Snapshot before replacing anything for this tag.
            let elements = doc.elements_by_tag(tag);
            tracing::debug!(tag, count = elements.len(), "Found shortcode elements");

            let mut toc_position = None;
            for element in elements {
                let attributes = extract_attributes(&doc, element);
                if tag == TOC
                    && let Some(position) = attributes.get("position").and_then(TocPosition::parse)
                {
                    toc_position = Some(position);
                }

                let content = doc.inner_markup(element);
                tracing::debug!(tag, "Rendering shortcode");
                let html = renderer
                    .render(&attributes, content.as_deref())
                    .await
                    .map_err(|source| ShortcodeError::Renderer {
                        tag: tag.to_owned(),
                        source,
                    })?;
                tracing::trace!(tag, html = %html, "Rendered shortcode");

                doc.replace_with_markup(element, &html);
            }

            if let Some(position) = toc_position {
                apply_toc_position(&mut doc, position);
            }
        }

        Ok(doc.to_markup())
    }
}
