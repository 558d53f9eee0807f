//! `<toc title="On this page" levels="h2,h3" position="left" />`
//!
//! Renders the table-of-contents container. Headings are collected on the
//! page itself from `data-levels`; the `position` attribute is handled by
//! the resolver's layout step, not here.

use std::fmt::Write;

use async_trait::async_trait;

use crate::layout::TOC_CLASS;
use crate::{AttributeBag, RenderError, Renderer};

const DEFAULT_LEVELS: &str = "h2,h3";

/// Renders the table-of-contents container.
#[derive(Debug, Default, Clone, Copy)]
pub struct TableOfContentsRenderer;

#[async_trait]
impl Renderer for TableOfContentsRenderer {
    async fn render(
        &self,
        attributes: &AttributeBag,
        _content: Option<&str>,
    ) -> Result<String, RenderError> {
        let levels = attributes
            .get("levels")
            .filter(|levels| !levels.is_empty())
            .unwrap_or(DEFAULT_LEVELS);

        let mut html = format!(
            r#"<div class="{TOC_CLASS}"><nav class="doctor__toc" data-levels="{levels}">"#
        );
        if let Some(title) = attributes.get("title").filter(|title| !title.is_empty()) {
            let _ = write!(html, r#"<h2 class="doctor__toc__title">{title}</h2>"#);
        }
        html.push_str("</nav></div>");
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_toc_defaults() {
        let html = TableOfContentsRenderer
            .render(&AttributeBag::new(), None)
            .await
            .unwrap();
        assert_eq!(
            html,
            r#"<div class="doctor__container__toc"><nav class="doctor__toc" data-levels="h2,h3"></nav></div>"#
        );
    }

    #[tokio::test]
    async fn test_toc_title_and_levels() {
        let attrs: AttributeBag = [("title", "Contents"), ("levels", "h2")].into_iter().collect();
        let html = TableOfContentsRenderer.render(&attrs, None).await.unwrap();
        assert_eq!(
            html,
            r#"<div class="doctor__container__toc"><nav class="doctor__toc" data-levels="h2"><h2 class="doctor__toc__title">Contents</h2></nav></div>"#
        );
    }
}
