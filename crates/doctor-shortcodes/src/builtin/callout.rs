//! `<callout type="warning" title="Heads up" icon="Warning">…</callout>`

use std::fmt::Write;

use async_trait::async_trait;

use super::icon::icon_markup;
use crate::{AttributeBag, RenderError, Renderer};

const DEFAULT_TYPE: &str = "info";

/// Renders a highlighted callout box around the inner markup.
#[derive(Debug, Default, Clone, Copy)]
pub struct CalloutRenderer;

#[async_trait]
impl Renderer for CalloutRenderer {
    async fn render(
        &self,
        attributes: &AttributeBag,
        content: Option<&str>,
    ) -> Result<String, RenderError> {
        let kind = attributes
            .get("type")
            .filter(|kind| !kind.trim().is_empty())
            .unwrap_or(DEFAULT_TYPE)
            .trim()
            .to_lowercase();

        let mut html = format!(r#"<div class="doctor__callout doctor__callout_{kind}">"#);
        if let Some(icon) = attributes.get("icon").filter(|icon| !icon.is_empty()) {
            let _ = write!(
                html,
                r#"<div class="doctor__callout__icon">{}</div>"#,
                icon_markup(icon, None)
            );
        }
        html.push_str(r#"<div class="doctor__callout__body">"#);
        if let Some(title) = attributes.get("title").filter(|title| !title.is_empty()) {
            let _ = write!(html, r#"<p class="doctor__callout__title">{title}</p>"#);
        }
        html.push_str(content.unwrap_or_default());
        html.push_str("</div></div>");
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_callout_defaults() {
        let html = CalloutRenderer
            .render(&AttributeBag::new(), Some("Text"))
            .await
            .unwrap();
        assert_eq!(
            html,
            r#"<div class="doctor__callout doctor__callout_info"><div class="doctor__callout__body">Text</div></div>"#
        );
    }

    #[tokio::test]
    async fn test_callout_with_title_and_icon() {
        let attrs: AttributeBag = [("type", "Warning"), ("title", "Heads up"), ("icon", "Warning")]
            .into_iter()
            .collect();
        let html = CalloutRenderer.render(&attrs, Some("<p>x</p>")).await.unwrap();
        assert_eq!(
            html,
            concat!(
                r#"<div class="doctor__callout doctor__callout_warning">"#,
                r#"<div class="doctor__callout__icon"><i class="ms-Icon ms-Icon--Warning" aria-hidden="true"></i></div>"#,
                r#"<div class="doctor__callout__body"><p class="doctor__callout__title">Heads up</p><p>x</p></div>"#,
                "</div>"
            )
        );
    }
}
