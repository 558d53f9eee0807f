//! `<icon name="Globe" size="24px" />`

use async_trait::async_trait;

use crate::{AttributeBag, RenderError, Renderer};

/// Renders a Fluent UI font icon.
#[derive(Debug, Default, Clone, Copy)]
pub struct IconRenderer;

#[async_trait]
impl Renderer for IconRenderer {
    async fn render(
        &self,
        attributes: &AttributeBag,
        _content: Option<&str>,
    ) -> Result<String, RenderError> {
        let name = attributes
            .get("name")
            .filter(|name| !name.is_empty())
            .ok_or(RenderError::MissingAttribute("name"))?;
        Ok(icon_markup(name, attributes.get("size")))
    }
}

pub(crate) fn icon_markup(name: &str, size: Option<&str>) -> String {
    let style = size
        .filter(|size| !size.is_empty())
        .map(|size| format!(r#" style="font-size:{size}""#))
        .unwrap_or_default();
    format!(r#"<i class="ms-Icon ms-Icon--{name}" aria-hidden="true"{style}></i>"#)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_icon() {
        let attrs: AttributeBag = [("name", "Globe")].into_iter().collect();
        let html = IconRenderer.render(&attrs, None).await.unwrap();
        assert_eq!(html, r#"<i class="ms-Icon ms-Icon--Globe" aria-hidden="true"></i>"#);
    }

    #[tokio::test]
    async fn test_icon_with_size() {
        let attrs: AttributeBag = [("name", "Info"), ("size", "24px")].into_iter().collect();
        let html = IconRenderer.render(&attrs, None).await.unwrap();
        assert_eq!(
            html,
            r#"<i class="ms-Icon ms-Icon--Info" aria-hidden="true" style="font-size:24px"></i>"#
        );
    }

    #[tokio::test]
    async fn test_icon_requires_name() {
        let err = IconRenderer
            .render(&AttributeBag::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::MissingAttribute("name")));
    }
}
