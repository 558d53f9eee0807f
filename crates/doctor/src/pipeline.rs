//! Markdown to page HTML conversion with shortcode expansion.

use doctor_shortcodes::{CONTAINER_CLASS, MARKDOWN_CLASS, ShortcodeError, ShortcodeResolver};
use pulldown_cmark::{Options, Parser, html};

/// Converts one markdown document into page HTML.
pub(crate) struct PagePipeline {
    resolver: ShortcodeResolver,
    wrap: bool,
}

impl PagePipeline {
    pub(crate) fn new(resolver: ShortcodeResolver, wrap: bool) -> Self {
        Self { resolver, wrap }
    }

    /// Run both expansion phases around the markdown conversion.
    ///
    /// # Errors
    ///
    /// Returns the first error of either expansion phase.
    pub(crate) async fn render(&self, markdown: &str) -> Result<String, ShortcodeError> {
        let body = strip_front_matter(markdown);
        let expanded = self.resolver.resolve_before_markdown(body).await?;

        let converted = markdown_to_html(&expanded);
        let page = if self.wrap {
            wrap_page(&converted)
        } else {
            converted
        };

        self.resolver.resolve_after_markdown(&page).await
    }
}

/// Drop a leading `---` YAML block.
///
/// The block must start on the first line and end with a `---` or `...`
/// line. Anything else is returned unchanged.
pub(crate) fn strip_front_matter(markdown: &str) -> &str {
    let Some(rest) = markdown
        .strip_prefix("---\n")
        .or_else(|| markdown.strip_prefix("---\r\n"))
    else {
        return markdown;
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        offset += line.len();
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed == "---" || trimmed == "..." {
            return &rest[offset..];
        }
    }
    markdown
}

fn markdown_to_html(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_GFM;
    let parser = Parser::new_ext(markdown, options);

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

fn wrap_page(html: &str) -> String {
    format!(r#"<div class="{CONTAINER_CLASS}"><div class="{MARKDOWN_CLASS}">{html}</div></div>"#)
}
