//! Renderer capability and the plugin renderer implementations.

use std::path::PathBuf;
use std::process::{Output, Stdio};
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};

use crate::{AttributeBag, RenderError};

/// Turns a shortcode's attributes and inner markup into replacement markup.
///
/// # Ordering
///
/// The resolver awaits one render at a time, in document order, and never
/// runs two renders concurrently. Implementations may rely on that order.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use doctor_shortcodes::{AttributeBag, RenderError, Renderer};
///
/// struct Badge;
///
/// #[async_trait]
/// impl Renderer for Badge {
///     async fn render(
///         &self,
///         attributes: &AttributeBag,
///         content: Option<&str>,
///     ) -> Result<String, RenderError> {
///         let kind = attributes.get("type").unwrap_or("default");
///         Ok(format!(
///             r#"<span class="badge badge-{kind}">{}</span>"#,
///             content.unwrap_or_default()
///         ))
///     }
/// }
/// ```
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Render one element.
    ///
    /// `content` is the element's inner markup, `None` when it has no
    /// children. The returned markup is inserted without escaping.
    async fn render(
        &self,
        attributes: &AttributeBag,
        content: Option<&str>,
    ) -> Result<String, RenderError>;
}

/// Renderer backed by a synchronous closure.
pub struct FnRenderer<F> {
    render: F,
}

/// Wrap a closure as a [`Renderer`].
pub fn renderer_fn<F>(render: F) -> FnRenderer<F>
where
    F: Fn(&AttributeBag, Option<&str>) -> Result<String, RenderError> + Send + Sync,
{
    FnRenderer { render }
}

#[async_trait]
impl<F> Renderer for FnRenderer<F>
where
    F: Fn(&AttributeBag, Option<&str>) -> Result<String, RenderError> + Send + Sync,
{
    async fn render(
        &self,
        attributes: &AttributeBag,
        content: Option<&str>,
    ) -> Result<String, RenderError> {
        (self.render)(attributes, content)
    }
}

/// Placeholder pattern: `{{ content }}` or `{{ attr.NAME }}`.
static PLACEHOLDER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*(?:(content)|attr\.([A-Za-z0-9_:.\-]+))\s*\}\}")
        .expect("invalid placeholder regex")
});

/// Renderer that fills a markup template.
///
/// `{{ content }}` expands to the inner markup and `{{ attr.NAME }}` to the
/// attribute value; both expand to an empty string when absent.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    template: String,
}

impl TemplateRenderer {
    /// Create a template renderer.
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    fn fill(&self, attributes: &AttributeBag, content: Option<&str>) -> String {
        PLACEHOLDER_PATTERN
            .replace_all(&self.template, |caps: &regex::Captures| {
                if caps.get(1).is_some() {
                    content.unwrap_or_default().to_owned()
                } else {
                    attributes.get(&caps[2]).unwrap_or_default().to_owned()
                }
            })
            .into_owned()
    }
}

#[async_trait]
impl Renderer for TemplateRenderer {
    async fn render(
        &self,
        attributes: &AttributeBag,
        content: Option<&str>,
    ) -> Result<String, RenderError> {
        Ok(self.fill(attributes, content))
    }
}

/// JSON request written to a renderer command's stdin.
#[derive(Serialize)]
struct RenderRequest<'a> {
    attributes: &'a AttributeBag,
    content: Option<&'a str>,
}

/// Renderer that runs an external command.
///
/// The command receives `{"attributes": {...}, "content": "..." | null}` on
/// stdin and prints the replacement markup on stdout. Trailing line breaks
/// are stripped from the output.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    program: PathBuf,
    args: Vec<String>,
    working_dir: PathBuf,
    timeout: Option<Duration>,
}

impl CommandRenderer {
    /// Create a command renderer run from `working_dir`.
    #[must_use]
    pub fn new(
        program: impl Into<PathBuf>,
        args: Vec<String>,
        working_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            program: program.into(),
            args,
            working_dir: working_dir.into(),
            timeout: None,
        }
    }

    /// Kill the command and fail if it runs longer than `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn program_name(&self) -> String {
        self.program.display().to_string()
    }
}

#[async_trait]
impl Renderer for CommandRenderer {
    async fn render(
        &self,
        attributes: &AttributeBag,
        content: Option<&str>,
    ) -> Result<String, RenderError> {
        let request = serde_json::to_vec(&RenderRequest {
            attributes,
            content,
        })?;

        tracing::debug!(program = %self.program.display(), "Running renderer command");
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RenderError::Spawn {
                program: self.program_name(),
                source,
            })?;

        let output = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, exchange(child, &request))
                .await
                .map_err(|_| RenderError::Timeout {
                    program: self.program_name(),
                    timeout_ms: timeout.as_millis(),
                })??,
            None => exchange(child, &request).await?,
        };

        if !output.status.success() {
            return Err(RenderError::CommandFailed {
                program: self.program_name(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        let mut markup = String::from_utf8(output.stdout)?;
        let trimmed_len = markup.trim_end_matches(['\r', '\n']).len();
        markup.truncate(trimmed_len);
        Ok(markup)
    }
}

/// Write `request` to the child's stdin while collecting its output.
///
/// Stdin is closed once the request is written. A command that exits without
/// reading all of it is judged by its exit status alone.
async fn exchange(mut child: Child, request: &[u8]) -> std::io::Result<Output> {
    let stdin = child.stdin.take();
    let write = async move {
        match stdin {
            Some(mut stdin) => stdin.write_all(request).await,
            None => Ok(()),
        }
    };

    let (written, output) = tokio::join!(write, child.wait_with_output());
    match written {
        Err(err) if err.kind() != std::io::ErrorKind::BrokenPipe => Err(err),
        _ => output,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bag(pairs: &[(&str, &str)]) -> AttributeBag {
        pairs.iter().copied().collect()
    }

    #[tokio::test]
    async fn test_template_fills_placeholders() {
        let renderer =
            TemplateRenderer::new(r#"<div class="cb cb-{{ attr.type }}">{{content}}</div>"#);
        let html = renderer
            .render(&bag(&[("type", "warning")]), Some("Be careful"))
            .await
            .unwrap();
        assert_eq!(html, r#"<div class="cb cb-warning">Be careful</div>"#);
    }

    #[tokio::test]
    async fn test_template_missing_values_are_empty() {
        let renderer = TemplateRenderer::new("[{{ attr.missing }}|{{ content }}]");
        let html = renderer.render(&AttributeBag::new(), None).await.unwrap();
        assert_eq!(html, "[|]");
    }

    #[tokio::test]
    async fn test_template_does_not_rescan_values() {
        let renderer = TemplateRenderer::new("{{ attr.a }}");
        let html = renderer
            .render(&bag(&[("a", "{{ content }}")]), Some("x"))
            .await
            .unwrap();
        assert_eq!(html, "{{ content }}");
    }

    #[tokio::test]
    async fn test_fn_renderer_propagates_errors() {
        let renderer = renderer_fn(|_, _| Err(RenderError::Other("boom".to_owned())));
        let err = renderer.render(&AttributeBag::new(), None).await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_renderer_reads_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = CommandRenderer::new(
            "sh",
            vec!["-c".to_owned(), "cat > request.json; echo '<b>ok</b>'".to_owned()],
            dir.path(),
        );
        let html = renderer
            .render(&bag(&[("k", "v")]), Some("inner"))
            .await
            .unwrap();
        assert_eq!(html, "<b>ok</b>");

        let request = std::fs::read_to_string(dir.path().join("request.json")).unwrap();
        assert_eq!(request, r#"{"attributes":{"k":"v"},"content":"inner"}"#);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_renderer_failure() {
        let renderer = CommandRenderer::new(
            "sh",
            vec!["-c".to_owned(), "echo nope >&2; exit 3".to_owned()],
            ".",
        );
        let err = renderer.render(&AttributeBag::new(), None).await.unwrap_err();
        match err {
            RenderError::CommandFailed { stderr, .. } => assert_eq!(stderr, "nope"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_renderer_timeout() {
        let renderer = CommandRenderer::new("sh", vec!["-c".to_owned(), "sleep 5".to_owned()], ".")
            .with_timeout(Some(Duration::from_millis(50)));
        let err = renderer.render(&AttributeBag::new(), None).await.unwrap_err();
        assert!(matches!(err, RenderError::Timeout { timeout_ms: 50, .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_renderer_large_request_echoed() {
        let content = "x".repeat(1 << 20);
        let renderer = CommandRenderer::new("cat", Vec::new(), ".")
            .with_timeout(Some(Duration::from_secs(10)));
        let html = renderer
            .render(&AttributeBag::new(), Some(&content))
            .await
            .unwrap();
        assert_eq!(html, format!(r#"{{"attributes":{{}},"content":"{content}"}}"#));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_renderer_timeout_with_unread_request() {
        let content = "x".repeat(1 << 20);
        let renderer = CommandRenderer::new("sh", vec!["-c".to_owned(), "sleep 5".to_owned()], ".")
            .with_timeout(Some(Duration::from_millis(100)));
        let err = renderer
            .render(&AttributeBag::new(), Some(&content))
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::Timeout { timeout_ms: 100, .. }));
    }

    #[tokio::test]
    async fn test_command_renderer_spawn_error() {
        let renderer = CommandRenderer::new("definitely-not-a-real-program-xyz", Vec::new(), ".");
        let err = renderer.render(&AttributeBag::new(), None).await.unwrap_err();
        assert!(matches!(err, RenderError::Spawn { .. }));
    }
}
