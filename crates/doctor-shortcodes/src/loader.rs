//! Plugin manifest discovery.
//!
//! Plugins are TOML manifests anywhere below the plugin directory:
//!
//! ```toml
//! name = "badge"
//! before_markdown = false
//!
//! [render]
//! template = "<span class=\"badge badge-{{ attr.type }}\">{{ content }}</span>"
//! # or: command = ["./render-badge.sh"], with optional timeout_ms = 5000
//! ```
//!
//! Manifests are loaded in path order. A manifest reusing a name already in
//! the registry, built-in or not, replaces that entry.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::{
    CommandRenderer, PluginError, RendererDescriptor, ShortcodeRegistry, ShortcodeSource,
    Telemetry, TelemetryEvent, TemplateRenderer,
};

/// Manifest file pattern below the plugin directory.
const MANIFEST_PATTERN: &str = "**/*.toml";

/// Raw manifest as parsed from TOML.
#[derive(Debug, Deserialize)]
struct PluginManifest {
    name: Option<String>,
    #[serde(default)]
    before_markdown: bool,
    render: Option<RenderSection>,
}

/// `[render]` section of a manifest.
#[derive(Debug, Deserialize)]
struct RenderSection {
    template: Option<String>,
    command: Option<Vec<String>>,
    timeout_ms: Option<u64>,
}

/// Manifest that could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedPlugin {
    /// Manifest path.
    pub path: PathBuf,
    /// Why it was rejected.
    pub reason: String,
}

/// Outcome of a plugin load.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Number of manifest files found, valid or not.
    pub discovered: usize,
    /// Names registered from manifests, in load order.
    pub loaded: Vec<String>,
    /// Manifests skipped in lenient mode; reporting them is up to the caller.
    pub rejected: Vec<RejectedPlugin>,
}

/// Loads plugin manifests into a [`ShortcodeRegistry`].
#[derive(Debug, Clone, Default)]
pub struct PluginLoader {
    strict: bool,
    command_timeout: Option<Duration>,
}

impl PluginLoader {
    /// Create a lenient loader: invalid manifests are skipped and listed in the
    /// [`LoadReport`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the load on the first invalid manifest instead of skipping it.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Default timeout for command renderers without their own `timeout_ms`.
    #[must_use]
    pub fn with_command_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Load every manifest below `dir` into `registry`.
    ///
    /// A missing directory loads nothing. The number of discovered manifests
    /// is reported to `telemetry` whether or not they turn out to be valid.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Pattern`] if `dir` cannot form a glob pattern,
    /// and in strict mode [`PluginError::InvalidManifest`] for the first
    /// manifest that cannot be used.
    pub async fn load(
        &self,
        dir: &Path,
        registry: &mut ShortcodeRegistry,
        telemetry: &dyn Telemetry,
    ) -> Result<LoadReport, PluginError> {
        let files = if tokio::fs::try_exists(dir).await.unwrap_or(false) {
            discover(dir)?
        } else {
            Vec::new()
        };

        tracing::debug!(dir = %dir.display(), count = files.len(), "Found custom shortcodes");
        telemetry.track(TelemetryEvent::CustomShortcodes, files.len());

        let mut report = LoadReport {
            discovered: files.len(),
            ..LoadReport::default()
        };

        for path in files {
            match self.load_manifest(&path).await {
                Ok(descriptor) => {
                    tracing::debug!(
                        name = %descriptor.name,
                        path = %path.display(),
                        before_markdown = descriptor.before_markdown,
                        "Registered shortcode plugin"
                    );
                    report.loaded.push(descriptor.name.clone());
                    registry.insert(descriptor);
                }
                Err(reason) if self.strict => {
                    return Err(PluginError::InvalidManifest { path, reason });
                }
                Err(reason) => {
                    tracing::debug!(path = %path.display(), %reason, "Skipping shortcode plugin");
                    report.rejected.push(RejectedPlugin { path, reason });
                }
            }
        }

        tracing::info!(
            loaded = report.loaded.len(),
            rejected = report.rejected.len(),
            "Loaded shortcode plugins"
        );
        Ok(report)
    }

    async fn load_manifest(&self, path: &Path) -> Result<RendererDescriptor, String> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("cannot read manifest: {e}"))?;
        let manifest: PluginManifest =
            toml::from_str(&content).map_err(|e| format!("invalid manifest: {e}"))?;

        let name = manifest
            .name
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| "missing `name`".to_owned())?;
        let render = manifest
            .render
            .ok_or_else(|| "missing `[render]` section".to_owned())?;

        let base_dir = path.parent().unwrap_or(Path::new("."));
        let descriptor = match (render.template, render.command) {
            (Some(_), Some(_)) => {
                return Err("`[render]` sets both `template` and `command`".to_owned());
            }
            (Some(template), None) => RendererDescriptor::new(
                name,
                TemplateRenderer::new(template),
                manifest.before_markdown,
            ),
            (None, Some(command)) => {
                let mut parts = command.into_iter();
                let program = parts
                    .next()
                    .filter(|program| !program.is_empty())
                    .ok_or_else(|| "`[render].command` is empty".to_owned())?;
                let timeout = render
                    .timeout_ms
                    .map(Duration::from_millis)
                    .or(self.command_timeout);
                let renderer =
                    CommandRenderer::new(resolve_program(base_dir, &program), parts.collect(), base_dir)
                        .with_timeout(timeout);
                RendererDescriptor::from_arc(name, Arc::new(renderer), manifest.before_markdown)
            }
            (None, None) => {
                tracing::warn!(
                    %name,
                    path = %path.display(),
                    "Shortcode plugin has no renderer; resolving will fail until it is replaced"
                );
                RendererDescriptor::unbound(name, manifest.before_markdown)
            }
        };

        Ok(descriptor.with_source(ShortcodeSource::Plugin(path.to_path_buf())))
    }
}

/// List manifest files below `dir`, sorted by path.
fn discover(dir: &Path) -> Result<Vec<PathBuf>, PluginError> {
    let pattern = format!(
        "{}/{MANIFEST_PATTERN}",
        glob::Pattern::escape(&dir.to_string_lossy())
    );

    let mut files: Vec<PathBuf> = glob::glob(&pattern)?
        .filter_map(|entry| match entry {
            Ok(path) if path.is_file() => Some(path),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Cannot read shortcode plugin path");
                None
            }
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Resolve a relative program path such as `./render.sh` against the
/// manifest directory. Bare names are left for `PATH` lookup.
fn resolve_program(base_dir: &Path, program: &str) -> PathBuf {
    let path = Path::new(program);
    if path.is_relative() && path.components().count() > 1 {
        base_dir.join(path)
    } else {
        path.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingTelemetry;
    use crate::{NoopTelemetry, Phase, ShortcodeResolver};
    use pretty_assertions::assert_eq;

    fn write(dir: &Path, relative: &str, content: &str) {
        let path = dir.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[tokio::test]
    async fn test_missing_directory_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let telemetry = RecordingTelemetry::default();
        let mut registry = ShortcodeRegistry::with_builtins();

        let report = PluginLoader::new()
            .load(&dir.path().join("missing"), &mut registry, &telemetry)
            .await
            .unwrap();

        assert_eq!(report.discovered, 0);
        assert_eq!(registry.len(), 3);
        assert_eq!(
            telemetry.events(),
            vec![(TelemetryEvent::CustomShortcodes, 0)]
        );
    }

    #[tokio::test]
    async fn test_loads_nested_manifests_in_path_order() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "b/badge.toml",
            "name = \"badge\"\n[render]\ntemplate = \"<span>{{ content }}</span>\"\n",
        );
        write(
            dir.path(),
            "a.toml",
            "name = \"early\"\nbefore_markdown = true\n[render]\ntemplate = \"E\"\n",
        );
        write(dir.path(), "notes.txt", "ignored");

        let mut registry = ShortcodeRegistry::with_builtins();
        let report = PluginLoader::new()
            .load(dir.path(), &mut registry, &NoopTelemetry)
            .await
            .unwrap();

        assert_eq!(report.discovered, 2);
        assert_eq!(report.loaded, vec!["early", "badge"]);
        assert_eq!(
            registry.names(),
            vec!["icon", "callout", "toc", "early", "badge"]
        );
        assert_eq!(registry.get("early").unwrap().phase(), Phase::Pre);
        assert_eq!(
            registry.get("badge").unwrap().source,
            ShortcodeSource::Plugin(dir.path().join("b/badge.toml"))
        );
    }

    #[tokio::test]
    async fn test_plugin_overrides_builtin() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "callout.toml",
            "name = \"callout\"\n[render]\ntemplate = '<div class=\"cb cb-{{ attr.type }}\">{{ content }}</div>'\n",
        );

        let mut registry = ShortcodeRegistry::with_builtins();
        PluginLoader::new()
            .load(dir.path(), &mut registry, &NoopTelemetry)
            .await
            .unwrap();
        assert_eq!(registry.names(), vec!["icon", "callout", "toc"]);

        let resolver = ShortcodeResolver::new(registry, Arc::new(NoopTelemetry));
        let html = resolver
            .resolve(r#"<callout type="warning">Be careful</callout>"#, Phase::Post)
            .await
            .unwrap();
        assert_eq!(html, r#"<div class="cb cb-warning">Be careful</div>"#);
    }

    #[tokio::test]
    async fn test_invalid_manifests_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "1-broken.toml", "name = [");
        write(dir.path(), "2-nameless.toml", "[render]\ntemplate = \"x\"\n");
        write(dir.path(), "3-norender.toml", "name = \"x\"\n");
        write(
            dir.path(),
            "4-both.toml",
            "name = \"x\"\n[render]\ntemplate = \"x\"\ncommand = [\"echo\"]\n",
        );
        write(dir.path(), "5-empty.toml", "name = \"x\"\n[render]\ncommand = []\n");

        let telemetry = RecordingTelemetry::default();
        let mut registry = ShortcodeRegistry::new();
        let report = PluginLoader::new()
            .load(dir.path(), &mut registry, &telemetry)
            .await
            .unwrap();

        assert_eq!(report.discovered, 5);
        assert_eq!(report.rejected.len(), 5);
        assert!(registry.is_empty());
        assert_eq!(
            telemetry.events(),
            vec![(TelemetryEvent::CustomShortcodes, 5)]
        );
    }

    #[tokio::test]
    async fn test_strict_mode_fails_on_invalid_manifest() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "bad.toml", "before_markdown = true\n");

        let mut registry = ShortcodeRegistry::new();
        let err = PluginLoader::new()
            .with_strict(true)
            .load(dir.path(), &mut registry, &NoopTelemetry)
            .await
            .unwrap_err();

        match err {
            PluginError::InvalidManifest { path, reason } => {
                assert_eq!(path, dir.path().join("bad.toml"));
                assert_eq!(reason, "missing `name`");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_render_section_without_renderer_registers_unbound() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "later.toml", "name = \"later\"\n[render]\n");

        let mut registry = ShortcodeRegistry::with_builtins();
        PluginLoader::new()
            .load(dir.path(), &mut registry, &NoopTelemetry)
            .await
            .unwrap();
        assert!(!registry.get("later").unwrap().is_callable());

        let resolver = ShortcodeResolver::new(registry, Arc::new(NoopTelemetry));
        let err = resolver.resolve("plain", Phase::Pre).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing render function for shortcode tag: \"later\""
        );
    }

    #[test]
    fn test_resolve_program() {
        let base = Path::new("/plugins/badge");
        assert_eq!(
            resolve_program(base, "./render.sh"),
            PathBuf::from("/plugins/badge/./render.sh")
        );
        assert_eq!(resolve_program(base, "python3"), PathBuf::from("python3"));
        assert_eq!(
            resolve_program(base, "/usr/bin/env"),
            PathBuf::from("/usr/bin/env")
        );
    }
}
