//! Error types for shortcode loading and expansion.

use std::io;
use std::path::PathBuf;
use std::string::FromUtf8Error;

/// Error from a [`ShortcodeResolver::resolve`](crate::ShortcodeResolver::resolve) call.
///
/// Any error aborts the whole pass. Replacements made before the failure are
/// discarded together with the tree, so callers never see partial output.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ShortcodeError {
    /// A registered shortcode has no callable renderer.
    #[error("Missing render function for shortcode tag: \"{tag}\"")]
    Configuration {
        /// Offending tag name.
        tag: String,
    },

    /// A renderer failed while expanding an element.
    #[error("shortcode \"{tag}\" failed to render")]
    Renderer {
        /// Tag whose renderer failed.
        tag: String,
        /// Underlying renderer error.
        #[source]
        source: RenderError,
    },
}

/// Error raised by a renderer.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RenderError {
    /// A required attribute is absent.
    #[error("missing required attribute \"{0}\"")]
    MissingAttribute(&'static str),

    /// The renderer command could not be started.
    #[error("failed to start renderer command `{program}`")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The renderer command exited unsuccessfully.
    #[error("renderer command `{program}` exited with {status}: {stderr}")]
    CommandFailed {
        /// Program that failed.
        program: String,
        /// Exit status description.
        status: String,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// The renderer command did not finish in time.
    #[error("renderer command `{program}` timed out after {timeout_ms} ms")]
    Timeout {
        /// Program that timed out.
        program: String,
        /// Configured timeout.
        timeout_ms: u128,
    },

    /// I/O error while talking to the renderer command.
    #[error("I/O error")]
    Io(#[from] io::Error),

    /// Request serialization error.
    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    /// Renderer output is not valid UTF-8.
    #[error("renderer output is not valid UTF-8")]
    Utf8(#[from] FromUtf8Error),

    /// Renderer-specific failure.
    #[error("{0}")]
    Other(String),
}

/// Error from [`PluginLoader::load`](crate::PluginLoader::load).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PluginError {
    /// The plugin directory produced an invalid glob pattern.
    #[error("invalid plugin pattern")]
    Pattern(#[from] glob::PatternError),

    /// A manifest was rejected while loading in strict mode.
    #[error("invalid shortcode plugin {}: {reason}", path.display())]
    InvalidManifest {
        /// Manifest path.
        path: PathBuf,
        /// Why it was rejected.
        reason: String,
    },
}
