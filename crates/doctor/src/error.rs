//! CLI error types.

use doctor_config::ConfigError;
use doctor_shortcodes::{PluginError, ShortcodeError};

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Plugin(#[from] PluginError),

    #[error(transparent)]
    Shortcode(#[from] ShortcodeError),
}
