//! Configuration management for Doctor.
//!
//! Parses `doctor.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `shortcodes.dir`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override plugin manifest directory.
    pub shortcodes_dir: Option<PathBuf>,
    /// Override strict plugin loading.
    pub strict: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "doctor.toml";

/// Default plugin manifest directory, relative to the config file.
const DEFAULT_SHORTCODES_DIR: &str = "shortcodes";

/// Default command renderer timeout in milliseconds.
const DEFAULT_COMMAND_TIMEOUT_MS: u64 = 10_000;

/// Upper bound for `shortcodes.command_timeout_ms`.
const MAX_COMMAND_TIMEOUT_MS: u64 = 600_000;

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Shortcode configuration (paths are relative strings from TOML).
    #[serde(rename = "shortcodes")]
    shortcodes_raw: ShortcodesConfigRaw,
    /// Telemetry configuration.
    pub telemetry: TelemetryConfig,
    /// Page rendering configuration.
    pub page: PageConfig,

    /// Resolved shortcode configuration (set after loading).
    #[serde(skip)]
    pub shortcodes: ShortcodesConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    #[allow(clippy::derivable_impls)]
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw shortcode configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ShortcodesConfigRaw {
    dir: Option<String>,
    strict: Option<bool>,
    command_timeout_ms: Option<u64>,
}

/// Resolved shortcode configuration with absolute paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcodesConfig {
    /// Directory scanned for plugin manifests.
    pub dir: PathBuf,
    /// Fail on invalid manifests instead of skipping them.
    pub strict: bool,
    /// Default command renderer timeout in milliseconds, 0 for none.
    pub command_timeout_ms: u64,
}

impl ShortcodesConfig {
    /// Default command renderer timeout, `None` when disabled.
    #[must_use]
    pub fn command_timeout(&self) -> Option<Duration> {
        (self.command_timeout_ms > 0).then(|| Duration::from_millis(self.command_timeout_ms))
    }
}

impl Default for ShortcodesConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_SHORTCODES_DIR),
            strict: false,
            command_timeout_ms: DEFAULT_COMMAND_TIMEOUT_MS,
        }
    }
}

/// Telemetry configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Whether telemetry events are recorded.
    pub enabled: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Page rendering configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Wrap converted HTML in the page container markup.
    pub wrap: bool,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self { wrap: true }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`shortcodes.dir`").
        field: String,
        /// Error message (e.g., "${`SHORTCODES_DIR`} not set").
        message: String,
    },
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `doctor.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::discover_from(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(dir) = &settings.shortcodes_dir {
            self.shortcodes.dir.clone_from(dir);
        }
        if let Some(strict) = settings.strict {
            self.shortcodes.strict = strict;
        }
    }

    /// Search for config file in `start` and its parents.
    fn discover_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            shortcodes_raw: ShortcodesConfigRaw::default(),
            telemetry: TelemetryConfig::default(),
            page: PageConfig::default(),
            shortcodes: ShortcodesConfig {
                dir: base.join(DEFAULT_SHORTCODES_DIR),
                ..ShortcodesConfig::default()
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shortcodes.dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "shortcodes.dir cannot be empty".to_owned(),
            ));
        }
        if self.shortcodes.command_timeout_ms > MAX_COMMAND_TIMEOUT_MS {
            return Err(ConfigError::Validation(format!(
                "shortcodes.command_timeout_ms cannot exceed {MAX_COMMAND_TIMEOUT_MS}"
            )));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref dir) = self.shortcodes_raw.dir {
            self.shortcodes_raw.dir = Some(expand::expand_env(dir, "shortcodes.dir")?);
        }
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let raw = &self.shortcodes_raw;
        let dir = match raw.dir.as_deref() {
            Some("") => PathBuf::new(),
            Some(dir) => config_dir.join(dir),
            None => config_dir.join(DEFAULT_SHORTCODES_DIR),
        };

        self.shortcodes = ShortcodesConfig {
            dir,
            strict: raw.strict.unwrap_or(false),
            command_timeout_ms: raw.command_timeout_ms.unwrap_or(DEFAULT_COMMAND_TIMEOUT_MS),
        };
    }
}
