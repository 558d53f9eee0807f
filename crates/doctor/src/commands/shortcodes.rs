//! `doctor shortcodes` command implementation.

use std::path::PathBuf;

use clap::Args;
use doctor_config::{CliSettings, Config};

use super::{load_registry, telemetry};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the shortcodes command.
#[derive(Args)]
pub(crate) struct ShortcodesArgs {
    /// Path to configuration file (default: auto-discover doctor.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Plugin manifest directory (overrides config).
    #[arg(long, env = "DOCTOR_SHORTCODES_DIR")]
    shortcodes_dir: Option<PathBuf>,
}

impl ShortcodesArgs {
    /// Execute the shortcodes command.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration or a plugin cannot be loaded.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            shortcodes_dir: self.shortcodes_dir,
            ..Default::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let registry = load_registry(&config, telemetry(&config).as_ref(), &output).await?;

        output.shortcode_table(&registry);
        Ok(())
    }
}
