//! `doctor render` command implementation.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use doctor_config::{CliSettings, Config};
use doctor_shortcodes::ShortcodeResolver;

use super::{load_registry, telemetry};
use crate::error::CliError;
use crate::output::Output;
use crate::pipeline::PagePipeline;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Path to the markdown file.
    markdown_file: PathBuf,

    /// Write the HTML to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover doctor.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Plugin manifest directory (overrides config).
    #[arg(long, env = "DOCTOR_SHORTCODES_DIR")]
    shortcodes_dir: Option<PathBuf>,

    /// Fail on invalid plugin manifests instead of skipping them.
    #[arg(long)]
    strict: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if loading, expansion or writing the result fails.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            shortcodes_dir: self.shortcodes_dir.clone(),
            strict: self.strict.then_some(true),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let telemetry = telemetry(&config);
        let registry = load_registry(&config, telemetry.as_ref(), &output).await?;
        let pipeline = PagePipeline::new(ShortcodeResolver::new(registry, telemetry), config.page.wrap);

        let markdown = tokio::fs::read_to_string(&self.markdown_file).await?;
        tracing::info!(path = %self.markdown_file.display(), "Rendering page");
        let html = pipeline.render(&markdown).await?;

        if let Some(path) = &self.output {
            tokio::fs::write(path, &html).await?;
            output.rendered(&self.markdown_file, path);
        } else {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(html.as_bytes())?;
            stdout.flush()?;
        }

        Ok(())
    }
}
