//! CLI command implementations.

pub(crate) mod render;
pub(crate) mod shortcodes;

pub(crate) use render::RenderArgs;
pub(crate) use shortcodes::ShortcodesArgs;

use std::sync::Arc;

use doctor_config::Config;
use doctor_shortcodes::{
    NoopTelemetry, PluginLoader, ShortcodeRegistry, Telemetry, TracingTelemetry,
};

use crate::error::CliError;
use crate::output::Output;

/// Build the registry for `config`: built-ins first, then plugin manifests.
pub(crate) async fn load_registry(
    config: &Config,
    telemetry: &dyn Telemetry,
    output: &Output,
) -> Result<ShortcodeRegistry, CliError> {
    let mut registry = ShortcodeRegistry::with_builtins();
    let report = PluginLoader::new()
        .with_strict(config.shortcodes.strict)
        .with_command_timeout(config.shortcodes.command_timeout())
        .load(&config.shortcodes.dir, &mut registry, telemetry)
        .await?;

    output.rejected_plugins(&report);
    Ok(registry)
}

/// Telemetry sink selected by `[telemetry] enabled`.
pub(crate) fn telemetry(config: &Config) -> Arc<dyn Telemetry> {
    if config.telemetry.enabled {
        Arc::new(TracingTelemetry)
    } else {
        Arc::new(NoopTelemetry)
    }
}
