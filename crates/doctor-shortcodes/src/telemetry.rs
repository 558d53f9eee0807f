//! Telemetry sink used by the loader and resolver.

use std::fmt;

/// Events reported by the shortcode engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryEvent {
    /// Number of plugin manifests discovered at start-up.
    CustomShortcodes,
    /// Number of shortcodes applied in one resolve pass.
    ShortcodeUsage,
}

impl TelemetryEvent {
    /// Stable event name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CustomShortcodes => "custom-shortcodes",
            Self::ShortcodeUsage => "shortcode-usage",
        }
    }
}

impl fmt::Display for TelemetryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fire-and-forget telemetry sink.
///
/// Implementations must not fail or block; the engine never looks at what
/// happens to an event.
pub trait Telemetry: Send + Sync {
    /// Record `count` for `event`.
    fn track(&self, event: TelemetryEvent, count: usize);
}

/// Emits telemetry events as `tracing` records.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTelemetry;

impl Telemetry for TracingTelemetry {
    fn track(&self, event: TelemetryEvent, count: usize) {
        tracing::info!(event = %event, count, "Telemetry event");
    }
}

/// Discards telemetry events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetry;

impl Telemetry for NoopTelemetry {
    fn track(&self, _event: TelemetryEvent, _count: usize) {}
}
