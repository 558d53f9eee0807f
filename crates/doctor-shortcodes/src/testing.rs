//! Test doubles shared by the unit tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::{AttributeBag, RenderError, Renderer, Telemetry, TelemetryEvent};

/// Telemetry sink that records every event.
#[derive(Debug, Default)]
pub(crate) struct RecordingTelemetry {
    events: Mutex<Vec<(TelemetryEvent, usize)>>,
}

impl RecordingTelemetry {
    pub(crate) fn events(&self) -> Vec<(TelemetryEvent, usize)> {
        self.events.lock().unwrap().clone()
    }
}

impl Telemetry for RecordingTelemetry {
    fn track(&self, event: TelemetryEvent, count: usize) {
        self.events.lock().unwrap().push((event, count));
    }
}

/// Renderer returning fixed markup and counting its invocations.
#[derive(Debug)]
pub(crate) struct CountingRenderer {
    html: String,
    calls: AtomicUsize,
}

impl CountingRenderer {
    pub(crate) fn new(html: &str) -> Self {
        Self {
            html: html.to_owned(),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Renderer for CountingRenderer {
    async fn render(
        &self,
        _attributes: &AttributeBag,
        _content: Option<&str>,
    ) -> Result<String, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.html.clone())
    }
}
