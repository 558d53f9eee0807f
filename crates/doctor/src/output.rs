//! Terminal messages of the doctor commands.
//!
//! Status and diagnostics go to stderr so rendered HTML on stdout stays
//! clean; the shortcode listing is data and goes to stdout.

use std::path::Path;

use console::{Style, Term};
use doctor_shortcodes::{LoadReport, RendererDescriptor, ShortcodeRegistry};

/// Terminal output formatter.
pub(crate) struct Output {
    status: Term,
    listing: Term,
    green: Style,
    yellow: Style,
    red: Style,
    cyan_bold: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            status: Term::stderr(),
            listing: Term::stdout(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
            cyan_bold: Style::new().cyan().bold(),
        }
    }

    /// Confirm a page written to a file.
    pub(crate) fn rendered(&self, source: &Path, target: &Path) {
        let msg = format!("Rendered {} -> {}", source.display(), target.display());
        let _ = self.status.write_line(&self.green.apply_to(msg).to_string());
    }

    /// Warn about every manifest the plugin loader skipped.
    pub(crate) fn rejected_plugins(&self, report: &LoadReport) {
        for rejected in &report.rejected {
            let msg = format!(
                "Skipped shortcode plugin {}: {}",
                rejected.path.display(),
                rejected.reason
            );
            let _ = self.status.write_line(&self.yellow.apply_to(msg).to_string());
        }
    }

    /// List the registry in processing order.
    pub(crate) fn shortcode_table(&self, registry: &ShortcodeRegistry) {
        let header = format!("Shortcodes ({}):", registry.len());
        let _ = self
            .listing
            .write_line(&self.cyan_bold.apply_to(header).to_string());
        for entry in registry.iter() {
            let line = shortcode_line(entry);
            let line = if entry.is_callable() {
                line
            } else {
                self.yellow.apply_to(line).to_string()
            };
            let _ = self.listing.write_line(&line);
        }
    }

    /// Report a failed command.
    pub(crate) fn failure(&self, message: &str) {
        let msg = format!("Error: {message}");
        let _ = self.status.write_line(&self.red.apply_to(msg).to_string());
    }
}

/// One aligned table row: name, phase, source and a marker for unbound entries.
fn shortcode_line(entry: &RendererDescriptor) -> String {
    let status = if entry.is_callable() { "" } else { " (no renderer)" };
    format!(
        "  {:<16} {:<5} {}{status}",
        entry.name,
        entry.phase().as_str(),
        entry.source
    )
}
