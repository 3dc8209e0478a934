//! Diagnostic rendering backends.

use crate::diagnostic::Diagnostic;

/// Trait for rendering diagnostics into formatted output strings.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic into a formatted string.
    fn render(&self, diag: &Diagnostic) -> String;
}

/// Renders diagnostics as compact log lines.
///
/// Produces output like:
/// ```text
/// warning[T001]: port lut_0.I0, connected to net 'n3', has negative timing budget of -0.250000ns
///    = note: ...
///    = help: ...
/// ```
pub struct TerminalRenderer {
    /// Whether to use ANSI color codes in output.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        let mut out = String::new();

        if self.color {
            out.push_str(&format!(
                "{}{}[{}]\x1b[0m: {}",
                diag.severity.ansi_color(),
                diag.severity,
                diag.code,
                diag.message
            ));
        } else {
            out.push_str(&format!(
                "{}[{}]: {}",
                diag.severity, diag.code, diag.message
            ));
        }

        for note in &diag.notes {
            out.push_str(&format!("\n   = note: {note}"));
        }
        for help in &diag.help {
            out.push_str(&format!("\n   = help: {help}"));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{Category, DiagnosticCode};

    #[test]
    fn render_plain_warning() {
        let diag = Diagnostic::warning(
            DiagnosticCode::new(Category::Timing, 1),
            "negative timing budget",
        );
        let out = TerminalRenderer::new(false).render(&diag);
        assert_eq!(out, "warning[T001]: negative timing budget");
    }

    #[test]
    fn render_notes_and_help() {
        let diag = Diagnostic::note(DiagnosticCode::new(Category::Timing, 103), "Checksum: 0x1")
            .with_note("computed over placement and budgets")
            .with_help("compare across runs");
        let out = TerminalRenderer::new(false).render(&diag);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "info[T103]: Checksum: 0x1");
        assert!(lines[1].contains("= note: computed over"));
        assert!(lines[2].contains("= help: compare"));
    }

    #[test]
    fn render_with_color() {
        let diag = Diagnostic::error(DiagnosticCode::new(Category::Netlist, 3), "bad");
        let out = TerminalRenderer::new(true).render(&diag);
        assert!(out.starts_with("\x1b[31merror[N003]\x1b[0m"));
        assert!(out.ends_with(": bad"));
    }
}
