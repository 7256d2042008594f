//! Terminal reporting for batch compiles.

use std::io::{self, Write};
use std::path::Path;

use crossterm::{queue, style};

use crate::engine::{FileOutcome, ProgressMonitor};
use crate::types::Diagnostic;

/// Prints one status line per file, followed by its diagnostics.
pub struct TerminalMonitor<W: Write> {
    out: W,
    diagnostics: usize,
}

impl TerminalMonitor<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write> TerminalMonitor<W> {
    pub fn new(out: W) -> Self {
        TerminalMonitor { out, diagnostics: 0 }
    }

    /// Diagnostics printed so far.
    pub fn diagnostic_count(&self) -> usize {
        self.diagnostics
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn print_file(&mut self, index: usize, total: usize, path: &Path, outcome: &FileOutcome<'_>) -> io::Result<()> {
        let (label, color) = match outcome {
            FileOutcome::Compiled(output) if output.diagnostics.is_empty() => ("ok", style::Color::Green),
            FileOutcome::Compiled(_) => ("ok", style::Color::Yellow),
            FileOutcome::Failed(_) => ("failed", style::Color::Red),
        };

        queue!(
            self.out,
            style::SetAttribute(style::Attribute::Dim),
            style::Print(format!("[{}/{total}] ", index + 1)),
            style::SetAttribute(style::Attribute::Reset),
            style::Print(path.display()),
            style::Print(" "),
            style::SetForegroundColor(color),
            style::SetAttribute(style::Attribute::Bold),
            style::Print(label),
            style::ResetColor,
            style::SetAttribute(style::Attribute::Reset),
            style::Print("\n"),
        )?;

        match outcome {
            FileOutcome::Compiled(output) => {
                for diagnostic in &output.diagnostics {
                    self.print_diagnostic(diagnostic)?;
                }
            }
            FileOutcome::Failed(e) => {
                queue!(self.out, style::Print(format!("    {e}\n")))?;
            }
        }
        self.out.flush()
    }

    fn print_diagnostic(&mut self, diagnostic: &Diagnostic) -> io::Result<()> {
        self.diagnostics += 1;
        queue!(
            self.out,
            style::SetForegroundColor(style::Color::Yellow),
            style::Print("    warning: "),
            style::ResetColor,
            style::Print(diagnostic),
            style::Print("\n"),
        )
    }
}

impl<W: Write> ProgressMonitor for TerminalMonitor<W> {
    fn file_done(&mut self, index: usize, total: usize, path: &Path, outcome: FileOutcome<'_>) {
        if let Err(e) = self.print_file(index, total, path, &outcome) {
            log::error!("Cannot write progress: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::CompileOutput;
    use crate::error::CompileError;

    #[test]
    fn reports_files_and_their_diagnostics() {
        let mut monitor = TerminalMonitor::new(Vec::new());
        let output = CompileOutput {
            text: String::new(),
            declarations: Vec::new(),
            diagnostics: vec![Diagnostic::new(Some("fx"), "No extension")],
        };
        monitor.file_done(0, 2, Path::new("a.scene"), FileOutcome::Compiled(&output));
        let error = CompileError::Format("expected a display list".into());
        monitor.file_done(1, 2, Path::new("b.scene"), FileOutcome::Failed(&error));

        assert_eq!(monitor.diagnostic_count(), 1);
        let text = String::from_utf8(monitor.into_inner()).unwrap();
        assert!(text.contains("[1/2] "));
        assert!(text.contains("a.scene"));
        assert!(text.contains("[fx] No extension"));
        assert!(text.contains("failed"));
        assert!(text.contains("Not a scene file: expected a display list"));
    }
}
