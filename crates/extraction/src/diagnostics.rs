//! Per-request diagnostic notes
//!
//! Every note is mirrored to `tracing` and kept on the result so callers and
//! tests can inspect what each stage did.

use routine_common::models::{Diagnostic, DiagnosticLevel};

#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    notes: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn debug(&mut self, stage: &str, message: impl Into<String>) {
        self.push(DiagnosticLevel::Debug, stage, message.into());
    }

    pub fn info(&mut self, stage: &str, message: impl Into<String>) {
        self.push(DiagnosticLevel::Info, stage, message.into());
    }

    pub fn warn(&mut self, stage: &str, message: impl Into<String>) {
        self.push(DiagnosticLevel::Warn, stage, message.into());
    }

    fn push(&mut self, level: DiagnosticLevel, stage: &str, message: String) {
        match level {
            DiagnosticLevel::Debug => tracing::debug!(stage = stage, "{}", message),
            DiagnosticLevel::Info => tracing::info!(stage = stage, "{}", message),
            DiagnosticLevel::Warn => tracing::warn!(stage = stage, "{}", message),
        }
        self.notes.push(Diagnostic {
            level,
            stage: stage.to_string(),
            message,
        });
    }

    pub fn notes(&self) -> &[Diagnostic] {
        &self.notes
    }

    /// Notes at `level` or above
    pub fn at_least(&self, level: DiagnosticLevel) -> impl Iterator<Item = &Diagnostic> {
        self.notes.iter().filter(move |d| d.level >= level)
    }

    pub fn into_notes(self) -> Vec<Diagnostic> {
        self.notes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_filtered() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.debug("tabular", "row 3 parsed");
        diagnostics.warn("tabular", "row 4 skipped");

        assert_eq!(diagnostics.notes().len(), 2);
        let warnings: Vec<_> = diagnostics.at_least(DiagnosticLevel::Warn).collect();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].stage, "tabular");
        assert_eq!(warnings[0].message, "row 4 skipped");
    }
}
