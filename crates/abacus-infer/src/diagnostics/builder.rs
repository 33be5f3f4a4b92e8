use codespan_reporting::diagnostic::{Diagnostic, Label, Severity};

use crate::diagnostics::code::DiagnosticCode;
use crate::diagnostics::collector::DiagnosticCollector;

/// Builder for creating and emitting a diagnostic.
///
/// Labels refer to formula sources by their id within the
/// [codespan_reporting::files::SimpleFiles] given to the collector.
#[must_use]
#[derive(Debug, PartialEq)]
pub struct DiagnosticBuilder {
    code: DiagnosticCode,
    diagnostic: Diagnostic<usize>,
}

impl DiagnosticBuilder {
    /// Create a new `DiagnosticBuilder` for the given code.
    ///
    /// The message is determined by the code. At least one label should be
    /// added before calling [Self::emit].
    pub(crate) fn new(code: DiagnosticCode, severity: Severity) -> Self {
        let diagnostic = Diagnostic::new(severity)
            .with_code(code.code_str())
            .with_message(code.message());

        Self { code, diagnostic }
    }

    pub fn code(&self) -> DiagnosticCode {
        self.code
    }

    pub fn is_error(&self) -> bool {
        matches!(self.code.severity(), Severity::Bug | Severity::Error)
    }

    /// Add a note to the diagnostic.
    ///
    /// Notes which can be associated with a specific part of a formula should
    /// be reported as secondary labels instead.
    pub fn with_note(mut self, note: String) -> Self {
        self.diagnostic.notes.push(note);
        self
    }

    /// Add a label to the diagnostic.
    ///
    /// Primary labels indicate the actual problem, while secondary labels
    /// point at the parts of the formula which contributed to it.
    pub fn with_label(mut self, label: Label<usize>) -> Self {
        self.diagnostic.labels.push(label);
        self
    }

    pub fn emit(self, collector: &mut DiagnosticCollector<'_>) {
        collector.add_diagnostic(self.code, self.diagnostic)
    }
}
