use codespan_reporting::diagnostic::{Diagnostic, Severity};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term::{self, Chars, Config, DisplayStyle, Styles};
use tracing::{error, info, warn};

use crate::diagnostics::DiagnosticCode;
use crate::DiagnosticBuilder;

/// Collects the diagnostic messages being reported, rendered as plain text.
pub struct DiagnosticCollector<'a> {
    files: &'a SimpleFiles<String, String>,
    collected: Vec<CollectedDiagnostic>,
    config: Config,
}

impl<'a> std::fmt::Debug for DiagnosticCollector<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosticCollector")
            .field("collected", &self.collected)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
pub struct CollectedDiagnostic {
    code: DiagnosticCode,
    pub formatted: String,
    pub message: String,
}

impl CollectedDiagnostic {
    pub fn code(&self) -> DiagnosticCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn is_error(&self) -> bool {
        matches!(self.severity(), Severity::Bug | Severity::Error)
    }
}

impl std::fmt::Display for CollectedDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.formatted)
    }
}

impl<'a> DiagnosticCollector<'a> {
    pub fn new(files: &'a SimpleFiles<String, String>) -> Self {
        Self {
            files,
            collected: Vec::new(),
            config: Config {
                chars: Chars::ascii(),
                display_style: DisplayStyle::Rich,
                tab_width: 4,
                styles: Styles::default(),
                end_context_lines: 1,
                start_context_lines: 3,
            },
        }
    }

    pub fn collect_all(&mut self, builders: impl IntoIterator<Item = DiagnosticBuilder>) {
        for builder in builders {
            builder.emit(self)
        }
    }

    /// Add a diagnostic to the collector.
    ///
    /// Rendering may fail, for instance if a label refers to a file that
    /// isn't part of the sources. In that case the diagnostic is logged at
    /// the "error" level and a generic diagnostic is collected instead, so
    /// callers never lose track of a reported problem.
    pub(super) fn add_diagnostic(&mut self, code: DiagnosticCode, diagnostic: Diagnostic<usize>) {
        let mut buffer = termcolor::Buffer::no_color();

        if let Err(err) = term::emit(&mut buffer, &self.config, self.files, &diagnostic) {
            error!(
                "Unable to report diagnostic: {:?} due to {}",
                diagnostic, err
            );
            self.collected.push(CollectedDiagnostic {
                code: DiagnosticCode::FailedToReport,
                formatted: DiagnosticCode::FailedToReport.message().to_owned(),
                message: diagnostic.message,
            });
            return;
        };

        let message = diagnostic.message.clone();
        let formatted = match String::from_utf8(buffer.into_inner()) {
            Ok(formatted) => formatted,
            Err(err) => {
                error!(
                    "Unable to report diagnostic: {:?} due to {}",
                    diagnostic, err
                );
                self.collected.push(CollectedDiagnostic {
                    code: DiagnosticCode::FailedToReport,
                    formatted: DiagnosticCode::FailedToReport.message().to_owned(),
                    message,
                });
                return;
            }
        };

        let diagnostic = CollectedDiagnostic {
            code,
            formatted,
            message,
        };

        if diagnostic.is_error() {
            warn!("Collecting fatal diagnostic:\n{}", diagnostic)
        } else {
            info!("Collecting non-fatal diagnostic:\n{}", diagnostic)
        }
        self.collected.push(diagnostic);
    }

    /// Return the count of error and bug diagnostics.
    pub fn num_errors(&self) -> usize {
        self.collected.iter().filter(|d| d.is_error()).count()
    }

    pub fn finish(self) -> Vec<CollectedDiagnostic> {
        self.collected
    }
}

#[cfg(test)]
mod tests {
    use codespan_reporting::diagnostic::Label;
    use itertools::Itertools;

    use super::*;

    #[test]
    fn test_render_diagnostic() {
        let mut files = SimpleFiles::new();
        let total = files.add("total".to_owned(), "price + \"ten\"".to_owned());
        let mut collector = DiagnosticCollector::new(&files);

        DiagnosticCode::TypeMismatch
            .builder()
            .with_note("Arguments to 'add' must have the same type".to_owned())
            .with_label(
                Label::primary(total, 8..13)
                    .with_message("type mismatch: expected Number[USD] but got Text"),
            )
            .emit(&mut collector);
        assert_eq!(collector.num_errors(), 1);

        let diagnostics = format!("{}", collector.finish().iter().format("\n"));
        insta::assert_snapshot!(diagnostics, @r###"
        error[E0101]: Type mismatch
          --> total:1:9
          |
        1 | price + "ten"
          |         ^^^^^ type mismatch: expected Number[USD] but got Text
          |
          = Arguments to 'add' must have the same type
        "###);
    }

    #[test]
    fn test_failed_to_report() {
        let files = SimpleFiles::new();
        let mut collector = DiagnosticCollector::new(&files);

        DiagnosticCode::CyclicType
            .builder()
            .with_label(Label::primary(7, 0..1))
            .emit(&mut collector);

        let collected = collector.finish();
        assert_eq!(collected.len(), 1);
        assert_eq!(collected[0].code(), DiagnosticCode::FailedToReport);
        assert_eq!(collected[0].message, "Cyclic type");
        assert!(collected[0].is_error());
    }
}
