use std::ops::Range;

use codespan_reporting::diagnostic::Label;

/// A byte range within one of the formula sources.
///
/// The `file` is the id assigned by the
/// [codespan_reporting::files::SimpleFiles] holding the formulas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    file: usize,
    start: usize,
    end: usize,
}

impl Location {
    pub fn new(file: usize, range: Range<usize>) -> Self {
        Self {
            file,
            start: range.start,
            end: range.end,
        }
    }

    pub fn file(&self) -> usize {
        self.file
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn primary_label(&self) -> Label<usize> {
        Label::primary(self.file, self.range())
    }

    pub fn secondary_label(&self) -> Label<usize> {
        Label::secondary(self.file, self.range())
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}..{}", self.file, self.start, self.end)
    }
}
