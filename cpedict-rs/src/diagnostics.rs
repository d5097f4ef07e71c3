//! Recoverable anomalies recorded while parsing.
//!
//! The parser never aborts a whole document for a problem contained in one
//! catalog entry or vendor subtree. Instead it records a [`Diagnostic`] here
//! and continues, so the caller can inspect afterwards what was skipped.

use std::fmt;

/// Kinds of recoverable anomalies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// An element the vocabulary does not define at that position.
    UnknownElement,
    /// A catalog entry name could not be parsed; the entry is kept unnamed.
    NameRejected,
    /// A catalog entry was dropped after a failure inside it.
    EntrySkipped,
    /// A vendor subtree was dropped after a failure inside it.
    VendorSkipped,
    /// A catalog entry stopped at an unexpected child and was kept partially.
    EntryTruncated,
    /// A component tree node appeared without its proper parent node.
    MisplacedElement,
}

impl DiagnosticKind {
    /// Returns a short label for this kind.
    pub fn label(&self) -> &'static str {
        match self {
            DiagnosticKind::UnknownElement => "unknown-element",
            DiagnosticKind::NameRejected => "name-rejected",
            DiagnosticKind::EntrySkipped => "entry-skipped",
            DiagnosticKind::VendorSkipped => "vendor-skipped",
            DiagnosticKind::EntryTruncated => "entry-truncated",
            DiagnosticKind::MisplacedElement => "misplaced-element",
        }
    }
}

/// A single recorded anomaly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Qualified name of the element that triggered it.
    pub element: String,
    /// Byte offset in the source where the reader stood.
    pub position: u64,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] <{}> at byte {}: {}",
            self.kind.label(),
            self.element,
            self.position,
            self.message
        )
    }
}

/// Ordered collection of diagnostics for one parse.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Diagnostics {
            entries: Vec::new(),
        }
    }

    /// Records a diagnostic.
    pub fn record(
        &mut self,
        kind: DiagnosticKind,
        element: impl Into<String>,
        position: u64,
        message: impl Into<String>,
    ) {
        let diagnostic = Diagnostic {
            kind,
            element: element.into(),
            position,
            message: message.into(),
        };
        tracing::warn!("{}", diagnostic);
        self.entries.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Returns the diagnostics of one kind, in the order they were recorded.
    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.kind == kind)
    }

    /// Returns how many diagnostics of one kind were recorded.
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.of_kind(kind).count()
    }

    /// Writes every diagnostic, one per line.
    pub fn write_report<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for diagnostic in &self.entries {
            writeln!(writer, "{}", diagnostic)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_count() {
        let mut diags = Diagnostics::new();
        assert!(diags.is_empty());

        diags.record(DiagnosticKind::UnknownElement, "foo", 10, "unexpected");
        diags.record(DiagnosticKind::EntrySkipped, "cpe-item", 42, "bad entry");
        diags.record(DiagnosticKind::UnknownElement, "bar", 90, "unexpected");

        assert_eq!(diags.len(), 3);
        assert_eq!(diags.count(DiagnosticKind::UnknownElement), 2);
        assert_eq!(diags.count(DiagnosticKind::VendorSkipped), 0);

        let names: Vec<&str> = diags
            .of_kind(DiagnosticKind::UnknownElement)
            .map(|d| d.element.as_str())
            .collect();
        assert_eq!(names, vec!["foo", "bar"]);
    }

    #[test]
    fn test_report_format() {
        let mut diags = Diagnostics::new();
        diags.record(DiagnosticKind::VendorSkipped, "vendor", 7, "bad part");

        let mut out = Vec::new();
        diags.write_report(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "[vendor-skipped] <vendor> at byte 7: bad part\n");
    }
}
