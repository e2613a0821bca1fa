use std::fmt;

/// Severity class of a non-fatal problem found while executing a script.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DiagnosticKind {
    /// Malformed token, modifier or command; the line (or modifier) was skipped.
    Line,
    /// Unresolved element id or variable at its use site; that command was skipped.
    Lookup,
    /// The document collaborator failed to build one element.
    EngineFault,
}

/// A non-fatal problem tied to one script line.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// 1-based line in the executed script (or handler body).
    pub line: usize,
    pub message: String,
}

impl Diagnostic {
    pub fn line(line: usize, message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::Line,
            line,
            message: message.into(),
        }
    }

    pub fn lookup(line: usize, message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::Lookup,
            line,
            message: message.into(),
        }
    }

    pub fn engine_fault(line: usize, message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::EngineFault,
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.kind {
            DiagnosticKind::Line => "warning",
            DiagnosticKind::Lookup => "lookup",
            DiagnosticKind::EngineFault => "fault",
        };
        write!(f, "line {} {label}: {}", self.line, self.message)
    }
}

/// Collects diagnostics and mirrors each one to `tracing`.
#[derive(Debug, Default)]
pub(crate) struct DiagnosticSink {
    items: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub(crate) fn push(&mut self, d: Diagnostic) {
        tracing::warn!(line = d.line, kind = ?d.kind, "{}", d.message);
        self.items.push(d);
    }

    pub(crate) fn warn(&mut self, line: usize, message: impl Into<String>) {
        self.push(Diagnostic::line(line, message));
    }

    pub(crate) fn lookup(&mut self, line: usize, message: impl Into<String>) {
        self.push(Diagnostic::lookup(line, message));
    }

    pub(crate) fn fault(&mut self, line: usize, message: impl Into<String>) {
        self.push(Diagnostic::engine_fault(line, message));
    }

    pub(crate) fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}
