use std::fmt;

/// Convenience result type used across the scripting engine.
pub type ScriptResult<T> = Result<T, ScriptError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Only [`ScriptError::TypeCheck`] aborts a whole script. Per-line problems are reported as
/// [`Diagnostic`](crate::Diagnostic) values instead of errors.
#[derive(thiserror::Error, Debug)]
pub enum ScriptError {
    /// Invalid user-provided data outside of a script (config, arguments).
    #[error("validation error: {0}")]
    Validation(String),

    /// The whole-script static pass rejected the script before any mutation.
    #[error("type check failed: {0}")]
    TypeCheck(TypeCheckFailure),

    /// Errors while evaluating expressions.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScriptError {
    /// Build a [`ScriptError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ScriptError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`ScriptError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

/// One problem found by the type checker.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TypeDiagnostic {
    /// 1-based script line.
    pub line: usize,
    /// Script file name, when the script came from a file.
    pub source: Option<String>,
    pub message: String,
}

impl fmt::Display for TypeDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{}:{}:1: {}", source, self.line, self.message),
            None => write!(f, "Line {}: {}", self.line, self.message),
        }
    }
}

/// All problems found by one type-check pass. Never empty.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TypeCheckFailure {
    pub diagnostics: Vec<TypeDiagnostic>,
}

impl TypeCheckFailure {
    /// Short notice suitable for a single user-facing message.
    pub fn notice(&self) -> String {
        let first = self
            .diagnostics
            .first()
            .map(ToString::to_string)
            .unwrap_or_default();
        match self.diagnostics.len() {
            0 | 1 => first,
            n => format!("{first} (and {} more)", n - 1),
        }
    }
}

impl fmt::Display for TypeCheckFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, d) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{d}")?;
        }
        Ok(())
    }
}

impl std::error::Error for TypeCheckFailure {}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
