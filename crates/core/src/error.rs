use serde::{Deserialize, Serialize};
use std::fmt;

/// The front-end phase that produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Lex,
    Parse,
    Check,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Lex => write!(f, "lex"),
            Phase::Parse => write!(f, "parse"),
            Phase::Check => write!(f, "check"),
        }
    }
}

/// A front-end diagnostic: syntax errors and static-check violations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, thiserror::Error)]
#[error("{file}:{line}: {phase} error: {message}")]
pub struct Diagnostic {
    pub phase: Phase,
    pub file: String,
    pub line: u32,
    pub message: String,
}

impl Diagnostic {
    pub fn new(phase: Phase, file: &str, line: u32, message: impl Into<String>) -> Self {
        Diagnostic {
            phase,
            file: file.to_owned(),
            line,
            message: message.into(),
        }
    }

    pub fn lex(file: &str, line: u32, message: impl Into<String>) -> Self {
        Diagnostic::new(Phase::Lex, file, line, message)
    }

    pub fn parse(file: &str, line: u32, message: impl Into<String>) -> Self {
        Diagnostic::new(Phase::Parse, file, line, message)
    }

    pub fn check(file: &str, line: u32, message: impl Into<String>) -> Self {
        Diagnostic::new(Phase::Check, file, line, message)
    }

    /// Serialize to JSON with every field present.
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "file":    self.file,
            "line":    self.line,
            "message": self.message,
            "phase":   self.phase,
        })
    }
}

/// One or more diagnostics from a single front-end run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub struct Diagnostics(pub Vec<Diagnostic>);

impl Diagnostics {
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if any diagnostic message contains `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        self.0.iter().any(|d| d.message.contains(needle))
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", d)?;
        }
        Ok(())
    }
}

impl From<Diagnostic> for Diagnostics {
    fn from(d: Diagnostic) -> Self {
        Diagnostics(vec![d])
    }
}
