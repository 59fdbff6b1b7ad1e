//! Evaluation errors.

use thiserror::Error;
use tycat_core::Diagnostics;

/// Errors that can occur while evaluating a checked program.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// A `throw` that nothing caught. The message is the thrown error's
    /// `message`, or the thrown value's string form.
    #[error("uncaught error: {message}")]
    Thrown { message: String },
    /// Runtime type failure, e.g. reading a property of `undefined`.
    #[error("type error: {message}")]
    TypeError { message: String },
    #[error("{name} is not defined")]
    UnknownName { name: String },
    #[error("{what} is not a function")]
    NotCallable { what: String },
    /// The step limit ran out, typically inside an unbounded loop.
    #[error("evaluation did not finish within {limit} steps")]
    Diverged { limit: u64 },
    #[error("maximum call depth of {limit} exceeded")]
    CallDepth { limit: usize },
}

impl EvalError {
    pub(crate) fn type_error(message: impl Into<String>) -> Self {
        EvalError::TypeError {
            message: message.into(),
        }
    }
}

/// Failure of check-then-evaluate.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("{0}")]
    Rejected(Diagnostics),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl From<Diagnostics> for RunError {
    fn from(d: Diagnostics) -> Self {
        RunError::Rejected(d)
    }
}

impl RunError {
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            RunError::Rejected(d) => serde_json::json!({
                "error": "rejected",
                "diagnostics": d.iter().map(|x| x.to_json_value()).collect::<Vec<_>>(),
            }),
            RunError::Eval(e) => serde_json::json!({
                "error": "eval",
                "message": e.to_string(),
            }),
        }
    }
}
