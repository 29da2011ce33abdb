//! Runtime error types for the evaluator and VM.

use std::fmt;

use tapec_types::{CompileErrors, Pointer};

/// Evaluation error: structural rejects, run-time traps and host I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// The source has unbalanced brackets and cannot run at all.
    UnbalancedLoops(CompileErrors),
    /// A bytecode unit that no compiler would produce.
    InvalidBytecode(String),
    /// Cell access off the tape under the checked policy.
    PointerOutOfBounds { pointer: Pointer },
    /// Gas exhaustion
    GasExhausted,
    /// Reading input or writing output failed.
    Io(String),
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnbalancedLoops(errors) => write!(f, "unbalanced loops:\n{errors}"),
            Self::InvalidBytecode(msg) => write!(f, "invalid bytecode: {msg}"),
            Self::PointerOutOfBounds { pointer } => {
                write!(f, "pointer {pointer} is outside the tape")
            }
            Self::GasExhausted => write!(f, "gas exhausted"),
            Self::Io(msg) => write!(f, "i/o error: {msg}"),
        }
    }
}

impl std::error::Error for EvalError {}

/// Result alias for evaluator operations.
pub type EvalResult<T> = Result<T, EvalError>;
