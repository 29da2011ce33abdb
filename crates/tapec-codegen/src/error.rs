//! Codegen error types.

use tapec_types::CompileErrors;
use thiserror::Error;

/// Errors that can occur while generating a unit.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// The source has an unmatched `[` or `]`.
    #[error("{0}")]
    UnbalancedLoops(CompileErrors),

    /// An internal consistency check failed.
    #[error("internal codegen error: {0}")]
    Internal(String),

    /// The generated WASM module failed validation.
    #[error("WASM validation failed: {0}")]
    ValidationFailed(String),

    /// Unit metadata or a bytecode unit could not be encoded as JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The instruction stream outgrew what the target can address.
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),
}

/// Codegen result type alias.
pub type CodegenResult<T> = Result<T, CodegenError>;
