//! Compiler error type.

use std::path::PathBuf;

use tapec_codegen::CodegenError;
use tapec_types::CompileErrors;

/// Why a compilation failed.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// Unbalanced brackets; carries the structured diagnostics.
    #[error("{0}")]
    Syntax(CompileErrors),

    #[error("code generation failed: {0}")]
    Codegen(CodegenError),

    #[error("invalid unit name {name:?}: {reason}")]
    InvalidUnitName { name: String, reason: &'static str },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CompileError {
    /// The structured diagnostics, if this is a source error.
    pub fn diagnostics(&self) -> Option<&CompileErrors> {
        match self {
            Self::Syntax(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<CodegenError> for CompileError {
    fn from(err: CodegenError) -> Self {
        match err {
            CodegenError::UnbalancedLoops(errors) => Self::Syntax(errors),
            other => Self::Codegen(other),
        }
    }
}
