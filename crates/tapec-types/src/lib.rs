//! Shared types for the tapec compiler.
//!
//! This crate defines the tape model every generated program runs against,
//! source spans, and the structured diagnostics used across all compiler
//! stages.

mod error;
mod span;
pub mod tape;

pub use error::{CompileErrors, ErrorCategory, ErrorCode, Severity, TapeError, MAX_ERRORS};
pub use span::{SourceFile, Span};
pub use tape::{
    cell_address, pointer_in_bounds, BoundsPolicy, Memory, Pointer, MEMORY_SIZE, TAPE_LEN,
    TAPE_OFFSET,
};
