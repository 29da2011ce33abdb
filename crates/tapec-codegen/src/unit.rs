//! Unit building: the single left-to-right pass.
//!
//! 1. Scan the source lazily, one symbol at a time
//! 2. Dispatch each symbol to the instruction emitter or the loop resolver
//! 3. Check that every loop was closed
//! 4. Append the terminating return and hand the stream to the backend
//!
//! Structural errors stop the build before [`TargetEmitter::finish`] runs,
//! so a broken source never yields a packaged unit.

use serde::{Deserialize, Serialize};
use tapec_lexer::{Lexer, Symbol};
use tapec_types::{BoundsPolicy, CompileErrors, ErrorCode, SourceFile, Span, TapeError};

use crate::emitter::{LoopLabels, TargetEmitter};
use crate::error::{CodegenError, CodegenResult};
use crate::instr::emit_instruction;
use crate::metadata::UnitInfo;
use crate::resolver::{LoopResolver, ResolveError};

/// Counters describing one built unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStats {
    /// Recognised symbols, brackets included.
    pub symbols: usize,
    /// Characters skipped as commentary.
    pub ignored: usize,
    /// Matched loops.
    pub loops: usize,
    /// Deepest loop nesting.
    pub max_depth: usize,
}

/// A packaged unit plus its build counters.
#[derive(Debug, Clone)]
pub struct BuiltUnit<T> {
    pub output: T,
    pub stats: UnitStats,
}

/// Compile `source` through `emitter` and package the result.
pub fn build_unit<E: TargetEmitter>(
    source: &SourceFile,
    info: &UnitInfo,
    mut emitter: E,
) -> CodegenResult<BuiltUnit<E::Output>> {
    let mut lexer = Lexer::new(source);
    let mut resolver = LoopResolver::new();
    let mut symbols = 0;

    for token in lexer.by_ref() {
        symbols += 1;
        match token.symbol {
            Symbol::LoopOpen => resolver.open(&mut emitter, token.span),
            Symbol::LoopClose => resolver
                .close(&mut emitter, token.span)
                .map_err(|e| resolve_error(source, e))?,
            other => emit_instruction(&mut emitter, other),
        }
    }

    let loops = resolver.finish().map_err(|e| resolve_error(source, e))?;
    emitter.emit_return();
    let output = emitter.finish(info)?;

    Ok(BuiltUnit {
        output,
        stats: UnitStats {
            symbols,
            ignored: lexer.ignored(),
            loops: loops.loops,
            max_depth: loops.max_depth,
        },
    })
}

/// Check bracket balance without generating code.
pub fn check_loops(source: &SourceFile) -> CompileErrors {
    let info = UnitInfo::new("check", BoundsPolicy::Unchecked, "");
    match build_unit(source, &info, NullEmitter) {
        Err(CodegenError::UnbalancedLoops(errors)) => errors,
        // NullEmitter::finish cannot fail.
        _ => CompileErrors::empty(),
    }
}

/// Emits nothing; lets [`check_loops`] run the full pass without codegen.
struct NullEmitter;

impl TargetEmitter for NullEmitter {
    type Label = ();
    type Output = ();

    fn new_label(&mut self) {}
    fn move_pointer(&mut self, _delta: i16) {}
    fn add_cell(&mut self, _delta: i8) {}
    fn write_byte(&mut self) {}
    fn read_byte(&mut self) {}
    fn emit_loop_entry(&mut self, _labels: LoopLabels<()>) {}
    fn emit_loop_back_edge(&mut self, _labels: LoopLabels<()>) {}
    fn emit_return(&mut self) {}
    fn finish(self, _info: &UnitInfo) -> CodegenResult<()> {
        Ok(())
    }
}

// ── Diagnostics ──────────────────────────────────────────────────────────────

fn resolve_error(source: &SourceFile, err: ResolveError) -> CodegenError {
    CodegenError::UnbalancedLoops(diagnostics(source, err))
}

fn diagnostics(source: &SourceFile, err: ResolveError) -> CompileErrors {
    let mut errors = CompileErrors::empty();
    match err {
        ResolveError::UnmatchedClose(span) => errors.push_error(
            error_at(source, ErrorCode::UNMATCHED_CLOSE, "unmatched ']': no loop is open", span)
                .with_suggestion("remove this ']' or add a matching '[' before it"),
        ),
        ResolveError::UnmatchedOpen(spans) => {
            for span in spans {
                errors.push_error(
                    error_at(source, ErrorCode::UNMATCHED_OPEN, "loop opened here is never closed", span)
                        .with_suggestion("add a matching ']'"),
                );
            }
        }
    }
    errors
}

fn error_at(source: &SourceFile, code: ErrorCode, message: &str, span: Span) -> TapeError {
    let line = source.line(span.start_line).unwrap_or_default();
    TapeError::new(&source.name, code, message, span, line)
}
