//! tapec code generator: compiles tape programs to loadable units.
//!
//! # Architecture
//!
//! A single left-to-right scan ([`unit::build_unit`]) pulls symbols from the
//! lexer and dispatches them:
//! - the six cell/pointer/I/O symbols go to [`instr::emit_instruction`]
//! - `[` and `]` go to the [`resolver::LoopResolver`]
//!
//! Both append to one instruction stream owned by a [`TargetEmitter`].
//! Two backends are provided:
//! - [`wasm::WasmEmitter`]: a validated WebAssembly module
//! - [`bytecode::BytecodeEmitter`]: a JSON bytecode unit for the tapec VM
//!
//! ## WASM host contract
//! - imports `env.read_byte() -> i32` (-1 at end of input) and
//!   `env.write_byte(byte: i32)`
//! - exports `execute()` (entry point), `init()`, `memory` and the
//!   `pointer` global
//!
//! See [`types`] for the index layout and [`tapec_types::tape`] for the
//! memory layout.

pub mod bytecode;
pub mod emitter;
pub mod error;
pub mod instr;
pub mod metadata;
pub mod resolver;
pub mod types;
pub mod unit;
pub mod wasm;

pub use bytecode::{BytecodeEmitter, BytecodeUnit, Instr};
pub use emitter::{LoopLabels, TargetEmitter};
pub use error::{CodegenError, CodegenResult};
pub use metadata::{UnitInfo, UnitMetadata};
pub use unit::{build_unit, check_loops, BuiltUnit, UnitStats};
pub use wasm::WasmEmitter;

use tapec_types::SourceFile;

/// Compile `source` to a WASM module.
pub fn compile_wasm(source: &SourceFile, info: &UnitInfo) -> CodegenResult<BuiltUnit<Vec<u8>>> {
    build_unit(source, info, WasmEmitter::new(info.bounds))
}

/// Compile `source` to a bytecode unit.
pub fn compile_bytecode(
    source: &SourceFile,
    info: &UnitInfo,
) -> CodegenResult<BuiltUnit<BytecodeUnit>> {
    build_unit(source, info, BytecodeEmitter::new())
}
