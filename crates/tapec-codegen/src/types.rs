//! WASM layout constants for generated units.
//!
//! ```text
//! imports   0: env.read_byte() -> i32      (-1 at end of input)
//!           1: env.write_byte(i32)
//! functions 2: init()                       zero memory, pointer ← 0
//!           3: execute()                    init, then the program
//! globals   0: pointer (mut i32, always a sign-extended i16)
//! memory    0: one 64 KiB page, tape at TAPE_OFFSET
//! ```

// ── WASM type indices ────────────────────────────────────────────────────────
// (order must match emit_types in wasm.rs)

/// `() -> ()`
pub const TYPE_VOID_VOID: u32 = 0;
/// `() -> i32`
pub const TYPE_VOID_I32: u32 = 1;
/// `(i32) -> ()`
pub const TYPE_I32_VOID: u32 = 2;

// ── Imported function indices ────────────────────────────────────────────────

/// `env.read_byte() -> i32`
pub const IMPORT_READ_BYTE: u32 = 0;
/// `env.write_byte(byte: i32)`
pub const IMPORT_WRITE_BYTE: u32 = 1;

/// Number of imported functions (offset for locally-defined function indices).
pub const IMPORT_COUNT: u32 = 2;

/// Host module name for the imports.
pub const IMPORT_MODULE: &str = "env";

// ── Local function indices ───────────────────────────────────────────────────

pub const FUNC_INIT: u32 = IMPORT_COUNT;
pub const FUNC_EXECUTE: u32 = IMPORT_COUNT + 1;

// ── Globals and locals ───────────────────────────────────────────────────────

/// The tape pointer.
pub const GLOBAL_POINTER: u32 = 0;
/// Scratch local in `execute` holding a cell address.
pub const LOCAL_ADDR: u32 = 0;

// ── Memory ───────────────────────────────────────────────────────────────────

/// Linear memory size in pages (64 KiB each); fixed, never grown.
pub const MEMORY_PAGES: u64 = 1;

// ── Exports ──────────────────────────────────────────────────────────────────

pub const EXPORT_EXECUTE: &str = "execute";
pub const EXPORT_INIT: &str = "init";
pub const EXPORT_MEMORY: &str = "memory";
pub const EXPORT_POINTER: &str = "pointer";

// ── Custom section ───────────────────────────────────────────────────────────

/// Custom section name for unit metadata.
pub const CUSTOM_SECTION_NAME: &str = "tapec";
/// Compiler version embedded in unit metadata.
pub const COMPILER_VERSION: &str = env!("CARGO_PKG_VERSION");
