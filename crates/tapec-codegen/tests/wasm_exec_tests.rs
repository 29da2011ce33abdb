//! Execution tests: compiled units run under wasmi.
//!
//! The host side implements the `env.read_byte` / `env.write_byte` contract
//! over in-memory buffers, then inspects the exported memory and pointer.

use std::collections::VecDeque;

use tapec_codegen::{compile_wasm, UnitInfo};
use tapec_types::{BoundsPolicy, SourceFile, TAPE_OFFSET};

// ══════════════════════════════════════════════════════════════════════════════
// WasmRunner: instantiate a compiled unit via wasmi
// ══════════════════════════════════════════════════════════════════════════════

/// Host state held by the wasmi Store.
#[derive(Default)]
struct HostState {
    /// Bytes returned by `env.read_byte`, front first.
    input: VecDeque<u8>,
    /// Bytes passed to `env.write_byte`.
    output: Vec<u8>,
}

struct WasmRunner {
    store: wasmi::Store<HostState>,
    instance: wasmi::Instance,
    memory: wasmi::Memory,
}

impl WasmRunner {
    fn new(wasm_bytes: &[u8], input: &[u8]) -> Self {
        let engine = wasmi::Engine::default();
        let module =
            wasmi::Module::new(&engine, wasm_bytes).expect("failed to parse WASM module");

        let host = HostState {
            input: input.iter().copied().collect(),
            output: Vec::new(),
        };
        let mut store = wasmi::Store::new(&engine, host);
        let mut linker = <wasmi::Linker<HostState>>::new(&engine);

        // env.read_byte() -> i32, -1 once input is exhausted
        linker
            .func_wrap(
                "env",
                "read_byte",
                |mut caller: wasmi::Caller<'_, HostState>| -> i32 {
                    caller
                        .data_mut()
                        .input
                        .pop_front()
                        .map(i32::from)
                        .unwrap_or(-1)
                },
            )
            .expect("link read_byte");

        // env.write_byte(byte: i32)
        linker
            .func_wrap(
                "env",
                "write_byte",
                |mut caller: wasmi::Caller<'_, HostState>, byte: i32| {
                    caller.data_mut().output.push(byte as u8);
                },
            )
            .expect("link write_byte");

        let instance = linker
            .instantiate(&mut store, &module)
            .expect("instantiation failed")
            .start(&mut store)
            .expect("start failed");

        let memory = instance
            .get_memory(&store, "memory")
            .expect("no memory export");

        Self {
            store,
            instance,
            memory,
        }
    }

    /// Call `execute()`.
    fn execute(&mut self) -> Result<(), wasmi::Error> {
        let execute = self
            .instance
            .get_typed_func::<(), ()>(&self.store, "execute")
            .expect("no execute export");
        execute.call(&mut self.store, ())
    }

    fn output(&self) -> &[u8] {
        &self.store.data().output
    }

    /// Cell `index` of the tape; negative indices read the guard region.
    fn cell(&self, index: i32) -> u8 {
        let addr = (TAPE_OFFSET as i32 + index) as usize;
        self.memory.data(&self.store)[addr]
    }

    fn pointer(&self) -> i32 {
        let global = self
            .instance
            .get_global(&self.store, "pointer")
            .expect("no pointer export");
        match global.get(&self.store) {
            wasmi::Val::I32(v) => v,
            other => panic!("pointer is not i32: {other:?}"),
        }
    }
}

/// Compile and run `source` once.
fn run_with(source: &str, input: &[u8], bounds: BoundsPolicy) -> (WasmRunner, Result<(), wasmi::Error>) {
    let sf = SourceFile::new("test.bf", source);
    let info = UnitInfo::new("test", bounds, "");
    let wasm = compile_wasm(&sf, &info)
        .unwrap_or_else(|e| panic!("codegen failed: {e}"))
        .output;
    let mut runner = WasmRunner::new(&wasm, input);
    let result = runner.execute();
    (runner, result)
}

fn run(source: &str, input: &[u8]) -> WasmRunner {
    let (runner, result) = run_with(source, input, BoundsPolicy::Unchecked);
    result.expect("execute() trapped");
    runner
}

// ══════════════════════════════════════════════════════════════════════════════
// Cells and Output
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn increments_then_outputs() {
    assert_eq!(run("+++.", b"").output(), &[3]);
}

#[test]
fn decrement_wraps_to_255() {
    let r = run("-.", b"");
    assert_eq!(r.output(), &[255]);
    assert_eq!(r.cell(0), 255);
}

#[test]
fn increment_wraps_to_zero() {
    let r = run(&"+".repeat(256), b"");
    assert_eq!(r.cell(0), 0);
}

#[test]
fn pointer_moves_between_cells() {
    let r = run("+>++>+++<", b"");
    assert_eq!((r.cell(0), r.cell(1), r.cell(2)), (1, 2, 3));
    assert_eq!(r.pointer(), 1);
}

#[test]
fn hello_world() {
    let program = "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";
    assert_eq!(run(program, b"").output(), b"Hello World!\n");
}

// ══════════════════════════════════════════════════════════════════════════════
// Loops
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn loop_moves_value_right() {
    let r = run("+[>+<-]", b"");
    assert_eq!(r.cell(0), 0);
    assert_eq!(r.cell(1), 1);
}

#[test]
fn empty_loop_on_zero_cell_completes() {
    let r = run("[]", b"");
    assert!(r.output().is_empty());
    assert_eq!(r.pointer(), 0);
}

#[test]
fn loop_body_skipped_when_cell_is_zero() {
    assert!(run("[.+]", b"").output().is_empty());
}

#[test]
fn nested_loops_multiply() {
    let r = run("++[>+++[>+<-]<-]>>.", b"");
    assert_eq!(r.output(), &[6]);
    assert_eq!(r.cell(0), 0);
    assert_eq!(r.cell(1), 0);
}

#[test]
fn clear_loop_zeroes_cell() {
    let r = run("+++++[-]", b"");
    assert_eq!(r.cell(0), 0);
}

// ══════════════════════════════════════════════════════════════════════════════
// Input
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn input_echo() {
    assert_eq!(run(",.,.,.", b"abc").output(), b"abc");
}

#[test]
fn end_of_input_stores_255() {
    let r = run(",", b"");
    assert_eq!(r.cell(0), 255);
}

#[test]
fn read_until_eof_marker() {
    // Echo while the byte read is not 255 (+1 turns it into 0).
    let r = run(",+[-.,+]", b"hi");
    assert_eq!(r.output(), b"hi");
}

// ══════════════════════════════════════════════════════════════════════════════
// Pointer Bounds
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn unchecked_left_of_origin_uses_guard_region() {
    let r = run("<+", b"");
    assert_eq!(r.pointer(), -1);
    assert_eq!(r.cell(-1), 1);
}

#[test]
fn pointer_wraps_as_i16() {
    let r = run(&">".repeat(32768), b"");
    assert_eq!(r.pointer(), -32768);
}

#[test]
fn checked_negative_pointer_traps() {
    let (r, result) = run_with("<+", b"", BoundsPolicy::Checked);
    assert!(result.is_err());
    assert_eq!(r.cell(-1), 0);
}

#[test]
fn checked_past_last_cell_traps() {
    let source = format!("{}.", ">".repeat(0x7FFF));
    let (r, result) = run_with(&source, b"", BoundsPolicy::Checked);
    assert!(result.is_err());
    assert!(r.output().is_empty());
}

#[test]
fn checked_moves_alone_do_not_trap() {
    let (r, result) = run_with("<<>>+.", b"", BoundsPolicy::Checked);
    result.expect("in-bounds access trapped");
    assert_eq!(r.output(), &[1]);
}

#[test]
fn checked_last_cell_is_accessible() {
    let source = format!("{}+.", ">".repeat(0x7FFE));
    let (r, result) = run_with(&source, b"", BoundsPolicy::Checked);
    result.expect("last cell trapped");
    assert_eq!(r.output(), &[1]);
}

// ══════════════════════════════════════════════════════════════════════════════
// Re-entry
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn execute_resets_tape_each_call() {
    let mut r = run("+>+.", b"");
    r.execute().expect("second execute() trapped");
    assert_eq!(r.output(), &[1, 1]);
    assert_eq!(r.cell(0), 1);
    assert_eq!(r.pointer(), 1);
}
