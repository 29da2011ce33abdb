//! Determinism and cross-executor parity tests.
//!
//! 1. Compiling the same source repeatedly yields identical artifacts.
//! 2. The WASM unit (run under wasmi), the bytecode VM and the reference
//!    evaluator agree on output and final tape state for every program,
//!    including ones that walk off the tape.

use std::collections::VecDeque;

use tapec_codegen::BytecodeUnit;
use tapec_compiler::{compile_to_result, CompileOptions, Target};
use tapec_eval::{evaluate, run_bytecode, EvalError, Execution};
use tapec_types::{BoundsPolicy, Memory, MEMORY_SIZE};

// ══════════════════════════════════════════════════════════════════════════════
// WasmRunner: instantiate a compiled unit via wasmi
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Default)]
struct HostState {
    input: VecDeque<u8>,
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

    fn execute(&mut self) -> Result<(), wasmi::Error> {
        let execute = self
            .instance
            .get_typed_func::<(), ()>(&self.store, "execute")
            .expect("no execute export");
        execute.call(&mut self.store, ())
    }

    fn pointer(&self) -> i16 {
        let global = self
            .instance
            .get_global(&self.store, "pointer")
            .expect("no pointer export");
        match global.get(&self.store) {
            wasmi::Val::I32(v) => v as i16,
            other => panic!("pointer is not i32: {other:?}"),
        }
    }

    /// Machine state in the evaluator's representation.
    fn snapshot(&self) -> Memory {
        let image = &self.memory.data(&self.store)[..MEMORY_SIZE];
        Memory::from_image(image, self.pointer()).expect("memory smaller than one page")
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

fn artifact(source: &str, target: Target, bounds: BoundsPolicy) -> Vec<u8> {
    let result = compile_to_result(source, "parity.bf", "parity", &CompileOptions::new(target, bounds));
    assert!(result.success, "compile failed: {:?}", result.errors);
    result.artifact.expect("artifact on success")
}

fn run_wasm(source: &str, input: &[u8], bounds: BoundsPolicy) -> Result<(Vec<u8>, Memory), ()> {
    let wasm = artifact(source, Target::Wasm, bounds);
    let mut runner = WasmRunner::new(&wasm, input);
    runner.execute().map_err(|_| ())?;
    Ok((runner.store.data().output.clone(), runner.snapshot()))
}

fn run_vm(source: &str, input: &[u8], bounds: BoundsPolicy) -> Result<Execution, EvalError> {
    let json = artifact(source, Target::Bytecode, bounds);
    let unit = BytecodeUnit::from_json(&json).expect("bytecode did not parse");
    run_bytecode(&unit, input)
}

/// Assert all three executors agree on a successful run.
fn assert_parity(source: &str, input: &[u8]) {
    let eval = evaluate(source, input, BoundsPolicy::Unchecked)
        .unwrap_or_else(|e| panic!("evaluator failed on {source:?}: {e}"));
    let vm = run_vm(source, input, BoundsPolicy::Unchecked)
        .unwrap_or_else(|e| panic!("vm failed on {source:?}: {e}"));
    let (wasm_out, wasm_mem) = run_wasm(source, input, BoundsPolicy::Unchecked)
        .unwrap_or_else(|_| panic!("wasm trapped on {source:?}"));

    assert_eq!(vm.output, eval.output, "vm output for {source:?}");
    assert_eq!(wasm_out, eval.output, "wasm output for {source:?}");
    assert_eq!(vm.memory, eval.memory, "vm state for {source:?}");
    assert!(wasm_mem == eval.memory, "wasm state for {source:?}");
}

const HELLO: &str = "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";

// ══════════════════════════════════════════════════════════════════════════════
// 1. Determinism
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn wasm_compilation_is_deterministic() {
    let reference = artifact(HELLO, Target::Wasm, BoundsPolicy::Unchecked);
    for _ in 0..100 {
        assert_eq!(artifact(HELLO, Target::Wasm, BoundsPolicy::Unchecked), reference);
    }
}

#[test]
fn bytecode_compilation_is_deterministic() {
    let reference = artifact(HELLO, Target::Bytecode, BoundsPolicy::Checked);
    for _ in 0..100 {
        assert_eq!(artifact(HELLO, Target::Bytecode, BoundsPolicy::Checked), reference);
    }
}

#[test]
fn repeated_wasm_runs_are_identical() {
    let mut reference = None;
    for _ in 0..20 {
        let run = run_wasm(HELLO, b"", BoundsPolicy::Unchecked).expect("trapped");
        if let Some(ref prev) = reference {
            assert!(&run == prev);
        }
        reference = Some(run);
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// 2. Parity
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn parity_basic_programs() {
    assert_parity("", b"");
    assert_parity("+++.", b"");
    assert_parity("+[>+<-]", b"");
    assert_parity("[]", b"");
    assert_parity("-.", b"");
}

#[test]
fn parity_hello_world() {
    assert_parity(HELLO, b"");
}

#[test]
fn parity_input_and_eof() {
    assert_parity(",.,.,.", b"xy");
    assert_parity(",+[-.,+]", b"echo until eof");
}

#[test]
fn parity_nested_loops() {
    assert_parity("++[>+++[>++[>+<-]<-]<-]>>>.", b"");
}

#[test]
fn parity_off_tape_unchecked() {
    // Negative pointers and the byte past the last cell alias the guard bytes
    // identically in every executor.
    assert_parity("<<<+++>>>-", b"");
    assert_parity(&format!("{}+<+", ">".repeat(0x7FFF)), b"");
    assert_parity(&format!("{}-", "<".repeat(0x8000)), b"");
}

#[test]
fn parity_checked_out_of_bounds_fails_everywhere() {
    let past_end = format!("{}+", ">".repeat(0x7FFF));
    for source in ["<+", "<.", "<,", "<[]", past_end.as_str()] {
        assert!(
            matches!(
                evaluate(source, b"", BoundsPolicy::Checked),
                Err(EvalError::PointerOutOfBounds { .. })
            ),
            "evaluator {source:?}"
        );
        assert!(
            matches!(
                run_vm(source, b"", BoundsPolicy::Checked),
                Err(EvalError::PointerOutOfBounds { .. })
            ),
            "vm {source:?}"
        );
        assert!(run_wasm(source, b"", BoundsPolicy::Checked).is_err(), "wasm {source:?}");
    }
}

#[test]
fn parity_checked_in_bounds_matches_unchecked() {
    let checked = run_wasm(HELLO, b"", BoundsPolicy::Checked).expect("trapped");
    let unchecked = run_wasm(HELLO, b"", BoundsPolicy::Unchecked).expect("trapped");
    assert!(checked == unchecked);
}

#[test]
fn parity_wrapping_loops() {
    // 255 iterations each way around the cell range.
    assert_parity("-[-]+.", b"");
    assert_parity("+[+]>-.", b"");
}
