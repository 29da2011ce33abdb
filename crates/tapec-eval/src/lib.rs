//! tapec evaluator: reference execution semantics.
//!
//! Two executors share one [`Machine`] model (the 64 KiB tape region from
//! [`tapec_types::tape`], wrapping cells and pointer, 255 at end of input):
//! - [`Evaluator`] runs source text directly and is the golden reference
//! - [`Vm`] runs bytecode units from the bytecode backend
//!
//! Both charge one unit of gas per executed instruction so that runaway
//! programs stop with [`EvalError::GasExhausted`].

pub mod error;
pub mod evaluator;
pub mod io;
pub mod machine;
pub mod vm;

pub use error::{EvalError, EvalResult};
pub use evaluator::Evaluator;
pub use io::{ByteSink, ByteSource, IoSink, IoSource};
pub use machine::{Machine, DEFAULT_GAS_LIMIT};
pub use vm::Vm;

use tapec_codegen::BytecodeUnit;
use tapec_types::{BoundsPolicy, Memory, SourceFile};

/// Everything observable after a completed run.
#[derive(Debug, Clone)]
pub struct Execution {
    pub output: Vec<u8>,
    pub memory: Memory,
    /// Gas consumed.
    pub gas: u64,
}

/// Evaluate `source` against `input` with the default gas limit.
pub fn evaluate(source: &str, input: &[u8], bounds: BoundsPolicy) -> EvalResult<Execution> {
    evaluate_with_gas_limit(source, input, bounds, DEFAULT_GAS_LIMIT)
}

pub fn evaluate_with_gas_limit(
    source: &str,
    input: &[u8],
    bounds: BoundsPolicy,
    gas_limit: u64,
) -> EvalResult<Execution> {
    let evaluator = Evaluator::new(&SourceFile::new("<eval>", source))?;
    let mut machine = Machine::new(bounds, gas_limit);
    let mut input = input;
    let mut output = Vec::new();
    evaluator.run(&mut machine, &mut input, &mut output)?;
    Ok(Execution {
        output,
        memory: machine.memory,
        gas: machine.gas,
    })
}

/// Run a bytecode unit against `input` under the bounds policy it was
/// compiled with.
pub fn run_bytecode(unit: &BytecodeUnit, input: &[u8]) -> EvalResult<Execution> {
    run_bytecode_with_gas_limit(unit, input, DEFAULT_GAS_LIMIT)
}

pub fn run_bytecode_with_gas_limit(
    unit: &BytecodeUnit,
    input: &[u8],
    gas_limit: u64,
) -> EvalResult<Execution> {
    let vm = Vm::new(unit)?;
    let mut machine = Machine::new(unit.metadata.bounds, gas_limit);
    let mut input = input;
    let mut output = Vec::new();
    vm.run(&mut machine, &mut input, &mut output)?;
    Ok(Execution {
        output,
        memory: machine.memory,
        gas: machine.gas,
    })
}
