//! Execution state shared by the evaluator and the VM.

use tapec_types::{BoundsPolicy, Memory};

use crate::error::{EvalError, EvalResult};
use crate::io::{ByteSink, ByteSource};

/// Gas limit used when the caller does not pick one.
pub const DEFAULT_GAS_LIMIT: u64 = 100_000_000;

/// Tape, pointer and gas for one run.
#[derive(Debug, Clone)]
pub struct Machine {
    pub memory: Memory,
    pub bounds: BoundsPolicy,
    /// Gas counter: one unit per executed instruction.
    pub gas: u64,
    /// Gas limit.
    pub gas_limit: u64,
}

impl Machine {
    pub fn new(bounds: BoundsPolicy, gas_limit: u64) -> Self {
        Self {
            memory: Memory::new(),
            bounds,
            gas: 0,
            gas_limit,
        }
    }

    /// Consume one unit of gas. Returns error if exhausted.
    pub fn tick(&mut self) -> EvalResult<()> {
        self.gas += 1;
        if self.gas > self.gas_limit {
            Err(EvalError::GasExhausted)
        } else {
            Ok(())
        }
    }

    fn check_access(&self) -> EvalResult<()> {
        let pointer = self.memory.pointer();
        if self.bounds.permits(pointer) {
            Ok(())
        } else {
            Err(EvalError::PointerOutOfBounds { pointer })
        }
    }

    pub fn move_pointer(&mut self, delta: i16) {
        self.memory.move_pointer(delta);
    }

    /// Current cell value.
    pub fn cell(&self) -> EvalResult<u8> {
        self.check_access()?;
        Ok(self.memory.cell())
    }

    pub fn add_cell(&mut self, delta: i8) -> EvalResult<()> {
        self.check_access()?;
        self.memory.add_cell(delta);
        Ok(())
    }

    /// `,`: store the next input byte, or 255 at end of input.
    pub fn read(&mut self, input: &mut dyn ByteSource) -> EvalResult<()> {
        self.check_access()?;
        let byte = input.read_byte()?.unwrap_or(u8::MAX);
        self.memory.set_cell(byte);
        Ok(())
    }

    /// `.`: emit the current cell.
    pub fn write(&mut self, output: &mut dyn ByteSink) -> EvalResult<()> {
        let byte = self.cell()?;
        output.write_byte(byte)
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new(BoundsPolicy::Unchecked, DEFAULT_GAS_LIMIT)
    }
}
