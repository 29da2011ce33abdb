//! Bytecode VM: runs a [`BytecodeUnit`] produced by the bytecode backend.

use tapec_codegen::{BytecodeUnit, Instr};

use crate::error::{EvalError, EvalResult};
use crate::io::{ByteSink, ByteSource};
use crate::machine::Machine;

/// A verified bytecode unit.
#[derive(Debug, Clone, Copy)]
pub struct Vm<'u> {
    unit: &'u BytecodeUnit,
}

impl<'u> Vm<'u> {
    /// Check that every branch target lies inside the unit.
    pub fn new(unit: &'u BytecodeUnit) -> EvalResult<Self> {
        let len = unit.instructions.len();
        for (at, instr) in unit.instructions.iter().enumerate() {
            if let Instr::Jump(target) | Instr::BranchIfPositive(target) = *instr {
                if target as usize >= len {
                    return Err(EvalError::InvalidBytecode(format!(
                        "instruction {at} branches to {target}, past the end ({len})"
                    )));
                }
            }
        }
        Ok(Self { unit })
    }

    pub fn unit(&self) -> &'u BytecodeUnit {
        self.unit
    }

    /// Run the entry routine until `return` (or the end of the list).
    pub fn run(
        &self,
        machine: &mut Machine,
        input: &mut dyn ByteSource,
        output: &mut dyn ByteSink,
    ) -> EvalResult<()> {
        let instrs = &self.unit.instructions;
        let mut pc = 0;
        while let Some(&instr) = instrs.get(pc) {
            machine.tick()?;
            match instr {
                Instr::MovePointer(delta) => machine.move_pointer(delta),
                Instr::AddCell(delta) => machine.add_cell(delta)?,
                Instr::Read => machine.read(input)?,
                Instr::Write => machine.write(output)?,
                Instr::Jump(target) => {
                    pc = target as usize;
                    continue;
                }
                Instr::BranchIfPositive(target) => {
                    if machine.cell()? > 0 {
                        pc = target as usize;
                        continue;
                    }
                }
                Instr::Return => return Ok(()),
            }
            pc += 1;
        }
        Ok(())
    }
}
