//! Bytecode backend: a linear instruction list with patched jump targets.
//!
//! Loops are emitted in marker form. The entry jump to the guard is a
//! forward reference, so it is written with a placeholder target and
//! recorded as a fixup; [`BytecodeEmitter::finish`] patches every fixup once
//! all labels are positioned.
//!
//! ```text
//! [ body ]  ⇒     jump  G
//!             B:  <body>
//!             G:  branch_if_positive B
//! ```

use serde::{Deserialize, Serialize};

use crate::emitter::{LoopLabels, TargetEmitter};
use crate::error::{CodegenError, CodegenResult};
use crate::metadata::{UnitInfo, UnitMetadata};

/// Target written into a jump until its label is positioned.
const UNPATCHED: u32 = u32::MAX;

/// Version of the bytecode unit JSON layout.
pub const BYTECODE_FORMAT_VERSION: u32 = 1;

/// One bytecode instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "arg", rename_all = "snake_case")]
pub enum Instr {
    /// `pointer ← pointer + n` (wrapping i16).
    MovePointer(i16),
    /// `tape[pointer] ← tape[pointer] + n` (wrapping u8).
    AddCell(i8),
    /// `tape[pointer] ← input byte`.
    Read,
    /// Output `tape[pointer]`.
    Write,
    /// Continue at the given instruction index.
    Jump(u32),
    /// Continue at the given index if `tape[pointer] > 0`.
    BranchIfPositive(u32),
    /// Leave the entry routine.
    Return,
}

/// A packaged bytecode unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BytecodeUnit {
    pub format_version: u32,
    #[serde(flatten)]
    pub metadata: UnitMetadata,
    pub instructions: Vec<Instr>,
}

impl BytecodeUnit {
    /// Serialize to the on-disk JSON form.
    pub fn to_json(&self) -> CodegenResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Parse the on-disk JSON form.
    pub fn from_json(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }
}

/// Label handle: an index into the emitter's label table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BytecodeLabel(usize);

/// Builds a [`BytecodeUnit`].
#[derive(Debug, Default)]
pub struct BytecodeEmitter {
    instrs: Vec<Instr>,
    /// Position of each label, once marked.
    labels: Vec<Option<usize>>,
    /// (instruction index, label) pairs whose target needs patching.
    fixups: Vec<(usize, BytecodeLabel)>,
}

impl BytecodeEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    fn mark(&mut self, label: BytecodeLabel) {
        self.labels[label.0] = Some(self.instrs.len());
    }

    fn push_branch(&mut self, instr: Instr, target: BytecodeLabel) {
        self.fixups.push((self.instrs.len(), target));
        self.instrs.push(instr);
    }
}

impl TargetEmitter for BytecodeEmitter {
    type Label = BytecodeLabel;
    type Output = BytecodeUnit;

    fn new_label(&mut self) -> BytecodeLabel {
        self.labels.push(None);
        BytecodeLabel(self.labels.len() - 1)
    }

    fn move_pointer(&mut self, delta: i16) {
        self.instrs.push(Instr::MovePointer(delta));
    }

    fn add_cell(&mut self, delta: i8) {
        self.instrs.push(Instr::AddCell(delta));
    }

    fn write_byte(&mut self) {
        self.instrs.push(Instr::Write);
    }

    fn read_byte(&mut self) {
        self.instrs.push(Instr::Read);
    }

    fn emit_loop_entry(&mut self, labels: LoopLabels<BytecodeLabel>) {
        self.push_branch(Instr::Jump(UNPATCHED), labels.guard);
        self.mark(labels.body);
    }

    fn emit_loop_back_edge(&mut self, labels: LoopLabels<BytecodeLabel>) {
        self.mark(labels.guard);
        self.push_branch(Instr::BranchIfPositive(UNPATCHED), labels.body);
    }

    fn emit_return(&mut self) {
        self.instrs.push(Instr::Return);
    }

    fn finish(mut self, info: &UnitInfo) -> CodegenResult<BytecodeUnit> {
        if self.instrs.len() >= UNPATCHED as usize {
            return Err(CodegenError::LimitExceeded(format!(
                "{} bytecode instructions exceed the addressable range",
                self.instrs.len()
            )));
        }

        for (at, label) in std::mem::take(&mut self.fixups) {
            let target = self.labels[label.0]
                .ok_or_else(|| CodegenError::Internal(format!("label {} never marked", label.0)))?
                as u32;
            match &mut self.instrs[at] {
                Instr::Jump(t) | Instr::BranchIfPositive(t) => *t = target,
                other => {
                    return Err(CodegenError::Internal(format!(
                        "fixup at {at} points at non-branch {other:?}"
                    )))
                }
            }
        }

        Ok(BytecodeUnit {
            format_version: BYTECODE_FORMAT_VERSION,
            metadata: UnitMetadata::new(info),
            instructions: self.instrs,
        })
    }
}
