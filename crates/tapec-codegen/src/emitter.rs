//! The target emitter capability.
//!
//! A [`TargetEmitter`] owns one linear instruction stream and knows how to
//! express each tape operation in its target format. The scan logic in
//! [`crate::unit`] and the loop bookkeeping in [`crate::resolver`] only ever
//! talk to this trait, so a new output format needs nothing but a new
//! implementation.

use std::fmt;

use crate::error::CodegenResult;
use crate::metadata::UnitInfo;

/// The two markers of one loop.
///
/// ```text
///         jump guard          ─┐ emit_loop_entry
/// body:   <loop body>          │
/// guard:  if cell > 0 → body  ─┘ emit_loop_back_edge
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopLabels<L> {
    /// Marker A: first instruction of the loop body.
    pub body: L,
    /// Marker B: the guard, which is also the loop exit path.
    pub guard: L,
}

/// A code generation backend.
///
/// Every method appends to the emitter's instruction stream; none of them
/// can fail; errors surface only from [`TargetEmitter::finish`].
pub trait TargetEmitter {
    /// A not-necessarily-positioned jump target.
    type Label: Copy + fmt::Debug;
    /// What [`TargetEmitter::finish`] produces.
    type Output;

    /// Create a fresh, unpositioned label.
    fn new_label(&mut self) -> Self::Label;

    /// `pointer ← pointer + delta`, wrapping at 16 bits.
    fn move_pointer(&mut self, delta: i16);

    /// `tape[pointer] ← tape[pointer] + delta`, wrapping at 8 bits.
    fn add_cell(&mut self, delta: i8);

    /// Send `tape[pointer]` to the output sink.
    fn write_byte(&mut self);

    /// Store one byte from the input source into `tape[pointer]`.
    fn read_byte(&mut self);

    /// Jump unconditionally to `labels.guard`, then position `labels.body`.
    fn emit_loop_entry(&mut self, labels: LoopLabels<Self::Label>);

    /// Position `labels.guard`, then branch back to `labels.body` while
    /// `tape[pointer] > 0`; fall through otherwise.
    fn emit_loop_back_edge(&mut self, labels: LoopLabels<Self::Label>);

    /// Return from the generated entry routine.
    fn emit_return(&mut self);

    /// Seal the instruction stream and package it as a unit.
    fn finish(self, info: &UnitInfo) -> CodegenResult<Self::Output>;
}
