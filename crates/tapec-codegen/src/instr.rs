//! Instruction emission for the six non-loop symbols.
//!
//! Each symbol maps to one fixed, context-free template; the template body
//! itself lives in the backend behind [`TargetEmitter`].

use tapec_lexer::Symbol;

use crate::emitter::TargetEmitter;

/// Emit the template for `symbol`. Loop brackets belong to the
/// [`crate::resolver::LoopResolver`] and emit nothing here.
pub fn emit_instruction<E: TargetEmitter>(emitter: &mut E, symbol: Symbol) {
    match symbol {
        Symbol::Right => emitter.move_pointer(1),
        Symbol::Left => emitter.move_pointer(-1),
        Symbol::Increment => emitter.add_cell(1),
        Symbol::Decrement => emitter.add_cell(-1),
        Symbol::Output => emitter.write_byte(),
        Symbol::Input => emitter.read_byte(),
        Symbol::LoopOpen | Symbol::LoopClose => {}
    }
}
