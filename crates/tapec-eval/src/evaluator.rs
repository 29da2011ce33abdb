//! Reference evaluator: runs source text directly.
//!
//! No code generation is involved, which makes this the golden reference
//! the WASM and bytecode backends are checked against. Brackets are paired
//! up front into a jump table; a source with unbalanced brackets is
//! rejected with the same diagnostics the compiler reports.

use tapec_codegen::check_loops;
use tapec_lexer::{Lexer, Symbol};
use tapec_types::SourceFile;

use crate::error::{EvalError, EvalResult};
use crate::io::{ByteSink, ByteSource};
use crate::machine::Machine;

/// A source program ready to run.
#[derive(Debug, Clone)]
pub struct Evaluator {
    symbols: Vec<Symbol>,
    /// For each bracket, the index of its partner. Unused for other symbols.
    jumps: Vec<usize>,
}

impl Evaluator {
    pub fn new(source: &SourceFile) -> EvalResult<Self> {
        let symbols: Vec<Symbol> = Lexer::new(source).map(|t| t.symbol).collect();
        let mut jumps = vec![0; symbols.len()];
        let mut open = Vec::new();

        for (i, symbol) in symbols.iter().enumerate() {
            match symbol {
                Symbol::LoopOpen => open.push(i),
                Symbol::LoopClose => {
                    let Some(start) = open.pop() else {
                        return Err(EvalError::UnbalancedLoops(check_loops(source)));
                    };
                    jumps[start] = i;
                    jumps[i] = start;
                }
                _ => {}
            }
        }
        if !open.is_empty() {
            return Err(EvalError::UnbalancedLoops(check_loops(source)));
        }

        Ok(Self { symbols, jumps })
    }

    /// Number of symbols in the program.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Run the program to completion on `machine`.
    pub fn run(
        &self,
        machine: &mut Machine,
        input: &mut dyn ByteSource,
        output: &mut dyn ByteSink,
    ) -> EvalResult<()> {
        let mut pc = 0;
        while let Some(&symbol) = self.symbols.get(pc) {
            machine.tick()?;
            match symbol {
                Symbol::Right => machine.move_pointer(1),
                Symbol::Left => machine.move_pointer(-1),
                Symbol::Increment => machine.add_cell(1)?,
                Symbol::Decrement => machine.add_cell(-1)?,
                Symbol::Output => machine.write(output)?,
                Symbol::Input => machine.read(input)?,
                Symbol::LoopOpen => {
                    if machine.cell()? == 0 {
                        pc = self.jumps[pc];
                    }
                }
                Symbol::LoopClose => {
                    if machine.cell()? > 0 {
                        pc = self.jumps[pc];
                    }
                }
            }
            pc += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(src: &str) -> EvalResult<Evaluator> {
        Evaluator::new(&SourceFile::new("t.bf", src))
    }

    #[test]
    fn commentary_is_dropped() {
        let e = eval("a + b - c").unwrap();
        assert_eq!(e.len(), 2);
    }

    #[test]
    fn jump_table_pairs_brackets() {
        let e = eval("[[]]").unwrap();
        assert_eq!(e.jumps, vec![3, 2, 1, 0]);
    }

    #[test]
    fn unbalanced_source_is_rejected() {
        for src in ["[", "]", "[]]", "[[]"] {
            assert!(
                matches!(eval(src), Err(EvalError::UnbalancedLoops(ref e)) if e.has_errors()),
                "{src:?}"
            );
        }
    }
}
