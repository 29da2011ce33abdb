//! Loop resolution.
//!
//! Every `[` pushes a pair of fresh labels onto the resolution stack and
//! emits the loop entry; every `]` pops the innermost pair and emits the
//! back edge. Pairing is strictly LIFO, so the innermost open loop always
//! closes first. The stack belongs to one [`LoopResolver`], which lives for
//! a single unit build and is consumed by [`LoopResolver::finish`].

use tapec_types::Span;

use crate::emitter::{LoopLabels, TargetEmitter};

/// An open loop waiting for its `]`.
#[derive(Debug, Clone, Copy)]
struct PendingLoop<L> {
    labels: LoopLabels<L>,
    /// Where the `[` was.
    open_span: Span,
}

/// Loop counts gathered while resolving.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Number of matched bracket pairs.
    pub loops: usize,
    /// Deepest nesting seen.
    pub max_depth: usize,
}

/// Why resolution failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// A `]` arrived with no open loop.
    UnmatchedClose(Span),
    /// These `[` were never closed, outermost first.
    UnmatchedOpen(Vec<Span>),
}

/// The resolution stack for one unit build.
#[derive(Debug)]
pub struct LoopResolver<L> {
    stack: Vec<PendingLoop<L>>,
    stats: LoopStats,
}

impl<L: Copy> LoopResolver<L> {
    pub fn new() -> Self {
        Self {
            stack: Vec::new(),
            stats: LoopStats::default(),
        }
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Handle `[`.
    pub fn open<E>(&mut self, emitter: &mut E, span: Span)
    where
        E: TargetEmitter<Label = L>,
    {
        let labels = LoopLabels {
            body: emitter.new_label(),
            guard: emitter.new_label(),
        };
        emitter.emit_loop_entry(labels);
        self.stack.push(PendingLoop {
            labels,
            open_span: span,
        });
        self.stats.max_depth = self.stats.max_depth.max(self.stack.len());
    }

    /// Handle `]`. Nothing is emitted when there is no loop to close.
    pub fn close<E>(&mut self, emitter: &mut E, span: Span) -> Result<(), ResolveError>
    where
        E: TargetEmitter<Label = L>,
    {
        let pending = self.stack.pop().ok_or(ResolveError::UnmatchedClose(span))?;
        emitter.emit_loop_back_edge(pending.labels);
        self.stats.loops += 1;
        Ok(())
    }

    /// End of source: the stack must be empty.
    pub fn finish(self) -> Result<LoopStats, ResolveError> {
        if self.stack.is_empty() {
            Ok(self.stats)
        } else {
            Err(ResolveError::UnmatchedOpen(
                self.stack.iter().map(|p| p.open_span).collect(),
            ))
        }
    }
}

impl<L: Copy> Default for LoopResolver<L> {
    fn default() -> Self {
        Self::new()
    }
}
