//! Token types for the tapec lexer.
//!
//! Defines [`Symbol`], the eight meaningful source characters, and
//! [`Token`], which pairs a symbol with a source [`Span`].

use tapec_types::Span;
use std::fmt;

/// Every symbol with meaning in a tape program, in canonical order.
pub const ALL_SYMBOLS: &[Symbol] = &[
    Symbol::Right,
    Symbol::Left,
    Symbol::Increment,
    Symbol::Decrement,
    Symbol::Output,
    Symbol::Input,
    Symbol::LoopOpen,
    Symbol::LoopClose,
];

// ─────────────────────────────────────────────────────────────────────
// Token
// ─────────────────────────────────────────────────────────────────────

/// A single symbol produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub symbol: Symbol,
    /// Source location.
    pub span: Span,
}

impl Token {
    /// Create a new token.
    pub fn new(symbol: Symbol, span: Span) -> Self {
        Self { symbol, span }
    }
}

// ─────────────────────────────────────────────────────────────────────
// Symbol
// ─────────────────────────────────────────────────────────────────────

/// The eight symbols of the tape language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// `>`: move the pointer one cell right.
    Right,
    /// `<`: move the pointer one cell left.
    Left,
    /// `+`: increment the current cell.
    Increment,
    /// `-`: decrement the current cell.
    Decrement,
    /// `.`: write the current cell to the output sink.
    Output,
    /// `,`: read one byte from the input source into the current cell.
    Input,
    /// `[`: start a loop.
    LoopOpen,
    /// `]`: end a loop.
    LoopClose,
}

impl Symbol {
    /// Recognise a source character. Anything else is commentary.
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '>' => Some(Self::Right),
            '<' => Some(Self::Left),
            '+' => Some(Self::Increment),
            '-' => Some(Self::Decrement),
            '.' => Some(Self::Output),
            ',' => Some(Self::Input),
            '[' => Some(Self::LoopOpen),
            ']' => Some(Self::LoopClose),
            _ => None,
        }
    }

    /// The source character for this symbol.
    pub fn as_char(self) -> char {
        match self {
            Self::Right => '>',
            Self::Left => '<',
            Self::Increment => '+',
            Self::Decrement => '-',
            Self::Output => '.',
            Self::Input => ',',
            Self::LoopOpen => '[',
            Self::LoopClose => ']',
        }
    }

    /// `true` for the two loop brackets.
    pub fn is_bracket(self) -> bool {
        matches!(self, Self::LoopOpen | Self::LoopClose)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}
