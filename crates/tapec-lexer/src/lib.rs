//! tapec lexer: turns source text into a lazy stream of tape symbols.

pub mod lexer;
pub mod token;

pub use lexer::Lexer;
pub use token::{Symbol, Token, ALL_SYMBOLS};
