//! Core tapec lexer: a lazy, single-pass symbol scanner.
//!
//! Only the eight tape symbols carry meaning. Every other character
//! (whitespace, letters, comments, non-ASCII text) is skipped without a
//! diagnostic; the lexer can therefore never fail. The skipped count is kept
//! so the unit builder can report it.

use tapec_types::{SourceFile, Span};

use crate::token::{Symbol, Token};

/// The tapec lexer.
///
/// Yields one [`Token`] per recognised symbol, in source order, as an
/// [`Iterator`]. Nothing is buffered: code generation consumes the tokens as
/// they are scanned.
pub struct Lexer<'src> {
    chars: std::str::Chars<'src>,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based, in characters).
    col: u32,
    /// Characters skipped so far.
    ignored: usize,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source file.
    pub fn new(source_file: &'src SourceFile) -> Self {
        Self::from_text(&source_file.source)
    }

    /// Create a lexer over raw text.
    pub fn from_text(source: &'src str) -> Self {
        Self {
            chars: source.chars(),
            line: 1,
            col: 1,
            ignored: 0,
        }
    }

    /// Number of non-symbol characters skipped so far.
    pub fn ignored(&self) -> usize {
        self.ignored
    }

    fn advance(&mut self) -> Option<(char, Span)> {
        let ch = self.chars.next()?;
        let span = Span::char_at(self.line, self.col);
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some((ch, span))
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            let (ch, span) = self.advance()?;
            match Symbol::from_char(ch) {
                Some(symbol) => return Some(Token::new(symbol, span)),
                None => self.ignored += 1,
            }
        }
    }
}
