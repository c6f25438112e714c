//! Character-level access to source text with position tracking.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

/// A 1-based line and column in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Walks source text one Unicode scalar at a time.
pub(crate) struct Cursor<'a> {
    chars: Peekable<Chars<'a>>,
    pos: Span,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            pos: Span::default(),
        }
    }

    /// Position of the next character.
    pub(crate) fn span(&self) -> Span {
        self.pos
    }

    pub(crate) fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    pub(crate) fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.pos.line += 1;
            self.pos.column = 1;
        } else {
            self.pos.column += 1;
        }
        Some(c)
    }

    /// Consume the next character if it satisfies `pred`.
    pub(crate) fn bump_if(&mut self, pred: impl FnOnce(char) -> bool) -> Option<char> {
        match self.peek() {
            Some(c) if pred(c) => self.bump(),
            _ => None,
        }
    }

    /// Consume characters while `pred` holds and return them.
    pub(crate) fn take_while(&mut self, mut pred: impl FnMut(char) -> bool) -> String {
        let mut taken = String::new();
        while let Some(c) = self.bump_if(&mut pred) {
            taken.push(c);
        }
        taken
    }
}
