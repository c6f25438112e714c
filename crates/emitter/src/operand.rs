//! Typed operands for the emitter API.
//!
//! The image only knows Words. These wrappers record what a Word means at
//! the point it is emitted and lower to the same Word.

use std::fmt;

use stackvm_common::Word;

/// A location in the final image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(Word);

impl Address {
    pub const fn new(word: Word) -> Self {
        Self(word)
    }

    pub const fn get(self) -> Word {
        self.0
    }

    /// The address `words` cells further on.
    pub const fn offset(self, words: Word) -> Self {
        Self(self.0 + words)
    }
}

impl From<Address> for Word {
    fn from(address: Address) -> Word {
        address.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// A 0/1 truth value as the VM's logic opcodes produce it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BooleanFlag(bool);

impl BooleanFlag {
    pub const TRUE: Self = Self(true);
}

impl From<bool> for BooleanFlag {
    fn from(value: bool) -> Self {
        Self(value)
    }
}

impl From<BooleanFlag> for Word {
    fn from(flag: BooleanFlag) -> Word {
        Word::from(flag.0)
    }
}

/// A Unicode scalar value as consumed by WRITE_CHAR and produced by
/// READ_CHAR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CharCode(char);

impl CharCode {
    pub const fn new(c: char) -> Self {
        Self(c)
    }

    pub const fn get(self) -> char {
        self.0
    }
}

impl From<char> for CharCode {
    fn from(c: char) -> Self {
        Self(c)
    }
}

impl From<CharCode> for Word {
    fn from(code: CharCode) -> Word {
        code.0 as Word
    }
}
