//! Bytecode image representation.
//!
//! An image is a flat sequence of Words. Image files are raw concatenations
//! of little-endian 32-bit Words with no header; the Word count is the byte
//! length divided by 4.

use crate::error::DecodeError;
use crate::Word;

/// Size of one encoded Word in bytes.
pub const WORD_BYTES: usize = 4;

/// A compiled program: code and inline data in one Word stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Image {
    /// The Word stream, starting at address 0.
    pub words: Vec<Word>,
}

impl Image {
    /// Create an image from a vector of Words.
    pub fn new(words: Vec<Word>) -> Self {
        Self { words }
    }

    /// Encode the image to bytes.
    ///
    /// The result length is always `words.len() * 4`.
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.words.len() * WORD_BYTES);
        for word in &self.words {
            bytes.extend_from_slice(&word.to_le_bytes());
        }
        bytes
    }

    /// Decode a byte slice into an image.
    ///
    /// The byte slice length must be a multiple of 4. Opcodes are not
    /// validated here: data cells may hold any Word.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() % WORD_BYTES != 0 {
            return Err(DecodeError::InvalidLength(bytes.len()));
        }

        let words = bytes
            .chunks_exact(WORD_BYTES)
            .map(|chunk| Word::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();

        Ok(Self { words })
    }

    /// Number of Words in the image.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns true if the image has no Words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl From<Vec<Word>> for Image {
    fn from(words: Vec<Word>) -> Self {
        Self::new(words)
    }
}
