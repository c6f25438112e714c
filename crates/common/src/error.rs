//! Decode errors for stackvm bytecode images.

use crate::Word;
use thiserror::Error;

/// Errors that occur while decoding image bytes or opcode Words.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Word does not name any opcode.
    #[error("invalid opcode: {0}")]
    InvalidOpcode(Word),

    /// Byte stream length is not a multiple of 4.
    #[error("invalid byte stream length: {0} (must be multiple of 4)")]
    InvalidLength(usize),
}
