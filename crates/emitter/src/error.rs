//! Compiler-internal errors raised by the emitter.
//!
//! These indicate a front-end that opened and closed buffers out of order,
//! not a problem in the user's source.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmitError {
    /// A block or sub was closed with no buffer open.
    #[error("block closed without a matching open")]
    UnresolvedBlock,

    /// Compilation finished with buffers still open.
    #[error("{depth} block(s) left open at end of compilation")]
    UnclosedBlock { depth: usize },

    /// Compilation finished without an END instruction.
    #[error("program has no END instruction")]
    MissingEnd,

    /// END was written more than once.
    #[error("END written {count} times (expected once)")]
    DuplicateEnd { count: usize },
}
