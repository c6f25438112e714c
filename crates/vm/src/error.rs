//! Errors for the stackvm machine.
//!
//! Runtime faults carry the address of the faulting instruction (`at`) for
//! debugging. Faults are terminal: `run` stops at the first one.

use std::fmt;

use stackvm_common::Word;
use thiserror::Error;

/// Which of the two machine stacks a fault refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackKind {
    Operand,
    Call,
}

impl fmt::Display for StackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackKind::Operand => write!(f, "operand stack"),
            StackKind::Call => write!(f, "call stack"),
        }
    }
}

/// Errors reported by a [`BoundedStack`](crate::stack::BoundedStack).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StackError {
    /// Push on a full stack.
    #[error("stack overflow")]
    Overflow,

    /// Pop or peek on an empty stack.
    #[error("stack underflow")]
    Underflow,

    /// Pick offset outside the stack region.
    #[error("stack index {0} out of range")]
    OutOfRange(Word),
}

/// Inconsistent memory configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// A stack was configured with zero cells.
    #[error("{0} must have at least one cell")]
    EmptyStack(StackKind),

    /// The stacks leave no room for the program/data region.
    #[error("stacks reserve {reserved} of {total} cells, leaving no program region")]
    NoProgramRegion { total: usize, reserved: usize },

    /// Addresses must be representable as Words.
    #[error("memory of {total} cells is not addressable by 32-bit words")]
    TooLarge { total: usize },
}

/// Errors that occur while loading an image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The image does not fit in the program/data region.
    #[error("image of {words} words exceeds program region of {capacity} cells")]
    ImageTooLarge { words: usize, capacity: usize },
}

/// Errors that occur during execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeFault {
    /// Push on a full stack.
    #[error("{stack} overflow at address {at}")]
    StackOverflow { at: usize, stack: StackKind },

    /// Pop on an empty stack.
    #[error("{stack} underflow at address {at}")]
    StackUnderflow { at: usize, stack: StackKind },

    /// PICK offset outside the operand stack.
    #[error("pick index {index} out of range at address {at}")]
    OutOfRange { at: usize, index: Word },

    /// Instruction pointer or memory operand outside its region.
    #[error("address {address} out of memory at address {at}")]
    OutOfMemory { at: usize, address: i64 },

    /// Word at the instruction pointer is not an opcode.
    #[error("invalid instruction {word} at address {at}")]
    InvalidInstruction { at: usize, word: Word },

    /// Integer division by zero.
    #[error("division by zero at address {at}")]
    DivisionByZero { at: usize },

    /// Reading input or writing output failed.
    #[error("i/o error at address {at}: {message}")]
    Io { at: usize, message: String },
}

impl RuntimeFault {
    /// Address of the instruction that faulted.
    pub fn at(&self) -> usize {
        match self {
            RuntimeFault::StackOverflow { at, .. }
            | RuntimeFault::StackUnderflow { at, .. }
            | RuntimeFault::OutOfRange { at, .. }
            | RuntimeFault::OutOfMemory { at, .. }
            | RuntimeFault::InvalidInstruction { at, .. }
            | RuntimeFault::DivisionByZero { at }
            | RuntimeFault::Io { at, .. } => *at,
        }
    }

    pub(crate) fn from_stack(error: StackError, at: usize, stack: StackKind) -> Self {
        match error {
            StackError::Overflow => RuntimeFault::StackOverflow { at, stack },
            StackError::Underflow => RuntimeFault::StackUnderflow { at, stack },
            StackError::OutOfRange(index) => RuntimeFault::OutOfRange { at, index },
        }
    }
}

/// Either half of a load-then-run cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VmError {
    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Fault(#[from] RuntimeFault),
}
