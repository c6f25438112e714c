//! Memory sizing for a machine.
//!
//! Memory is one Word array split, from low to high addresses, into the
//! program/data region, the operand stack region and the call stack region.
//! Front-ends that reserve memory inside the image (the Brainfuck tape) must
//! be run with a program region large enough to hold it.

use crate::error::{LayoutError, StackKind};
use stackvm_common::Word;

/// Default total cell count.
pub const DEFAULT_TOTAL: usize = 131_072;
/// Default operand stack cell count.
pub const DEFAULT_OPERAND_STACK: usize = 1280;
/// Default call stack cell count.
pub const DEFAULT_CALL_STACK: usize = 640;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryLayout {
    /// Total number of cells.
    pub total: usize,
    /// Cells reserved for the operand stack.
    pub operand_stack: usize,
    /// Cells reserved for the call stack.
    pub call_stack: usize,
}

impl Default for MemoryLayout {
    fn default() -> Self {
        Self {
            total: DEFAULT_TOTAL,
            operand_stack: DEFAULT_OPERAND_STACK,
            call_stack: DEFAULT_CALL_STACK,
        }
    }
}

impl MemoryLayout {
    pub fn new(total: usize, operand_stack: usize, call_stack: usize) -> Self {
        Self {
            total,
            operand_stack,
            call_stack,
        }
    }

    /// Check that both stacks are non-empty, the program region is
    /// non-empty, and every address fits in a Word.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.operand_stack == 0 {
            return Err(LayoutError::EmptyStack(StackKind::Operand));
        }
        if self.call_stack == 0 {
            return Err(LayoutError::EmptyStack(StackKind::Call));
        }
        if self.total > Word::MAX as usize {
            return Err(LayoutError::TooLarge { total: self.total });
        }
        let reserved = self.operand_stack.saturating_add(self.call_stack);
        if reserved >= self.total {
            return Err(LayoutError::NoProgramRegion {
                total: self.total,
                reserved,
            });
        }
        Ok(())
    }

    /// Cells available to code and inline data.
    pub fn program_size(&self) -> usize {
        self.total
            .saturating_sub(self.operand_stack)
            .saturating_sub(self.call_stack)
    }

    /// First cell of the operand stack region.
    pub fn operand_stack_offset(&self) -> usize {
        self.program_size()
    }

    /// First cell of the call stack region.
    pub fn call_stack_offset(&self) -> usize {
        self.total.saturating_sub(self.call_stack)
    }
}
