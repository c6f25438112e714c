//! Fixed-capacity LIFO over a region of a shared cell array.
//!
//! A stack owns only its bounds and pointer; the cells live in the
//! machine's memory and are passed to each operation. This lets the operand
//! stack, the call stack and the program region share one array.
//!
//! The stack grows toward lower addresses: the pointer starts at
//! `offset + capacity` and decrements on push. At all times
//! `offset <= pointer <= offset + capacity`.

use crate::error::StackError;
use stackvm_common::Word;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedStack {
    offset: usize,
    capacity: usize,
    pointer: usize,
}

impl BoundedStack {
    /// Create an empty stack over `cells[offset..offset + capacity]`.
    pub fn new(offset: usize, capacity: usize) -> Self {
        Self {
            offset,
            capacity,
            pointer: offset + capacity,
        }
    }

    /// Index of the current top cell (`offset + capacity` when empty).
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    fn top(&self) -> usize {
        self.offset + self.capacity
    }

    /// Number of values currently on the stack.
    pub fn len(&self) -> usize {
        self.top() - self.pointer
    }

    pub fn is_empty(&self) -> bool {
        self.pointer == self.top()
    }

    /// Empty the stack in O(1). Old cell contents are left in place.
    pub fn reset(&mut self) {
        self.pointer = self.top();
    }

    pub fn push(&mut self, cells: &mut [Word], value: Word) -> Result<(), StackError> {
        if self.pointer == self.offset {
            return Err(StackError::Overflow);
        }
        self.pointer -= 1;
        cells[self.pointer] = value;
        Ok(())
    }

    pub fn pop(&mut self, cells: &[Word]) -> Result<Word, StackError> {
        if self.is_empty() {
            return Err(StackError::Underflow);
        }
        let value = cells[self.pointer];
        self.pointer += 1;
        Ok(value)
    }

    /// Read the top value without removing it.
    pub fn peek(&self, cells: &[Word]) -> Result<Word, StackError> {
        if self.is_empty() {
            return Err(StackError::Underflow);
        }
        Ok(cells[self.pointer])
    }

    /// Read the value `k` slots below the top. `pick(0)` is `peek()`.
    ///
    /// Fails when `pointer + k` falls outside `[offset, offset + capacity)`.
    pub fn pick(&self, cells: &[Word], k: Word) -> Result<Word, StackError> {
        let index = self.pointer as i64 + i64::from(k);
        if index < self.offset as i64 || index >= self.top() as i64 {
            return Err(StackError::OutOfRange(k));
        }
        Ok(cells[index as usize])
    }

    /// Snapshot of the live values, bottom first.
    pub fn contents(&self, cells: &[Word]) -> Vec<Word> {
        cells[self.pointer..self.top()]
            .iter()
            .rev()
            .copied()
            .collect()
    }
}
