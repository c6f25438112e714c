//! Machine state: memory, stacks, instruction pointer.

use std::fmt;

use crate::error::{LayoutError, LoadError, RuntimeFault, StackKind};
use crate::layout::MemoryLayout;
use crate::stack::BoundedStack;
use stackvm_common::{Image, Word};
use tracing::debug;

/// The stackvm virtual machine.
///
/// One Word array backs code, data and both stacks. The array is allocated
/// once in [`Machine::new`] and repopulated by every [`Machine::load`].
pub struct Machine {
    pub(crate) layout: MemoryLayout,
    pub(crate) memory: Vec<Word>,
    pub(crate) operands: BoundedStack,
    pub(crate) calls: BoundedStack,
    /// Address of the next Word to fetch.
    pub(crate) ip: usize,
    /// Address of the instruction being executed, reported in faults.
    pub(crate) current: usize,
    /// Instructions dispatched since the last load.
    pub(crate) executed: u64,
}

impl Machine {
    /// Allocate memory for the given layout.
    pub fn new(layout: MemoryLayout) -> Result<Self, LayoutError> {
        layout.validate()?;
        Ok(Self {
            layout,
            memory: vec![0; layout.total],
            operands: BoundedStack::new(layout.operand_stack_offset(), layout.operand_stack),
            calls: BoundedStack::new(layout.call_stack_offset(), layout.call_stack),
            ip: 0,
            current: 0,
            executed: 0,
        })
    }

    /// Copy an image into the program region and reset the machine.
    ///
    /// Memory past the image is zero-filled; both stacks and the
    /// instruction pointer return to their initial positions.
    pub fn load(&mut self, image: &Image) -> Result<(), LoadError> {
        let capacity = self.layout.program_size();
        if image.len() > capacity {
            return Err(LoadError::ImageTooLarge {
                words: image.len(),
                capacity,
            });
        }

        self.memory[..image.len()].copy_from_slice(&image.words);
        self.memory[image.len()..].fill(0);
        self.operands.reset();
        self.calls.reset();
        self.ip = 0;
        self.current = 0;
        self.executed = 0;

        debug!(words = image.len(), capacity, "image loaded");
        Ok(())
    }

    /// Current instruction pointer.
    pub fn ip(&self) -> usize {
        self.ip
    }

    /// Instructions executed since the last load.
    pub fn executed(&self) -> u64 {
        self.executed
    }

    /// The whole memory array, stacks included.
    pub fn memory(&self) -> &[Word] {
        &self.memory
    }

    /// Operand stack contents, bottom first.
    pub fn operand_stack(&self) -> Vec<Word> {
        self.operands.contents(&self.memory)
    }

    /// Call stack contents, bottom first.
    pub fn call_stack(&self) -> Vec<Word> {
        self.calls.contents(&self.memory)
    }

    /// Capture the registers and both stacks for diagnostics.
    pub fn dump(&self) -> Snapshot {
        Snapshot {
            ip: self.ip,
            executed: self.executed,
            operand_stack: self.operand_stack(),
            call_stack: self.call_stack(),
        }
    }

    // ---- helpers used by the dispatch loop ----

    pub(crate) fn push(&mut self, value: Word) -> Result<(), RuntimeFault> {
        self.operands
            .push(&mut self.memory, value)
            .map_err(|e| RuntimeFault::from_stack(e, self.current, StackKind::Operand))
    }

    pub(crate) fn pop(&mut self) -> Result<Word, RuntimeFault> {
        self.operands
            .pop(&self.memory)
            .map_err(|e| RuntimeFault::from_stack(e, self.current, StackKind::Operand))
    }

    pub(crate) fn peek(&self) -> Result<Word, RuntimeFault> {
        self.operands
            .peek(&self.memory)
            .map_err(|e| RuntimeFault::from_stack(e, self.current, StackKind::Operand))
    }

    pub(crate) fn pick(&self, k: Word) -> Result<Word, RuntimeFault> {
        self.operands
            .pick(&self.memory, k)
            .map_err(|e| RuntimeFault::from_stack(e, self.current, StackKind::Operand))
    }

    pub(crate) fn push_return(&mut self, address: Word) -> Result<(), RuntimeFault> {
        self.calls
            .push(&mut self.memory, address)
            .map_err(|e| RuntimeFault::from_stack(e, self.current, StackKind::Call))
    }

    pub(crate) fn pop_return(&mut self) -> Result<Word, RuntimeFault> {
        self.calls
            .pop(&self.memory)
            .map_err(|e| RuntimeFault::from_stack(e, self.current, StackKind::Call))
    }

    /// Read the Word at the instruction pointer and advance past it.
    pub(crate) fn next(&mut self) -> Result<Word, RuntimeFault> {
        if self.ip >= self.memory.len() {
            return Err(RuntimeFault::OutOfMemory {
                at: self.current,
                address: self.ip as i64,
            });
        }
        let word = self.memory[self.ip];
        self.ip += 1;
        Ok(word)
    }

    /// Move the instruction pointer. Any cell of memory is a valid target.
    pub(crate) fn jump(&mut self, address: Word) -> Result<(), RuntimeFault> {
        if address < 0 || address as usize >= self.memory.len() {
            return Err(RuntimeFault::OutOfMemory {
                at: self.current,
                address: i64::from(address),
            });
        }
        self.ip = address as usize;
        Ok(())
    }

    /// Validate a Store/Fetch/Copy operand against the program/data region.
    pub(crate) fn data_address(&self, address: Word) -> Result<usize, RuntimeFault> {
        if address < 0 || address as usize >= self.layout.program_size() {
            return Err(RuntimeFault::OutOfMemory {
                at: self.current,
                address: i64::from(address),
            });
        }
        Ok(address as usize)
    }

    /// The instruction pointer as a Word, for the call stack.
    pub(crate) fn return_address(&self) -> Word {
        // Layout validation caps memory at Word::MAX cells.
        self.ip as Word
    }
}

/// Registers and stacks captured by [`Machine::dump`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub ip: usize,
    pub executed: u64,
    pub operand_stack: Vec<Word>,
    pub call_stack: Vec<Word>,
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "instruction pointer: {}", self.ip)?;
        writeln!(f, "instructions executed: {}", self.executed)?;
        writeln!(f, "operand stack: {}", join_words(&self.operand_stack))?;
        write!(f, "call stack: {}", join_words(&self.call_stack))
    }
}

fn join_words(words: &[Word]) -> String {
    words
        .iter()
        .map(Word::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
