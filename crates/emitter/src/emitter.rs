//! The bytecode emitter.
//!
//! Front-ends append instructions through [`Emitter`]. Code that must not run
//! inline (loop bodies, conditional bodies, reserved data) is written into a
//! nested buffer opened with [`Emitter::block_create`] or
//! [`Emitter::sub_create`]. When the buffer is closed it is spliced into its
//! parent behind a forward GOTO, so every address is final the moment it is
//! written and no back-patching pass is needed.

use stackvm_common::{Image, Opcode, Word};
use tracing::trace;

use crate::buffer::EmissionBuffer;
use crate::error::EmitError;
use crate::operand::{Address, CharCode};

/// Words occupied by the `GOTO target` that skips a spliced buffer.
pub const SKIP_HEADER: usize = 2;

/// Appends instructions to an image under construction.
#[derive(Debug, Default)]
pub struct Emitter {
    root: EmissionBuffer,
    open: Vec<EmissionBuffer>,
    ends: usize,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Global address of the next Word to be written.
    pub fn len(&self) -> usize {
        self.current().end()
    }

    /// True if nothing has been written anywhere yet.
    pub fn is_empty(&self) -> bool {
        self.open.is_empty() && self.root.words.is_empty()
    }

    /// Number of buffers currently open above the root.
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// The next write position as an [`Address`].
    pub fn here(&self) -> Address {
        Address::new(self.len() as Word)
    }

    fn current(&self) -> &EmissionBuffer {
        self.open.last().unwrap_or(&self.root)
    }

    fn current_mut(&mut self) -> &mut EmissionBuffer {
        match self.open.last_mut() {
            Some(buffer) => buffer,
            None => &mut self.root,
        }
    }

    // ---- raw writes ----

    /// Append one Word verbatim. Used for inline data.
    pub fn write_word(&mut self, word: Word) {
        self.current_mut().words.push(word);
    }

    /// Append an opcode that takes no inline operands.
    pub fn write_op(&mut self, op: Opcode) {
        debug_assert_eq!(
            op.inline_operands(),
            Some(0),
            "{} takes operands",
            op.mnemonic()
        );
        self.write_word(op.into());
    }

    // ---- instructions with operands ----

    pub fn write_push(&mut self, value: impl Into<Word>) {
        self.write_word(Opcode::Push.into());
        self.write_word(value.into());
    }

    pub fn write_store(&mut self, address: Address) {
        self.write_word(Opcode::Store.into());
        self.write_word(address.into());
    }

    pub fn write_fetch(&mut self, address: Address) {
        self.write_word(Opcode::Fetch.into());
        self.write_word(address.into());
    }

    pub fn write_copy(&mut self, from: Address, to: Address) {
        self.write_word(Opcode::Copy.into());
        self.write_word(from.into());
        self.write_word(to.into());
    }

    pub fn write_goto(&mut self, target: Address) {
        self.write_word(Opcode::Goto.into());
        self.write_word(target.into());
    }

    /// Write a GOTO that lands `skip` Words past its own operand.
    ///
    /// Returns the target address.
    pub fn write_goto_rel(&mut self, skip: usize) -> Address {
        self.write_word(Opcode::Goto.into());
        let target = Address::new((self.len() + 1 + skip) as Word);
        self.write_word(target.into());
        target
    }

    /// Write a WRITE_STR with its inline length and character codes.
    pub fn write_string(&mut self, text: &str) {
        self.write_word(Opcode::WriteStr.into());
        self.write_word(text.chars().count() as Word);
        for c in text.chars() {
            self.write_word(CharCode::from(c).into());
        }
    }

    /// Write END. A finished image must contain exactly one.
    pub fn write_end(&mut self) {
        self.ends += 1;
        self.write_op(Opcode::End);
    }

    // ---- convenience wrappers for zero-operand opcodes ----

    pub fn write_call(&mut self) {
        self.write_op(Opcode::Call);
    }

    pub fn write_call_if(&mut self) {
        self.write_op(Opcode::CallIf);
    }

    pub fn write_return(&mut self) {
        self.write_op(Opcode::Return);
    }

    pub fn write_goto_if(&mut self) {
        self.write_op(Opcode::GotoIf);
    }

    pub fn write_char(&mut self) {
        self.write_op(Opcode::WriteChar);
    }

    pub fn write_int(&mut self) {
        self.write_op(Opcode::WriteInt);
    }

    // ---- variables ----

    /// Reserve one data cell holding `initial` and jump over it.
    ///
    /// Returns the cell's address for STORE/FETCH.
    pub fn write_var(&mut self, initial: Word) -> Address {
        self.write_goto_rel(1);
        let address = self.here();
        self.write_word(initial);
        address
    }

    // ---- deferred buffers ----

    /// Open a nested buffer for code or data that is skipped when control
    /// falls through.
    pub fn block_create(&mut self) {
        let prev_len = self.len() + SKIP_HEADER;
        self.open.push(EmissionBuffer::new(prev_len));
        trace!(depth = self.depth(), prev_len, "block opened");
    }

    /// Close the innermost buffer, splicing it into its parent behind a
    /// forward GOTO.
    ///
    /// Returns the address of the block's first Word.
    pub fn block_skip(&mut self) -> Result<Address, EmitError> {
        let block = self.open.pop().ok_or(EmitError::UnresolvedBlock)?;
        Ok(self.splice(block))
    }

    /// Open a nested buffer for a subroutine body.
    pub fn sub_create(&mut self) {
        self.block_create();
    }

    /// Close the innermost subroutine: append RETURN, splice it into its
    /// parent, then emit `PUSH entry` in the parent.
    ///
    /// Returns the subroutine's entry address.
    pub fn sub_return(&mut self) -> Result<Address, EmitError> {
        if self.open.is_empty() {
            return Err(EmitError::UnresolvedBlock);
        }
        self.write_return();
        let entry = self.block_skip()?;
        self.write_push(entry);
        Ok(entry)
    }

    fn splice(&mut self, block: EmissionBuffer) -> Address {
        self.write_goto_rel(block.words.len());
        let entry = self.here();
        debug_assert_eq!(entry.get() as usize, block.prev_len);
        trace!(depth = self.depth(), %entry, words = block.words.len(), "block spliced");
        self.current_mut().words.extend(block.words);
        entry
    }

    // ---- finishing ----

    /// Check that every buffer is closed and END was written once, then
    /// return the image.
    pub fn finish(self) -> Result<Image, EmitError> {
        if !self.open.is_empty() {
            return Err(EmitError::UnclosedBlock {
                depth: self.open.len(),
            });
        }
        match self.ends {
            0 => Err(EmitError::MissingEnd),
            1 => Ok(Image::new(self.root.words)),
            count => Err(EmitError::DuplicateEnd { count }),
        }
    }
}
