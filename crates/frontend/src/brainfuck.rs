//! Brainfuck front-end.
//!
//! The tape lives inside the image as a block of zero words. The data
//! pointer is a variable cell holding the absolute address of the current
//! tape cell. Reads and writes through the pointer patch the operand of a
//! following FETCH or STORE, so the generated code modifies itself.

use stackvm_common::{Opcode, Word};
use stackvm_emitter::{Address, Emitter};
use tracing::debug;

use crate::error::CompileError;
use crate::source::{Cursor, Span};
use crate::Frontend;

/// Cells reserved for the tape.
pub const TAPE_CELLS: usize = 30_720;

/// Compiles Brainfuck source.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrainfuckFrontend;

impl Frontend for BrainfuckFrontend {
    fn compile(&self, source: &str, emitter: &mut Emitter) -> Result<(), CompileError> {
        emitter.block_create();
        for _ in 0..TAPE_CELLS {
            emitter.write_word(0);
        }
        let tape = emitter.block_skip()?;
        let ptr = emitter.write_var(tape.get());
        debug!(%tape, %ptr, "brainfuck tape reserved");

        let mut cur = Cursor::new(source);
        let mut open: Vec<Span> = Vec::new();
        while let Some(c) = cur.peek() {
            let span = cur.span();
            cur.bump();
            match c {
                '>' => step(emitter, ptr, Opcode::Plus),
                '<' => step(emitter, ptr, Opcode::Minus),
                '+' => update_cell(emitter, ptr, Opcode::Plus),
                '-' => update_cell(emitter, ptr, Opcode::Minus),
                ',' => {
                    emitter.write_op(Opcode::ReadChar);
                    emitter.write_fetch(ptr);
                    patch_next_operand(emitter, 3);
                    emitter.write_store(Address::new(0));
                }
                '.' => {
                    fetch_cell(emitter, ptr);
                    emitter.write_char();
                }
                '[' => {
                    open.push(span);
                    emitter.sub_create();
                    fetch_cell(emitter, ptr);
                    emitter.sub_return()?;
                    emitter.sub_create();
                }
                ']' => {
                    if open.pop().is_none() {
                        return Err(CompileError::syntax(span, "]", "unmatched ']'"));
                    }
                    emitter.sub_return()?;
                    emitter.emit_while()?;
                }
                _ => {}
            }
        }

        if let Some(&span) = open.last() {
            return Err(CompileError::syntax(span, "[", "unclosed '['"));
        }
        emitter.write_end();
        Ok(())
    }
}

/// Move the data pointer by one cell.
fn step(emitter: &mut Emitter, ptr: Address, op: Opcode) {
    emitter.write_fetch(ptr);
    emitter.write_push(1);
    emitter.write_op(op);
    emitter.write_store(ptr);
}

/// Write a STORE whose target is the Word `distance` cells past the STORE
/// opcode itself. Pops the address to patch in.
fn patch_next_operand(emitter: &mut Emitter, distance: Word) {
    let here = emitter.here();
    emitter.write_store(here.offset(distance));
}

/// Push the value of the current tape cell.
fn fetch_cell(emitter: &mut Emitter, ptr: Address) {
    emitter.write_fetch(ptr);
    patch_next_operand(emitter, 3);
    emitter.write_fetch(Address::new(0));
}

/// Add or subtract one from the current tape cell.
fn update_cell(emitter: &mut Emitter, ptr: Address, op: Opcode) {
    emitter.write_fetch(ptr);
    emitter.write_op(Opcode::Dup);
    // Patches the final STORE, then the FETCH right after this pair.
    patch_next_operand(emitter, 10);
    patch_next_operand(emitter, 3);
    emitter.write_fetch(Address::new(0));
    emitter.write_push(1);
    emitter.write_op(op);
    emitter.write_store(Address::new(0));
}
