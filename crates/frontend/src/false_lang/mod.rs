//! FALSE front-end.
//!
//! FALSE is a tiny postfix language: integers and characters push values,
//! `a`..`z` name global variables, `[...]` pushes a subroutine, and `!`,
//! `?` and `#` call, conditionally call and loop over subroutines.

mod lexer;

pub use lexer::Command;

use stackvm_emitter::{CharCode, Emitter};
use tracing::debug;

use crate::error::CompileError;
use crate::source::Span;
use crate::Frontend;
use lexer::{tokenize, Access, Token};

/// Compiles FALSE source.
#[derive(Debug, Clone, Copy, Default)]
pub struct FalseFrontend;

impl Frontend for FalseFrontend {
    fn compile(&self, source: &str, emitter: &mut Emitter) -> Result<(), CompileError> {
        let tokens = tokenize(source)?;
        debug!(tokens = tokens.len(), "tokenized FALSE source");

        // One cell per variable, reserved on first use.
        let mut vars = [None; 26];
        // Positions of the `[` still waiting for their `]`.
        let mut open: Vec<Span> = Vec::new();

        for (span, token) in tokens {
            match token {
                Token::Int(value) => emitter.write_push(value),
                Token::Char(c) => emitter.write_push(CharCode::from(c)),
                Token::Var(name, access) => {
                    let slot = &mut vars[(name as u8 - b'a') as usize];
                    let cell = *slot.get_or_insert_with(|| emitter.write_var(0));
                    match access {
                        Access::Store => emitter.write_store(cell),
                        Access::Fetch => emitter.write_fetch(cell),
                    }
                }
                Token::SubStart => {
                    open.push(span);
                    emitter.sub_create();
                }
                Token::SubEnd => {
                    if open.pop().is_none() {
                        return Err(CompileError::syntax(span, "]", "unmatched ']'"));
                    }
                    emitter.sub_return()?;
                }
                Token::Call => emitter.write_call(),
                Token::If => emitter.emit_if(),
                Token::While => emitter.emit_while()?,
                Token::Command(cmd) => emitter.write_op(cmd.opcode()),
                Token::Str(text) => emitter.write_string(&text),
            }
        }

        if let Some(&span) = open.last() {
            return Err(CompileError::syntax(span, "[", "unclosed '['"));
        }
        emitter.write_end();
        Ok(())
    }
}
