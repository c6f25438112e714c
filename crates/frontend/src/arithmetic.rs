//! Infix arithmetic front-end.
//!
//! Expressions over non-negative integer literals, `+ - * /` and
//! parentheses are reordered to postfix with the shunting-yard algorithm.
//! The compiled program prints the value and halts.

use stackvm_common::{Opcode, Word};
use stackvm_emitter::Emitter;
use tracing::debug;

use crate::error::CompileError;
use crate::source::{Cursor, Span};
use crate::Frontend;

/// Compiles arithmetic expressions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArithmeticFrontend;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Operator::Add),
            '-' => Some(Operator::Subtract),
            '*' => Some(Operator::Multiply),
            '/' => Some(Operator::Divide),
            _ => None,
        }
    }

    fn precedence(self) -> u8 {
        match self {
            Operator::Add | Operator::Subtract => 1,
            Operator::Multiply | Operator::Divide => 2,
        }
    }

    fn opcode(self) -> Opcode {
        match self {
            Operator::Add => Opcode::Plus,
            Operator::Subtract => Opcode::Minus,
            Operator::Multiply => Opcode::Multiply,
            Operator::Divide => Opcode::Divide,
        }
    }
}

/// Entries on the operator stack.
#[derive(Debug, Clone, Copy)]
enum Pending {
    Op(Operator),
    Open(Span),
}

impl Frontend for ArithmeticFrontend {
    fn compile(&self, source: &str, emitter: &mut Emitter) -> Result<(), CompileError> {
        let mut cur = Cursor::new(source);
        let mut pending: Vec<Pending> = Vec::new();
        // True when the next token must be a literal or '('.
        let mut want_operand = true;
        let mut operands = 0usize;

        while let Some(c) = cur.peek() {
            let span = cur.span();

            if c.is_whitespace() {
                cur.bump();
                continue;
            }

            if c.is_ascii_digit() {
                if !want_operand {
                    return Err(CompileError::syntax(span, c.to_string(), "expected an operator"));
                }
                let digits = cur.take_while(|c| c.is_ascii_digit());
                let value = digits.parse::<Word>().map_err(|_| {
                    CompileError::syntax(span, &digits, "integer literal out of range")
                })?;
                emitter.write_push(value);
                operands += 1;
                want_operand = false;
                continue;
            }

            cur.bump();
            match c {
                '(' => {
                    if !want_operand {
                        return Err(CompileError::syntax(span, "(", "expected an operator"));
                    }
                    pending.push(Pending::Open(span));
                }
                ')' => {
                    if want_operand {
                        return Err(CompileError::syntax(span, ")", "expected an operand"));
                    }
                    loop {
                        match pending.pop() {
                            Some(Pending::Op(op)) => emitter.write_op(op.opcode()),
                            Some(Pending::Open(_)) => break,
                            None => return Err(CompileError::syntax(span, ")", "unmatched ')'")),
                        }
                    }
                }
                _ => {
                    let op = match Operator::from_char(c) {
                        Some(op) => op,
                        None => return Err(CompileError::unknown(span, c)),
                    };
                    if want_operand {
                        return Err(CompileError::syntax(
                            span,
                            c.to_string(),
                            "expected an operand",
                        ));
                    }
                    while let Some(&Pending::Op(top)) = pending.last() {
                        if top.precedence() < op.precedence() {
                            break;
                        }
                        emitter.write_op(top.opcode());
                        pending.pop();
                    }
                    pending.push(Pending::Op(op));
                    want_operand = true;
                }
            }
        }

        let end = cur.span();
        if operands == 0 {
            return Err(CompileError::syntax(end, "<eof>", "empty expression"));
        }
        if want_operand {
            return Err(CompileError::syntax(end, "<eof>", "expected an operand"));
        }
        while let Some(entry) = pending.pop() {
            match entry {
                Pending::Op(op) => emitter.write_op(op.opcode()),
                Pending::Open(at) => return Err(CompileError::syntax(at, "(", "unmatched '('")),
            }
        }
        debug!(operands, "compiled arithmetic expression");

        emitter.write_int();
        emitter.write_end();
        Ok(())
    }
}
