//! Opcode definitions for the stackvm instruction set.
//!
//! Opcode values are part of the image format and must never be renumbered.

use crate::error::DecodeError;
use crate::Word;

/// Identifies the operation to perform.
///
/// The `#[repr(i32)]` attribute gives each variant its stable Word value.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Literal
    /// Push the inline operand.
    Push = 1,

    // Stack shuffle
    /// Duplicate the top of stack.
    Dup = 2,
    /// Discard the top of stack.
    Drop = 3,
    /// Exchange the top two values.
    Swap = 4,
    /// Rotate the third value to the top.
    Rot = 5,
    /// Pop `k`, push the value `k` slots below the new top.
    Pick = 6,

    // Arithmetic & logic
    /// Pop two values, push their sum.
    Plus = 7,
    /// Pop two values, push (second_popped - first_popped).
    Minus = 8,
    /// Pop two values, push their product.
    Multiply = 9,
    /// Pop two values, push (second_popped / first_popped). Division by zero faults.
    Divide = 10,
    /// Pop one value, push its negation.
    Negative = 11,
    /// Pop two values, push 1 if both are nonzero.
    And = 12,
    /// Pop two values, push 1 if either is nonzero.
    Or = 13,
    /// Pop one value, push 1 if it is zero.
    Not = 14,

    // Comparison
    /// Pop two, push 1 if second_popped > first_popped.
    More = 15,
    /// Pop two, push 1 if equal.
    Equals = 16,

    // I/O
    /// Block for one input character and push its code.
    ReadChar = 17,
    /// Pop a character code and write it.
    WriteChar = 18,
    /// Pop a value and write it in decimal.
    WriteInt = 19,
    /// Write an inline length-prefixed run of character codes.
    WriteStr = 20,
    /// Flush buffered output.
    Flush = 21,

    // Memory
    /// Pop a value into the inline address.
    Store = 22,
    /// Push the value at the inline address.
    Fetch = 23,
    /// Copy the cell at the first inline address into the second.
    Copy = 24,

    // Control
    /// Pop an address, save the return point on the call stack, jump.
    Call = 25,
    /// Pop an address, pop a condition, call only if the condition is nonzero.
    CallIf = 26,
    /// Pop the call stack and jump there.
    Return = 27,
    /// Jump to the inline address.
    Goto = 28,
    /// Pop an address, pop a condition, jump only if the condition is nonzero.
    GotoIf = 29,
    /// Stop execution.
    End = 30,
}

/// All valid opcodes, in definition order. Useful for exhaustive testing.
pub const ALL_OPCODES: [Opcode; 30] = [
    Opcode::Push,
    Opcode::Dup,
    Opcode::Drop,
    Opcode::Swap,
    Opcode::Rot,
    Opcode::Pick,
    Opcode::Plus,
    Opcode::Minus,
    Opcode::Multiply,
    Opcode::Divide,
    Opcode::Negative,
    Opcode::And,
    Opcode::Or,
    Opcode::Not,
    Opcode::More,
    Opcode::Equals,
    Opcode::ReadChar,
    Opcode::WriteChar,
    Opcode::WriteInt,
    Opcode::WriteStr,
    Opcode::Flush,
    Opcode::Store,
    Opcode::Fetch,
    Opcode::Copy,
    Opcode::Call,
    Opcode::CallIf,
    Opcode::Return,
    Opcode::Goto,
    Opcode::GotoIf,
    Opcode::End,
];

impl TryFrom<Word> for Opcode {
    type Error = DecodeError;

    fn try_from(value: Word) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Opcode::Push),

            2 => Ok(Opcode::Dup),
            3 => Ok(Opcode::Drop),
            4 => Ok(Opcode::Swap),
            5 => Ok(Opcode::Rot),
            6 => Ok(Opcode::Pick),

            7 => Ok(Opcode::Plus),
            8 => Ok(Opcode::Minus),
            9 => Ok(Opcode::Multiply),
            10 => Ok(Opcode::Divide),
            11 => Ok(Opcode::Negative),
            12 => Ok(Opcode::And),
            13 => Ok(Opcode::Or),
            14 => Ok(Opcode::Not),

            15 => Ok(Opcode::More),
            16 => Ok(Opcode::Equals),

            17 => Ok(Opcode::ReadChar),
            18 => Ok(Opcode::WriteChar),
            19 => Ok(Opcode::WriteInt),
            20 => Ok(Opcode::WriteStr),
            21 => Ok(Opcode::Flush),

            22 => Ok(Opcode::Store),
            23 => Ok(Opcode::Fetch),
            24 => Ok(Opcode::Copy),

            25 => Ok(Opcode::Call),
            26 => Ok(Opcode::CallIf),
            27 => Ok(Opcode::Return),
            28 => Ok(Opcode::Goto),
            29 => Ok(Opcode::GotoIf),
            30 => Ok(Opcode::End),

            _ => Err(DecodeError::InvalidOpcode(value)),
        }
    }
}

impl From<Opcode> for Word {
    fn from(op: Opcode) -> Word {
        op as Word
    }
}

impl Opcode {
    /// Returns the mnemonic used by the disassembler.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Push => "PUSH",
            Opcode::Dup => "DUP",
            Opcode::Drop => "DROP",
            Opcode::Swap => "SWAP",
            Opcode::Rot => "ROT",
            Opcode::Pick => "PICK",
            Opcode::Plus => "PLUS",
            Opcode::Minus => "MINUS",
            Opcode::Multiply => "MULTIPLY",
            Opcode::Divide => "DIVIDE",
            Opcode::Negative => "NEGATIVE",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Not => "NOT",
            Opcode::More => "MORE",
            Opcode::Equals => "EQUALS",
            Opcode::ReadChar => "READ_CHAR",
            Opcode::WriteChar => "WRITE_CHAR",
            Opcode::WriteInt => "WRITE_INT",
            Opcode::WriteStr => "WRITE_STR",
            Opcode::Flush => "FLUSH",
            Opcode::Store => "STORE",
            Opcode::Fetch => "FETCH",
            Opcode::Copy => "COPY",
            Opcode::Call => "CALL",
            Opcode::CallIf => "CALL_IF",
            Opcode::Return => "RETURN",
            Opcode::Goto => "GOTO",
            Opcode::GotoIf => "GOTO_IF",
            Opcode::End => "END",
        }
    }

    /// Number of inline operand Words that follow the opcode.
    ///
    /// Returns `None` for `WriteStr`, whose operand count is given by its
    /// first inline Word.
    pub fn inline_operands(&self) -> Option<usize> {
        match self {
            Opcode::Push | Opcode::Store | Opcode::Fetch | Opcode::Goto => Some(1),
            Opcode::Copy => Some(2),
            Opcode::WriteStr => None,
            _ => Some(0),
        }
    }
}
