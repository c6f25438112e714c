//! Tokenizer for FALSE source.

use stackvm_common::{Opcode, Word};

use crate::error::CompileError;
use crate::source::{Cursor, Span};

/// Single-character commands that compile to exactly one opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Dup,
    Drop,
    Swap,
    Rot,
    Pick,
    Plus,
    Minus,
    Multiply,
    Divide,
    Negative,
    And,
    Or,
    Not,
    Greater,
    Equals,
    ReadChar,
    WriteChar,
    WriteInt,
    Flush,
}

impl Command {
    pub const ALL: [Command; 19] = [
        Command::Dup,
        Command::Drop,
        Command::Swap,
        Command::Rot,
        Command::Pick,
        Command::Plus,
        Command::Minus,
        Command::Multiply,
        Command::Divide,
        Command::Negative,
        Command::And,
        Command::Or,
        Command::Not,
        Command::Greater,
        Command::Equals,
        Command::ReadChar,
        Command::WriteChar,
        Command::WriteInt,
        Command::Flush,
    ];

    pub fn from_char(c: char) -> Option<Self> {
        let cmd = match c {
            '$' => Command::Dup,
            '%' => Command::Drop,
            '\\' => Command::Swap,
            '@' => Command::Rot,
            'ø' => Command::Pick,
            '+' => Command::Plus,
            '-' => Command::Minus,
            '*' => Command::Multiply,
            '/' => Command::Divide,
            '_' => Command::Negative,
            '&' => Command::And,
            '|' => Command::Or,
            '~' => Command::Not,
            '>' => Command::Greater,
            '=' => Command::Equals,
            '^' => Command::ReadChar,
            ',' => Command::WriteChar,
            '.' => Command::WriteInt,
            'ß' => Command::Flush,
            _ => return None,
        };
        Some(cmd)
    }

    pub fn symbol(self) -> char {
        match self {
            Command::Dup => '$',
            Command::Drop => '%',
            Command::Swap => '\\',
            Command::Rot => '@',
            Command::Pick => 'ø',
            Command::Plus => '+',
            Command::Minus => '-',
            Command::Multiply => '*',
            Command::Divide => '/',
            Command::Negative => '_',
            Command::And => '&',
            Command::Or => '|',
            Command::Not => '~',
            Command::Greater => '>',
            Command::Equals => '=',
            Command::ReadChar => '^',
            Command::WriteChar => ',',
            Command::WriteInt => '.',
            Command::Flush => 'ß',
        }
    }

    pub fn opcode(self) -> Opcode {
        match self {
            Command::Dup => Opcode::Dup,
            Command::Drop => Opcode::Drop,
            Command::Swap => Opcode::Swap,
            Command::Rot => Opcode::Rot,
            Command::Pick => Opcode::Pick,
            Command::Plus => Opcode::Plus,
            Command::Minus => Opcode::Minus,
            Command::Multiply => Opcode::Multiply,
            Command::Divide => Opcode::Divide,
            Command::Negative => Opcode::Negative,
            Command::And => Opcode::And,
            Command::Or => Opcode::Or,
            Command::Not => Opcode::Not,
            Command::Greater => Opcode::More,
            Command::Equals => Opcode::Equals,
            Command::ReadChar => Opcode::ReadChar,
            Command::WriteChar => Opcode::WriteChar,
            Command::WriteInt => Opcode::WriteInt,
            Command::Flush => Opcode::Flush,
        }
    }
}

/// How a variable reference uses its cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Access {
    Store,
    Fetch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Int(Word),
    Char(char),
    Var(char, Access),
    SubStart,
    SubEnd,
    Call,
    If,
    While,
    Command(Command),
    Str(String),
}

/// Tokenize a whole FALSE program. Comments and whitespace are dropped.
pub(crate) fn tokenize(source: &str) -> Result<Vec<(Span, Token)>, CompileError> {
    let mut cur = Cursor::new(source);
    let mut tokens = Vec::new();

    while let Some(c) = cur.peek() {
        let span = cur.span();

        if c.is_whitespace() {
            cur.bump();
            continue;
        }
        if c == '{' {
            skip_comment(&mut cur, span)?;
            continue;
        }

        let token = if c.is_ascii_digit() {
            let digits = cur.take_while(|c| c.is_ascii_digit());
            let value = digits
                .parse::<Word>()
                .map_err(|_| CompileError::syntax(span, &digits, "integer literal out of range"))?;
            Token::Int(value)
        } else if c.is_ascii_lowercase() {
            cur.bump();
            Token::Var(c, read_access(&mut cur, c)?)
        } else {
            cur.bump();
            match c {
                '\'' => {
                    let ch = cur.bump().ok_or_else(|| {
                        CompileError::syntax(span, "'", "unterminated character literal")
                    })?;
                    Token::Char(ch)
                }
                '"' => Token::Str(read_string(&mut cur, span)?),
                '[' => Token::SubStart,
                ']' => Token::SubEnd,
                '!' => Token::Call,
                '?' => Token::If,
                '#' => Token::While,
                _ => match Command::from_char(c) {
                    Some(cmd) => Token::Command(cmd),
                    None => return Err(CompileError::unknown(span, c)),
                },
            }
        };
        tokens.push((span, token));
    }

    Ok(tokens)
}

/// Read the `:` or `;` after a variable name, allowing one whitespace
/// character in between.
fn read_access(cur: &mut Cursor<'_>, name: char) -> Result<Access, CompileError> {
    cur.bump_if(char::is_whitespace);
    let span = cur.span();
    match cur.bump() {
        Some(':') => Ok(Access::Store),
        Some(';') => Ok(Access::Fetch),
        Some(other) => Err(CompileError::syntax(
            span,
            other.to_string(),
            format!("expected ':' or ';' after variable '{name}'"),
        )),
        None => Err(CompileError::syntax(
            span,
            "<eof>",
            format!("expected ':' or ';' after variable '{name}'"),
        )),
    }
}

/// Read a string body after the opening quote. `\` takes the next
/// character literally.
fn read_string(cur: &mut Cursor<'_>, start: Span) -> Result<String, CompileError> {
    let mut text = String::new();
    loop {
        match cur.bump() {
            Some('"') => return Ok(text),
            Some('\\') => match cur.bump() {
                Some(c) => text.push(c),
                None => break,
            },
            Some(c) => text.push(c),
            None => break,
        }
    }
    Err(CompileError::syntax(start, "\"", "unterminated string"))
}

fn skip_comment(cur: &mut Cursor<'_>, start: Span) -> Result<(), CompileError> {
    cur.bump();
    while let Some(c) = cur.bump() {
        if c == '}' {
            return Ok(());
        }
    }
    Err(CompileError::syntax(start, "{", "unterminated comment"))
}
