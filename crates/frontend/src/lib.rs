//! stackvm front-ends: source text → bytecode image.
//!
//! Three languages compile onto the same instruction set through the
//! shared [`Emitter`]:
//!
//! - **FALSE** (`.f`, `.false`): a postfix language with variables,
//!   subroutines and loops.
//! - **Brainfuck** (`.bf`): an eight-command tape machine.
//! - **Arithmetic** (`.expr`, `.calc`): one infix integer expression whose
//!   value is printed.
//!
//! # Usage
//!
//! ```
//! use stackvm_frontend::{compile, disassemble, Language};
//!
//! let image = compile(Language::Arithmetic, "2 * (3 + 4)").unwrap();
//! let text = disassemble(&image);
//! assert!(text.starts_with("0000: PUSH 2\n"));
//! ```
//!
//! Compilation either succeeds with a complete image or fails with a
//! [`CompileError`]; a partial image is never returned.

pub mod error;
pub mod source;

mod arithmetic;
mod brainfuck;
mod disassembler;
mod false_lang;

pub use arithmetic::ArithmeticFrontend;
pub use brainfuck::{BrainfuckFrontend, TAPE_CELLS};
pub use disassembler::disassemble;
pub use error::{CompileError, UnknownLanguage};
pub use false_lang::{Command, FalseFrontend};
pub use source::Span;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use stackvm_common::Image;
use stackvm_emitter::Emitter;
use tracing::debug;

/// A source language compiler.
///
/// Implementations write the whole program into `emitter`, ending with
/// exactly one END and leaving no block open.
pub trait Frontend {
    fn compile(&self, source: &str, emitter: &mut Emitter) -> Result<(), CompileError>;
}

/// The source languages stackvm can compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    False,
    Brainfuck,
    Arithmetic,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::False, Language::Brainfuck, Language::Arithmetic];

    /// Guess the language from a file extension (without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "f" | "false" => Some(Language::False),
            "bf" => Some(Language::Brainfuck),
            "expr" | "calc" => Some(Language::Arithmetic),
            _ => None,
        }
    }

    /// Guess the language from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn name(self) -> &'static str {
        match self {
            Language::False => "false",
            Language::Brainfuck => "bf",
            Language::Arithmetic => "arith",
        }
    }

    pub fn frontend(self) -> &'static dyn Frontend {
        match self {
            Language::False => &FalseFrontend,
            Language::Brainfuck => &BrainfuckFrontend,
            Language::Arithmetic => &ArithmeticFrontend,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "false" => Ok(Language::False),
            "bf" | "brainfuck" => Ok(Language::Brainfuck),
            "arith" | "arithmetic" => Ok(Language::Arithmetic),
            _ => Err(UnknownLanguage(s.to_string())),
        }
    }
}

/// Compile source text to a finished image.
///
/// Returns the first error encountered.
pub fn compile(language: Language, source: &str) -> Result<Image, CompileError> {
    let mut emitter = Emitter::new();
    language.frontend().compile(source, &mut emitter)?;
    let image = emitter.finish()?;
    debug!(%language, words = image.len(), "compiled");
    Ok(image)
}
