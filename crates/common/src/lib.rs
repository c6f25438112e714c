//! stackvm common types and image encoding.
//!
//! This crate provides the foundational data structures shared by the
//! emitter, the front-ends and the virtual machine:
//!
//! - [`Word`]: the 32-bit signed cell type of code, data and stacks
//! - [`Opcode`]: the 30 opcodes and their inline operand counts
//! - [`Image`]: a Word stream with little-endian byte encoding
//! - [`DecodeError`]: errors from decoding byte streams and opcode Words

pub mod error;
pub mod image;
pub mod opcode;

// Re-export commonly used types at the crate root.
pub use error::DecodeError;
pub use image::Image;
pub use opcode::Opcode;

/// The VM's only data type. Addresses, opcodes, operands and character
/// codes are all Words.
pub type Word = i32;
