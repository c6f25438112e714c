//! Bytecode emitter shared by every stackvm front-end.
//!
//! The [`Emitter`] writes instructions into a stack of buffers. Deferred
//! code (loop and conditional bodies, inline data) goes into a nested
//! buffer whose final position is fixed when it is opened, so jump targets
//! are known at write time and the image never needs patching.
//!
//! # Usage
//!
//! ```
//! use stackvm_emitter::Emitter;
//!
//! let mut e = Emitter::new();
//! e.sub_create();
//! e.write_string("hi");
//! e.sub_return().unwrap();
//! e.write_call();
//! e.write_end();
//! let image = e.finish().unwrap();
//! assert!(!image.is_empty());
//! ```

mod buffer;
pub mod emitter;
pub mod error;
pub mod operand;
mod patterns;

pub use emitter::{Emitter, SKIP_HEADER};
pub use error::EmitError;
pub use operand::{Address, BooleanFlag, CharCode};
