//! stackvm virtual machine: executes bytecode images.
//!
//! The machine is a single-threaded integer stack machine with:
//! - One Word array holding the program/data region and both stacks
//! - An operand stack for intermediate values
//! - A call stack of return addresses
//!
//! # Usage
//!
//! ```
//! use stackvm_common::{Image, Opcode};
//! use stackvm_vm::{run, MemoryLayout};
//!
//! let image = Image::new(vec![
//!     Opcode::Push as i32, 3,
//!     Opcode::Push as i32, 4,
//!     Opcode::Plus as i32,
//!     Opcode::WriteInt as i32,
//!     Opcode::End as i32,
//! ]);
//!
//! let mut output = Vec::new();
//! run(&image, MemoryLayout::default(), &b""[..], &mut output).unwrap();
//! assert_eq!(output, b"7");
//! ```

pub mod error;
pub mod execute;
pub mod layout;
pub mod machine;
pub mod stack;

pub use error::{LayoutError, LoadError, RuntimeFault, StackError, StackKind, VmError};
pub use layout::MemoryLayout;
pub use machine::{Machine, Snapshot};
pub use stack::BoundedStack;

use std::io::{BufRead, Write};

use stackvm_common::Image;

/// Load and execute an image on a fresh machine.
///
/// Returns the number of instructions executed.
///
/// # Errors
///
/// Returns [`VmError`] if the layout is inconsistent, the image does not
/// fit, or execution faults.
pub fn run<R: BufRead, W: Write>(
    image: &Image,
    layout: MemoryLayout,
    input: R,
    output: W,
) -> Result<u64, VmError> {
    let mut vm = Machine::new(layout)?;
    vm.load(image)?;
    vm.run(input, output)?;
    Ok(vm.executed())
}
