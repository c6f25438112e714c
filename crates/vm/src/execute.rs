//! Main execution loop and opcode dispatch.

use std::io::{self, BufRead, BufWriter, Write};

use crate::error::RuntimeFault;
use crate::machine::Machine;
use stackvm_common::{Opcode, Word};
use tracing::debug;

impl Machine {
    /// Execute the loaded image until `End` or the first fault.
    ///
    /// Output is buffered and flushed on `Flush` and whenever this method
    /// returns, so output written before a fault is never lost.
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        mut input: R,
        output: W,
    ) -> Result<(), RuntimeFault> {
        let mut out = BufWriter::new(output);
        let result = self.execute(&mut input, &mut out);
        let flushed = out.flush().map_err(|e| self.io_fault(e));

        match &result {
            Ok(()) => debug!(executed = self.executed, "vm halted"),
            Err(fault) => debug!(executed = self.executed, %fault, "vm faulted"),
        }
        result.and(flushed)
    }

    fn execute<R: BufRead, W: Write>(
        &mut self,
        input: &mut R,
        out: &mut W,
    ) -> Result<(), RuntimeFault> {
        loop {
            self.current = self.ip;
            let word = self.next()?;
            let opcode = Opcode::try_from(word).map_err(|_| RuntimeFault::InvalidInstruction {
                at: self.current,
                word,
            })?;
            self.executed += 1;

            match opcode {
                // Literal
                Opcode::Push => {
                    let value = self.next()?;
                    self.push(value)?;
                }

                // Stack shuffle
                Opcode::Dup => {
                    let value = self.peek()?;
                    self.push(value)?;
                }
                Opcode::Drop => {
                    self.pop()?;
                }
                Opcode::Swap => {
                    let b = self.pop()?;
                    let a = self.pop()?;
                    self.push(b)?;
                    self.push(a)?;
                }
                Opcode::Rot => {
                    let c = self.pop()?;
                    let b = self.pop()?;
                    let a = self.pop()?;
                    self.push(b)?;
                    self.push(c)?;
                    self.push(a)?;
                }
                Opcode::Pick => {
                    let k = self.pop()?;
                    let value = self.pick(k)?;
                    self.push(value)?;
                }

                // Arithmetic & logic
                Opcode::Plus => self.exec_binary(|a, b| a.wrapping_add(b))?,
                Opcode::Minus => self.exec_binary(|a, b| a.wrapping_sub(b))?,
                Opcode::Multiply => self.exec_binary(|a, b| a.wrapping_mul(b))?,
                Opcode::Divide => self.exec_divide()?,
                Opcode::Negative => {
                    let a = self.pop()?;
                    self.push(a.wrapping_neg())?;
                }
                Opcode::And => self.exec_binary(|a, b| flag(a != 0 && b != 0))?,
                Opcode::Or => self.exec_binary(|a, b| flag(a != 0 || b != 0))?,
                Opcode::Not => {
                    let a = self.pop()?;
                    self.push(flag(a == 0))?;
                }

                // Comparison
                Opcode::More => self.exec_binary(|a, b| flag(a > b))?,
                Opcode::Equals => self.exec_binary(|a, b| flag(a == b))?,

                // I/O
                Opcode::ReadChar => {
                    let code = read_char(input)
                        .map_err(|e| self.io_fault(e))?
                        .map_or(0, |c| c as Word);
                    self.push(code)?;
                }
                Opcode::WriteChar => {
                    let code = self.pop()?;
                    write_char(out, code).map_err(|e| self.io_fault(e))?;
                }
                Opcode::WriteInt => {
                    let value = self.pop()?;
                    write!(out, "{value}").map_err(|e| self.io_fault(e))?;
                }
                Opcode::WriteStr => {
                    let len = self.next()?;
                    for _ in 0..len.max(0) {
                        let code = self.next()?;
                        write_char(out, code).map_err(|e| self.io_fault(e))?;
                    }
                }
                Opcode::Flush => out.flush().map_err(|e| self.io_fault(e))?,

                // Memory
                Opcode::Store => {
                    let address = self.next()?;
                    let cell = self.data_address(address)?;
                    let value = self.pop()?;
                    self.memory[cell] = value;
                }
                Opcode::Fetch => {
                    let address = self.next()?;
                    let cell = self.data_address(address)?;
                    let value = self.memory[cell];
                    self.push(value)?;
                }
                Opcode::Copy => {
                    let from = self.next()?;
                    let to = self.next()?;
                    let from = self.data_address(from)?;
                    let to = self.data_address(to)?;
                    self.memory[to] = self.memory[from];
                }

                // Control
                Opcode::Call => {
                    let address = self.pop()?;
                    self.exec_call(address)?;
                }
                Opcode::CallIf => {
                    let address = self.pop()?;
                    let condition = self.pop()?;
                    if condition != 0 {
                        self.exec_call(address)?;
                    }
                }
                Opcode::Return => {
                    let address = self.pop_return()?;
                    self.jump(address)?;
                }
                Opcode::Goto => {
                    let address = self.next()?;
                    self.jump(address)?;
                }
                Opcode::GotoIf => {
                    let address = self.pop()?;
                    let condition = self.pop()?;
                    if condition != 0 {
                        self.jump(address)?;
                    }
                }
                Opcode::End => return Ok(()),
            }
        }
    }

    /// Pop `b` then `a`, push `op(a, b)`.
    fn exec_binary(&mut self, op: fn(Word, Word) -> Word) -> Result<(), RuntimeFault> {
        let b = self.pop()?;
        let a = self.pop()?;
        self.push(op(a, b))
    }

    fn exec_divide(&mut self) -> Result<(), RuntimeFault> {
        let b = self.pop()?;
        let a = self.pop()?;
        if b == 0 {
            return Err(RuntimeFault::DivisionByZero { at: self.current });
        }
        // Truncates toward zero; Word::MIN / -1 wraps.
        self.push(a.wrapping_div(b))
    }

    fn exec_call(&mut self, address: Word) -> Result<(), RuntimeFault> {
        let ret = self.return_address();
        self.push_return(ret)?;
        self.jump(address)
    }

    fn io_fault(&self, error: io::Error) -> RuntimeFault {
        RuntimeFault::Io {
            at: self.current,
            message: error.to_string(),
        }
    }
}

fn flag(value: bool) -> Word {
    Word::from(value)
}

/// Read one UTF-8 encoded character. Returns `None` at end of input.
fn read_char<R: BufRead>(input: &mut R) -> io::Result<Option<char>> {
    let mut buf = [0u8; 4];
    match input.read_exact(&mut buf[..1]) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e),
    }

    let width = match buf[0] {
        0x00..=0x7f => 1,
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        _ => return Err(invalid_utf8()),
    };
    input.read_exact(&mut buf[1..width])?;

    std::str::from_utf8(&buf[..width])
        .ok()
        .and_then(|s| s.chars().next())
        .map(Some)
        .ok_or_else(invalid_utf8)
}

fn invalid_utf8() -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, "input is not valid UTF-8")
}

/// Write a character code, substituting U+FFFD for invalid scalars.
fn write_char<W: Write>(out: &mut W, code: Word) -> io::Result<()> {
    let c = u32::try_from(code)
        .ok()
        .and_then(char::from_u32)
        .unwrap_or(char::REPLACEMENT_CHARACTER);
    let mut buf = [0u8; 4];
    out.write_all(c.encode_utf8(&mut buf).as_bytes())
}
