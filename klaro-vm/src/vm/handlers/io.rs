// klaro-vm - Bytecode virtual machine for the Klaro programming language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! I/O handlers: Print, PrintBlank, Clock.

use crate::opcode::Op;
use crate::value::Value;
use crate::vm::{Result, RuntimeError, Vm};

impl Vm {
    /// Execute an I/O opcode.
    pub(crate) fn execute_io(&mut self, op: Op) -> Result<()> {
        match op {
            Op::Print => {
                let handle = self.pop_str("PRINT")?;
                let bytes = self
                    .heap
                    .str_bytes(handle)
                    .ok_or(RuntimeError::Internal("PRINT: string handle lost"))?;
                self.out.write_all(bytes)?;
                self.out.write_all(b"\n")?;
            }
            Op::PrintBlank => {
                self.out.write_all(b"\n")?;
            }
            Op::Clock => {
                let seconds = self.started.elapsed().as_secs_f64();
                self.push(Value::Num(seconds))?;
            }
            _ => return Err(RuntimeError::Internal("execute_io: unexpected opcode")),
        }
        Ok(())
    }
}
