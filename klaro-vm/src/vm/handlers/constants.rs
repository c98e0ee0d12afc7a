// klaro-vm - Bytecode virtual machine for the Klaro programming language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Constant and stack opcode handlers: PushConst, PushTrue, PushFalse,
//! PushNil, Pop.

use crate::opcode::Op;
use crate::value::Value;
use crate::vm::{Result, RuntimeError, Vm};

impl Vm {
    /// Execute a constant or stack opcode.
    pub(crate) fn execute_constants(&mut self, op: Op) -> Result<()> {
        match op {
            Op::PushConst => {
                let idx = self.read_u8("PUSH_CONST")?;
                let value = self.get_constant(idx)?;
                self.push(value)?;
            }
            Op::PushTrue => self.push(Value::Bool(true))?,
            Op::PushFalse => self.push(Value::Bool(false))?,
            Op::PushNil => self.push(Value::Nil)?,
            Op::Pop => {
                self.pop()?;
            }
            _ => {
                return Err(RuntimeError::Internal(
                    "execute_constants: unexpected opcode",
                ));
            }
        }
        Ok(())
    }
}
