// klaro-vm - Bytecode virtual machine for the Klaro programming language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Variable opcode handlers: SetGlobal, PushGlobal, SetLocal, PushLocal.

use crate::opcode::Op;
use crate::vm::{Result, RuntimeError, Vm};

impl Vm {
    /// Execute a variable opcode.
    pub(crate) fn execute_variables(&mut self, op: Op) -> Result<()> {
        match op {
            Op::SetGlobal => {
                let idx = self.read_u8("SET_GLOBAL")?;
                let value = self.pop()?;
                self.globals.set(idx as usize, value)?;
            }
            Op::PushGlobal => {
                let idx = self.read_u8("PUSH_GLOBAL")?;
                let value = self.globals.get(idx as usize)?;
                self.push(value)?;
            }
            Op::SetLocal => {
                let idx = self.read_u8("SET_LOCAL")?;
                let value = self.pop()?;
                let slot = self.local_index(idx)?;
                self.stack.set_value(slot, value)?;
            }
            Op::PushLocal => {
                let idx = self.read_u8("PUSH_LOCAL")?;
                let slot = self.local_index(idx)?;
                let value = self.stack.get(slot)?;
                self.push(value)?;
            }
            _ => {
                return Err(RuntimeError::Internal(
                    "execute_variables: unexpected opcode",
                ));
            }
        }
        Ok(())
    }
}
