// klaro-vm - Bytecode virtual machine for the Klaro programming language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Upvalue handlers: RefLocal, Deref, SetRef.
//!
//! An open upvalue aliases a live stack slot; the slot's back-chain makes
//! the aliasing visible to POP, which closes every chained upvalue before
//! the slot dies. Once closed, the chain head owns the value and the other
//! members alias the head, so every upvalue over one slot keeps reading and
//! writing a single shared cell.

use crate::heap::{Handle, Obj, UpvalueTarget};
use crate::opcode::Op;
use crate::value::Value;
use crate::vm::{Result, RuntimeError, Vm};

impl Vm {
    /// Execute an upvalue opcode.
    pub(crate) fn execute_upvalues(&mut self, op: Op) -> Result<()> {
        match op {
            Op::RefLocal => {
                let idx = self.read_u8("REF_LOCAL")?;
                let slot = self.local_index(idx)?;
                let head = self.stack.chain_head(slot)?;
                let handle = self.heap.alloc_upvalue(slot, head);
                self.stack.set_chain_head(slot, Some(handle))?;
                self.push(Value::Obj(handle))?;
            }
            Op::Deref => {
                let top = self.stack.peek(0)?;
                let handle = self.expect_upvalue("DEREF", top)?;
                let value = self.read_through(handle)?;
                let top_index = self.stack.len() - 1;
                self.stack.set_value(top_index, value)?;
            }
            Op::SetRef => {
                let value = self.pop()?;
                let target = self.pop()?;
                let handle = self.expect_upvalue("SET_REF", target)?;
                self.write_through(handle, value)?;
            }
            _ => {
                return Err(RuntimeError::Internal(
                    "execute_upvalues: unexpected opcode",
                ));
            }
        }
        Ok(())
    }

    fn expect_upvalue(&self, op: &'static str, value: Value) -> Result<Handle> {
        match value {
            Value::Obj(handle) if matches!(self.heap.get(handle), Obj::Upvalue(_)) => Ok(handle),
            other => Err(self.type_mismatch(op, "upvalue", other)),
        }
    }

    /// Read the value an upvalue's cell currently holds.
    fn read_through(&self, handle: Handle) -> Result<Value> {
        match self.heap.upvalue(handle)?.target {
            UpvalueTarget::Open(slot) => self.stack.get(slot),
            UpvalueTarget::Closed(value) => Ok(value),
            UpvalueTarget::Shared(inner) => match self.heap.upvalue(inner)?.target {
                UpvalueTarget::Closed(value) => Ok(value),
                _ => Err(RuntimeError::Internal("shared upvalue alias is not closed")),
            },
        }
    }

    /// Write a value through an upvalue's cell.
    fn write_through(&mut self, handle: Handle, value: Value) -> Result<()> {
        match self.heap.upvalue(handle)?.target {
            UpvalueTarget::Open(slot) => self.stack.set_value(slot, value),
            UpvalueTarget::Closed(_) => {
                self.heap.upvalue_mut(handle)?.target = UpvalueTarget::Closed(value);
                Ok(())
            }
            UpvalueTarget::Shared(inner) => match self.heap.upvalue(inner)?.target {
                UpvalueTarget::Closed(_) => {
                    self.heap.upvalue_mut(inner)?.target = UpvalueTarget::Closed(value);
                    Ok(())
                }
                _ => Err(RuntimeError::Internal("shared upvalue alias is not closed")),
            },
        }
    }
}
