// klaro-vm - Bytecode virtual machine for the Klaro programming language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Struct handlers: Struct, GetField, ExtractField, SetField.

use crate::heap::Handle;
use crate::opcode::Op;
use crate::value::Value;
use crate::vm::{Result, RuntimeError, Vm};

impl Vm {
    /// Execute a struct opcode.
    pub(crate) fn execute_structs(&mut self, op: Op) -> Result<()> {
        match op {
            Op::Struct => {
                let arity = self.read_u8("STRUCT")?;
                let mut fields = vec![Value::Nil; arity as usize];
                for slot in fields.iter_mut().rev() {
                    *slot = self.pop()?;
                }
                let handle = self.heap.alloc_struct(fields);
                self.push(Value::Obj(handle))?;
            }
            Op::GetField => {
                let idx = self.read_u8("GET_FIELD")?;
                let handle = self.pop_struct("GET_FIELD")?;
                let value = self.struct_field(handle, idx)?;
                self.push(value)?;
            }
            Op::ExtractField => {
                let depth = self.read_u8("EXTRACT_FIELD")?;
                let idx = self.read_u8("EXTRACT_FIELD")?;
                let peeked = self.stack.peek(depth as usize)?;
                let handle = self.expect_struct("EXTRACT_FIELD", peeked)?;
                let value = self.struct_field(handle, idx)?;
                self.push(value)?;
            }
            Op::SetField => {
                let idx = self.read_u8("SET_FIELD")?;
                let value = self.pop()?;
                let top = self.stack.peek(0)?;
                let handle = self.expect_struct("SET_FIELD", top)?;
                let fields = self
                    .heap
                    .struct_fields_mut(handle)
                    .ok_or(RuntimeError::Internal("SET_FIELD: struct handle lost"))?;
                let slot = fields
                    .get_mut(idx as usize)
                    .ok_or(RuntimeError::FieldOutOfRange(idx))?;
                *slot = value;
            }
            _ => {
                return Err(RuntimeError::Internal("execute_structs: unexpected opcode"));
            }
        }
        Ok(())
    }

    fn struct_field(&self, handle: Handle, idx: u8) -> Result<Value> {
        self.heap
            .struct_fields(handle)
            .ok_or(RuntimeError::Internal("struct handle lost"))?
            .get(idx as usize)
            .copied()
            .ok_or(RuntimeError::FieldOutOfRange(idx))
    }
}
