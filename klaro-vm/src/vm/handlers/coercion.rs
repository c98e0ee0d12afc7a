// klaro-vm - Bytecode virtual machine for the Klaro programming language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Type coercion handlers: Int, Num, Bool, Str.
//!
//! Coercions replace the value in the top slot without popping it, so a
//! slot's upvalue back-chain survives coercion in place.

use crate::opcode::Op;
use crate::value::{NUM_PRECISION, Value};
use crate::vm::{Result, RuntimeError, Vm};

impl Vm {
    /// Execute a coercion opcode.
    pub(crate) fn execute_coercion(&mut self, op: Op) -> Result<()> {
        let value = self.stack.peek(0)?;
        let coerced = match op {
            Op::Int => match value {
                Value::Bool(b) => Value::Int(b as i32),
                Value::Int(_) => value,
                Value::Nil => Value::Int(0),
                Value::Num(x) => Value::Int(x as i32),
                other => return Err(self.type_mismatch("INT", "bool, nil, or number", other)),
            },
            Op::Num => match value {
                Value::Bool(b) => Value::Num(b as i32 as f64),
                Value::Int(i) => Value::Num(i as f64),
                Value::Nil => Value::Num(0.0),
                Value::Num(_) => value,
                other => return Err(self.type_mismatch("NUM", "bool, nil, or number", other)),
            },
            Op::Bool => match value {
                Value::Bool(_) => value,
                Value::Int(i) => Value::Bool(i != 0),
                Value::Nil => Value::Bool(false),
                // The zero-ish test: a num coerces to true exactly when it
                // is within NUM_PRECISION of zero. Pinned by the bytecode
                // contract with the compiler.
                Value::Num(x) => Value::Bool(x.abs() < NUM_PRECISION),
                other => return Err(self.type_mismatch("BOOL", "bool, nil, or number", other)),
            },
            Op::Str => {
                let handle = self.heap.stringify(value);
                Value::Obj(handle)
            }
            _ => {
                return Err(RuntimeError::Internal(
                    "execute_coercion: unexpected opcode",
                ));
            }
        };
        let top = self.stack.len() - 1;
        self.stack.set_value(top, coerced)
    }
}
