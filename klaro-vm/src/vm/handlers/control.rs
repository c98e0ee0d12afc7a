// klaro-vm - Bytecode virtual machine for the Klaro programming language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Control flow handlers: jumps, function literals, calls, and the return
//! convention.
//!
//! A call saves the return code pointer and the caller's frame pointer
//! *below* the new frame: after `CALL n` the stack reads
//! `[.. CodePtr(ret) FramePtr(caller) arg0 .. argn-1]` with `fp` at `arg0`.
//! The callee returns by storing its result with SetReturn, popping its
//! locals, then executing LoadFp and LoadIp against the saved slots; the
//! caller picks the result up with PushReturn.

use crate::opcode::Op;
use crate::value::Value;
use crate::vm::{Result, RuntimeError, Vm};

impl Vm {
    /// Execute a control flow opcode.
    pub(crate) fn execute_control(&mut self, op: Op) -> Result<()> {
        match op {
            Op::Jump => {
                let off = self.read_u8("JUMP")?;
                self.jump_forward("JUMP", off)?;
            }
            Op::JumpIfFalse => {
                let off = self.read_u8("JUMP_IF_FALSE")?;
                let cond = self.pop_bool("JUMP_IF_FALSE")?;
                if !cond {
                    self.jump_forward("JUMP_IF_FALSE", off)?;
                }
            }
            Op::Loop => {
                let off = self.read_u8("LOOP")?;
                self.jump_back("LOOP", off)?;
            }

            Op::Function => {
                let off = self.read_u8("FUNCTION")?;
                let entry = self.ip;
                self.push(Value::CodePtr(entry))?;
                self.jump_forward("FUNCTION", off)?;
            }
            Op::Call => {
                let argc = self.read_u8("CALL")?;
                self.call(argc as usize)?;
            }
            Op::LoadIp => {
                let target = match self.pop()? {
                    Value::CodePtr(offset) => offset,
                    other => return Err(self.type_mismatch("LOAD_IP", "code", other)),
                };
                self.ip = self.check_code_target("LOAD_IP", target)?;
            }
            Op::LoadFp => {
                let frame = match self.pop()? {
                    Value::FramePtr(offset) => offset,
                    other => return Err(self.type_mismatch("LOAD_FP", "frame", other)),
                };
                self.fp = frame;
            }
            Op::SetReturn => {
                self.return_store = self.pop()?;
            }
            Op::PushReturn => {
                self.push(self.return_store)?;
            }

            _ => {
                return Err(RuntimeError::Internal("execute_control: unexpected opcode"));
            }
        }
        Ok(())
    }

    fn call(&mut self, argc: usize) -> Result<()> {
        let target = match self.pop()? {
            Value::CodePtr(offset) => offset,
            other => return Err(self.type_mismatch("CALL", "code", other)),
        };
        let target = self.check_code_target("CALL", target)?;

        let mut args = Vec::with_capacity(argc);
        for _ in 0..argc {
            args.push(self.pop()?);
        }
        args.reverse();

        self.push(Value::CodePtr(self.ip))?;
        self.push(Value::FramePtr(self.fp))?;
        self.fp = self.stack.len();
        self.ip = target;

        for arg in args {
            self.push(arg)?;
        }
        Ok(())
    }
}
