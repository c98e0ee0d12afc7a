// klaro-vm - Bytecode virtual machine for the Klaro programming language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Arithmetic, comparison, string, and logic handlers.
//!
//! The instruction set is split per type: the compiler emits the typed
//! variant, and the VM fails with a type mismatch when operands disagree.
//! Integer arithmetic wraps; float arithmetic follows IEEE, with ordering
//! comparisons widened by NUM_PRECISION.

use crate::opcode::Op;
use crate::value::{NUM_PRECISION, Value};
use crate::vm::{Result, RuntimeError, Vm};

impl Vm {
    /// Execute an arithmetic, comparison, string, or logic opcode.
    pub(crate) fn execute_arithmetic(&mut self, op: Op) -> Result<()> {
        match op {
            Op::IntAdd => self.binary_int_op("INT_ADD", |a, b| a.wrapping_add(b)),
            Op::IntSub => self.binary_int_op("INT_SUB", |a, b| a.wrapping_sub(b)),
            Op::IntMul => self.binary_int_op("INT_MUL", |a, b| a.wrapping_mul(b)),
            Op::IntDiv => {
                let b = self.pop_int("INT_DIV")?;
                let a = self.pop_int("INT_DIV")?;
                if b == 0 {
                    return Err(RuntimeError::DivByZero);
                }
                self.push(Value::Int(a.wrapping_div(b)))
            }
            Op::IntNeg => {
                let a = self.pop_int("INT_NEG")?;
                self.push(Value::Int(a.wrapping_neg()))
            }
            Op::IntLess => self.int_comparison("INT_LESS", |a, b| a < b),
            Op::IntGreater => self.int_comparison("INT_GREATER", |a, b| a > b),

            Op::NumAdd => self.binary_num_op("NUM_ADD", |a, b| a + b),
            Op::NumSub => self.binary_num_op("NUM_SUB", |a, b| a - b),
            Op::NumMul => self.binary_num_op("NUM_MUL", |a, b| a * b),
            Op::NumDiv => self.binary_num_op("NUM_DIV", |a, b| a / b),
            Op::NumNeg => {
                let a = self.pop_num("NUM_NEG")?;
                self.push(Value::Num(-a))
            }
            Op::NumLess => self.num_comparison("NUM_LESS", |a, b| a < b - NUM_PRECISION),
            Op::NumGreater => self.num_comparison("NUM_GREATER", |a, b| a > b + NUM_PRECISION),

            Op::StrCat => {
                let b = self.pop_str("STR_CAT")?;
                let a = self.pop_str("STR_CAT")?;
                let joined = self.heap.concat(a, b)?;
                self.push(Value::Obj(joined))
            }
            Op::Not => {
                let b = self.pop_bool("NOT")?;
                self.push(Value::Bool(!b))
            }
            Op::Equal => {
                let b = self.pop()?;
                let a = self.pop()?;
                let equal = self.heap.values_equal(a, b);
                self.push(Value::Bool(equal))
            }

            _ => Err(RuntimeError::Internal(
                "execute_arithmetic: unexpected opcode",
            )),
        }
    }

    fn binary_int_op(&mut self, op: &'static str, f: impl Fn(i32, i32) -> i32) -> Result<()> {
        let b = self.pop_int(op)?;
        let a = self.pop_int(op)?;
        self.push(Value::Int(f(a, b)))
    }

    fn int_comparison(&mut self, op: &'static str, f: impl Fn(i32, i32) -> bool) -> Result<()> {
        let b = self.pop_int(op)?;
        let a = self.pop_int(op)?;
        self.push(Value::Bool(f(a, b)))
    }

    fn binary_num_op(&mut self, op: &'static str, f: impl Fn(f64, f64) -> f64) -> Result<()> {
        let b = self.pop_num(op)?;
        let a = self.pop_num(op)?;
        self.push(Value::Num(f(a, b)))
    }

    fn num_comparison(&mut self, op: &'static str, f: impl Fn(f64, f64) -> bool) -> Result<()> {
        let b = self.pop_num(op)?;
        let a = self.pop_num(op)?;
        self.push(Value::Bool(f(a, b)))
    }
}
