// klaro-vm - Bytecode virtual machine for the Klaro programming language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Stack-based bytecode virtual machine for Klaro.
//!
//! This crate executes flat bytecode images produced by the Klaro compiler:
//! a constant pool prefix followed by an instruction stream of one-byte
//! opcodes with single-byte immediates. The VM runs the stream against a
//! value stack, a frame pointer, an indexed global table, and a heap of
//! boxed objects; closures are supported through upvalue boxes that alias
//! live stack slots and close over their values when those slots die.

pub mod disasm;
pub mod heap;
pub mod image;
pub mod opcode;
pub mod value;
pub mod vm;

pub use heap::{Handle, Heap, Obj};
pub use opcode::{OP_COUNT, Op};
pub use value::{NUM_PLACES, NUM_PRECISION, Value};
pub use vm::{GLOBAL_MAX, Result, RuntimeError, STACK_MAX, Vm};
