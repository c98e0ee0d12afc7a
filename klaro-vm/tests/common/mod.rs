// klaro-vm - Common test utilities
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Shared test helpers for Klaro VM integration tests.
//!
//! # Usage
//!
//! In your test file, add:
//! ```ignore
//! mod common;
//! use common::*;
//! ```
//!
//! # Available Helpers
//!
//! - [`ImageBuilder`] - Assemble raw bytecode images by hand
//! - [`CaptureOutput`] - A `Write` sink that records PRINT output
//! - [`run`] - Execute an image, returning the result and printed text
//! - [`run_ok`] - Execute an image that must succeed, returning printed lines
//! - [`run_err`] - Execute an image that must fail, returning the error

use std::io::Write;
use std::sync::{Arc, Mutex};

use klaro_vm::image::{TAG_INT, TAG_NUM, TAG_STR};
#[allow(unused_imports)]
pub use klaro_vm::{Op, Result, RuntimeError, Value, Vm};

/// A cloneable `Write` sink that records everything the VM prints.
#[derive(Clone, Default)]
pub struct CaptureOutput(Arc<Mutex<Vec<u8>>>);

impl CaptureOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything printed so far, as UTF-8 text.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    /// Printed output split into lines.
    #[allow(dead_code)]
    pub fn lines(&self) -> Vec<String> {
        self.text().lines().map(str::to_string).collect()
    }
}

impl Write for CaptureOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Assembles a raw bytecode image: constant pool prefix plus instruction
/// stream. Jump offsets can be patched after the fact, mirroring how the
/// compiler back-patches forward jumps.
#[derive(Default)]
pub struct ImageBuilder {
    constants: Vec<u8>,
    count: u8,
    code: Vec<u8>,
}

impl ImageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an integer constant, returning its pool index.
    pub fn const_int(&mut self, value: i32) -> u8 {
        self.constants.push(TAG_INT);
        self.constants.extend_from_slice(&value.to_le_bytes());
        self.next_index()
    }

    /// Add a number constant, returning its pool index.
    #[allow(dead_code)]
    pub fn const_num(&mut self, value: f64) -> u8 {
        self.constants.push(TAG_NUM);
        self.constants.extend_from_slice(&value.to_le_bytes());
        self.next_index()
    }

    /// Add a string constant, returning its pool index.
    #[allow(dead_code)]
    pub fn const_str(&mut self, value: &str) -> u8 {
        self.constants.push(TAG_STR);
        self.constants.push(value.len() as u8);
        self.constants.extend_from_slice(value.as_bytes());
        self.next_index()
    }

    fn next_index(&mut self) -> u8 {
        let idx = self.count;
        self.count += 1;
        idx
    }

    /// Emit an opcode with no immediates.
    pub fn op(&mut self, op: Op) -> &mut Self {
        self.code.push(op as u8);
        self
    }

    /// Emit an opcode with one immediate.
    pub fn op1(&mut self, op: Op, a: u8) -> &mut Self {
        self.code.push(op as u8);
        self.code.push(a);
        self
    }

    /// Emit an opcode with two immediates.
    #[allow(dead_code)]
    pub fn op2(&mut self, op: Op, a: u8, b: u8) -> &mut Self {
        self.code.push(op as u8);
        self.code.push(a);
        self.code.push(b);
        self
    }

    /// Emit a raw byte into the instruction stream.
    #[allow(dead_code)]
    pub fn raw(&mut self, byte: u8) -> &mut Self {
        self.code.push(byte);
        self
    }

    /// Current instruction offset (code-relative).
    #[allow(dead_code)]
    pub fn offset(&self) -> usize {
        self.code.len()
    }

    /// Emit a forward jump-style instruction (JUMP, JUMP_IF_FALSE,
    /// FUNCTION) with a placeholder offset. Returns the position to patch.
    #[allow(dead_code)]
    pub fn emit_jump(&mut self, op: Op) -> usize {
        self.code.push(op as u8);
        self.code.push(0);
        self.code.len() - 1
    }

    /// Patch a placeholder offset so the jump lands at the current position.
    #[allow(dead_code)]
    pub fn patch_jump(&mut self, at: usize) {
        let distance = self.code.len() - (at + 1);
        self.code[at] = distance as u8;
    }

    /// Emit a LOOP instruction jumping back to `target` (a code-relative
    /// offset previously taken from [`ImageBuilder::offset`]).
    #[allow(dead_code)]
    pub fn emit_loop(&mut self, target: usize) {
        let distance = self.code.len() + 2 - target;
        self.code.push(Op::Loop as u8);
        self.code.push(distance as u8);
    }

    /// Assemble the final image bytes.
    pub fn build(&self) -> Vec<u8> {
        let mut image = vec![self.count];
        image.extend_from_slice(&self.constants);
        image.extend_from_slice(&self.code);
        image
    }
}

/// Execute an image, returning the VM result and everything it printed.
pub fn run(image: Vec<u8>) -> (Result<()>, String) {
    let capture = CaptureOutput::new();
    let mut vm = Vm::with_output(capture.clone());
    let result = vm.execute(image);
    (result, capture.text())
}

/// Execute an image that must succeed; returns the printed lines.
#[allow(dead_code)]
pub fn run_ok(image: Vec<u8>) -> Vec<String> {
    let (result, text) = run(image);
    assert!(result.is_ok(), "execution failed: {:?}", result.unwrap_err());
    text.lines().map(str::to_string).collect()
}

/// Execute an image that must fail; returns the error.
#[allow(dead_code)]
pub fn run_err(image: Vec<u8>) -> RuntimeError {
    let (result, text) = run(image);
    assert!(result.is_err(), "expected error, printed: {:?}", text);
    result.unwrap_err()
}
