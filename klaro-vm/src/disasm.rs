// klaro-vm - Bytecode virtual machine for the Klaro programming language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Image disassembly.
//!
//! Renders an image's constant pool and instruction stream as text, one
//! instruction per line with its byte offset, mnemonic, and immediates.

use crate::heap::Heap;
use crate::image;
use crate::opcode::Op;
use crate::value::{Value, format_num};
use crate::vm::{Result, RuntimeError};

/// Disassemble a whole image.
pub fn disassemble(bytes: &[u8]) -> Result<String> {
    let mut heap = Heap::new();
    let loaded = image::load_constants(bytes, &mut heap)?;

    let mut out = String::new();
    out.push_str("== constants ==\n");
    for (idx, constant) in loaded.constants.iter().enumerate() {
        out.push_str(&format!(
            "{:4}  {}\n",
            idx,
            render_constant(&heap, *constant)
        ));
    }

    out.push_str("== code ==\n");
    let mut offset = loaded.code_start;
    while offset < bytes.len() {
        let byte = bytes[offset];
        let op = Op::from_u8(byte).ok_or(RuntimeError::UnknownOpcode(byte))?;

        let operands = op.operand_bytes();
        let end = offset + 1 + operands;
        if end > bytes.len() {
            return Err(RuntimeError::TruncatedInstruction(op.mnemonic()));
        }

        out.push_str(&format!("{:6}  {}", offset, op.mnemonic()));
        for imm in &bytes[offset + 1..end] {
            out.push_str(&format!(" {}", imm));
        }
        out.push('\n');
        offset = end;
    }

    Ok(out)
}

fn render_constant(heap: &Heap, constant: Value) -> String {
    match constant {
        Value::Int(i) => format!("int {}", i),
        Value::Num(x) => format!("num {}", format_num(x)),
        Value::Obj(handle) => match heap.str_bytes(handle) {
            Some(bytes) => format!("str {:?}", String::from_utf8_lossy(bytes)),
            None => "<object>".to_string(),
        },
        other => format!("{:?}", other),
    }
}
