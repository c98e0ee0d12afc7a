// klaro-vm - Bytecode virtual machine for the Klaro programming language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Image framing: the constant pool prefix.
//!
//! An image is `u8 K`, then `K` tagged constant entries, then the
//! instruction stream to end of buffer. Multi-byte payloads are
//! little-endian; the `NUM` payload is an IEEE-754 double in little-endian
//! byte order.

use tracing::debug;

use crate::heap::Heap;
use crate::value::Value;
use crate::vm::{Result, RuntimeError};

/// Constant tag: 4-byte little-endian signed integer.
pub const TAG_INT: u8 = 0;
/// Constant tag: 8-byte little-endian IEEE-754 double.
pub const TAG_NUM: u8 = 1;
/// Constant tag: 1-byte length followed by that many bytes.
pub const TAG_STR: u8 = 2;

/// A parsed image prefix: the constant table and where code begins.
#[derive(Debug)]
pub struct Image {
    pub constants: Vec<Value>,
    pub code_start: usize,
}

/// Parse the constant pool prefix of `bytes`, allocating string constants
/// on `heap`.
pub fn load_constants(bytes: &[u8], heap: &mut Heap) -> Result<Image> {
    let mut cursor = 0;

    let count = read_u8(bytes, &mut cursor)?;
    let mut constants = Vec::with_capacity(count as usize);

    for _ in 0..count {
        let tag = read_u8(bytes, &mut cursor)?;
        let value = match tag {
            TAG_INT => {
                let raw = read_array::<4>(bytes, &mut cursor)?;
                Value::Int(i32::from_le_bytes(raw))
            }
            TAG_NUM => {
                let raw = read_array::<8>(bytes, &mut cursor)?;
                Value::Num(f64::from_le_bytes(raw))
            }
            TAG_STR => {
                let len = read_u8(bytes, &mut cursor)? as usize;
                let data = read_slice(bytes, &mut cursor, len)?;
                Value::Obj(heap.alloc_str(data))
            }
            _ => return Err(RuntimeError::UnknownConstTag(tag)),
        };
        constants.push(value);
    }

    debug!(
        constants = constants.len(),
        code_start = cursor,
        "image loaded"
    );

    Ok(Image {
        constants,
        code_start: cursor,
    })
}

fn read_u8(bytes: &[u8], cursor: &mut usize) -> Result<u8> {
    let byte = *bytes.get(*cursor).ok_or(RuntimeError::TruncatedImage)?;
    *cursor += 1;
    Ok(byte)
}

fn read_slice<'a>(bytes: &'a [u8], cursor: &mut usize, len: usize) -> Result<&'a [u8]> {
    let end = cursor
        .checked_add(len)
        .ok_or(RuntimeError::TruncatedImage)?;
    let slice = bytes
        .get(*cursor..end)
        .ok_or(RuntimeError::TruncatedImage)?;
    *cursor = end;
    Ok(slice)
}

fn read_array<const N: usize>(bytes: &[u8], cursor: &mut usize) -> Result<[u8; N]> {
    let slice = read_slice(bytes, cursor, N)?;
    let mut raw = [0u8; N];
    raw.copy_from_slice(slice);
    Ok(raw)
}
