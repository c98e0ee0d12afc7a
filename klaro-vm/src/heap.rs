// klaro-vm - Bytecode virtual machine for the Klaro programming language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The object heap.
//!
//! Every string, struct, and upvalue allocated during a run is appended to a
//! VM-owned allocation list and addressed by [`Handle`]. Nothing is freed
//! mid-run; the whole list is released when the VM is dropped.

use crate::value::{Value, format_num};
use crate::vm::{Result, RuntimeError};

/// Index of an object in the heap's allocation list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handle(u32);

impl Handle {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Where an upvalue's cell currently lives.
#[derive(Debug, Clone, Copy)]
pub enum UpvalueTarget {
    /// Aliases a live stack slot.
    Open(usize),

    /// Owns the value outright.
    Closed(Value),

    /// Aliases the closed cell of another upvalue. Produced when a slot with
    /// several chained upvalues is popped, so they keep sharing one cell.
    Shared(Handle),
}

/// A heap upvalue box: a tagged cell plus the intrusive link to the next
/// upvalue aliasing the same stack slot.
#[derive(Debug, Clone)]
pub struct Upvalue {
    pub target: UpvalueTarget,
    pub next: Option<Handle>,
}

/// A heap object.
#[derive(Debug, Clone)]
pub enum Obj {
    /// Opaque byte string. The VM never interprets the bytes.
    Str(Box<[u8]>),

    /// Fixed-arity record of values.
    Struct(Box<[Value]>),

    /// Shared mutable cell for a closed-over variable.
    Upvalue(Upvalue),
}

/// The VM's allocation list.
#[derive(Debug, Default)]
pub struct Heap {
    objects: Vec<Obj>,
}

impl Heap {
    /// Create an empty heap.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
        }
    }

    /// Number of objects allocated so far.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check whether anything has been allocated.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn alloc(&mut self, obj: Obj) -> Handle {
        let handle = Handle(self.objects.len() as u32);
        self.objects.push(obj);
        handle
    }

    /// Allocate a byte string.
    pub fn alloc_str(&mut self, bytes: impl Into<Box<[u8]>>) -> Handle {
        self.alloc(Obj::Str(bytes.into()))
    }

    /// Allocate a struct from its fields.
    pub fn alloc_struct(&mut self, fields: impl Into<Box<[Value]>>) -> Handle {
        self.alloc(Obj::Struct(fields.into()))
    }

    /// Allocate an open upvalue over `slot`, chained in front of `next`.
    pub fn alloc_upvalue(&mut self, slot: usize, next: Option<Handle>) -> Handle {
        self.alloc(Obj::Upvalue(Upvalue {
            target: UpvalueTarget::Open(slot),
            next,
        }))
    }

    /// Look up an object.
    #[inline]
    pub fn get(&self, handle: Handle) -> &Obj {
        &self.objects[handle.index()]
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut Obj {
        &mut self.objects[handle.index()]
    }

    /// The bytes of a string object, or `None` for other objects.
    pub fn str_bytes(&self, handle: Handle) -> Option<&[u8]> {
        match self.get(handle) {
            Obj::Str(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// The fields of a struct object, or `None` for other objects.
    pub fn struct_fields(&self, handle: Handle) -> Option<&[Value]> {
        match self.get(handle) {
            Obj::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    pub(crate) fn struct_fields_mut(&mut self, handle: Handle) -> Option<&mut [Value]> {
        match self.get_mut(handle) {
            Obj::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    pub(crate) fn upvalue(&self, handle: Handle) -> Result<&Upvalue> {
        match self.get(handle) {
            Obj::Upvalue(upvalue) => Ok(upvalue),
            _ => Err(RuntimeError::Internal("handle is not an upvalue")),
        }
    }

    pub(crate) fn upvalue_mut(&mut self, handle: Handle) -> Result<&mut Upvalue> {
        match self.get_mut(handle) {
            Obj::Upvalue(upvalue) => Ok(upvalue),
            _ => Err(RuntimeError::Internal("handle is not an upvalue")),
        }
    }

    /// Close every upvalue chained from `head` over a slot holding `value`.
    ///
    /// The chain head takes ownership of the value; the remaining members
    /// become aliases of the head, so all of them keep sharing one cell.
    /// Links are cleared as the chain is walked.
    pub(crate) fn close_chain(&mut self, head: Option<Handle>, value: Value) {
        let Some(first) = head else { return };
        let mut cursor = Some(first);
        while let Some(handle) = cursor {
            let Obj::Upvalue(upvalue) = &mut self.objects[handle.index()] else {
                break;
            };
            cursor = upvalue.next.take();
            upvalue.target = if handle == first {
                UpvalueTarget::Closed(value)
            } else {
                UpvalueTarget::Shared(first)
            };
        }
    }

    /// Concatenate two string objects into a fresh string. Neither source is
    /// modified.
    pub fn concat(&mut self, first: Handle, second: Handle) -> Result<Handle> {
        let (Some(a), Some(b)) = (self.str_bytes(first), self.str_bytes(second)) else {
            return Err(RuntimeError::TypeMismatch {
                op: "STR_CAT",
                expected: "string",
                got: "object",
            });
        };
        let mut bytes = Vec::with_capacity(a.len() + b.len());
        bytes.extend_from_slice(a);
        bytes.extend_from_slice(b);
        Ok(self.alloc_str(bytes))
    }

    /// Heap-aware equality.
    ///
    /// Discriminants must match exactly (`Int 1` is not `Num 1.0`). Objects
    /// compare by handle identity, except strings, which compare by bytes.
    pub fn values_equal(&self, a: Value, b: Value) -> bool {
        match (a, b) {
            (Value::Bool(x), Value::Bool(y)) => x == y,
            (Value::Nil, Value::Nil) => true,
            (Value::Int(x), Value::Int(y)) => x == y,
            (Value::Num(x), Value::Num(y)) => x == y,
            (Value::CodePtr(x), Value::CodePtr(y)) => x == y,
            (Value::FramePtr(x), Value::FramePtr(y)) => x == y,
            (Value::Obj(x), Value::Obj(y)) => match (self.get(x), self.get(y)) {
                (Obj::Str(a), Obj::Str(b)) => a == b,
                _ => x == y,
            },
            _ => false,
        }
    }

    /// Render `value` as a freshly allocated string object. Total: every
    /// value has a non-empty rendering. Stringifying a string returns the
    /// same handle.
    pub fn stringify(&mut self, value: Value) -> Handle {
        let text = match value {
            Value::Bool(true) => "true".to_string(),
            Value::Bool(false) => "false".to_string(),
            Value::Nil => "nil".to_string(),
            Value::Int(i) => i.to_string(),
            Value::Num(x) => format_num(x),
            Value::CodePtr(offset) => format!("<code @{}>", offset),
            Value::FramePtr(offset) => format!("<frame @{}>", offset),
            Value::Obj(handle) => match self.get(handle) {
                Obj::Str(_) => return handle,
                Obj::Struct(fields) => format!("<struct {}>", fields.len()),
                Obj::Upvalue(_) => "<upvalue>".to_string(),
            },
        };
        self.alloc_str(text.into_bytes())
    }

    /// Type name for diagnostics.
    pub fn type_name(&self, value: Value) -> &'static str {
        match value {
            Value::Bool(_) => "bool",
            Value::Nil => "nil",
            Value::Int(_) => "int",
            Value::Num(_) => "num",
            Value::CodePtr(_) => "code",
            Value::FramePtr(_) => "frame",
            Value::Obj(handle) => match self.get(handle) {
                Obj::Str(_) => "string",
                Obj::Struct(_) => "struct",
                Obj::Upvalue(_) => "upvalue",
            },
        }
    }
}
