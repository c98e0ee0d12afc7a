// klaro-vm - Bytecode virtual machine for the Klaro programming language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Bytecode instruction definitions.
//!
//! Each instruction is one opcode byte followed by zero or more single-byte
//! immediates. Jump offsets are relative to the instruction pointer after the
//! offset byte has been consumed. The byte values here are the wire format:
//! they must stay stable across compiler and VM.

/// Bytecode instructions for the Klaro VM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Op {
    // =========================================================================
    // Constants & Stack
    // =========================================================================
    /// Push constants[idx]. One immediate: constant index.
    PushConst = 0,

    /// Push `true`.
    PushTrue = 1,

    /// Push `false`.
    PushFalse = 2,

    /// Push `nil`.
    PushNil = 3,

    /// Pop the top slot, closing any upvalues chained to it first.
    Pop = 4,

    // =========================================================================
    // Variables
    // =========================================================================
    /// Pop into globals[idx]. One immediate: global index.
    SetGlobal = 5,

    /// Push globals[idx]; the slot must have been written. One immediate.
    PushGlobal = 6,

    /// Pop into fp[idx], preserving the slot's upvalue back-chain. One
    /// immediate: local index.
    SetLocal = 7,

    /// Push fp[idx]. One immediate: local index.
    PushLocal = 8,

    // =========================================================================
    // Type coercions (replace top of stack)
    // =========================================================================
    /// Coerce top to int.
    Int = 9,

    /// Coerce top to num.
    Num = 10,

    /// Coerce top to bool. For a num this is the zero-ish test: true iff
    /// |x| < NUM_PRECISION.
    Bool = 11,

    /// Stringify top.
    Str = 12,

    // =========================================================================
    // Integer arithmetic & comparison
    // =========================================================================
    IntAdd = 13,
    IntSub = 14,
    IntMul = 15,
    /// Integer division; division by zero is fatal.
    IntDiv = 16,
    IntNeg = 17,
    IntLess = 18,
    IntGreater = 19,

    // =========================================================================
    // Float arithmetic & comparison (epsilon ordering)
    // =========================================================================
    NumAdd = 20,
    NumSub = 21,
    NumMul = 22,
    /// Float division follows IEEE; dividing by zero produces an infinity.
    NumDiv = 23,
    NumNeg = 24,
    /// a < b - NUM_PRECISION.
    NumLess = 25,
    /// a > b + NUM_PRECISION.
    NumGreater = 26,

    // =========================================================================
    // Strings, logic, equality
    // =========================================================================
    /// Pop two strings, push their concatenation.
    StrCat = 27,

    /// Boolean negation.
    Not = 28,

    /// Pop two values, push heap-aware equality.
    Equal = 29,

    // =========================================================================
    // I/O
    // =========================================================================
    /// Pop a string, write its bytes plus a newline.
    Print = 30,

    /// Write a bare newline.
    PrintBlank = 31,

    /// Push elapsed seconds as a num.
    Clock = 32,

    // =========================================================================
    // Control flow
    // =========================================================================
    /// ip += off. One immediate: unsigned forward offset.
    Jump = 33,

    /// Pop a bool; if false, ip += off. One immediate.
    JumpIfFalse = 34,

    /// ip -= off. One immediate: unsigned backward offset.
    Loop = 35,

    // =========================================================================
    // Functions & calls
    // =========================================================================
    /// Push a code pointer to the byte after this instruction, then skip
    /// `off` bytes over the function body. One immediate.
    Function = 36,

    /// Call the code pointer under `n` arguments. One immediate: argc.
    Call = 37,

    /// Pop a code pointer into ip.
    LoadIp = 38,

    /// Pop a frame pointer into fp.
    LoadFp = 39,

    /// Pop into the return store.
    SetReturn = 40,

    /// Push the return store.
    PushReturn = 41,

    // =========================================================================
    // Structs
    // =========================================================================
    /// Pop `n` values into a fresh struct, push its handle. One immediate.
    Struct = 42,

    /// Pop a struct, push fields[i]. One immediate: field index.
    GetField = 43,

    /// Peek the struct at stack depth `depth`, push fields[i]. Two
    /// immediates: depth, field index.
    ExtractField = 44,

    /// Pop a value, overwrite fields[i] of the struct at the top. One
    /// immediate: field index.
    SetField = 45,

    // =========================================================================
    // Upvalues
    // =========================================================================
    /// Allocate an open upvalue over fp[i], link it into the slot's
    /// back-chain, push its handle. One immediate: local index.
    RefLocal = 46,

    /// Replace the upvalue handle at the top with the value its cell holds.
    Deref = 47,

    /// Pop a value, pop an upvalue handle, write the value through the cell.
    SetRef = 48,
}

/// Total number of defined opcodes; bytes at or above this are fatal.
pub const OP_COUNT: u8 = 49;

impl Op {
    /// Decode an opcode byte. Returns `None` for bytes >= [`OP_COUNT`].
    pub fn from_u8(byte: u8) -> Option<Op> {
        use Op::*;
        Some(match byte {
            0 => PushConst,
            1 => PushTrue,
            2 => PushFalse,
            3 => PushNil,
            4 => Pop,
            5 => SetGlobal,
            6 => PushGlobal,
            7 => SetLocal,
            8 => PushLocal,
            9 => Int,
            10 => Num,
            11 => Bool,
            12 => Str,
            13 => IntAdd,
            14 => IntSub,
            15 => IntMul,
            16 => IntDiv,
            17 => IntNeg,
            18 => IntLess,
            19 => IntGreater,
            20 => NumAdd,
            21 => NumSub,
            22 => NumMul,
            23 => NumDiv,
            24 => NumNeg,
            25 => NumLess,
            26 => NumGreater,
            27 => StrCat,
            28 => Not,
            29 => Equal,
            30 => Print,
            31 => PrintBlank,
            32 => Clock,
            33 => Jump,
            34 => JumpIfFalse,
            35 => Loop,
            36 => Function,
            37 => Call,
            38 => LoadIp,
            39 => LoadFp,
            40 => SetReturn,
            41 => PushReturn,
            42 => Struct,
            43 => GetField,
            44 => ExtractField,
            45 => SetField,
            46 => RefLocal,
            47 => Deref,
            48 => SetRef,
            _ => return None,
        })
    }

    /// Assembler-style mnemonic, used in diagnostics and disassembly.
    pub fn mnemonic(self) -> &'static str {
        use Op::*;
        match self {
            PushConst => "PUSH_CONST",
            PushTrue => "PUSH_TRUE",
            PushFalse => "PUSH_FALSE",
            PushNil => "PUSH_NIL",
            Pop => "POP",
            SetGlobal => "SET_GLOBAL",
            PushGlobal => "PUSH_GLOBAL",
            SetLocal => "SET_LOCAL",
            PushLocal => "PUSH_LOCAL",
            Int => "INT",
            Num => "NUM",
            Bool => "BOOL",
            Str => "STR",
            IntAdd => "INT_ADD",
            IntSub => "INT_SUB",
            IntMul => "INT_MUL",
            IntDiv => "INT_DIV",
            IntNeg => "INT_NEG",
            IntLess => "INT_LESS",
            IntGreater => "INT_GREATER",
            NumAdd => "NUM_ADD",
            NumSub => "NUM_SUB",
            NumMul => "NUM_MUL",
            NumDiv => "NUM_DIV",
            NumNeg => "NUM_NEG",
            NumLess => "NUM_LESS",
            NumGreater => "NUM_GREATER",
            StrCat => "STR_CAT",
            Not => "NOT",
            Equal => "EQUAL",
            Print => "PRINT",
            PrintBlank => "PRINT_BLANK",
            Clock => "CLOCK",
            Jump => "JUMP",
            JumpIfFalse => "JUMP_IF_FALSE",
            Loop => "LOOP",
            Function => "FUNCTION",
            Call => "CALL",
            LoadIp => "LOAD_IP",
            LoadFp => "LOAD_FP",
            SetReturn => "SET_RETURN",
            PushReturn => "PUSH_RETURN",
            Struct => "STRUCT",
            GetField => "GET_FIELD",
            ExtractField => "EXTRACT_FIELD",
            SetField => "SET_FIELD",
            RefLocal => "REF_LOCAL",
            Deref => "DEREF",
            SetRef => "SET_REF",
        }
    }

    /// Number of immediate bytes following the opcode.
    pub fn operand_bytes(self) -> usize {
        use Op::*;
        match self {
            PushConst | SetGlobal | PushGlobal | SetLocal | PushLocal | Jump | JumpIfFalse
            | Loop | Function | Call | Struct | GetField | SetField | RefLocal => 1,
            ExtractField => 2,
            _ => 0,
        }
    }
}
