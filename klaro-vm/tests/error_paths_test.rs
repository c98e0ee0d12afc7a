// klaro-vm - VM error path tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Tests for VM error paths:
//! - Malformed images (bad tags, truncation, unknown opcodes)
//! - Bounds violations (constants, globals, locals, fields, jumps, stack)
//! - Semantic errors (type mismatches, undefined globals, division by zero)

mod common;
use common::*;

// =============================================================================
// Malformed images
// =============================================================================

#[test]
fn unknown_constant_tag_fails_before_execution() {
    let image = vec![1, 99];
    let (result, text) = run(image);
    assert_eq!(result.unwrap_err(), RuntimeError::UnknownConstTag(99));
    assert_eq!(text, "", "no instruction may run");
}

#[test]
fn truncated_constant_pool() {
    // INT tag with only three payload bytes.
    let image = vec![1, 0, 1, 2, 3];
    assert_eq!(run_err(image), RuntimeError::TruncatedImage);
}

#[test]
fn missing_constant_count() {
    assert_eq!(run_err(vec![]), RuntimeError::TruncatedImage);
}

#[test]
fn unknown_opcode_is_fatal() {
    let image = vec![0, 255];
    assert_eq!(run_err(image), RuntimeError::UnknownOpcode(255));
}

#[test]
fn side_effects_stop_at_the_failure_point() {
    let mut b = ImageBuilder::new();
    let before = b.const_str("before");
    b.op1(Op::PushConst, before).op(Op::Print);
    b.raw(250);
    b.op1(Op::PushConst, before).op(Op::Print);

    let (result, text) = run(b.build());
    assert_eq!(result.unwrap_err(), RuntimeError::UnknownOpcode(250));
    assert_eq!(text, "before\n");
}

#[test]
fn truncated_instruction_immediates() {
    let mut b = ImageBuilder::new();
    b.raw(Op::PushConst as u8);
    assert_eq!(
        run_err(b.build()),
        RuntimeError::TruncatedInstruction("PUSH_CONST")
    );
}

// =============================================================================
// Bounds
// =============================================================================

#[test]
fn constant_index_out_of_range() {
    let mut b = ImageBuilder::new();
    b.op1(Op::PushConst, 0);
    assert_eq!(run_err(b.build()), RuntimeError::ConstOutOfRange(0));
}

#[test]
fn local_index_out_of_range() {
    let mut b = ImageBuilder::new();
    b.op1(Op::PushLocal, 0);
    assert_eq!(run_err(b.build()), RuntimeError::LocalOutOfRange(0));
}

#[test]
fn set_local_out_of_range() {
    let mut b = ImageBuilder::new();
    b.op(Op::PushTrue).op1(Op::SetLocal, 3);
    assert_eq!(run_err(b.build()), RuntimeError::LocalOutOfRange(3));
}

#[test]
fn ref_local_out_of_range() {
    let mut b = ImageBuilder::new();
    b.op1(Op::RefLocal, 0);
    assert_eq!(run_err(b.build()), RuntimeError::LocalOutOfRange(0));
}

#[test]
fn field_index_out_of_range() {
    let mut b = ImageBuilder::new();
    let one = b.const_int(1);
    b.op1(Op::PushConst, one)
        .op1(Op::Struct, 1)
        .op1(Op::GetField, 5);
    assert_eq!(run_err(b.build()), RuntimeError::FieldOutOfRange(5));
}

#[test]
fn jump_past_the_image_end() {
    let mut b = ImageBuilder::new();
    b.op1(Op::Jump, 200);
    let err = run_err(b.build());
    assert!(matches!(err, RuntimeError::JumpOutOfRange { op: "JUMP", .. }));
}

#[test]
fn loop_before_the_code_start() {
    let mut b = ImageBuilder::new();
    b.op1(Op::Loop, 200);
    let err = run_err(b.build());
    assert!(matches!(err, RuntimeError::JumpOutOfRange { op: "LOOP", .. }));
}

#[test]
fn stack_overflow() {
    let mut b = ImageBuilder::new();
    for _ in 0..300 {
        b.op(Op::PushTrue);
    }
    assert_eq!(run_err(b.build()), RuntimeError::StackOverflow);
}

#[test]
fn stack_underflow() {
    let mut b = ImageBuilder::new();
    b.op(Op::Pop);
    assert_eq!(run_err(b.build()), RuntimeError::StackUnderflow);
}

// =============================================================================
// Semantic errors
// =============================================================================

#[test]
fn integer_division_by_zero() {
    let mut b = ImageBuilder::new();
    let one = b.const_int(1);
    let zero = b.const_int(0);
    b.op1(Op::PushConst, one)
        .op1(Op::PushConst, zero)
        .op(Op::IntDiv);
    assert_eq!(run_err(b.build()), RuntimeError::DivByZero);
}

#[test]
fn undefined_global_read() {
    let mut b = ImageBuilder::new();
    b.op1(Op::PushGlobal, 3);
    assert_eq!(run_err(b.build()), RuntimeError::UndefinedGlobal(3));
}

#[test]
fn int_add_rejects_bools() {
    let mut b = ImageBuilder::new();
    b.op(Op::PushTrue).op(Op::PushTrue).op(Op::IntAdd);
    assert_eq!(
        run_err(b.build()),
        RuntimeError::TypeMismatch {
            op: "INT_ADD",
            expected: "int",
            got: "bool",
        }
    );
}

#[test]
fn num_add_rejects_ints() {
    let mut b = ImageBuilder::new();
    let one = b.const_int(1);
    b.op1(Op::PushConst, one)
        .op1(Op::PushConst, one)
        .op(Op::NumAdd);
    assert_eq!(
        run_err(b.build()),
        RuntimeError::TypeMismatch {
            op: "NUM_ADD",
            expected: "num",
            got: "int",
        }
    );
}

#[test]
fn str_cat_rejects_non_strings() {
    let mut b = ImageBuilder::new();
    let one = b.const_int(1);
    let s = b.const_str("x");
    b.op1(Op::PushConst, s)
        .op1(Op::PushConst, one)
        .op(Op::StrCat);
    assert_eq!(
        run_err(b.build()),
        RuntimeError::TypeMismatch {
            op: "STR_CAT",
            expected: "string",
            got: "int",
        }
    );
}

#[test]
fn print_requires_a_string() {
    let mut b = ImageBuilder::new();
    let one = b.const_int(1);
    b.op1(Op::PushConst, one).op(Op::Print);
    assert_eq!(
        run_err(b.build()),
        RuntimeError::TypeMismatch {
            op: "PRINT",
            expected: "string",
            got: "int",
        }
    );
}

#[test]
fn int_coercion_rejects_objects() {
    let mut b = ImageBuilder::new();
    let s = b.const_str("nope");
    b.op1(Op::PushConst, s).op(Op::Int);
    assert!(matches!(
        run_err(b.build()),
        RuntimeError::TypeMismatch { op: "INT", .. }
    ));
}

#[test]
fn call_requires_a_code_pointer() {
    let mut b = ImageBuilder::new();
    let one = b.const_int(1);
    b.op1(Op::PushConst, one).op1(Op::Call, 0);
    assert_eq!(
        run_err(b.build()),
        RuntimeError::TypeMismatch {
            op: "CALL",
            expected: "code",
            got: "int",
        }
    );
}

#[test]
fn jump_if_false_requires_a_bool() {
    let mut b = ImageBuilder::new();
    let one = b.const_int(1);
    b.op1(Op::PushConst, one).op1(Op::JumpIfFalse, 0);
    assert!(matches!(
        run_err(b.build()),
        RuntimeError::TypeMismatch {
            op: "JUMP_IF_FALSE",
            ..
        }
    ));
}

#[test]
fn get_field_requires_a_struct() {
    let mut b = ImageBuilder::new();
    b.op(Op::PushTrue).op1(Op::GetField, 0);
    assert!(matches!(
        run_err(b.build()),
        RuntimeError::TypeMismatch {
            op: "GET_FIELD",
            ..
        }
    ));
}

#[test]
fn deref_requires_an_upvalue() {
    let mut b = ImageBuilder::new();
    b.op(Op::PushTrue).op(Op::Deref);
    assert!(matches!(
        run_err(b.build()),
        RuntimeError::TypeMismatch { op: "DEREF", .. }
    ));
}

#[test]
fn set_ref_requires_an_upvalue() {
    let mut b = ImageBuilder::new();
    let one = b.const_int(1);
    b.op(Op::PushTrue)
        .op1(Op::PushConst, one)
        .op(Op::SetRef);
    assert!(matches!(
        run_err(b.build()),
        RuntimeError::TypeMismatch { op: "SET_REF", .. }
    ));
}

#[test]
fn not_requires_a_bool() {
    let mut b = ImageBuilder::new();
    let one = b.const_int(1);
    b.op1(Op::PushConst, one).op(Op::Not);
    assert_eq!(
        run_err(b.build()),
        RuntimeError::TypeMismatch {
            op: "NOT",
            expected: "bool",
            got: "int",
        }
    );
}
