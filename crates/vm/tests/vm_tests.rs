//! Integration tests for the stackvm machine.
//!
//! Organized by instruction group. Images are built by hand so these tests
//! do not depend on the emitter.

use proptest::prelude::*;
use stackvm_common::{Image, Opcode, Word};
use stackvm_vm::{run, Machine, MemoryLayout, RuntimeFault, StackKind, VmError};

// ============================================================
// Helper functions
// ============================================================

fn op(opcode: Opcode) -> Word {
    opcode as Word
}

/// 64 cells: 48 program, 8 operand stack, 8 call stack.
fn layout() -> MemoryLayout {
    MemoryLayout::new(64, 8, 8)
}

/// Run an image with the given input and return the result and output.
fn exec_with_input(words: Vec<Word>, input: &str) -> (Result<u64, VmError>, String) {
    let mut output = Vec::new();
    let result = run(&Image::new(words), layout(), input.as_bytes(), &mut output);
    (result, String::from_utf8(output).unwrap())
}

fn exec(words: Vec<Word>) -> (Result<u64, VmError>, String) {
    exec_with_input(words, "")
}

/// Run an image that must halt cleanly and return its output.
fn output_of(words: Vec<Word>) -> String {
    let (result, output) = exec(words);
    result.unwrap();
    output
}

/// Run an image that must fault and return the fault.
fn fault_of(words: Vec<Word>) -> RuntimeFault {
    match exec(words).0 {
        Err(VmError::Fault(fault)) => fault,
        other => panic!("expected runtime fault, got {other:?}"),
    }
}

fn out_of_memory(at: usize, address: i64) -> RuntimeFault {
    RuntimeFault::OutOfMemory { at, address }
}

// ============================================================
// Scenarios
// ============================================================

#[test]
fn push_push_plus_write_int() {
    #[rustfmt::skip]
    let words = vec![
        op(Opcode::Push), 3,
        op(Opcode::Push), 4,
        op(Opcode::Plus),
        op(Opcode::WriteInt),
        op(Opcode::End),
    ];
    let (result, output) = exec(words);
    assert_eq!(result, Ok(5));
    assert_eq!(output, "7");
}

#[test]
fn minimal_memory_runs_scenario() {
    #[rustfmt::skip]
    let words = vec![
        op(Opcode::Push), 3,
        op(Opcode::Push), 4,
        op(Opcode::Plus),
        op(Opcode::WriteInt),
        op(Opcode::End),
    ];
    let layout = MemoryLayout::new(11, 2, 1);
    let mut output = Vec::new();
    run(&Image::new(words), layout, &b""[..], &mut output).unwrap();
    assert_eq!(output, b"7");
}

#[test]
fn divide_by_zero_faults() {
    #[rustfmt::skip]
    let words = vec![
        op(Opcode::Push), 5,
        op(Opcode::Push), 0,
        op(Opcode::Divide),
        op(Opcode::WriteInt),
        op(Opcode::End),
    ];
    assert_eq!(fault_of(words), RuntimeFault::DivisionByZero { at: 4 });
}

#[test]
fn end_on_empty_stack_is_graceful() {
    assert_eq!(exec(vec![op(Opcode::End)]), (Ok(1), String::new()));
}

// ============================================================
// Arithmetic & logic
// ============================================================

fn binary(a: Word, b: Word, opcode: Opcode) -> String {
    #[rustfmt::skip]
    let words = vec![
        op(Opcode::Push), a,
        op(Opcode::Push), b,
        op(opcode),
        op(Opcode::WriteInt),
        op(Opcode::End),
    ];
    output_of(words)
}

#[test]
fn minus_subtracts_first_popped_from_second() {
    assert_eq!(binary(10, 3, Opcode::Minus), "7");
    assert_eq!(binary(3, 10, Opcode::Minus), "-7");
}

#[test]
fn multiply() {
    assert_eq!(binary(-6, 7, Opcode::Multiply), "-42");
}

#[test]
fn divide_truncates_toward_zero() {
    assert_eq!(binary(7, 2, Opcode::Divide), "3");
    assert_eq!(binary(-7, 2, Opcode::Divide), "-3");
    assert_eq!(binary(7, -2, Opcode::Divide), "-3");
    assert_eq!(binary(-7, -2, Opcode::Divide), "3");
}

#[test]
fn divide_min_by_minus_one_wraps() {
    assert_eq!(binary(Word::MIN, -1, Opcode::Divide), "-2147483648");
}

#[test]
fn plus_wraps_on_overflow() {
    assert_eq!(binary(Word::MAX, 1, Opcode::Plus), Word::MIN.to_string());
}

#[test]
fn negative() {
    #[rustfmt::skip]
    let words = vec![
        op(Opcode::Push), 9,
        op(Opcode::Negative),
        op(Opcode::WriteInt),
        op(Opcode::End),
    ];
    assert_eq!(output_of(words), "-9");
}

#[test]
fn logic_produces_booleans() {
    assert_eq!(binary(5, -3, Opcode::And), "1");
    assert_eq!(binary(5, 0, Opcode::And), "0");
    assert_eq!(binary(0, 0, Opcode::Or), "0");
    assert_eq!(binary(0, 8, Opcode::Or), "1");
}

#[test]
fn not_produces_booleans() {
    let not = |v: Word| {
        #[rustfmt::skip]
        let words = vec![
            op(Opcode::Push), v,
            op(Opcode::Not),
            op(Opcode::WriteInt),
            op(Opcode::End),
        ];
        output_of(words)
    };
    assert_eq!(not(0), "1");
    assert_eq!(not(17), "0");
    assert_eq!(not(-1), "0");
}

#[test]
fn comparison() {
    assert_eq!(binary(5, 3, Opcode::More), "1");
    assert_eq!(binary(3, 5, Opcode::More), "0");
    assert_eq!(binary(4, 4, Opcode::More), "0");
    assert_eq!(binary(4, 4, Opcode::Equals), "1");
    assert_eq!(binary(4, -4, Opcode::Equals), "0");
}

// ============================================================
// Stack shuffle
// ============================================================

/// Push `values`, run `ops`, then print the whole stack top first.
fn shuffle(values: &[Word], ops: &[Word], depth: usize) -> String {
    let mut words = Vec::new();
    for &v in values {
        words.extend([op(Opcode::Push), v]);
    }
    words.extend_from_slice(ops);
    for _ in 0..depth {
        words.push(op(Opcode::WriteInt));
    }
    words.push(op(Opcode::End));
    output_of(words)
}

#[test]
fn dup() {
    assert_eq!(shuffle(&[1, 2], &[op(Opcode::Dup)], 3), "221");
}

#[test]
fn drop() {
    assert_eq!(shuffle(&[1, 2], &[op(Opcode::Drop)], 1), "1");
}

#[test]
fn swap() {
    assert_eq!(shuffle(&[1, 2], &[op(Opcode::Swap)], 2), "12");
}

#[test]
fn rot_brings_third_to_top() {
    // [1 2 3] -> [2 3 1]
    assert_eq!(shuffle(&[1, 2, 3], &[op(Opcode::Rot)], 3), "132");
}

#[test]
fn pick_copies_kth_below_top() {
    let ops = [op(Opcode::Push), 2, op(Opcode::Pick)];
    // [7 8 9] pick 2 -> [7 8 9 7]
    assert_eq!(shuffle(&[7, 8, 9], &ops, 4), "7987");
}

#[test]
fn pick_zero_duplicates_top() {
    let ops = [op(Opcode::Push), 0, op(Opcode::Pick)];
    assert_eq!(shuffle(&[4, 5], &ops, 3), "554");
}

#[test]
fn pick_out_of_range() {
    #[rustfmt::skip]
    let words = vec![
        op(Opcode::Push), 1,
        op(Opcode::Push), 3,
        op(Opcode::Pick),
        op(Opcode::End),
    ];
    assert_eq!(
        fault_of(words),
        RuntimeFault::OutOfRange { at: 4, index: 3 }
    );
}

#[test]
fn dup_on_empty_underflows() {
    assert_eq!(
        fault_of(vec![op(Opcode::Dup), op(Opcode::End)]),
        RuntimeFault::StackUnderflow {
            at: 0,
            stack: StackKind::Operand
        }
    );
}

#[test]
fn operand_stack_overflow() {
    let mut words = Vec::new();
    for v in 0..9 {
        words.extend([op(Opcode::Push), v]);
    }
    words.push(op(Opcode::End));
    assert_eq!(
        fault_of(words),
        RuntimeFault::StackOverflow {
            at: 16,
            stack: StackKind::Operand
        }
    );
}

#[test]
fn operand_stack_holds_exactly_capacity() {
    let mut words = Vec::new();
    for v in 0..8 {
        words.extend([op(Opcode::Push), v]);
    }
    words.push(op(Opcode::End));
    assert!(exec(words).0.is_ok());
}

// ============================================================
// I/O
// ============================================================

#[test]
fn write_str_emits_inline_codes() {
    #[rustfmt::skip]
    let words = vec![
        op(Opcode::WriteStr), 3, 'h' as Word, 'é' as Word, '!' as Word,
        op(Opcode::End),
    ];
    assert_eq!(output_of(words), "hé!");
}

#[test]
fn write_str_does_not_touch_stack() {
    #[rustfmt::skip]
    let words = vec![
        op(Opcode::Push), 5,
        op(Opcode::WriteStr), 1, 'x' as Word,
        op(Opcode::WriteInt),
        op(Opcode::End),
    ];
    assert_eq!(output_of(words), "x5");
}

#[test]
fn read_char_consumes_one_character_each() {
    #[rustfmt::skip]
    let words = vec![
        op(Opcode::ReadChar),
        op(Opcode::ReadChar),
        op(Opcode::WriteChar),
        op(Opcode::WriteChar),
        op(Opcode::End),
    ];
    let (result, output) = exec_with_input(words, "xß");
    assert!(result.is_ok());
    assert_eq!(output, "ßx");
}

#[test]
fn read_char_at_end_of_input_pushes_zero() {
    let words = vec![op(Opcode::ReadChar), op(Opcode::WriteInt), op(Opcode::End)];
    assert_eq!(output_of(words), "0");
}

#[test]
fn flush_mid_program() {
    #[rustfmt::skip]
    let words = vec![
        op(Opcode::Push), 'a' as Word,
        op(Opcode::WriteChar),
        op(Opcode::Flush),
        op(Opcode::Push), 'b' as Word,
        op(Opcode::WriteChar),
        op(Opcode::End),
    ];
    assert_eq!(output_of(words), "ab");
}

#[test]
fn output_is_flushed_on_fault() {
    #[rustfmt::skip]
    let words = vec![
        op(Opcode::Push), 'A' as Word,
        op(Opcode::WriteChar),
        op(Opcode::Push), 1,
        op(Opcode::Push), 0,
        op(Opcode::Divide),
        op(Opcode::End),
    ];
    let (result, output) = exec(words);
    assert_eq!(
        result,
        Err(VmError::Fault(RuntimeFault::DivisionByZero { at: 7 }))
    );
    assert_eq!(output, "A");
}

// ============================================================
// Memory
// ============================================================

#[test]
fn store_then_fetch_returns_value() {
    for addr in [0, 20, 47] {
        #[rustfmt::skip]
        let words = vec![
            op(Opcode::Push), -123,
            op(Opcode::Store), addr,
            op(Opcode::Fetch), addr,
            op(Opcode::WriteInt),
            op(Opcode::End),
        ];
        assert_eq!(output_of(words), "-123", "address {addr}");
    }
}

#[test]
fn store_outside_program_region_faults() {
    for addr in [48, 63, 64, -1] {
        #[rustfmt::skip]
        let words = vec![
            op(Opcode::Push), 1,
            op(Opcode::Store), addr,
            op(Opcode::End),
        ];
        assert_eq!(fault_of(words), out_of_memory(2, i64::from(addr)));
    }
}

#[test]
fn fetch_outside_program_region_faults() {
    let words = vec![op(Opcode::Fetch), 48, op(Opcode::End)];
    assert_eq!(fault_of(words), out_of_memory(0, 48));
}

#[test]
fn copy_moves_cell_without_stack_traffic() {
    #[rustfmt::skip]
    let words = vec![
        op(Opcode::Copy), 8, 9,
        op(Opcode::Fetch), 9,
        op(Opcode::WriteInt),
        op(Opcode::End),
        0,
        77, // address 8
        0,  // address 9
    ];
    assert_eq!(output_of(words), "77");
}

#[test]
fn copy_rejects_out_of_region_target() {
    let words = vec![op(Opcode::Copy), 0, 50, op(Opcode::End)];
    assert_eq!(fault_of(words), out_of_memory(0, 50));
}

#[test]
fn store_can_rewrite_code() {
    // The Store overwrites the operand of the following Push.
    #[rustfmt::skip]
    let words = vec![
        op(Opcode::Push), 42,
        op(Opcode::Store), 5,
        op(Opcode::Push), 0,
        op(Opcode::WriteInt),
        op(Opcode::End),
    ];
    assert_eq!(output_of(words), "42");
}

#[test]
fn store_can_rewrite_an_executed_instruction() {
    let mut vm = Machine::new(layout()).unwrap();
    #[rustfmt::skip]
    let words = vec![
        op(Opcode::Push), op(Opcode::Drop),
        op(Opcode::Store), 0,
        op(Opcode::End),
    ];
    vm.load(&Image::new(words)).unwrap();
    vm.run(&b""[..], Vec::new()).unwrap();
    assert_eq!(vm.memory()[0], op(Opcode::Drop));
}

// ============================================================
// Control
// ============================================================

#[test]
fn goto_skips_code() {
    #[rustfmt::skip]
    let words = vec![
        op(Opcode::Goto), 4,
        op(Opcode::WriteInt), // skipped; would underflow
        op(Opcode::End),
        op(Opcode::WriteStr), 1, 'k' as Word,
        op(Opcode::End),
    ];
    assert_eq!(output_of(words), "k");
}

#[test]
fn call_and_return() {
    #[rustfmt::skip]
    let words = vec![
        op(Opcode::Push), 7,
        op(Opcode::Call),
        op(Opcode::WriteStr), 1, 'b' as Word,
        op(Opcode::End),
        op(Opcode::WriteStr), 1, 'a' as Word, // address 7
        op(Opcode::Return),
    ];
    assert_eq!(output_of(words), "ab");
}

#[test]
fn call_if_pops_address_then_condition() {
    let call_if = |condition: Word| {
        #[rustfmt::skip]
        let words = vec![
            op(Opcode::Push), condition,
            op(Opcode::Push), 8,
            op(Opcode::CallIf),
            op(Opcode::End),
            0,
            0,
            op(Opcode::WriteStr), 1, 'y' as Word, // address 8
            op(Opcode::Return),
        ];
        output_of(words)
    };
    assert_eq!(call_if(1), "y");
    assert_eq!(call_if(-4), "y");
    assert_eq!(call_if(0), "");
}

#[test]
fn goto_if_pops_address_before_condition() {
    let goto_if = |first: Word, second: Word| {
        #[rustfmt::skip]
        let words = vec![
            op(Opcode::Push), first,
            op(Opcode::Push), second,
            op(Opcode::GotoIf),
            op(Opcode::WriteStr), 1, 'n' as Word,
            op(Opcode::End),
            op(Opcode::WriteStr), 1, 'y' as Word, // address 9
            op(Opcode::End),
        ];
        exec(words)
    };

    // Condition pushed first, address on top: jumps.
    assert_eq!(goto_if(1, 9).1, "y");
    // Condition false: falls through.
    assert_eq!(goto_if(0, 9).1, "n");
    // Swapped operands: 1 is taken as the address, so the jump lands on the
    // operand Word 9 (MULTIPLY) and faults on the empty stack.
    let (result, output) = goto_if(9, 1);
    assert_eq!(output, "");
    assert_eq!(
        result,
        Err(VmError::Fault(RuntimeFault::StackUnderflow {
            at: 1,
            stack: StackKind::Operand
        }))
    );
}

#[test]
fn return_with_empty_call_stack_underflows() {
    assert_eq!(
        fault_of(vec![op(Opcode::Return)]),
        RuntimeFault::StackUnderflow {
            at: 0,
            stack: StackKind::Call
        }
    );
}

#[test]
fn unbounded_recursion_overflows_call_stack() {
    let words = vec![op(Opcode::Push), 0, op(Opcode::Call)];
    assert_eq!(
        fault_of(words),
        RuntimeFault::StackOverflow {
            at: 2,
            stack: StackKind::Call
        }
    );
}

#[test]
fn jump_outside_memory_faults() {
    assert_eq!(fault_of(vec![op(Opcode::Goto), 64]), out_of_memory(0, 64));
    assert_eq!(
        fault_of(vec![op(Opcode::Push), -2, op(Opcode::Call)]),
        out_of_memory(2, -2)
    );
}

#[test]
fn zero_word_is_invalid_instruction() {
    // No END: execution runs into the zero-filled remainder.
    assert_eq!(
        fault_of(vec![op(Opcode::Push), 1]),
        RuntimeFault::InvalidInstruction { at: 2, word: 0 }
    );
}

#[test]
fn unknown_opcode_is_invalid_instruction() {
    assert_eq!(
        fault_of(vec![99]),
        RuntimeFault::InvalidInstruction { at: 0, word: 99 }
    );
}

// ============================================================
// Machine reuse and introspection
// ============================================================

#[test]
fn reload_resets_machine() {
    let mut vm = Machine::new(layout()).unwrap();
    let faulting = Image::new(vec![op(Opcode::Push), 1, op(Opcode::Drop)]);
    vm.load(&faulting).unwrap();
    assert!(vm.run(&b""[..], Vec::new()).is_err());

    let halting = Image::new(vec![op(Opcode::Push), 2, op(Opcode::End)]);
    vm.load(&halting).unwrap();
    vm.run(&b""[..], Vec::new()).unwrap();
    assert_eq!(vm.operand_stack(), vec![2]);
    assert!(vm.call_stack().is_empty());
    assert_eq!(vm.executed(), 2);
}

#[test]
fn dump_reports_stacks_after_halt() {
    let mut vm = Machine::new(layout()).unwrap();
    let words = vec![op(Opcode::Push), 1, op(Opcode::Push), 2, op(Opcode::End)];
    vm.load(&Image::new(words)).unwrap();
    vm.run(&b""[..], Vec::new()).unwrap();
    let snapshot = vm.dump();
    assert_eq!(snapshot.ip, 5);
    assert_eq!(snapshot.operand_stack, vec![1, 2]);
    assert_eq!(snapshot.executed, 3);
}

// ============================================================
// Properties
// ============================================================

proptest! {
    #[test]
    fn plus_prints_sum(a in any::<Word>(), b in any::<Word>()) {
        prop_assume!(a.checked_add(b).is_some());
        let out = binary(a, b, Opcode::Plus);
        prop_assert_eq!(out, (a + b).to_string());
    }

    #[test]
    fn store_fetch_idempotent(addr in 0..48i32, value in any::<Word>()) {
        let words = vec![
            op(Opcode::Push), value,
            op(Opcode::Store), addr,
            op(Opcode::Fetch), addr,
            op(Opcode::WriteInt),
            op(Opcode::End),
        ];
        // Addresses below 9 hold this image's own code.
        prop_assume!(addr >= 9);
        prop_assert_eq!(output_of(words), value.to_string());
    }
}
