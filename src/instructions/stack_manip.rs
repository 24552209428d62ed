//! `PUSH0`..`PUSH32`, `DUPn`, `SWAPn`, `POP`. `push` reads the
//! translator's packed immediate directly instead of slicing raw
//! bytecode.

use crate::common::ErrorKind;
use crate::interpreter::ExecutionContext;
use crate::instruction::Instruction;
use crate::opcode::OpCode;
use crate::word::Word;

pub(crate) fn push0(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    ctx.stack.push(Word::zero())
}

/// Number of trailing `DATA` slots a `PUSHn` head occupies: the head
/// carries the first two big-endian bytes, everything past that spills
/// two bytes at a time.
fn data_slot_count(push_len: usize) -> usize {
    if push_len <= 2 {
        0
    } else {
        (push_len - 1) / 2
    }
}

pub(crate) fn push(ctx: &mut ExecutionContext<'_>, instr: Instruction, op: OpCode) -> Result<(), ErrorKind> {
    let push_len = op.push_size();

    let mut value_bytes = Vec::with_capacity(push_len + 1);
    if push_len == 1 {
        value_bytes.push(instr.arg as u8);
    } else {
        value_bytes.extend_from_slice(&instr.arg.to_be_bytes());
        let slots = data_slot_count(push_len);
        for slot_offset in 1..=slots {
            let slot = ctx.code[ctx.pc + slot_offset];
            value_bytes.extend_from_slice(&slot.arg.to_be_bytes());
        }
        value_bytes.truncate(push_len);
    }

    let mut buf = [0u8; 32];
    buf[32 - push_len..].copy_from_slice(&value_bytes);
    ctx.stack.push(Word::from_big_endian(&buf))?;

    // The dispatch loop advances `pc` by one past the head; skip the
    // trailing `DATA` slots here so it lands on the next real instruction.
    ctx.pc += data_slot_count(push_len);
    Ok(())
}

pub(crate) fn dup(ctx: &mut ExecutionContext<'_>, op: OpCode) -> Result<(), ErrorKind> {
    ctx.stack.dup(op.dup_height())
}

pub(crate) fn swap(ctx: &mut ExecutionContext<'_>, op: OpCode) -> Result<(), ErrorKind> {
    ctx.stack.swap(op.swap_height())
}

pub(crate) fn pop(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    ctx.stack.pop().map(drop)
}
