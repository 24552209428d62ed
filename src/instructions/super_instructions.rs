//! The 20 fused instruction sequences the translator's peephole pass
//! produces. Each handler here replays the combined
//! stack effect of its constituent base opcodes in one call; gas for the
//! whole sequence was already charged as a single sum by
//! [`crate::translator::super_instruction_static_gas`] before dispatch, so
//! none of these re-charge per-opcode static gas.
//!
//! Grounded on [`crate::instructions::stack_manip::push`]'s own immediate
//! reconstruction and its own `pc` bookkeeping: a sub-opcode that is itself
//! a multi-byte `PUSH` has its value preserved across one or more trailing
//! `DATA` slots by the fusion pass, read back here the same way a
//! standalone `PUSH` reads its own spillover; and exactly as `push` itself
//! advances `pc` past its own trailing slots, every handler here advances
//! `pc` past the padding its whole fused window left behind — a taken
//! `JUMP`/`JUMPI` is the one case that needs no such adjustment, since it
//! repositions `pc` absolutely.

use crate::common::ErrorKind;
use crate::instruction::Instruction;
use crate::instructions::{arithmetic, bitwise, boolean, control, memory, stack_manip};
use crate::interpreter::{validate_jump_dest, ExecutionContext};
use crate::opcode::OpCode;
use crate::translator::super_instruction_slot_count;
use crate::word::Word;

/// Reconstruct a `PUSHn` immediate whose head lives at `ctx.code[head]`,
/// spilling into `ctx.code[head + 1..]` for `n > 2` — identical byte
/// layout to [`stack_manip::push`], just addressed at an arbitrary slot
/// instead of always `ctx.pc`.
fn immediate_at(ctx: &ExecutionContext<'_>, head: usize, push_len: usize) -> Word {
    if push_len == 1 {
        return Word::from(ctx.code[head].arg as u8);
    }
    let mut value_bytes = Vec::with_capacity(push_len + 1);
    value_bytes.extend_from_slice(&ctx.code[head].arg.to_be_bytes());
    let slots = if push_len <= 2 { 0 } else { (push_len - 1) / 2 };
    for slot_offset in 1..=slots {
        value_bytes.extend_from_slice(&ctx.code[head + slot_offset].arg.to_be_bytes());
    }
    value_bytes.truncate(push_len);
    let mut buf = [0u8; 32];
    buf[32 - push_len..].copy_from_slice(&value_bytes);
    Word::from_big_endian(&buf)
}

/// Skip `pc` past this pattern's own padding, the fused analogue of
/// [`stack_manip::push`]'s trailing-`DATA`-slot skip.
fn skip_padding(ctx: &mut ExecutionContext<'_>, op: OpCode) {
    ctx.pc += super_instruction_slot_count(op) - 1;
}

pub(crate) fn push1_push4_dup3(ctx: &mut ExecutionContext<'_>, instr: Instruction) -> Result<(), ErrorKind> {
    let a = Word::from(instr.arg as u8);
    let b = immediate_at(ctx, ctx.pc + 1, 4);
    ctx.stack.push(a)?;
    ctx.stack.push(b)?;
    stack_manip::dup(ctx, OpCode::DUP3)?;
    skip_padding(ctx, OpCode::SUPER_PUSH1_PUSH4_DUP3);
    Ok(())
}

pub(crate) fn push1_push1_push1_shl_sub(ctx: &mut ExecutionContext<'_>, instr: Instruction) -> Result<(), ErrorKind> {
    let a = Word::from(instr.arg as u8);
    let b = Word::from(ctx.code[ctx.pc + 1].arg as u8);
    let c = Word::from(ctx.code[ctx.pc + 2].arg as u8);
    ctx.stack.push(a)?;
    ctx.stack.push(b)?;
    ctx.stack.push(c)?;
    bitwise::shl(ctx)?;
    arithmetic::sub(ctx)?;
    skip_padding(ctx, OpCode::SUPER_PUSH1_PUSH1_PUSH1_SHL_SUB);
    Ok(())
}

pub(crate) fn and_swap1_pop_swap2_swap1(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    boolean::and(ctx)?;
    stack_manip::swap(ctx, OpCode::SWAP1)?;
    stack_manip::pop(ctx)?;
    stack_manip::swap(ctx, OpCode::SWAP2)?;
    stack_manip::swap(ctx, OpCode::SWAP1)?;
    skip_padding(ctx, OpCode::SUPER_AND_SWAP1_POP_SWAP2_SWAP1);
    Ok(())
}

/// Returns `Ok(true)` if the `JUMPI` was taken. On the non-taken path `pc`
/// is skipped past this pattern's own padding here, same as the taken path
/// is repositioned absolutely by [`validate_jump_dest`].
pub(crate) fn iszero_push2_jumpi(ctx: &mut ExecutionContext<'_>, _instr: Instruction) -> Result<bool, ErrorKind> {
    boolean::iszero(ctx)?;
    let dest = Word::from(ctx.code[ctx.pc + 1].arg);
    let cond = ctx.stack.pop()?;
    if cond.is_zero() {
        skip_padding(ctx, OpCode::SUPER_ISZERO_PUSH2_JUMPI);
        return Ok(false);
    }
    ctx.pc = validate_jump_dest(ctx.code, ctx.pc_map, dest)?;
    Ok(true)
}

pub(crate) fn swap2_swap1_pop_jump(ctx: &mut ExecutionContext<'_>) -> Result<bool, ErrorKind> {
    stack_manip::swap(ctx, OpCode::SWAP2)?;
    stack_manip::swap(ctx, OpCode::SWAP1)?;
    stack_manip::pop(ctx)?;
    control::jump(ctx)
}

pub(crate) fn swap1_pop_swap2_swap1(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    stack_manip::swap(ctx, OpCode::SWAP1)?;
    stack_manip::pop(ctx)?;
    stack_manip::swap(ctx, OpCode::SWAP2)?;
    stack_manip::swap(ctx, OpCode::SWAP1)?;
    skip_padding(ctx, OpCode::SUPER_SWAP1_POP_SWAP2_SWAP1);
    Ok(())
}

pub(crate) fn pop_swap2_swap1_pop(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    stack_manip::pop(ctx)?;
    stack_manip::swap(ctx, OpCode::SWAP2)?;
    stack_manip::swap(ctx, OpCode::SWAP1)?;
    stack_manip::pop(ctx)?;
    skip_padding(ctx, OpCode::SUPER_POP_SWAP2_SWAP1_POP);
    Ok(())
}

pub(crate) fn push2_jump(ctx: &mut ExecutionContext<'_>, instr: Instruction) -> Result<bool, ErrorKind> {
    let dest = Word::from(instr.arg);
    ctx.pc = validate_jump_dest(ctx.code, ctx.pc_map, dest)?;
    Ok(true)
}

pub(crate) fn push2_jumpi(ctx: &mut ExecutionContext<'_>, instr: Instruction) -> Result<bool, ErrorKind> {
    let dest = Word::from(instr.arg);
    let cond = ctx.stack.pop()?;
    if cond.is_zero() {
        skip_padding(ctx, OpCode::SUPER_PUSH2_JUMPI);
        return Ok(false);
    }
    ctx.pc = validate_jump_dest(ctx.code, ctx.pc_map, dest)?;
    Ok(true)
}

pub(crate) fn push1_push1(ctx: &mut ExecutionContext<'_>, instr: Instruction) -> Result<(), ErrorKind> {
    let a = Word::from(instr.arg as u8);
    let b = Word::from(ctx.code[ctx.pc + 1].arg as u8);
    ctx.stack.push(a)?;
    ctx.stack.push(b)?;
    skip_padding(ctx, OpCode::SUPER_PUSH1_PUSH1);
    Ok(())
}

pub(crate) fn push1_add(ctx: &mut ExecutionContext<'_>, instr: Instruction) -> Result<(), ErrorKind> {
    ctx.stack.push(Word::from(instr.arg as u8))?;
    arithmetic::add(ctx)?;
    skip_padding(ctx, OpCode::SUPER_PUSH1_ADD);
    Ok(())
}

pub(crate) fn push1_shl(ctx: &mut ExecutionContext<'_>, instr: Instruction) -> Result<(), ErrorKind> {
    ctx.stack.push(Word::from(instr.arg as u8))?;
    bitwise::shl(ctx)?;
    skip_padding(ctx, OpCode::SUPER_PUSH1_SHL);
    Ok(())
}

pub(crate) fn push1_dup1(ctx: &mut ExecutionContext<'_>, instr: Instruction) -> Result<(), ErrorKind> {
    ctx.stack.push(Word::from(instr.arg as u8))?;
    stack_manip::dup(ctx, OpCode::DUP1)?;
    skip_padding(ctx, OpCode::SUPER_PUSH1_DUP1);
    Ok(())
}

pub(crate) fn swap1_pop(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    stack_manip::swap(ctx, OpCode::SWAP1)?;
    stack_manip::pop(ctx)?;
    skip_padding(ctx, OpCode::SUPER_SWAP1_POP);
    Ok(())
}

pub(crate) fn pop_jump(ctx: &mut ExecutionContext<'_>) -> Result<bool, ErrorKind> {
    stack_manip::pop(ctx)?;
    control::jump(ctx)
}

pub(crate) fn pop_pop(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    stack_manip::pop(ctx)?;
    stack_manip::pop(ctx)?;
    skip_padding(ctx, OpCode::SUPER_POP_POP);
    Ok(())
}

pub(crate) fn swap2_swap1(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    stack_manip::swap(ctx, OpCode::SWAP2)?;
    stack_manip::swap(ctx, OpCode::SWAP1)?;
    skip_padding(ctx, OpCode::SUPER_SWAP2_SWAP1);
    Ok(())
}

pub(crate) fn swap2_pop(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    stack_manip::swap(ctx, OpCode::SWAP2)?;
    stack_manip::pop(ctx)?;
    skip_padding(ctx, OpCode::SUPER_SWAP2_POP);
    Ok(())
}

pub(crate) fn dup2_mstore(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    stack_manip::dup(ctx, OpCode::DUP2)?;
    memory::mstore(ctx)?;
    skip_padding(ctx, OpCode::SUPER_DUP2_MSTORE);
    Ok(())
}

pub(crate) fn dup2_lt(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    stack_manip::dup(ctx, OpCode::DUP2)?;
    boolean::lt(ctx)?;
    skip_padding(ctx, OpCode::SUPER_DUP2_LT);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{CallKind, CallParams, Revision};
    use crate::opcode::OpCode as Op;
    use bytes::Bytes;
    use ethereum_types::Address;

    fn params() -> CallParams {
        CallParams {
            kind: CallKind::Call,
            is_static: false,
            depth: 0,
            gas: 1_000_000,
            recipient: Address::zero(),
            sender: Address::zero(),
            input_data: Bytes::new(),
            value: Word::zero(),
            code_identity: None,
            code: Bytes::new(),
            revision: Revision::Cancun,
            config: Default::default(),
        }
    }

    #[test]
    fn push1_push4_dup3_reconstructs_both_immediates_and_skips_padding() {
        let translated = fused(&[0x60, 0x01, 0x63, 0xde, 0xad, 0xbe, 0xef, 0x82]);
        let mut ctx = ExecutionContext::new(params(), &translated.code, &translated.pc_map);
        ctx.stack.push(Word::from(9)).unwrap(); // pre-existing item DUP3 reaches past the two pushes
        let instr = ctx.code[ctx.pc];
        assert_eq!(instr.op(), Op::SUPER_PUSH1_PUSH4_DUP3);
        push1_push4_dup3(&mut ctx, instr).unwrap();
        assert_eq!(ctx.stack.pop().unwrap(), Word::from(9)); // DUP3 copy
        assert_eq!(ctx.stack.pop().unwrap(), Word::from(0xdeadbeefu32));
        assert_eq!(ctx.stack.pop().unwrap(), Word::from(1));
        assert_eq!(ctx.stack.pop().unwrap(), Word::from(9));
        assert_eq!(ctx.pc, translated.code.len() - 1);
    }

    #[test]
    fn push1_push1_pushes_both_values_and_skips_its_data_slot() {
        let translated = fused(&[0x60, 0x01, 0x60, 0x02]);
        let mut ctx = ExecutionContext::new(params(), &translated.code, &translated.pc_map);
        let instr = ctx.code[ctx.pc];
        push1_push1(&mut ctx, instr).unwrap();
        assert_eq!(ctx.stack.pop().unwrap(), Word::from(2));
        assert_eq!(ctx.stack.pop().unwrap(), Word::from(1));
        assert_eq!(ctx.pc, 1);
    }

    #[test]
    fn push2_jump_jumps_to_fused_immediate() {
        let translated = fused(&[0x61, 0x00, 0x04, 0x56, 0x5b, 0x00]);
        let mut ctx = ExecutionContext::new(params(), &translated.code, &translated.pc_map);
        let instr = ctx.code[ctx.pc];
        assert_eq!(instr.op(), Op::SUPER_PUSH2_JUMP);
        let jumped = push2_jump(&mut ctx, instr).unwrap();
        assert!(jumped);
        assert_eq!(ctx.code[ctx.pc].op(), Op::JUMPDEST);
    }

    #[test]
    fn push2_jumpi_false_skips_past_its_own_padding_slot() {
        let translated = fused(&[0x61, 0x00, 0x04, 0x57, 0x5b, 0x00]);
        let mut ctx = ExecutionContext::new(params(), &translated.code, &translated.pc_map);
        let instr = ctx.code[ctx.pc];
        assert_eq!(instr.op(), Op::SUPER_PUSH2_JUMPI);
        ctx.stack.push(Word::zero()).unwrap(); // cond
        let jumped = push2_jumpi(&mut ctx, instr).unwrap();
        assert!(!jumped);
        // Fused window is 2 slots (PUSH2 head + JUMPI's own, now a NOOP);
        // the dispatch loop's own step-10 `pc += 1` then lands on JUMPDEST.
        assert_eq!(ctx.pc, 1);
        assert_eq!(ctx.code[ctx.pc + 1].op(), Op::JUMPDEST);
    }

    #[test]
    fn dup2_lt_compares_duplicated_item() {
        let translated = fused(&[]);
        let mut ctx = ExecutionContext::new(params(), &translated.code, &translated.pc_map);
        ctx.stack.push(Word::from(5)).unwrap();
        ctx.stack.push(Word::from(3)).unwrap();
        dup2_lt(&mut ctx).unwrap();
        // stack: [5, 3, dup(5)] -> LT pops (5, 3) -> 3 < 5 -> 1
        assert_eq!(ctx.stack.pop().unwrap(), Word::one());
    }

    use crate::translator::{translate_with, TranslateOptions};

    fn fused(bytecode: &[u8]) -> crate::translator::TranslatedCode {
        translate_with(bytecode, TranslateOptions { enable_super_instructions: true, build_pc_map: false })
    }
}
