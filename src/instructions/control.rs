//! Control flow: `JUMP`/`JUMPI`/`JUMPDEST`, `RETURN`/`REVERT`,
//! `CALLDATALOAD`/`CALLDATASIZE`, `PC`, `GAS`, `STOP`. Jump validation is
//! delegated to [`crate::interpreter::validate_jump_dest`], which needs
//! the [`crate::pcmap::PcMap`] to translate a bytecode-offset destination
//! into the fused instruction stream's own indexing.

use crate::common::{ErrorKind, Status};
use crate::interpreter::{validate_jump_dest, ExecutionContext};
use crate::word::Word;

pub(crate) fn stop(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    ctx.status = Status::Stopped;
    Ok(())
}

pub(crate) fn jumpdest(_ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    Ok(())
}

/// Returns `Ok(true)` if the jump was taken (`pc` already points at the
/// destination), `Ok(false)` otherwise — the dispatch loop only advances
/// `pc` by one in the latter case.
pub(crate) fn jump(ctx: &mut ExecutionContext<'_>) -> Result<bool, ErrorKind> {
    let dest = ctx.stack.pop()?;
    ctx.pc = validate_jump_dest(ctx.code, ctx.pc_map, dest)?;
    Ok(true)
}

pub(crate) fn jumpi(ctx: &mut ExecutionContext<'_>) -> Result<bool, ErrorKind> {
    let dest = ctx.stack.pop()?;
    let cond = ctx.stack.pop()?;
    if cond.is_zero() {
        return Ok(false);
    }
    ctx.pc = validate_jump_dest(ctx.code, ctx.pc_map, dest)?;
    Ok(true)
}

pub(crate) fn pc(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    let orig = ctx.pc_map.trans_to_orig(ctx.pc as u16).unwrap_or(0);
    ctx.stack.push(Word::from(orig))
}

pub(crate) fn gas(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    ctx.stack.push(Word::from(ctx.gas_left.max(0) as u64))
}

pub(crate) fn calldataload(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    let index = ctx.stack.pop()?;
    let input = &ctx.params.input_data;

    let value = if index > Word::from(input.len() as u64) {
        Word::zero()
    } else {
        let index = index.as_usize();
        let end = (index + 32).min(input.len());
        let mut data = [0u8; 32];
        data[..end - index].copy_from_slice(&input[index..end]);
        Word::from_big_endian(&data)
    };
    ctx.stack.push(value)
}

pub(crate) fn calldatasize(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    ctx.stack.push(Word::from(ctx.params.input_data.len() as u64))
}

pub(crate) fn ret(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    let offset = ctx.stack.pop()?;
    let size = ctx.stack.pop()?;
    set_output(ctx, offset, size)?;
    ctx.status = Status::Returned;
    Ok(())
}

pub(crate) fn revert(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    let offset = ctx.stack.pop()?;
    let size = ctx.stack.pop()?;
    set_output(ctx, offset, size)?;
    ctx.status = Status::Reverted;
    Ok(())
}

fn set_output(ctx: &mut ExecutionContext<'_>, offset: Word, size: Word) -> Result<(), ErrorKind> {
    if size.is_zero() {
        return Ok(());
    }
    if size > Word::from(u32::MAX) {
        return Err(ErrorKind::GasUintOverflow);
    }
    let size = size.as_usize();
    let cost = ctx.memory.access_cost(offset, size)?;
    if !ctx.consume_gas(cost) {
        return Ok(());
    }
    ctx.output_data = ctx.memory.get(offset.as_usize(), size).to_vec().into();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{CallKind, CallParams, Revision};
    use crate::instruction::{Code, Instruction};
    use crate::opcode::OpCode;
    use crate::translator::translate;
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
    fn jump_to_jumpdest_succeeds() {
        let translated = translate(&[0x60, 0x03, 0x5b, 0x00], false); // PUSH1 3, JUMPDEST, STOP
        let mut ctx = ExecutionContext::new(params(), &translated.code, &translated.pc_map);
        ctx.stack.push(Word::from(2)).unwrap();
        let jumped = jump(&mut ctx).unwrap();
        assert!(jumped);
        assert_eq!(ctx.code[ctx.pc].op(), OpCode::JUMPDEST);
    }

    #[test]
    fn jump_to_non_jumpdest_is_invalid() {
        let translated = translate(&[0x60, 0x00, 0x00], false);
        let mut ctx = ExecutionContext::new(params(), &translated.code, &translated.pc_map);
        ctx.stack.push(Word::from(1)).unwrap();
        assert_eq!(jump(&mut ctx).unwrap_err(), ErrorKind::InvalidJump);
    }

    #[test]
    fn jumpi_false_does_not_jump() {
        let code: Code = vec![Instruction::plain(OpCode::JUMPI)];
        let pc_map = crate::pcmap::PcMap::new(0, 0);
        let mut ctx = ExecutionContext::new(params(), &code, &pc_map);
        ctx.stack.push(Word::zero()).unwrap(); // cond
        ctx.stack.push(Word::from(100)).unwrap(); // dest
        assert!(!jumpi(&mut ctx).unwrap());
    }

    #[test]
    fn calldataload_pads_with_zero() {
        let code = Code::new();
        let pc_map = crate::pcmap::PcMap::new(0, 0);
        let mut p = params();
        p.input_data = Bytes::from_static(&[0xff; 4]);
        let mut ctx = ExecutionContext::new(p, &code, &pc_map);
        ctx.stack.push(Word::zero()).unwrap();
        calldataload(&mut ctx).unwrap();
        let value = ctx.stack.pop().unwrap();
        let mut expected = [0u8; 32];
        expected[0..4].copy_from_slice(&[0xff; 4]);
        assert_eq!(value, Word::from_big_endian(&expected));
    }

    #[test]
    fn ret_copies_memory_to_output() {
        let code = Code::new();
        let pc_map = crate::pcmap::PcMap::new(0, 0);
        let mut ctx = ExecutionContext::new(params(), &code, &pc_map);
        ctx.memory.access_cost(Word::zero(), 32).unwrap();
        ctx.memory.store_word(0, Word::from(7));
        ctx.stack.push(Word::from(32)).unwrap(); // size
        ctx.stack.push(Word::zero()).unwrap(); // offset
        ret(&mut ctx).unwrap();
        assert_eq!(ctx.status, Status::Returned);
        assert_eq!(ctx.output_data.len(), 32);
    }
}
