//! Comparison and logical opcodes, `LT`..`NOT`, built against the
//! fallible [`crate::stack::Stack`] instead of a panicking one.

use i256::I256;

use crate::common::ErrorKind;
use crate::interpreter::ExecutionContext;
use crate::word::Word;

fn bool_word(b: bool) -> Word {
    if b {
        Word::one()
    } else {
        Word::zero()
    }
}

pub(crate) fn lt(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    let a = ctx.stack.pop()?;
    let b = ctx.stack.pop()?;
    ctx.stack.push(bool_word(a < b))
}

pub(crate) fn gt(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    let a = ctx.stack.pop()?;
    let b = ctx.stack.pop()?;
    ctx.stack.push(bool_word(a > b))
}

pub(crate) fn slt(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    let a = I256::from(ctx.stack.pop()?);
    let b = I256::from(ctx.stack.pop()?);
    ctx.stack.push(bool_word(a < b))
}

pub(crate) fn sgt(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    let a = I256::from(ctx.stack.pop()?);
    let b = I256::from(ctx.stack.pop()?);
    ctx.stack.push(bool_word(a > b))
}

pub(crate) fn eq(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    let a = ctx.stack.pop()?;
    let b = ctx.stack.pop()?;
    ctx.stack.push(bool_word(a == b))
}

pub(crate) fn iszero(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    let a = ctx.stack.back_mut(0)?;
    *a = bool_word(a.is_zero());
    Ok(())
}

pub(crate) fn and(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    let a = ctx.stack.pop()?;
    let b = ctx.stack.pop()?;
    ctx.stack.push(a & b)
}

pub(crate) fn or(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    let a = ctx.stack.pop()?;
    let b = ctx.stack.pop()?;
    ctx.stack.push(a | b)
}

pub(crate) fn xor(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    let a = ctx.stack.pop()?;
    let b = ctx.stack.pop()?;
    ctx.stack.push(a ^ b)
}

pub(crate) fn not(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    let a = ctx.stack.back_mut(0)?;
    *a = !*a;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{CallKind, CallParams, Revision};
    use crate::instruction::Code;
    use crate::pcmap::PcMap;
    use bytes::Bytes;
    use ethereum_types::Address;

    fn ctx<'a>(code: &'a Code, pc_map: &'a PcMap) -> ExecutionContext<'a> {
        ExecutionContext::new(
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
            },
            code,
            pc_map,
        )
    }

    #[test]
    fn slt_is_signed() {
        let code = Code::new();
        let pc_map = PcMap::new(0, 0);
        let mut c = ctx(&code, &pc_map);
        c.stack.push(Word::MAX).unwrap(); // -1
        c.stack.push(Word::zero()).unwrap();
        slt(&mut c).unwrap();
        assert_eq!(c.stack.pop().unwrap(), Word::one());
    }

    #[test]
    fn iszero_true_for_zero() {
        let code = Code::new();
        let pc_map = PcMap::new(0, 0);
        let mut c = ctx(&code, &pc_map);
        c.stack.push(Word::zero()).unwrap();
        iszero(&mut c).unwrap();
        assert_eq!(c.stack.pop().unwrap(), Word::one());
    }

    #[test]
    fn not_inverts_bits() {
        let code = Code::new();
        let pc_map = PcMap::new(0, 0);
        let mut c = ctx(&code, &pc_map);
        c.stack.push(Word::zero()).unwrap();
        not(&mut c).unwrap();
        assert_eq!(c.stack.pop().unwrap(), Word::MAX);
    }
}
