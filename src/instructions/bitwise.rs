//! `BYTE`, `SHL`, `SHR`, `SAR`. The bit-twiddling itself lives in
//! [`crate::word`] since the translator's super-instruction fusion needs it
//! too (`SUPER_PUSH1_PUSH1_PUSH1_SHL_SUB`).

use crate::common::ErrorKind;
use crate::interpreter::ExecutionContext;
use crate::word;

pub(crate) fn byte(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    let index = ctx.stack.pop()?;
    let value = ctx.stack.pop()?;
    ctx.stack.push(word::byte(index, value))
}

pub(crate) fn shl(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    let shift = ctx.stack.pop()?;
    let value = ctx.stack.pop()?;
    ctx.stack.push(word::shl(shift, value))
}

pub(crate) fn shr(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    let shift = ctx.stack.pop()?;
    let value = ctx.stack.pop()?;
    ctx.stack.push(word::shr(shift, value))
}

pub(crate) fn sar(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    let shift = ctx.stack.pop()?;
    let value = ctx.stack.pop()?;
    ctx.stack.push(word::sar(shift, value))
}
