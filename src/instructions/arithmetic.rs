//! `ADD`..`SIGNEXTEND`: arithmetic opcodes built on [`crate::word`]'s free
//! functions and a fallible [`crate::stack::Stack`] instead of panicking
//! pops.

use crate::common::ErrorKind;
use crate::interpreter::ExecutionContext;
use crate::word;

macro_rules! binop {
    ($name:ident, $f:path) => {
        pub(crate) fn $name(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
            let a = ctx.stack.pop()?;
            let b = ctx.stack.pop()?;
            ctx.stack.push($f(a, b))
        }
    };
}

binop!(add, word::wrapping_add);
binop!(mul, word::wrapping_mul);
binop!(sub, word::wrapping_sub);
binop!(div, word::div);
binop!(sdiv, word::sdiv);
binop!(modulo, word::modulo);
binop!(smod, word::smod);

pub(crate) fn addmod(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    let a = ctx.stack.pop()?;
    let b = ctx.stack.pop()?;
    let m = ctx.stack.pop()?;
    ctx.stack.push(word::addmod(a, b, m))
}

pub(crate) fn mulmod(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    let a = ctx.stack.pop()?;
    let b = ctx.stack.pop()?;
    let m = ctx.stack.pop()?;
    ctx.stack.push(word::mulmod(a, b, m))
}

pub(crate) fn exp(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    let base = ctx.stack.pop()?;
    let power = ctx.stack.pop()?;

    let gas_per_byte = if ctx.params.revision >= crate::common::Revision::Istanbul {
        50
    } else {
        10
    };
    let additional = word::exp_dynamic_gas(power, gas_per_byte);
    if !ctx.consume_gas(additional) {
        // consume_gas already flipped status to OutOfGas.
        return Ok(());
    }

    ctx.stack.push(word::exp(base, power))
}

pub(crate) fn signextend(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    let a = ctx.stack.pop()?;
    let b = ctx.stack.pop()?;
    ctx.stack.push(word::signextend(a, b))
}
