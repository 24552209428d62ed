//! `CALL`/`CALLCODE`/`DELEGATECALL`/`STATICCALL`, `CREATE`/`CREATE2`.
//!
//! Same cold-access surcharge, value-stipend, new-account, and
//! 63/64ths-forwarding order of operations as the reference client, built
//! as direct `Host::call` invocations: the host runs the sub-call to
//! completion in-process and returns a [`crate::host::CallOutcome`]
//! synchronously.

use ethereum_types::{Address, H256};

use crate::common::{address_to_u256, u256_to_address, CallKind, CallParams, ErrorKind, Revision, Status};
use crate::gas::call_gas_forwarded;
use crate::host::Host;
use crate::interpreter::ExecutionContext;
use crate::memory::num_words;
use crate::word::Word;

const MAX_REGION_SIZE: u64 = u32::MAX as u64;
const DEPTH_LIMIT: u32 = 1024;
const VALUE_STIPEND: i64 = 2300;
const VALUE_TRANSFER_COST: u64 = 9000;
const NEW_ACCOUNT_COST: u64 = 25000;
/// EIP-3860 (Shanghai): max `initcode` size for `CREATE`/`CREATE2`.
const MAX_INIT_CODE_SIZE: u64 = 2 * 24576;

fn region_bytes(ctx: &ExecutionContext<'_>, offset: Word, size: Word) -> Result<Vec<u8>, ErrorKind> {
    if size.is_zero() {
        return Ok(Vec::new());
    }
    if size > Word::from(MAX_REGION_SIZE) {
        return Err(ErrorKind::GasUintOverflow);
    }
    Ok(ctx.memory.get(offset.as_usize(), size.as_usize()).to_vec())
}

fn charge_memory(ctx: &mut ExecutionContext<'_>, offset: Word, size: Word) -> Result<bool, ErrorKind> {
    if size.is_zero() {
        return Ok(true);
    }
    if size > Word::from(MAX_REGION_SIZE) {
        return Err(ErrorKind::GasUintOverflow);
    }
    let cost = ctx.memory.access_cost(offset, size.as_usize())?;
    Ok(ctx.consume_gas(cost))
}

fn do_call<H: Host>(ctx: &mut ExecutionContext<'_>, host: &mut H, kind: CallKind, force_static: bool) -> Result<(), ErrorKind> {
    let gas_arg = ctx.stack.pop()?;
    let dst = u256_to_address(ctx.stack.pop()?);
    let value = if force_static || matches!(kind, CallKind::DelegateCall) {
        Word::zero()
    } else {
        ctx.stack.pop()?
    };
    let has_value = !value.is_zero();
    let input_offset = ctx.stack.pop()?;
    let input_size = ctx.stack.pop()?;
    let output_offset = ctx.stack.pop()?;
    let output_size = ctx.stack.pop()?;

    if has_value && ctx.params.is_static {
        return Err(ErrorKind::WriteProtection);
    }

    if ctx.params.revision >= Revision::Berlin {
        if host.access_account(dst) == crate::host::AccessStatus::Cold {
            if !ctx.consume_gas(crate::gas::ADDITIONAL_COLD_ACCOUNT_ACCESS_COST as u64) {
                return Ok(());
            }
        }
    }

    if !charge_memory(ctx, input_offset, input_size)? {
        return Ok(());
    }
    if !charge_memory(ctx, output_offset, output_size)? {
        return Ok(());
    }

    let mut cost = if has_value { VALUE_TRANSFER_COST } else { 0 };
    if matches!(kind, CallKind::Call) && has_value && !host.account_exists(dst) {
        cost += NEW_ACCOUNT_COST;
    }
    if !ctx.consume_gas(cost) {
        return Ok(());
    }

    let input_data = region_bytes(ctx, input_offset, input_size)?;

    let mut forwarded = call_gas_forwarded(i64::MAX, ctx.gas_left, 0);
    if gas_arg < Word::from(forwarded as u64) {
        forwarded = gas_arg.as_u64() as i64;
    }
    if has_value {
        forwarded += VALUE_STIPEND;
        ctx.gas_left += VALUE_STIPEND;
    }

    ctx.return_data = bytes::Bytes::new();

    let can_execute = ctx.params.depth < DEPTH_LIMIT
        && !(has_value && host.get_balance(ctx.params.recipient) < value);

    if !can_execute {
        return ctx.stack.push(Word::zero());
    }

    let sender = if matches!(kind, CallKind::DelegateCall) {
        ctx.params.sender
    } else {
        ctx.params.recipient
    };
    let call_value = if matches!(kind, CallKind::DelegateCall) {
        ctx.params.value
    } else {
        value
    };

    let outcome = host.call(CallParams {
        kind,
        is_static: force_static || ctx.params.is_static,
        depth: ctx.params.depth + 1,
        gas: forwarded,
        recipient: dst,
        sender,
        input_data: input_data.into(),
        value: call_value,
        code_identity: None,
        code: bytes::Bytes::new(),
        revision: ctx.params.revision,
        config: ctx.params.config,
    });

    ctx.return_data = outcome.output.clone();
    if !output_size.is_zero() {
        let copy_size = (output_size.as_usize()).min(outcome.output.len());
        if copy_size > 0 {
            ctx.memory.set(output_offset.as_usize(), &outcome.output[..copy_size]);
        }
    }

    let gas_used = forwarded - outcome.gas_left;
    ctx.gas_left -= gas_used;
    ctx.gas_refund += outcome.gas_refund;

    let success = !outcome.reverted && outcome.error.is_none();
    ctx.stack.push(if success { Word::one() } else { Word::zero() })
}

pub(crate) fn call<H: Host>(ctx: &mut ExecutionContext<'_>, host: &mut H) -> Result<(), ErrorKind> {
    do_call(ctx, host, CallKind::Call, false)
}

pub(crate) fn callcode<H: Host>(ctx: &mut ExecutionContext<'_>, host: &mut H) -> Result<(), ErrorKind> {
    do_call(ctx, host, CallKind::CallCode, false)
}

pub(crate) fn delegatecall<H: Host>(ctx: &mut ExecutionContext<'_>, host: &mut H) -> Result<(), ErrorKind> {
    do_call(ctx, host, CallKind::DelegateCall, false)
}

pub(crate) fn staticcall<H: Host>(ctx: &mut ExecutionContext<'_>, host: &mut H) -> Result<(), ErrorKind> {
    do_call(ctx, host, CallKind::StaticCall, true)
}

fn do_create<H: Host>(ctx: &mut ExecutionContext<'_>, host: &mut H, is_create2: bool) -> Result<(), ErrorKind> {
    if ctx.params.is_static {
        return Err(ErrorKind::WriteProtection);
    }

    let endowment = ctx.stack.pop()?;
    let init_code_offset = ctx.stack.pop()?;
    let init_code_size = ctx.stack.pop()?;

    if init_code_size > Word::from(MAX_INIT_CODE_SIZE) && ctx.params.revision >= Revision::Shanghai {
        ctx.status = Status::MaxInitCodeSizeExceeded;
        return Ok(());
    }

    if !charge_memory(ctx, init_code_offset, init_code_size)? {
        return Ok(());
    }

    let kind = if is_create2 {
        let salt = ctx.stack.pop()?;
        let salt_cost = num_words(init_code_size.as_u64()) * 6;
        if !ctx.consume_gas(salt_cost) {
            return Ok(());
        }
        CallKind::Create2 { salt: H256(salt.into()) }
    } else {
        CallKind::Create
    };

    ctx.return_data = bytes::Bytes::new();

    let can_execute =
        ctx.params.depth < DEPTH_LIMIT && !(!endowment.is_zero() && host.get_balance(ctx.params.recipient) < endowment);

    if !can_execute {
        return ctx.stack.push(Word::zero());
    }

    let init_code = region_bytes(ctx, init_code_offset, init_code_size)?;
    let forwarded = ctx.gas_left - ctx.gas_left / 64;

    let outcome = host.call(CallParams {
        kind,
        is_static: false,
        depth: ctx.params.depth + 1,
        gas: forwarded,
        recipient: Address::zero(),
        sender: ctx.params.recipient,
        input_data: init_code.into(),
        value: endowment,
        code_identity: None,
        code: bytes::Bytes::new(),
        revision: ctx.params.revision,
        config: ctx.params.config,
    });

    ctx.gas_left -= forwarded - outcome.gas_left;
    ctx.gas_refund += outcome.gas_refund;
    ctx.return_data = outcome.output;

    let success = !outcome.reverted && outcome.error.is_none();
    let value = if success {
        outcome.created_address.map(address_to_u256).unwrap_or_default()
    } else {
        Word::zero()
    };
    ctx.stack.push(value)
}

pub(crate) fn create<H: Host>(ctx: &mut ExecutionContext<'_>, host: &mut H) -> Result<(), ErrorKind> {
    do_create(ctx, host, false)
}

pub(crate) fn create2<H: Host>(ctx: &mut ExecutionContext<'_>, host: &mut H) -> Result<(), ErrorKind> {
    do_create(ctx, host, true)
}
