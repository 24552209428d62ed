//! Account and block/tx context reads: `ADDRESS`/`CALLER`/`CALLVALUE`/
//! `ORIGIN`/`GASPRICE`, `BALANCE`/`EXTCODESIZE`/`EXTCODECOPY`/
//! `EXTCODEHASH`, `BLOCKHASH`/`COINBASE`/`TIMESTAMP`/`NUMBER`/`DIFFICULTY`/
//! `GASLIMIT`/`CHAINID`/`SELFBALANCE`/`BASEFEE`/`BLOBHASH`/`BLOBBASEFEE`.
//!
//! The EIP-2929 cold/warm surcharge pattern applies uniformly: the table
//! cost already covers the warm case, and a cold access pays the
//! difference on top, via direct `Host::access_account` calls.

use ethereum_types::{Address, H256};

use crate::common::{address_to_u256, u256_to_address, ErrorKind, Revision};
use crate::gas::ADDITIONAL_COLD_ACCOUNT_ACCESS_COST;
use crate::host::{AccessStatus, Host};
use crate::interpreter::ExecutionContext;
use crate::memory::num_words;
use crate::word::Word;

pub(crate) fn address(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    ctx.stack.push(address_to_u256(ctx.params.recipient))
}

pub(crate) fn caller(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    ctx.stack.push(address_to_u256(ctx.params.sender))
}

pub(crate) fn callvalue(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    ctx.stack.push(ctx.params.value)
}

/// Charges the cold-access surcharge on top of the already-deducted warm
/// static cost. Returns `Ok(true)` if execution may continue.
fn charge_cold_account_access<H: Host>(
    ctx: &mut ExecutionContext<'_>,
    host: &mut H,
    address: Address,
) -> Result<bool, ErrorKind> {
    if ctx.params.revision < Revision::Berlin {
        return Ok(true);
    }
    if host.access_account(address) == AccessStatus::Cold {
        return Ok(ctx.consume_gas(ADDITIONAL_COLD_ACCOUNT_ACCESS_COST as u64));
    }
    Ok(true)
}

pub(crate) fn balance<H: Host>(ctx: &mut ExecutionContext<'_>, host: &mut H) -> Result<(), ErrorKind> {
    let address = u256_to_address(ctx.stack.pop()?);
    if !charge_cold_account_access(ctx, host, address)? {
        return Ok(());
    }
    ctx.stack.push(host.get_balance(address))
}

pub(crate) fn extcodesize<H: Host>(ctx: &mut ExecutionContext<'_>, host: &mut H) -> Result<(), ErrorKind> {
    let address = u256_to_address(ctx.stack.pop()?);
    if !charge_cold_account_access(ctx, host, address)? {
        return Ok(());
    }
    ctx.stack.push(Word::from(host.get_code_size(address)))
}

pub(crate) fn extcodehash<H: Host>(ctx: &mut ExecutionContext<'_>, host: &mut H) -> Result<(), ErrorKind> {
    let address = u256_to_address(ctx.stack.pop()?);
    if !charge_cold_account_access(ctx, host, address)? {
        return Ok(());
    }
    let hash = if host.account_exists(address) {
        host.get_code_hash(address)
    } else {
        H256::zero()
    };
    ctx.stack.push(Word::from_big_endian(hash.as_bytes()))
}

pub(crate) fn extcodecopy<H: Host>(ctx: &mut ExecutionContext<'_>, host: &mut H) -> Result<(), ErrorKind> {
    let address = u256_to_address(ctx.stack.pop()?);
    let mem_index = ctx.stack.pop()?;
    let input_index = ctx.stack.pop()?;
    let size = ctx.stack.pop()?;

    if size > Word::from(u32::MAX) {
        return Err(ErrorKind::GasUintOverflow);
    }
    let size = size.as_usize();

    if !charge_cold_account_access(ctx, host, address)? {
        return Ok(());
    }
    if size == 0 {
        return Ok(());
    }

    let cost = ctx.memory.access_cost(mem_index, size)?;
    if !ctx.consume_gas(cost) {
        return Ok(());
    }
    let copy_cost = num_words(size as u64) * 3;
    if !ctx.consume_gas(copy_cost) {
        return Ok(());
    }

    let code = host.get_code(address);
    let src = input_index.min(Word::from(code.len() as u64)).as_usize();
    let copy_size = size.min(code.len().saturating_sub(src));

    let offset = mem_index.as_usize();
    if copy_size > 0 {
        ctx.memory.set(offset, &code[src..src + copy_size]);
    }
    if size > copy_size {
        ctx.memory.fill(offset + copy_size, size - copy_size, 0);
    }
    Ok(())
}

pub(crate) fn blockhash<H: Host>(ctx: &mut ExecutionContext<'_>, host: &mut H) -> Result<(), ErrorKind> {
    let number = ctx.stack.pop()?;
    let upper_bound = host.get_transaction_context().block_number;
    let lower_bound = upper_bound.saturating_sub(256);

    let mut hash = H256::zero();
    if number <= Word::from(u64::MAX) {
        let n = number.as_u64();
        if (lower_bound..upper_bound).contains(&n) {
            hash = host.get_block_hash(n);
        }
    }
    ctx.stack.push(Word::from_big_endian(hash.as_bytes()))
}

pub(crate) fn selfbalance<H: Host>(ctx: &mut ExecutionContext<'_>, host: &mut H) -> Result<(), ErrorKind> {
    let balance = host.get_balance(ctx.params.recipient);
    ctx.stack.push(balance)
}

pub(crate) fn gasprice<H: Host>(ctx: &mut ExecutionContext<'_>, host: &mut H) -> Result<(), ErrorKind> {
    ctx.stack.push(host.get_transaction_context().gas_price)
}

pub(crate) fn origin<H: Host>(ctx: &mut ExecutionContext<'_>, host: &mut H) -> Result<(), ErrorKind> {
    ctx.stack.push(address_to_u256(host.get_transaction_context().origin))
}

pub(crate) fn coinbase<H: Host>(ctx: &mut ExecutionContext<'_>, host: &mut H) -> Result<(), ErrorKind> {
    ctx.stack.push(address_to_u256(host.get_transaction_context().coinbase))
}

pub(crate) fn timestamp<H: Host>(ctx: &mut ExecutionContext<'_>, host: &mut H) -> Result<(), ErrorKind> {
    ctx.stack.push(Word::from(host.get_transaction_context().timestamp))
}

pub(crate) fn number<H: Host>(ctx: &mut ExecutionContext<'_>, host: &mut H) -> Result<(), ErrorKind> {
    ctx.stack.push(Word::from(host.get_transaction_context().block_number))
}

pub(crate) fn difficulty<H: Host>(ctx: &mut ExecutionContext<'_>, host: &mut H) -> Result<(), ErrorKind> {
    let tx_context = host.get_transaction_context();
    ctx.stack.push(Word::from_big_endian(tx_context.prev_randao.as_bytes()))
}

pub(crate) fn gaslimit<H: Host>(ctx: &mut ExecutionContext<'_>, host: &mut H) -> Result<(), ErrorKind> {
    ctx.stack.push(Word::from(host.get_transaction_context().gas_limit))
}

pub(crate) fn chainid<H: Host>(ctx: &mut ExecutionContext<'_>, host: &mut H) -> Result<(), ErrorKind> {
    ctx.stack.push(host.get_transaction_context().chain_id)
}

pub(crate) fn basefee<H: Host>(ctx: &mut ExecutionContext<'_>, host: &mut H) -> Result<(), ErrorKind> {
    ctx.stack.push(host.get_transaction_context().base_fee)
}

pub(crate) fn blobbasefee<H: Host>(ctx: &mut ExecutionContext<'_>, host: &mut H) -> Result<(), ErrorKind> {
    ctx.stack.push(host.get_transaction_context().blob_base_fee)
}

pub(crate) fn blobhash<H: Host>(ctx: &mut ExecutionContext<'_>, host: &mut H) -> Result<(), ErrorKind> {
    let index = ctx.stack.pop()?;
    let tx_context = host.get_transaction_context();
    let value = if index < Word::from(tx_context.blob_hashes.len() as u64) {
        let hash = tx_context.blob_hashes[index.as_usize()];
        Word::from_big_endian(hash.as_bytes())
    } else {
        Word::zero()
    };
    ctx.stack.push(value)
}
