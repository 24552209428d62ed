//! `MLOAD`/`MSTORE`/`MSTORE8`/`MSIZE`/`MCOPY`, `KECCAK256`,
//! `CODESIZE`/`CODECOPY`, `CALLDATACOPY`, `RETURNDATASIZE`/
//! `RETURNDATACOPY`, all built over [`crate::memory::Memory`], which owns
//! the expansion-cost arithmetic itself.

use ethereum_types::H256;
use sha3::Digest as _;

use crate::common::ErrorKind;
use crate::hash_cache::{RegionKey, GLOBAL_KECCAK_CACHE};
use crate::interpreter::ExecutionContext;
use crate::memory::num_words;
use crate::word::Word;

const MAX_REGION_SIZE: u64 = u32::MAX as u64;

/// Charge the expansion cost for `[offset, offset+size)`. Returns `Ok(true)`
/// if execution may proceed; `Ok(false)` means the charge ran the context
/// out of gas and the caller should return `Ok(())` immediately.
fn ensure_memory(ctx: &mut ExecutionContext<'_>, offset: Word, size: usize) -> Result<bool, ErrorKind> {
    let cost = ctx.memory.access_cost(offset, size)?;
    Ok(ctx.consume_gas(cost))
}

pub(crate) fn mload(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    let offset = ctx.stack.pop()?;
    if !ensure_memory(ctx, offset, 32)? {
        return Ok(());
    }
    let value = ctx.memory.load_word(offset.as_usize());
    ctx.stack.push(value)
}

pub(crate) fn mstore(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    let offset = ctx.stack.pop()?;
    let value = ctx.stack.pop()?;
    if !ensure_memory(ctx, offset, 32)? {
        return Ok(());
    }
    ctx.memory.store_word(offset.as_usize(), value);
    Ok(())
}

pub(crate) fn mstore8(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    let offset = ctx.stack.pop()?;
    let value = ctx.stack.pop()?;
    if !ensure_memory(ctx, offset, 1)? {
        return Ok(());
    }
    ctx.memory.store_byte(offset.as_usize(), value.low_u32() as u8);
    Ok(())
}

pub(crate) fn msize(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    ctx.stack.push(Word::from(ctx.memory.len() as u64))
}

/// `MCOPY`, Cancun (EIP-5656): copy `size` bytes within memory itself,
/// correct under overlap — implemented as if through an intermediate
/// buffer, matching `copy_from_slice` semantics on overlapping regions.
pub(crate) fn mcopy(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    let dest = ctx.stack.pop()?;
    let src = ctx.stack.pop()?;
    let size = ctx.stack.pop()?;

    if size > Word::from(MAX_REGION_SIZE) {
        return Err(ErrorKind::GasUintOverflow);
    }
    let size = size.as_usize();
    if size == 0 {
        return Ok(());
    }

    let max_offset = dest.max(src);
    if !ensure_memory(ctx, max_offset, size)? {
        return Ok(());
    }
    let copy_cost = num_words(size as u64) * 3;
    if !ctx.consume_gas(copy_cost) {
        return Ok(());
    }

    let data = ctx.memory.get(src.as_usize(), size).to_vec();
    ctx.memory.set(dest.as_usize(), &data);
    Ok(())
}

pub(crate) fn calldatacopy(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    let mem_index = ctx.stack.pop()?;
    let input_index = ctx.stack.pop()?;
    let size = ctx.stack.pop()?;

    if size > Word::from(MAX_REGION_SIZE) {
        return Err(ErrorKind::GasUintOverflow);
    }
    let size = size.as_usize();
    if size == 0 {
        return Ok(());
    }

    if !ensure_memory(ctx, mem_index, size)? {
        return Ok(());
    }
    let copy_cost = num_words(size as u64) * 3;
    if !ctx.consume_gas(copy_cost) {
        return Ok(());
    }

    let input = &ctx.params.input_data;
    let src = input_index.min(Word::from(input.len() as u64)).as_usize();
    let copy_size = size.min(input.len().saturating_sub(src));

    let offset = mem_index.as_usize();
    if copy_size > 0 {
        ctx.memory.set(offset, &input[src..src + copy_size]);
    }
    if size > copy_size {
        ctx.memory.fill(offset + copy_size, size - copy_size, 0);
    }
    Ok(())
}

pub(crate) fn codesize(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    ctx.stack.push(Word::from(ctx.params.code.len() as u64))
}

pub(crate) fn codecopy(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    let mem_index = ctx.stack.pop()?;
    let input_index = ctx.stack.pop()?;
    let size = ctx.stack.pop()?;

    if size > Word::from(MAX_REGION_SIZE) {
        return Err(ErrorKind::GasUintOverflow);
    }
    let size = size.as_usize();
    if size == 0 {
        return Ok(());
    }

    if !ensure_memory(ctx, mem_index, size)? {
        return Ok(());
    }
    let copy_cost = num_words(size as u64) * 3;
    if !ctx.consume_gas(copy_cost) {
        return Ok(());
    }

    let code = &ctx.params.code;
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

pub(crate) fn returndatasize(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    ctx.stack.push(Word::from(ctx.return_data.len() as u64))
}

pub(crate) fn returndatacopy(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    let mem_index = ctx.stack.pop()?;
    let input_index = ctx.stack.pop()?;
    let size = ctx.stack.pop()?;

    if input_index > Word::from(ctx.return_data.len() as u64) {
        return Err(ErrorKind::ReturnDataOutOfBounds);
    }
    let src = input_index.as_usize();
    if size > Word::from(MAX_REGION_SIZE) {
        return Err(ErrorKind::GasUintOverflow);
    }
    let size = size.as_usize();
    if src.checked_add(size).map_or(true, |end| end > ctx.return_data.len()) {
        return Err(ErrorKind::ReturnDataOutOfBounds);
    }
    if size == 0 {
        return Ok(());
    }

    if !ensure_memory(ctx, mem_index, size)? {
        return Ok(());
    }
    let copy_cost = num_words(size as u64) * 3;
    if !ctx.consume_gas(copy_cost) {
        return Ok(());
    }

    let data = ctx.return_data[src..src + size].to_vec();
    ctx.memory.set(mem_index.as_usize(), &data);
    Ok(())
}

pub(crate) fn keccak256(ctx: &mut ExecutionContext<'_>) -> Result<(), ErrorKind> {
    let offset = ctx.stack.pop()?;
    let size = ctx.stack.pop()?;

    if size > Word::from(MAX_REGION_SIZE) {
        return Err(ErrorKind::GasUintOverflow);
    }
    let size = size.as_usize();

    if size == 0 {
        let digest = if ctx.params.config.enable_hash_cache {
            GLOBAL_KECCAK_CACHE.get_or_hash(
                RegionKey {
                    code_identity: ctx.params.code_identity.unwrap_or(H256::zero()),
                    offset: 0,
                    len: 0,
                },
                &[],
            )
        } else {
            H256::from_slice(&sha3::Keccak256::digest(&[]))
        };
        return ctx.stack.push(Word::from_big_endian(digest.as_bytes()));
    }

    if !ensure_memory(ctx, offset, size)? {
        return Ok(());
    }
    let hash_cost = num_words(size as u64) * 6;
    if !ctx.consume_gas(hash_cost) {
        return Ok(());
    }

    let data = ctx.memory.get(offset.as_usize(), size);
    let digest = if ctx.params.config.enable_hash_cache {
        GLOBAL_KECCAK_CACHE.get_or_hash(
            RegionKey {
                code_identity: ctx.params.code_identity.unwrap_or(H256::zero()),
                offset: offset.as_u32(),
                len: size as u32,
            },
            data,
        )
    } else {
        H256::from_slice(&sha3::Keccak256::digest(data))
    };
    ctx.stack.push(Word::from_big_endian(digest.as_bytes()))
}
