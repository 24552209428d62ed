//! `LOG0`..`LOG4`: memory-region gas first, then one `H256` topic pop per
//! configured topic count, then a direct `Host::emit_log` call.

use arrayvec::ArrayVec;
use ethereum_types::H256;

use crate::common::ErrorKind;
use crate::host::Host;
use crate::interpreter::ExecutionContext;
use crate::word::Word;

const MAX_REGION_SIZE: u64 = u32::MAX as u64;

/// Per-byte cost of a LOG's data region, on top of the per-topic static
/// cost already charged from the gas table.
const LOG_DATA_BYTE_COST: u64 = 8;

fn log<H: Host>(ctx: &mut ExecutionContext<'_>, host: &mut H, num_topics: usize) -> Result<(), ErrorKind> {
    if ctx.params.is_static {
        return Err(ErrorKind::WriteProtection);
    }

    let offset = ctx.stack.pop()?;
    let size = ctx.stack.pop()?;

    if size > Word::from(MAX_REGION_SIZE) {
        return Err(ErrorKind::GasUintOverflow);
    }
    let size = size.as_usize();

    if size > 0 {
        let cost = ctx.memory.access_cost(offset, size)?;
        if !ctx.consume_gas(cost) {
            return Ok(());
        }
    }
    if !ctx.consume_gas(size as u64 * LOG_DATA_BYTE_COST) {
        return Ok(());
    }

    let mut topics: ArrayVec<H256, 4> = ArrayVec::new();
    for _ in 0..num_topics {
        topics.push(H256(ctx.stack.pop()?.into()));
    }

    let data = if size > 0 {
        ctx.memory.get(offset.as_usize(), size).to_vec()
    } else {
        Vec::new()
    };
    host.emit_log(ctx.params.recipient, &topics, &data);
    Ok(())
}

pub(crate) fn log0<H: Host>(ctx: &mut ExecutionContext<'_>, host: &mut H) -> Result<(), ErrorKind> {
    log(ctx, host, 0)
}

pub(crate) fn log1<H: Host>(ctx: &mut ExecutionContext<'_>, host: &mut H) -> Result<(), ErrorKind> {
    log(ctx, host, 1)
}

pub(crate) fn log2<H: Host>(ctx: &mut ExecutionContext<'_>, host: &mut H) -> Result<(), ErrorKind> {
    log(ctx, host, 2)
}

pub(crate) fn log3<H: Host>(ctx: &mut ExecutionContext<'_>, host: &mut H) -> Result<(), ErrorKind> {
    log(ctx, host, 3)
}

pub(crate) fn log4<H: Host>(ctx: &mut ExecutionContext<'_>, host: &mut H) -> Result<(), ErrorKind> {
    log(ctx, host, 4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{CallKind, CallParams, Revision};
    use crate::host::DummyHost;
    use crate::instruction::Code;
    use crate::pcmap::PcMap;
    use bytes::Bytes;
    use ethereum_types::Address;
    use std::cell::RefCell;

    #[derive(Default)]
    struct LogHost {
        calls: RefCell<Vec<(usize, usize)>>,
    }

    impl Host for LogHost {
        fn get_storage(&self, _a: Address, _k: H256) -> Word {
            Word::zero()
        }
        fn set_storage(&mut self, _a: Address, _k: H256, _v: Word) -> crate::host::StorageStatus {
            crate::host::StorageStatus::Unchanged
        }
        fn get_committed_storage(&self, _a: Address, _k: H256) -> Word {
            Word::zero()
        }
        fn get_balance(&self, _a: Address) -> Word {
            Word::zero()
        }
        fn get_code_size(&self, _a: Address) -> u64 {
            0
        }
        fn get_code_hash(&self, _a: Address) -> H256 {
            H256::zero()
        }
        fn get_code(&self, _a: Address) -> Bytes {
            Bytes::new()
        }
        fn account_exists(&self, _a: Address) -> bool {
            false
        }
        fn has_self_destructed(&self, _a: Address) -> bool {
            false
        }
        fn self_destruct(&mut self, _a: Address, _b: Address) -> bool {
            true
        }
        fn is_address_in_access_list(&self, _a: Address) -> bool {
            false
        }
        fn is_slot_in_access_list(&self, _a: Address, _k: H256) -> (bool, bool) {
            (false, false)
        }
        fn access_account(&mut self, _a: Address) -> crate::host::AccessStatus {
            crate::host::AccessStatus::Warm
        }
        fn access_storage(&mut self, _a: Address, _k: H256) -> crate::host::AccessStatus {
            crate::host::AccessStatus::Warm
        }
        fn get_transaction_context(&self) -> crate::host::TxContext {
            DummyHost.get_transaction_context()
        }
        fn get_block_hash(&self, _b: u64) -> H256 {
            H256::zero()
        }
        fn call(&mut self, params: CallParams) -> crate::host::CallOutcome {
            crate::host::CallOutcome {
                gas_left: params.gas,
                ..Default::default()
            }
        }
        fn emit_log(&mut self, _address: Address, topics: &[H256], data: &[u8]) {
            self.calls.borrow_mut().push((topics.len(), data.len()));
        }
    }

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
    fn log2_emits_two_topics_and_memory_data() {
        let code = Code::new();
        let pc_map = PcMap::new(0, 0);
        let mut c = ctx(&code, &pc_map);
        let mut host = LogHost::default();

        c.memory.access_cost(Word::zero(), 32).unwrap();
        c.memory.store_word(0, Word::from(123));

        c.stack.push(Word::from(0xaa)).unwrap(); // topic2
        c.stack.push(Word::from(0xbb)).unwrap(); // topic1
        c.stack.push(Word::from(32)).unwrap(); // size
        c.stack.push(Word::zero()).unwrap(); // offset
        log2(&mut c, &mut host).unwrap();

        assert_eq!(host.calls.borrow()[0], (2, 32));
    }

    #[test]
    fn log_rejected_in_static_context() {
        let code = Code::new();
        let pc_map = PcMap::new(0, 0);
        let mut c = ctx(&code, &pc_map);
        c.params.is_static = true;
        let mut host = LogHost::default();
        c.stack.push(Word::zero()).unwrap();
        c.stack.push(Word::zero()).unwrap();
        assert_eq!(log0(&mut c, &mut host).unwrap_err(), ErrorKind::WriteProtection);
    }
}
