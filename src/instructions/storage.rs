//! `SLOAD`/`SSTORE` and Cancun's transient-storage `TLOAD`/`TSTORE`.
//!
//! Same EIP-2929 cold-surcharge-on-top-of-warm pattern for both, and the
//! EIP-2200/3529 `SSTORE` cost table lives in a pure function
//! ([`crate::gas::sstore_gas`]) rather than inline, via direct `Host`
//! calls.

use ethereum_types::H256;

use crate::common::{ErrorKind, Revision};
use crate::gas::ADDITIONAL_COLD_SLOAD_COST;
use crate::host::{AccessStatus, Host};
use crate::interpreter::ExecutionContext;
use crate::word::Word;

pub(crate) fn sload<H: Host>(ctx: &mut ExecutionContext<'_>, host: &mut H) -> Result<(), ErrorKind> {
    let key = H256(ctx.stack.pop()?.into());

    if ctx.params.revision >= Revision::Berlin {
        if host.access_storage(ctx.params.recipient, key) == AccessStatus::Cold {
            if !ctx.consume_gas(ADDITIONAL_COLD_SLOAD_COST as u64) {
                return Ok(());
            }
        }
    }

    let value = host.get_storage(ctx.params.recipient, key);
    ctx.stack.push(value)
}

/// EIP-2200's gas-stipend guard: below 2300 gas remaining, an SSTORE always
/// reverts (prevents reentrancy guards from being starved mid-transfer).
const SSTORE_STIPEND: i64 = 2300;

pub(crate) fn sstore<H: Host>(ctx: &mut ExecutionContext<'_>, host: &mut H) -> Result<(), ErrorKind> {
    if ctx.params.is_static {
        return Err(ErrorKind::WriteProtection);
    }
    if ctx.params.revision >= Revision::Istanbul && ctx.gas_left <= SSTORE_STIPEND {
        ctx.status = crate::common::Status::OutOfGas;
        return Ok(());
    }

    let key = H256(ctx.stack.pop()?.into());
    let value = ctx.stack.pop()?;

    let is_cold = ctx.params.revision >= Revision::Berlin
        && host.access_storage(ctx.params.recipient, key) == AccessStatus::Cold;

    let original = host.get_committed_storage(ctx.params.recipient, key);
    let current = host.get_storage(ctx.params.recipient, key);

    let (cost, refund) = crate::gas::sstore_gas(ctx.params.revision, is_cold, original, current, value);
    if !ctx.consume_gas(cost) {
        return Ok(());
    }
    ctx.gas_refund += refund;

    host.set_storage(ctx.params.recipient, key, value);
    Ok(())
}

pub(crate) fn tload<H: Host>(ctx: &mut ExecutionContext<'_>, host: &mut H) -> Result<(), ErrorKind> {
    let key = H256(ctx.stack.pop()?.into());
    // Transient storage shares the committed-value accessor as its backing
    // store; hosts are expected to clear it at transaction boundaries.
    let value = host.get_storage(ctx.params.recipient, key);
    ctx.stack.push(value)
}

pub(crate) fn tstore<H: Host>(ctx: &mut ExecutionContext<'_>, host: &mut H) -> Result<(), ErrorKind> {
    if ctx.params.is_static {
        return Err(ErrorKind::WriteProtection);
    }
    let key = H256(ctx.stack.pop()?.into());
    let value = ctx.stack.pop()?;
    host.set_storage(ctx.params.recipient, key, value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{CallKind, CallParams};
    use crate::host::{CallOutcome, StorageStatus, TxContext};
    use crate::instruction::Code;
    use crate::pcmap::PcMap;
    use bytes::Bytes;
    use ethereum_types::{Address, U256};
    use std::collections::HashMap;

    #[derive(Default)]
    struct RecordingHost {
        storage: HashMap<(Address, H256), Word>,
        accessed: HashMap<(Address, H256), bool>,
    }

    impl Host for RecordingHost {
        fn get_storage(&self, address: Address, key: H256) -> Word {
            self.storage.get(&(address, key)).copied().unwrap_or_default()
        }
        fn set_storage(&mut self, address: Address, key: H256, value: Word) -> StorageStatus {
            self.storage.insert((address, key), value);
            StorageStatus::Modified
        }
        fn get_committed_storage(&self, _address: Address, _key: H256) -> Word {
            Word::zero()
        }
        fn get_balance(&self, _address: Address) -> Word {
            Word::zero()
        }
        fn get_code_size(&self, _address: Address) -> u64 {
            0
        }
        fn get_code_hash(&self, _address: Address) -> H256 {
            H256::zero()
        }
        fn get_code(&self, _address: Address) -> Bytes {
            Bytes::new()
        }
        fn account_exists(&self, _address: Address) -> bool {
            false
        }
        fn has_self_destructed(&self, _address: Address) -> bool {
            false
        }
        fn self_destruct(&mut self, _address: Address, _beneficiary: Address) -> bool {
            true
        }
        fn is_address_in_access_list(&self, _address: Address) -> bool {
            false
        }
        fn is_slot_in_access_list(&self, _address: Address, _key: H256) -> (bool, bool) {
            (false, false)
        }
        fn access_account(&mut self, _address: Address) -> crate::host::AccessStatus {
            crate::host::AccessStatus::Warm
        }
        fn access_storage(&mut self, address: Address, key: H256) -> crate::host::AccessStatus {
            let first = !*self.accessed.entry((address, key)).or_insert(false);
            self.accessed.insert((address, key), true);
            if first {
                crate::host::AccessStatus::Cold
            } else {
                crate::host::AccessStatus::Warm
            }
        }
        fn get_transaction_context(&self) -> TxContext {
            TxContext {
                origin: Address::zero(),
                gas_price: U256::zero(),
                block_number: 0,
                timestamp: 0,
                coinbase: Address::zero(),
                gas_limit: 0,
                prev_randao: H256::zero(),
                base_fee: U256::zero(),
                chain_id: U256::zero(),
                blob_base_fee: U256::zero(),
                blob_hashes: Vec::new(),
            }
        }
        fn get_block_hash(&self, _block_number: u64) -> H256 {
            H256::zero()
        }
        fn call(&mut self, params: CallParams) -> CallOutcome {
            CallOutcome {
                gas_left: params.gas,
                ..Default::default()
            }
        }
        fn emit_log(&mut self, _address: Address, _topics: &[H256], _data: &[u8]) {}
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
    fn sstore_then_sload_roundtrips() {
        let code = Code::new();
        let pc_map = PcMap::new(0, 0);
        let mut c = ctx(&code, &pc_map);
        let mut host = RecordingHost::default();

        c.stack.push(Word::from(99)).unwrap(); // value
        c.stack.push(Word::from(1)).unwrap(); // key
        sstore(&mut c, &mut host).unwrap();

        c.stack.push(Word::from(1)).unwrap(); // key
        sload(&mut c, &mut host).unwrap();
        assert_eq!(c.stack.pop().unwrap(), Word::from(99));
    }

    #[test]
    fn sstore_below_stipend_is_out_of_gas() {
        let code = Code::new();
        let pc_map = PcMap::new(0, 0);
        let mut c = ctx(&code, &pc_map);
        c.gas_left = 2000;
        let mut host = RecordingHost::default();
        c.stack.push(Word::from(1)).unwrap();
        c.stack.push(Word::from(1)).unwrap();
        sstore(&mut c, &mut host).unwrap();
        assert_eq!(c.status, crate::common::Status::OutOfGas);
    }

    #[test]
    fn sstore_rejected_in_static_context() {
        let code = Code::new();
        let pc_map = PcMap::new(0, 0);
        let mut c = ctx(&code, &pc_map);
        c.params.is_static = true;
        let mut host = RecordingHost::default();
        c.stack.push(Word::from(1)).unwrap();
        c.stack.push(Word::from(1)).unwrap();
        assert_eq!(sstore(&mut c, &mut host).unwrap_err(), ErrorKind::WriteProtection);
    }
}
