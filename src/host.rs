//! The host interface: the capability boundary between the interpreter and
//! the surrounding chain state (storage, balances, other accounts, calls).
//!
//! The trait is synchronous and infallible: every handler in this crate
//! runs a call to completion without suspending, so there is no async
//! boundary to cross inside a single dispatch. Outcomes that might
//! elsewhere be modeled as `Err` (a nonexistent account, an unsupported
//! op) are modeled here as a documented default return value instead
//! ("returns 0 if the account does not exist"), treating the host as
//! authoritative and non-adversarial.

use bytes::Bytes;
use ethereum_types::{Address, H256, U256};

use crate::common::CallParams;
use crate::word::Word;

/// State access status (EIP-2929).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessStatus {
    Cold,
    Warm,
}

impl Default for AccessStatus {
    fn default() -> Self {
        Self::Cold
    }
}

/// Outcome of an `SSTORE`, for refund accounting at the call site.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageStatus {
    Unchanged,
    Modified,
    ModifiedAgain,
    Added,
    Deleted,
}

/// Block- and transaction-scoped values returned by `get_tx_context()`.
#[derive(Clone, Debug)]
pub struct TxContext {
    pub origin: Address,
    pub gas_price: U256,
    pub block_number: u64,
    pub timestamp: u64,
    pub coinbase: Address,
    pub gas_limit: u64,
    pub prev_randao: H256,
    pub base_fee: U256,
    pub chain_id: U256,
    pub blob_base_fee: U256,
    pub blob_hashes: Vec<H256>,
}

/// The outcome of a `call()`, covering CALL/CALLCODE/DELEGATECALL/
/// STATICCALL/CREATE/CREATE2.
#[derive(Clone, Debug, Default)]
pub struct CallOutcome {
    pub output: Bytes,
    pub gas_left: i64,
    pub gas_refund: i64,
    pub created_address: Option<Address>,
    pub reverted: bool,
    /// `Some` only when the sub-call failed for a reason other than an
    /// ordinary REVERT (e.g. the host rejected it outright).
    pub error: Option<crate::common::ErrorKind>,
}

/// Abstraction that exposes world state and nested-call semantics to the
/// interpreter. Synchronous: the host owns state and answers in-process.
pub trait Host {
    fn get_storage(&self, address: Address, key: H256) -> Word;
    fn set_storage(&mut self, address: Address, key: H256, value: Word) -> StorageStatus;
    /// Storage value as of the start of the current transaction, used by
    /// the EIP-2200/3529 `SSTORE` gas computation.
    fn get_committed_storage(&self, address: Address, key: H256) -> Word;

    fn get_balance(&self, address: Address) -> Word;
    fn get_code_size(&self, address: Address) -> u64;
    fn get_code_hash(&self, address: Address) -> H256;
    fn get_code(&self, address: Address) -> Bytes;

    fn account_exists(&self, address: Address) -> bool;
    fn has_self_destructed(&self, address: Address) -> bool;
    /// Returns `true` if this is the first self-destruct of `address`
    /// within the current transaction (relevant to pre-London refunds).
    fn self_destruct(&mut self, address: Address, beneficiary: Address) -> bool;

    fn is_address_in_access_list(&self, address: Address) -> bool;
    fn is_slot_in_access_list(&self, address: Address, key: H256) -> (bool, bool);
    fn access_account(&mut self, address: Address) -> AccessStatus;
    fn access_storage(&mut self, address: Address, key: H256) -> AccessStatus;

    fn get_transaction_context(&self) -> TxContext;
    fn get_block_hash(&self, block_number: u64) -> H256;

    fn call(&mut self, params: CallParams) -> CallOutcome;
    fn emit_log(&mut self, address: Address, topics: &[H256], data: &[u8]);
}

/// Host that answers every query with "account does not exist" defaults.
/// Useful for translation-only workloads and as a base for tests that only
/// care about a few methods.
#[derive(Clone, Copy, Debug, Default)]
pub struct DummyHost;

impl Host for DummyHost {
    fn get_storage(&self, _address: Address, _key: H256) -> Word {
        Word::zero()
    }

    fn set_storage(&mut self, _address: Address, _key: H256, _value: Word) -> StorageStatus {
        StorageStatus::Unchanged
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

    fn access_account(&mut self, _address: Address) -> AccessStatus {
        AccessStatus::Cold
    }

    fn access_storage(&mut self, _address: Address, _key: H256) -> AccessStatus {
        AccessStatus::Cold
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
            output: Bytes::new(),
            gas_left: params.gas,
            gas_refund: 0,
            created_address: None,
            reverted: true,
            error: Some(crate::common::ErrorKind::InvalidCode),
        }
    }

    fn emit_log(&mut self, _address: Address, _topics: &[H256], _data: &[u8]) {}
}
