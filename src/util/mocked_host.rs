//! A stateful, configurable [`Host`] for tests.
//!
//! Unlike [`crate::host::DummyHost`] (fixed "account does not exist"
//! answers), this tracks per-address balance/code/storage, an EIP-2929
//! access-list pair, a single configurable sub-call outcome, and records
//! every `call`/`emit_log` it receives so test assertions can inspect
//! what the interpreter did.

use std::collections::{HashMap, HashSet};

use bytes::Bytes;
use ethereum_types::{Address, H256, U256};

use crate::common::CallParams;
use crate::host::{AccessStatus, CallOutcome, Host, StorageStatus, TxContext};
use crate::word::Word;

#[derive(Clone, Debug, Default)]
pub struct Account {
    pub balance: Word,
    pub code: Bytes,
    pub code_hash: H256,
    pub storage: HashMap<H256, Word>,
    pub committed_storage: HashMap<H256, Word>,
    pub exists: bool,
    pub self_destructed: bool,
}

#[derive(Clone, Debug)]
pub struct MockedHost {
    pub accounts: HashMap<Address, Account>,
    pub tx_context: TxContext,
    pub block_hashes: HashMap<u64, H256>,
    pub accessed_accounts: HashSet<Address>,
    pub accessed_storage: HashSet<(Address, H256)>,
    /// Returned verbatim by every `call()`.
    pub call_result: CallOutcome,
    pub recorded_calls: Vec<CallParams>,
    pub recorded_logs: Vec<(Address, Vec<H256>, Bytes)>,
}

impl MockedHost {
    pub fn new() -> Self {
        Self {
            accounts: HashMap::new(),
            tx_context: TxContext {
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
            },
            block_hashes: HashMap::new(),
            accessed_accounts: HashSet::new(),
            accessed_storage: HashSet::new(),
            call_result: CallOutcome::default(),
            recorded_calls: Vec::new(),
            recorded_logs: Vec::new(),
        }
    }

    pub fn account_mut(&mut self, address: Address) -> &mut Account {
        self.accounts.entry(address).or_default()
    }

    pub fn set_balance(&mut self, address: Address, balance: impl Into<Word>) {
        let account = self.account_mut(address);
        account.balance = balance.into();
        account.exists = true;
    }

    pub fn set_code(&mut self, address: Address, code: impl Into<Bytes>) {
        use sha3::Digest as _;
        let code = code.into();
        let hash = H256::from_slice(&sha3::Keccak256::digest(&code));
        let account = self.account_mut(address);
        account.code_hash = hash;
        account.code = code;
        account.exists = true;
    }

    pub fn set_storage(&mut self, address: Address, key: H256, value: impl Into<Word>) {
        let value = value.into();
        let account = self.account_mut(address);
        account.committed_storage.insert(key, value);
        account.storage.insert(key, value);
    }
}

impl Default for MockedHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for MockedHost {
    fn get_storage(&self, address: Address, key: H256) -> Word {
        self.accounts
            .get(&address)
            .and_then(|a| a.storage.get(&key))
            .copied()
            .unwrap_or_default()
    }

    fn set_storage(&mut self, address: Address, key: H256, value: Word) -> StorageStatus {
        let committed = self
            .accounts
            .get(&address)
            .and_then(|a| a.committed_storage.get(&key))
            .copied()
            .unwrap_or_default();
        let account = self.account_mut(address);
        let current = account.storage.get(&key).copied().unwrap_or_default();

        let status = if current == value {
            StorageStatus::Unchanged
        } else if committed == current {
            if value.is_zero() {
                StorageStatus::Deleted
            } else if current.is_zero() {
                StorageStatus::Added
            } else {
                StorageStatus::Modified
            }
        } else {
            StorageStatus::ModifiedAgain
        };

        account.storage.insert(key, value);
        status
    }

    fn get_committed_storage(&self, address: Address, key: H256) -> Word {
        self.accounts
            .get(&address)
            .and_then(|a| a.committed_storage.get(&key))
            .copied()
            .unwrap_or_default()
    }

    fn get_balance(&self, address: Address) -> Word {
        self.accounts.get(&address).map(|a| a.balance).unwrap_or_default()
    }

    fn get_code_size(&self, address: Address) -> u64 {
        self.accounts.get(&address).map(|a| a.code.len() as u64).unwrap_or(0)
    }

    fn get_code_hash(&self, address: Address) -> H256 {
        self.accounts.get(&address).map(|a| a.code_hash).unwrap_or_default()
    }

    fn get_code(&self, address: Address) -> Bytes {
        self.accounts.get(&address).map(|a| a.code.clone()).unwrap_or_default()
    }

    fn account_exists(&self, address: Address) -> bool {
        self.accounts.get(&address).map(|a| a.exists).unwrap_or(false)
    }

    fn has_self_destructed(&self, address: Address) -> bool {
        self.accounts.get(&address).map(|a| a.self_destructed).unwrap_or(false)
    }

    fn self_destruct(&mut self, address: Address, beneficiary: Address) -> bool {
        let first_time = !self.accounts.get(&address).map(|a| a.self_destructed).unwrap_or(false);
        let balance = self.get_balance(address);
        if address != beneficiary {
            self.account_mut(beneficiary).balance += balance;
            self.account_mut(address).balance = Word::zero();
        }
        self.account_mut(address).self_destructed = true;
        first_time
    }

    fn is_address_in_access_list(&self, address: Address) -> bool {
        self.accessed_accounts.contains(&address)
    }

    fn is_slot_in_access_list(&self, address: Address, key: H256) -> (bool, bool) {
        (
            self.accessed_accounts.contains(&address),
            self.accessed_storage.contains(&(address, key)),
        )
    }

    fn access_account(&mut self, address: Address) -> AccessStatus {
        if self.accessed_accounts.insert(address) {
            AccessStatus::Cold
        } else {
            AccessStatus::Warm
        }
    }

    fn access_storage(&mut self, address: Address, key: H256) -> AccessStatus {
        self.accessed_accounts.insert(address);
        if self.accessed_storage.insert((address, key)) {
            AccessStatus::Cold
        } else {
            AccessStatus::Warm
        }
    }

    fn get_transaction_context(&self) -> TxContext {
        self.tx_context.clone()
    }

    fn get_block_hash(&self, block_number: u64) -> H256 {
        self.block_hashes.get(&block_number).copied().unwrap_or_default()
    }

    fn call(&mut self, params: CallParams) -> CallOutcome {
        self.recorded_calls.push(params);
        self.call_result.clone()
    }

    fn emit_log(&mut self, address: Address, topics: &[H256], data: &[u8]) {
        self.recorded_logs.push((address, topics.to_vec(), Bytes::copy_from_slice(data)));
    }
}
