use bytes::Bytes;
use ethereum_types::{Address, H256, U256};
use strum_macros::Display;

/// EVM protocol revision, ordered so that later upgrades compare greater.
///
/// Every revision-gated behavior in this crate is a comparison against this
/// enum; there is no independent per-feature boolean (see DESIGN.md).
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Revision {
    Istanbul = 0,
    Berlin = 1,
    London = 2,
    Paris = 3,
    Shanghai = 4,
    Cancun = 5,
}

impl Revision {
    pub fn iter() -> impl Iterator<Item = Self> {
        [
            Self::Istanbul,
            Self::Berlin,
            Self::London,
            Self::Paris,
            Self::Shanghai,
            Self::Cancun,
        ]
        .into_iter()
    }

    pub const fn len() -> usize {
        Self::Cancun as usize + 1
    }

    pub const fn latest() -> Self {
        Self::Cancun
    }
}

/// The kind of call-like instruction that produced an invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallKind {
    Call,
    DelegateCall,
    CallCode,
    StaticCall,
    Create,
    Create2 { salt: H256 },
}

/// Invocation parameters supplied by the host.
#[derive(Clone, Debug, PartialEq)]
pub struct CallParams {
    pub kind: CallKind,
    pub is_static: bool,
    pub depth: u32,
    pub gas: i64,
    pub recipient: Address,
    pub sender: Address,
    pub input_data: Bytes,
    pub value: U256,
    /// Code identity; `None` marks an ephemeral "create call" whose
    /// translation must never be cached.
    pub code_identity: Option<H256>,
    pub code: Bytes,
    pub revision: Revision,
    pub config: crate::config::InvocationConfig,
}

/// Result of an invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct InvocationResult {
    pub success: bool,
    pub output_data: Bytes,
    pub gas_left: i64,
    pub gas_refund: i64,
}

/// The fine-grained error taxonomy.
///
/// These never escape as panics or Rust-level errors; they are always
/// wrapped in [`Status::Error`] and observed by the dispatch loop.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum ErrorKind {
    #[strum(serialize = "invalid jump")]
    InvalidJump,
    #[strum(serialize = "invalid code")]
    InvalidCode,
    #[strum(serialize = "stack underflow")]
    StackUnderflow,
    #[strum(serialize = "stack overflow")]
    StackOverflow,
    #[strum(serialize = "write protection")]
    WriteProtection,
    #[strum(serialize = "return data out of bounds")]
    ReturnDataOutOfBounds,
    #[strum(serialize = "gas uint overflow")]
    GasUintOverflow,
}

/// Execution status. `Running` is the only non-terminal state; every
/// other variant ends the dispatch loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Running,
    Stopped,
    Returned,
    Reverted,
    Suicided,
    InvalidInstruction,
    OutOfGas,
    SegmentationFault,
    MaxInitCodeSizeExceeded,
    Error(ErrorKind),
}

impl Status {
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}

#[inline]
pub(crate) fn u256_to_address(v: U256) -> Address {
    H256(v.into()).into()
}

#[inline]
pub(crate) fn address_to_u256(v: Address) -> U256 {
    U256::from_big_endian(&v.0)
}
