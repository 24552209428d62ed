//! The internal opcode space.
//!
//! `OpCode` is a thin `u16` newtype rather than a Rust enum: the dispatch
//! loop needs O(1) decode from a raw `u16` tag, and a 256-way `enum` with a
//! fallible `TryFrom` would just reintroduce the branch the packed encoding
//! exists to avoid. Base EVM opcodes keep their original byte values
//! (`0x00..=0xff`); everything the translator introduces — `DATA`, `NOOP`,
//! `JUMP_TO`, and the super-instructions — lives at `0x100` and above so it
//! can never collide with a real EVM byte.
//!
//! Reconstructed from the opcode call sites across the dispatch and
//! translation modules rather than copied from a single source file.

use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OpCode(pub u16);

macro_rules! opcodes {
    ($($name:ident = $value:expr),* $(,)?) => {
        impl OpCode {
            $(pub const $name: OpCode = OpCode($value);)*

            pub fn name(self) -> &'static str {
                match self.0 {
                    $($value => stringify!($name),)*
                    _ => "UNKNOWN",
                }
            }
        }
    };
}

opcodes! {
    STOP = 0x00,
    ADD = 0x01,
    MUL = 0x02,
    SUB = 0x03,
    DIV = 0x04,
    SDIV = 0x05,
    MOD = 0x06,
    SMOD = 0x07,
    ADDMOD = 0x08,
    MULMOD = 0x09,
    EXP = 0x0a,
    SIGNEXTEND = 0x0b,

    LT = 0x10,
    GT = 0x11,
    SLT = 0x12,
    SGT = 0x13,
    EQ = 0x14,
    ISZERO = 0x15,
    AND = 0x16,
    OR = 0x17,
    XOR = 0x18,
    NOT = 0x19,
    BYTE = 0x1a,
    SHL = 0x1b,
    SHR = 0x1c,
    SAR = 0x1d,

    KECCAK256 = 0x20,

    ADDRESS = 0x30,
    BALANCE = 0x31,
    ORIGIN = 0x32,
    CALLER = 0x33,
    CALLVALUE = 0x34,
    CALLDATALOAD = 0x35,
    CALLDATASIZE = 0x36,
    CALLDATACOPY = 0x37,
    CODESIZE = 0x38,
    CODECOPY = 0x39,
    GASPRICE = 0x3a,
    EXTCODESIZE = 0x3b,
    EXTCODECOPY = 0x3c,
    RETURNDATASIZE = 0x3d,
    RETURNDATACOPY = 0x3e,
    EXTCODEHASH = 0x3f,

    BLOCKHASH = 0x40,
    COINBASE = 0x41,
    TIMESTAMP = 0x42,
    NUMBER = 0x43,
    DIFFICULTY = 0x44,
    GASLIMIT = 0x45,
    CHAINID = 0x46,
    SELFBALANCE = 0x47,
    BASEFEE = 0x48,
    BLOBHASH = 0x49,
    BLOBBASEFEE = 0x4a,

    POP = 0x50,
    MLOAD = 0x51,
    MSTORE = 0x52,
    MSTORE8 = 0x53,
    SLOAD = 0x54,
    SSTORE = 0x55,
    JUMP = 0x56,
    JUMPI = 0x57,
    PC = 0x58,
    MSIZE = 0x59,
    GAS = 0x5a,
    JUMPDEST = 0x5b,
    TLOAD = 0x5c,
    TSTORE = 0x5d,
    MCOPY = 0x5e,
    PUSH0 = 0x5f,

    PUSH1 = 0x60,
    PUSH2 = 0x61,
    PUSH3 = 0x62,
    PUSH4 = 0x63,
    PUSH5 = 0x64,
    PUSH6 = 0x65,
    PUSH7 = 0x66,
    PUSH8 = 0x67,
    PUSH9 = 0x68,
    PUSH10 = 0x69,
    PUSH11 = 0x6a,
    PUSH12 = 0x6b,
    PUSH13 = 0x6c,
    PUSH14 = 0x6d,
    PUSH15 = 0x6e,
    PUSH16 = 0x6f,
    PUSH17 = 0x70,
    PUSH18 = 0x71,
    PUSH19 = 0x72,
    PUSH20 = 0x73,
    PUSH21 = 0x74,
    PUSH22 = 0x75,
    PUSH23 = 0x76,
    PUSH24 = 0x77,
    PUSH25 = 0x78,
    PUSH26 = 0x79,
    PUSH27 = 0x7a,
    PUSH28 = 0x7b,
    PUSH29 = 0x7c,
    PUSH30 = 0x7d,
    PUSH31 = 0x7e,
    PUSH32 = 0x7f,

    DUP1 = 0x80,
    DUP2 = 0x81,
    DUP3 = 0x82,
    DUP4 = 0x83,
    DUP5 = 0x84,
    DUP6 = 0x85,
    DUP7 = 0x86,
    DUP8 = 0x87,
    DUP9 = 0x88,
    DUP10 = 0x89,
    DUP11 = 0x8a,
    DUP12 = 0x8b,
    DUP13 = 0x8c,
    DUP14 = 0x8d,
    DUP15 = 0x8e,
    DUP16 = 0x8f,

    SWAP1 = 0x90,
    SWAP2 = 0x91,
    SWAP3 = 0x92,
    SWAP4 = 0x93,
    SWAP5 = 0x94,
    SWAP6 = 0x95,
    SWAP7 = 0x96,
    SWAP8 = 0x97,
    SWAP9 = 0x98,
    SWAP10 = 0x99,
    SWAP11 = 0x9a,
    SWAP12 = 0x9b,
    SWAP13 = 0x9c,
    SWAP14 = 0x9d,
    SWAP15 = 0x9e,
    SWAP16 = 0x9f,

    LOG0 = 0xa0,
    LOG1 = 0xa1,
    LOG2 = 0xa2,
    LOG3 = 0xa3,
    LOG4 = 0xa4,

    CREATE = 0xf0,
    CALL = 0xf1,
    CALLCODE = 0xf2,
    RETURN = 0xf3,
    DELEGATECALL = 0xf4,
    CREATE2 = 0xf5,
    STATICCALL = 0xfa,
    REVERT = 0xfd,
    INVALID = 0xfe,
    SELFDESTRUCT = 0xff,

    // Pseudo-instructions emitted by the translator. These live outside the
    // single byte range so they never alias a real EVM opcode.
    DATA = 0x100,
    NOOP = 0x101,
    JUMP_TO = 0x102,

    // Super-instructions, longest fused pattern first.
    SUPER_PUSH1_PUSH4_DUP3 = 0x103,
    SUPER_PUSH1_PUSH1_PUSH1_SHL_SUB = 0x104,
    SUPER_AND_SWAP1_POP_SWAP2_SWAP1 = 0x105,
    SUPER_ISZERO_PUSH2_JUMPI = 0x106,
    SUPER_SWAP2_SWAP1_POP_JUMP = 0x107,
    SUPER_SWAP1_POP_SWAP2_SWAP1 = 0x108,
    SUPER_POP_SWAP2_SWAP1_POP = 0x109,
    SUPER_PUSH2_JUMP = 0x10a,
    SUPER_PUSH2_JUMPI = 0x10b,
    SUPER_PUSH1_PUSH1 = 0x10c,
    SUPER_PUSH1_ADD = 0x10d,
    SUPER_PUSH1_SHL = 0x10e,
    SUPER_PUSH1_DUP1 = 0x10f,
    SUPER_SWAP1_POP = 0x110,
    SUPER_POP_JUMP = 0x111,
    SUPER_POP_POP = 0x112,
    SUPER_SWAP2_SWAP1 = 0x113,
    SUPER_SWAP2_POP = 0x114,
    SUPER_DUP2_MSTORE = 0x115,
    SUPER_DUP2_LT = 0x116,
}

/// One past the highest valid dispatch tag. Any `op.0` at or beyond this is
/// invalid code.
pub const NUM_EXECUTABLE_OPCODES: u16 = OpCode::SUPER_DUP2_LT.0 + 1;

impl OpCode {
    pub const fn to_u16(self) -> u16 {
        self.0
    }

    pub const fn to_usize(self) -> usize {
        self.0 as usize
    }

    /// The underlying EVM byte, for opcodes that have one.
    pub const fn to_u8(self) -> u8 {
        self.0 as u8
    }

    pub const fn is_push(self) -> bool {
        self.0 >= Self::PUSH1.0 && self.0 <= Self::PUSH32.0
    }

    pub const fn is_dup(self) -> bool {
        self.0 >= Self::DUP1.0 && self.0 <= Self::DUP16.0
    }

    pub const fn is_swap(self) -> bool {
        self.0 >= Self::SWAP1.0 && self.0 <= Self::SWAP16.0
    }

    pub const fn is_log(self) -> bool {
        self.0 >= Self::LOG0.0 && self.0 <= Self::LOG4.0
    }

    pub const fn is_super_instruction(self) -> bool {
        self.0 >= Self::SUPER_PUSH1_PUSH4_DUP3.0
    }

    /// `n` for `PUSHn`, 1-indexed number of data bytes pushed.
    pub const fn push_size(self) -> usize {
        (self.0 - Self::PUSH1.0) as usize + 1
    }

    pub const fn dup_height(self) -> usize {
        (self.0 - Self::DUP1.0) as usize + 1
    }

    pub const fn swap_height(self) -> usize {
        (self.0 - Self::SWAP1.0) as usize + 1
    }

    pub const fn log_topics(self) -> usize {
        (self.0 - Self::LOG0.0) as usize
    }
}

impl fmt::Debug for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
