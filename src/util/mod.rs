//! Test-support helpers: a bytecode builder, a stateful mock [`Host`], and
//! a checked-execution test harness built on top of both.
//!
//! [`Host`]: crate::host::Host

pub mod bytecode;
pub mod mocked_host;
pub mod tester;

pub use bytecode::{Bytecode, CallInstruction};
pub use mocked_host::MockedHost;
pub use tester::EvmTester;
