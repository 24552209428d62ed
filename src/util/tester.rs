//! A builder for exercising [`crate::execute`] against a [`MockedHost`]
//! and asserting on the outcome in one expression.

use std::sync::Arc;

use bytes::Bytes;
use ethereum_types::{Address, U256};

use crate::common::{CallKind, CallParams, Revision, Status};
use crate::config::InvocationConfig;
use crate::util::bytecode::Bytecode;
use crate::util::mocked_host::MockedHost;

#[derive(Clone, Copy, Debug)]
enum GasCheck {
    Used(i64),
    Left(i64),
}

/// Tester that executes EVM bytecode against a [`MockedHost`] and runs a
/// set of checks against the result.
#[must_use]
pub struct EvmTester {
    host: MockedHost,
    apply_host_fns: Vec<Box<dyn FnOnce(&mut MockedHost, &CallParams)>>,
    inspect_output_fn: Arc<dyn Fn(&[u8])>,
    inspect_host_fn: Arc<dyn Fn(&MockedHost, &CallParams)>,
    revision: Revision,
    kind: CallKind,
    is_static: bool,
    depth: u32,
    gas: i64,
    recipient: Address,
    sender: Address,
    input_data: Bytes,
    value: U256,
    config: InvocationConfig,
    code: Bytes,
    gas_check: Option<GasCheck>,
    expected_statuses: Option<Vec<Status>>,
    expected_output_data: Option<Vec<u8>>,
}

impl Default for EvmTester {
    fn default() -> Self {
        Self::new()
    }
}

impl EvmTester {
    pub fn new() -> Self {
        Self {
            host: MockedHost::default(),
            apply_host_fns: Vec::new(),
            inspect_output_fn: Arc::new(|_| ()),
            inspect_host_fn: Arc::new(|_, _| ()),
            revision: Revision::latest(),
            kind: CallKind::Call,
            is_static: false,
            depth: 0,
            gas: i64::MAX,
            recipient: Address::zero(),
            sender: Address::zero(),
            input_data: Bytes::new(),
            value: U256::zero(),
            config: InvocationConfig::default(),
            code: Bytes::new(),
            gas_check: None,
            expected_statuses: None,
            expected_output_data: None,
        }
    }

    pub fn code(mut self, code: impl Into<Bytecode>) -> Self {
        self.code = code.into().build().into();
        self
    }

    /// Queue a function that mutates the host before execution, given the
    /// invocation parameters it is about to be called with.
    pub fn apply_host_fn(mut self, host_fn: impl FnOnce(&mut MockedHost, &CallParams) + 'static) -> Self {
        self.apply_host_fns.push(Box::new(host_fn));
        self
    }

    pub fn revision(mut self, revision: Revision) -> Self {
        self.revision = revision;
        self
    }

    pub fn kind(mut self, kind: CallKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    pub fn gas(mut self, gas: i64) -> Self {
        self.gas = gas;
        self
    }

    pub fn set_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn recipient(mut self, recipient: impl Into<Address>) -> Self {
        self.recipient = recipient.into();
        self
    }

    pub fn sender(mut self, sender: impl Into<Address>) -> Self {
        self.sender = sender.into();
        self
    }

    pub fn value(mut self, value: impl Into<U256>) -> Self {
        self.value = value.into();
        self
    }

    pub fn config(mut self, config: InvocationConfig) -> Self {
        self.config = config;
        self
    }

    /// Check how much gas was used. Mutually exclusive with `gas_left`.
    pub fn gas_used(mut self, expected_gas_used: i64) -> Self {
        self.gas_check = Some(GasCheck::Used(expected_gas_used));
        self
    }

    /// Check how much gas is left. Mutually exclusive with `gas_used`.
    pub fn gas_left(mut self, expected_gas_left: i64) -> Self {
        self.gas_check = Some(GasCheck::Left(expected_gas_left));
        self
    }

    pub fn input(mut self, input: impl Into<Bytes>) -> Self {
        self.input_data = input.into();
        self
    }

    pub fn status(mut self, expected: Status) -> Self {
        self.expected_statuses = Some(vec![expected]);
        self
    }

    pub fn status_one_of<const N: usize>(mut self, expected: [Status; N]) -> Self {
        self.expected_statuses = Some(expected.to_vec());
        self
    }

    pub fn output_value(mut self, expected: impl Into<U256>) -> Self {
        let mut data = [0u8; 32];
        expected.into().to_big_endian(&mut data);
        self.expected_output_data = Some(data.to_vec());
        self
    }

    pub fn output_data(mut self, expected: impl Into<Vec<u8>>) -> Self {
        self.expected_output_data = Some(expected.into());
        self
    }

    pub fn inspect_output(mut self, f: impl Fn(&[u8]) + 'static) -> Self {
        self.inspect_output_fn = Arc::new(f);
        self
    }

    pub fn inspect_host(mut self, f: impl Fn(&MockedHost, &CallParams) + 'static) -> Self {
        self.inspect_host_fn = Arc::new(f);
        self
    }

    /// Execute the code, run every configured check, and return the raw
    /// output bytes along with the final status.
    pub fn check_and_get_result(mut self) -> (Status, Bytes) {
        let params = CallParams {
            kind: self.kind,
            is_static: self.is_static,
            depth: self.depth,
            gas: self.gas,
            recipient: self.recipient,
            sender: self.sender,
            input_data: self.input_data.clone(),
            value: self.value,
            code_identity: None,
            code: self.code.clone(),
            revision: self.revision,
            config: self.config,
        };

        let mut host = self.host;
        if self.revision >= Revision::Berlin {
            host.access_account(params.sender);
            host.access_account(params.recipient);
        }
        for f in self.apply_host_fns.drain(..) {
            f(&mut host, &params);
        }

        let gas = params.gas;
        let translated = crate::translator::translate_with(
            &self.code,
            crate::translator::TranslateOptions {
                enable_super_instructions: self.config.enable_super_instructions,
                build_pc_map: false,
            },
        );
        let ctx = crate::interpreter::ExecutionContext::new(params.clone(), &translated.code, &translated.pc_map);
        let ctx = crate::interpreter::run(ctx, &mut host, &mut crate::trace::NoopTracer);
        let status = ctx.status;
        let output = match status {
            Status::Returned | Status::Reverted => ctx.output_data,
            _ => Bytes::new(),
        };

        if let Some(expected) = &self.expected_statuses {
            assert!(
                expected.contains(&status),
                "status mismatch: {status:?}, expected one of {expected:?}"
            );
        }

        if let Some(check) = self.gas_check {
            match check {
                GasCheck::Used(used) => assert_eq!(gas - ctx.gas_left, used),
                GasCheck::Left(left) => assert_eq!(ctx.gas_left, left),
            }
        }

        if let Some(expected) = &self.expected_output_data {
            assert_eq!(&*output, expected);
        }

        (self.inspect_output_fn)(&output);
        (self.inspect_host_fn)(&host, &params);

        (status, output)
    }

    pub fn check(self) {
        self.check_and_get_result();
    }
}
