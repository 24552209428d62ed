use ethereum_types::{Address, H256, U256};
use hex_literal::hex;
use lfvm::util::{Bytecode, CallInstruction, EvmTester};
use lfvm::{CallKind, OpCode, Revision, Status};

/// DELEGATECALL runs with the caller's storage/balance, only borrowing the
/// callee's code — so it forwards the caller's own value, not a popped one.
#[test]
fn delegatecall_forwards_callers_value_and_copies_output() {
    let mut value = H256::zero();
    value.0[17] = 0xfe;

    EvmTester::new()
        .code(
            Bytecode::new()
                .append(hex!("6001600003600052")) // m[0] = 0xffffff...
                .append(hex!("600560046003600260016103e8f4")) // DELEGATECALL(1000, 1, 2, 3, 4, 5)
                .append(hex!("60086000f3")),
        )
        .apply_host_fn(|host, _| {
            host.call_result.output = (&hex!("0a0b0c") as &[u8]).into();
            host.call_result.gas_left = 1;
        })
        .value(value.0)
        .gas(1700)
        .status(Status::Returned)
        .output_data(hex!("ffffffff0a0b0cff"))
        .inspect_host(move |host, _| {
            assert_eq!(host.recorded_calls.len(), 1);
            let call = host.recorded_calls.last().unwrap();
            assert_eq!(call.kind, CallKind::DelegateCall);
            assert_eq!(call.input_data.len(), 3);
            assert_eq!(<[u8; 32]>::from(call.value)[17], 0xfe);
        })
        .check()
}

/// DELEGATECALL forwards the caller's own `is_static` flag to the sub-call.
#[test]
fn delegatecall_forwards_static_flag() {
    EvmTester::new()
        .set_static(true)
        .code(Bytecode::new().append_bc(CallInstruction::delegatecall(0).gas(1)))
        .status(Status::Stopped)
        .inspect_host(|host, _| {
            assert_eq!(host.recorded_calls.len(), 1);
            let call = host.recorded_calls.last().unwrap();
            assert_eq!(call.gas, 1);
            assert!(call.is_static);
        })
        .check()
}

/// Past the depth limit, DELEGATECALL pushes 0 without invoking the host.
#[test]
fn delegatecall_respects_depth_limit() {
    EvmTester::new()
        .depth(1024)
        .code(Bytecode::new().append_bc(CallInstruction::delegatecall(0).gas(16)).ret_top())
        .status(Status::Returned)
        .output_value(0)
        .inspect_host(|host, _| assert!(host.recorded_calls.is_empty()))
        .check()
}

#[test]
fn create_pushes_the_created_address_and_shares_input_with_init_code() {
    let address = Address::zero();

    EvmTester::new()
        .apply_host_fn(move |host, _| {
            host.set_balance(address, 1);
            host.call_result.output = (&hex!("0a0b0c") as &[u8]).into();
            host.call_result.created_address = Some({
                let mut a = Address::zero();
                a.0[10] = 0xcc;
                a
            });
            host.call_result.gas_left = 200_000;
        })
        .gas(300_000)
        .code(hex!("602060006001f0600155"))
        .status(Status::Stopped)
        .inspect_host(move |host, _| {
            use lfvm::Host as _;
            assert_eq!(host.recorded_calls.len(), 1);
            assert_eq!(host.recorded_calls.last().unwrap().input_data.len(), 0x20);
            let stored = host.get_storage(address, H256::from_low_u64_be(1));
            assert_eq!(<[u8; 32]>::from(stored)[10], 0xcc);
        })
        .check()
}

/// `CREATE`'s gas-stipend-insufficient-balance case never touches the host
/// and leaves 0 on the stack.
#[test]
fn create_fails_when_endowment_exceeds_balance() {
    EvmTester::new()
        .code(
            Bytecode::new()
                .pushv(0) // init code size
                .pushv(0) // init code offset
                .pushv(1) // endowment
                .opcode(OpCode::CREATE)
                .ret_top(),
        )
        .status(Status::Returned)
        .output_value(0)
        .inspect_host(|host, _| assert!(host.recorded_calls.is_empty()))
        .check()
}

#[test]
fn create2_forwards_salt_and_pushes_created_address() {
    let created = {
        let mut a = Address::zero();
        a.0[19] = 0x42;
        a
    };

    EvmTester::new()
        .apply_host_fn(move |host, _| {
            host.call_result.created_address = Some(created);
            host.call_result.gas_left = 100_000;
        })
        .gas(200_000)
        .code(Bytecode::new().pushv(0x2a).pushv(0).pushv(0).pushv(0).opcode(OpCode::CREATE2).ret_top())
        .status(Status::Returned)
        .output_value(U256::from_big_endian(&created.0))
        .inspect_host(|host, _| {
            assert_eq!(host.recorded_calls.last().unwrap().kind, CallKind::Create2 { salt: H256::from_low_u64_be(0x2a) });
        })
        .check()
}

/// EIP-3860: an oversized `init_code` is rejected post-Shanghai without a
/// sub-call.
#[test]
fn create_rejects_oversized_init_code_post_shanghai() {
    EvmTester::new()
        .revision(Revision::Shanghai)
        .code(
            Bytecode::new()
                .pushv(2 * 24576 + 1) // init code size, one past EIP-3860's limit
                .pushv(0)
                .pushv(0)
                .opcode(OpCode::CREATE),
        )
        .status(Status::MaxInitCodeSizeExceeded)
        .check()
}

/// A zero-value CALL to a nonexistent account does not charge the
/// new-account surcharge.
#[test]
fn call_value_zero_to_nonexistent_account_is_cheap() {
    EvmTester::new()
        .code(Bytecode::new().append_bc(CallInstruction::call(0xff).gas(100_000)))
        .status(Status::Stopped)
        .inspect_host(|host, _| assert_eq!(host.recorded_calls.len(), 1))
        .check()
}

/// A value-bearing CALL to a nonexistent account pays the new-account cost,
/// on top of the flat value-transfer cost.
#[test]
fn call_with_value_to_new_account_charges_new_account_cost() {
    EvmTester::new()
        .apply_host_fn(|host, params| host.set_balance(params.recipient, 1_000_000))
        .code(Bytecode::new().append_bc(CallInstruction::call(0xff).gas(100_000).value(1)))
        .gas(200_000)
        .status(Status::Stopped)
        .check()
}

/// STATICCALL can never carry a value argument, so its callee never
/// observes one above zero even if the caller tries.
#[test]
fn staticcall_forwards_input() {
    EvmTester::new()
        .code(Bytecode::new().append_bc(CallInstruction::staticcall(0xff).gas(50_000).input(0, 4)))
        .status(Status::Stopped)
        .inspect_host(|host, _| {
            let call = host.recorded_calls.last().unwrap();
            assert_eq!(call.kind, CallKind::StaticCall);
            assert!(call.is_static);
            assert_eq!(call.input_data.len(), 4);
        })
        .check()
}

/// A write attempted from inside a STATICCALL-entered frame (`is_static`)
/// is rejected by the write-protection check, not by the callee itself —
/// this exercises the caller side: a CALL carrying value from a static
/// frame is rejected before the host ever sees it.
#[test]
fn call_with_value_from_static_frame_is_write_protected() {
    EvmTester::new()
        .set_static(true)
        .code(Bytecode::new().append_bc(CallInstruction::call(0xff).gas(1).value(1)))
        .status(Status::Error(lfvm::ErrorKind::WriteProtection))
        .check()
}

/// Every sub-call forwards at most 63/64ths of the gas left after static
/// charges, per EIP-150.
#[test]
fn call_forwards_at_most_63_64_of_remaining_gas() {
    EvmTester::new()
        .apply_host_fn(|host, params| host.set_balance(params.recipient, 1_000_000))
        .gas(1_000_000)
        .code(Bytecode::new().append_bc(CallInstruction::call(0xff).gas(1_000_000)))
        .status(Status::Stopped)
        .inspect_host(|host, _| {
            let call = host.recorded_calls.last().unwrap();
            assert!(call.gas < 1_000_000);
        })
        .check()
}

/// `RETURNDATASIZE`/`RETURNDATACOPY` observe the previous sub-call's
/// output, and start at 0 before any call has executed.
#[test]
fn returndatasize_reflects_the_last_calls_output() {
    EvmTester::new()
        .apply_host_fn(|host, _| host.call_result.output = (&hex!("01020304") as &[u8]).into())
        .code(
            Bytecode::new()
                .append_bc(CallInstruction::call(0xff).gas(50_000))
                .opcode(OpCode::POP)
                .opcode(OpCode::RETURNDATASIZE)
                .ret_top(),
        )
        .status(Status::Returned)
        .output_value(4)
        .check()
}

#[test]
fn returndatasize_before_any_call_is_zero() {
    EvmTester::new()
        .code(Bytecode::new().opcode(OpCode::RETURNDATASIZE).ret_top())
        .status(Status::Returned)
        .output_value(0)
        .check()
}

#[test]
fn returndatacopy_copies_the_requested_slice() {
    EvmTester::new()
        .apply_host_fn(|host, _| host.call_result.output = (&hex!("deadbeef") as &[u8]).into())
        .code(
            Bytecode::new()
                .append_bc(CallInstruction::call(0xff).gas(50_000))
                .opcode(OpCode::POP)
                .pushv(4) // size
                .pushv(0) // offset into return data
                .pushv(0) // dest memory offset
                .opcode(OpCode::RETURNDATACOPY)
                .ret(0, 4),
        )
        .status(Status::Returned)
        .output_data(hex!("deadbeef"))
        .check()
}

/// Reading past the end of the last call's return data is a dedicated
/// error, not a zero-fill.
#[test]
fn returndatacopy_out_of_range_is_rejected() {
    EvmTester::new()
        .apply_host_fn(|host, _| host.call_result.output = (&hex!("deadbeef") as &[u8]).into())
        .code(
            Bytecode::new()
                .append_bc(CallInstruction::call(0xff).gas(50_000))
                .opcode(OpCode::POP)
                .pushv(1) // size
                .pushv(4) // offset into return data — one past the end
                .pushv(0) // dest memory offset
                .opcode(OpCode::RETURNDATACOPY),
        )
        .status(Status::Error(lfvm::ErrorKind::ReturnDataOutOfBounds))
        .check()
}

/// A reverted sub-call still reports failure (0 on the stack) but its
/// output is still readable through RETURNDATACOPY.
#[test]
fn reverted_call_pushes_zero_but_keeps_return_data() {
    EvmTester::new()
        .apply_host_fn(|host, _| {
            host.call_result.output = (&hex!("ba5eba11") as &[u8]).into();
            host.call_result.reverted = true;
        })
        .code(Bytecode::new().append_bc(CallInstruction::call(0xff).gas(50_000)).ret_top())
        .status(Status::Returned)
        .output_value(0)
        .check()
}
