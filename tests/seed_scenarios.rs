//! End-to-end coverage for seven small scenarios: empty code, a
//! three-instruction add, multi-byte `PUSH` decoding, jump-destination
//! alignment, an out-of-gas push, static-call write protection, and a
//! small iterative contract call.

use ethereum_types::{Address, U256};
use hex_literal::hex;
use lfvm::util::{Bytecode, CallInstruction, EvmTester};
use lfvm::{CallKind, CallParams, ErrorKind, InvocationConfig, OpCode, Revision, Status};

fn params(code: &[u8], gas: i64) -> CallParams {
    CallParams {
        kind: CallKind::Call,
        is_static: false,
        depth: 0,
        gas,
        recipient: Address::zero(),
        sender: Address::zero(),
        input_data: bytes::Bytes::new(),
        value: U256::zero(),
        code_identity: None,
        code: bytes::Bytes::copy_from_slice(code),
        revision: Revision::Cancun,
        config: InvocationConfig::default(),
    }
}

#[test]
fn empty_code_stops_with_all_gas_left_and_no_output() {
    let mut host = lfvm::host::DummyHost;
    let result = lfvm::execute(params(&[], 100), &mut host);
    assert!(result.success);
    assert_eq!(result.gas_left, 100);
    assert!(result.output_data.is_empty());
}

/// `PUSH1 0x03, PUSH1 0x04, ADD` with gas 100 leaves 7 on the stack,
/// 91 gas left (100 − 3×3), and a `Stopped` status from simply falling off
/// the end of the translated stream.
#[test]
fn simple_add_leaves_seven_on_the_stack_and_ninety_one_gas() {
    let code = hex!("6003600401");
    let translated = lfvm::translator::translate(&code, false);
    let ctx = lfvm::interpreter::ExecutionContext::new(params(&code, 100), &translated.code, &translated.pc_map);
    let mut host = lfvm::host::DummyHost;
    let ctx = lfvm::interpreter::run(ctx, &mut host, &mut lfvm::trace::NoopTracer);

    assert_eq!(ctx.status, Status::Stopped);
    assert_eq!(ctx.gas_left, 91);
    assert_eq!(*ctx.stack.back(0).unwrap(), U256::from(7));
}

#[test]
fn push3_decodes_into_a_head_and_a_data_slot_and_pushes_the_right_value() {
    let bytecode = hex!("62baadc0");
    let translated = lfvm::translator::translate(&bytecode, false);
    assert_eq!(translated.code.len(), 2);
    assert_eq!(translated.code[0].op(), OpCode::PUSH3);
    assert_eq!(translated.code[0].arg, 0xbaad);
    assert_eq!(translated.code[1].op(), OpCode::DATA);
    assert_eq!(translated.code[1].arg, 0xc000);

    // PUSH3 0xbaadc0, PUSH1 0x00, MSTORE, PUSH1 0x20, PUSH1 0x00, RETURN
    let code = [0x62u8, 0xba, 0xad, 0xc0, 0x60, 0x00, 0x52, 0x60, 0x20, 0x60, 0x00, 0xf3];
    let mut host = lfvm::host::DummyHost;
    let result = lfvm::execute(params(&code, 1_000), &mut host);
    assert!(result.success);
    assert_eq!(U256::from_big_endian(&result.output_data), U256::from(0xbaadc0u64));
}

/// `PUSH3 0x00 0x00 0x06, JUMP, INVALID, JUMPDEST`: `JUMPDEST` is
/// NOOP-padded and bridged with a `JUMP_TO` so it always lands at the same
/// index in the translated stream as its original byte offset, even
/// though the preceding `PUSH3` packs two immediate bytes per slot. So the
/// translated stream is 7 slots long, matching the 7-byte input, and
/// `orig_to_trans(6)` is `Some(6)`; jumping there stops execution cleanly
/// instead of falling through into `INVALID`.
#[test]
fn jump_lands_exactly_on_the_jumpdest_slot() {
    let bytecode: [u8; 7] = [0x62, 0x00, 0x00, 0x06, 0x56, 0xfe, 0x5b];
    let translated = lfvm::translator::translate(&bytecode, false);

    assert_eq!(translated.code.len(), 7);
    assert_eq!(translated.pc_map.orig_to_trans(6), Some(6));
    assert_eq!(translated.code[6].op(), OpCode::JUMPDEST);

    let mut host = lfvm::host::DummyHost;
    let result = lfvm::execute(params(&bytecode, 1_000), &mut host);
    assert!(result.success);
    assert!(result.output_data.is_empty());
}

#[test]
fn out_of_gas_on_the_second_push() {
    let code = [0x60u8, 0x01, 0x60, 0x02, 0x01];
    let mut host = lfvm::host::DummyHost;
    let result = lfvm::execute(params(&code, 5), &mut host);
    assert!(!result.success);
    assert_eq!(result.gas_left, 0);
}

#[test]
fn static_call_rejects_sstore_but_allows_a_valueless_call() {
    // SSTORE under a static frame is rejected outright.
    EvmTester::new()
        .set_static(true)
        .code(Bytecode::new().pushv(1).pushv(0).opcode(OpCode::SSTORE))
        .status(Status::Error(ErrorKind::WriteProtection))
        .check();

    // A CALL carrying zero value from a static frame proceeds to the host.
    EvmTester::new()
        .set_static(true)
        .code(Bytecode::new().append_bc(CallInstruction::call(0xff).gas(1)))
        .status(Status::Stopped)
        .inspect_host(|host, _| assert_eq!(host.recorded_calls.len(), 1))
        .check();

    // The same CALL carrying a nonzero value is write-protected before the
    // host is ever invoked.
    EvmTester::new()
        .set_static(true)
        .code(Bytecode::new().append_bc(CallInstruction::call(0xff).gas(1).value(1)))
        .status(Status::Error(ErrorKind::WriteProtection))
        .inspect_host(|host, _| assert!(host.recorded_calls.is_empty()))
        .check();
}

/// An iterative Fibonacci contract, called with the 32-byte big-endian
/// argument 10, returns the 32-byte big-endian encoding of 89.
#[test]
fn fibonacci_of_ten_returns_eighty_nine() {
    let code: [u8; 67] = [
        0x60, 0x00, 0x60, 0x00, 0x52, // mem[0x00] = 0            (a = 0)
        0x60, 0x01, 0x60, 0x20, 0x52, // mem[0x20] = 1            (b = 1)
        0x60, 0x00, 0x60, 0x40, 0x52, // mem[0x40] = 0            (i = 0)
        0x60, 0x00, 0x35, 0x60, 0x60, 0x52, // mem[0x60] = calldataload(0) (n)
        0x5b, // JUMPDEST (loop head, original offset 21)
        0x60, 0x60, 0x51, // push n
        0x60, 0x40, 0x51, // push i
        0x10, // LT -> i < n
        0x15, // ISZERO
        0x60, 0x3d, 0x57, // PUSH1 <end offset = 61>, JUMPI
        0x60, 0x00, 0x51, // push a
        0x60, 0x20, 0x51, // push b
        0x01, // a + b -> tmp
        0x60, 0x20, 0x51, // push b
        0x60, 0x00, 0x52, // mem[0x00] = b              (a = b)
        0x60, 0x20, 0x52, // mem[0x20] = tmp            (b = tmp)
        0x60, 0x40, 0x51, // push i
        0x60, 0x01, 0x01, // i + 1
        0x60, 0x40, 0x52, // mem[0x40] = i + 1
        0x60, 0x15, 0x56, // PUSH1 <loop offset = 21>, JUMP
        0x5b, // JUMPDEST (end, original offset 61)
        0x60, 0x20, 0x60, 0x20, 0xf3, // RETURN(mem[0x20], 32)
    ];

    let mut input_data = [0u8; 32];
    U256::from(10u64).to_big_endian(&mut input_data);

    let mut call_params = params(&code, 1_000_000);
    call_params.input_data = bytes::Bytes::copy_from_slice(&input_data);

    let mut host = lfvm::host::DummyHost;
    let result = lfvm::execute(call_params, &mut host);

    assert!(result.success);
    assert_eq!(result.output_data.len(), 32);
    assert_eq!(U256::from_big_endian(&result.output_data), U256::from(89));
}
