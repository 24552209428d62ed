//! Per-opcode handlers and the central dispatch table.
//!
//! `dispatch` is a direct call into whichever handler module owns the
//! opcode; every handler runs to completion synchronously, so there is no
//! intermediate yield/resume layer between opcodes.

pub(crate) mod arithmetic;
pub(crate) mod bitwise;
pub(crate) mod boolean;
pub(crate) mod call;
pub(crate) mod control;
pub(crate) mod external;
pub(crate) mod log;
pub(crate) mod memory;
pub(crate) mod stack_manip;
pub(crate) mod storage;
pub(crate) mod sudo;
pub(crate) mod super_instructions;

use crate::common::{ErrorKind, Revision, Status};
use crate::host::Host;
use crate::instruction::Instruction;
use crate::interpreter::ExecutionContext;
use crate::opcode::OpCode;

/// The revision an opcode was introduced in, for opcodes whose byte value
/// was unassigned (and so undefined) before a given upgrade. `None` means
/// the opcode (if valid at all) has been available since Istanbul.
fn introduced_in(op: OpCode) -> Option<Revision> {
    match op {
        OpCode::BASEFEE => Some(Revision::London),
        OpCode::PUSH0 => Some(Revision::Shanghai),
        OpCode::TLOAD | OpCode::TSTORE | OpCode::MCOPY => Some(Revision::Cancun),
        OpCode::BLOBHASH | OpCode::BLOBBASEFEE => Some(Revision::Cancun),
        _ => None,
    }
}

/// Dispatch one decoded instruction. Returns whether `pc` was already
/// repositioned by the handler — a taken `JUMP`/`JUMPI` or one of the
/// jump-shaped super-instructions — in which case the caller's step 10
/// must not also advance it.
pub fn dispatch<H: Host>(
    ctx: &mut ExecutionContext<'_>,
    host: &mut H,
    instr: Instruction,
) -> Result<bool, ErrorKind> {
    let op = instr.op();

    if let Some(min) = introduced_in(op) {
        if ctx.params.revision < min {
            ctx.status = Status::InvalidInstruction;
            return Ok(false);
        }
    }

    if op == OpCode::PUSH0 {
        stack_manip::push0(ctx)?;
        return Ok(false);
    }
    if op.is_push() {
        stack_manip::push(ctx, instr, op)?;
        return Ok(false);
    }
    if op.is_dup() {
        stack_manip::dup(ctx, op)?;
        return Ok(false);
    }
    if op.is_swap() {
        stack_manip::swap(ctx, op)?;
        return Ok(false);
    }
    if op.is_log() {
        match op.log_topics() {
            0 => log::log0(ctx, host)?,
            1 => log::log1(ctx, host)?,
            2 => log::log2(ctx, host)?,
            3 => log::log3(ctx, host)?,
            _ => log::log4(ctx, host)?,
        }
        return Ok(false);
    }

    match op {
        OpCode::STOP => control::stop(ctx)?,
        OpCode::ADD => arithmetic::add(ctx)?,
        OpCode::MUL => arithmetic::mul(ctx)?,
        OpCode::SUB => arithmetic::sub(ctx)?,
        OpCode::DIV => arithmetic::div(ctx)?,
        OpCode::SDIV => arithmetic::sdiv(ctx)?,
        OpCode::MOD => arithmetic::modulo(ctx)?,
        OpCode::SMOD => arithmetic::smod(ctx)?,
        OpCode::ADDMOD => arithmetic::addmod(ctx)?,
        OpCode::MULMOD => arithmetic::mulmod(ctx)?,
        OpCode::EXP => arithmetic::exp(ctx)?,
        OpCode::SIGNEXTEND => arithmetic::signextend(ctx)?,

        OpCode::LT => boolean::lt(ctx)?,
        OpCode::GT => boolean::gt(ctx)?,
        OpCode::SLT => boolean::slt(ctx)?,
        OpCode::SGT => boolean::sgt(ctx)?,
        OpCode::EQ => boolean::eq(ctx)?,
        OpCode::ISZERO => boolean::iszero(ctx)?,
        OpCode::AND => boolean::and(ctx)?,
        OpCode::OR => boolean::or(ctx)?,
        OpCode::XOR => boolean::xor(ctx)?,
        OpCode::NOT => boolean::not(ctx)?,
        OpCode::BYTE => bitwise::byte(ctx)?,
        OpCode::SHL => bitwise::shl(ctx)?,
        OpCode::SHR => bitwise::shr(ctx)?,
        OpCode::SAR => bitwise::sar(ctx)?,

        OpCode::KECCAK256 => memory::keccak256(ctx)?,

        OpCode::ADDRESS => external::address(ctx)?,
        OpCode::BALANCE => external::balance(ctx, host)?,
        OpCode::ORIGIN => external::origin(ctx, host)?,
        OpCode::CALLER => external::caller(ctx)?,
        OpCode::CALLVALUE => external::callvalue(ctx)?,
        OpCode::CALLDATALOAD => control::calldataload(ctx)?,
        OpCode::CALLDATASIZE => control::calldatasize(ctx)?,
        OpCode::CALLDATACOPY => memory::calldatacopy(ctx)?,
        OpCode::CODESIZE => memory::codesize(ctx)?,
        OpCode::CODECOPY => memory::codecopy(ctx)?,
        OpCode::GASPRICE => external::gasprice(ctx, host)?,
        OpCode::EXTCODESIZE => external::extcodesize(ctx, host)?,
        OpCode::EXTCODECOPY => external::extcodecopy(ctx, host)?,
        OpCode::RETURNDATASIZE => memory::returndatasize(ctx)?,
        OpCode::RETURNDATACOPY => memory::returndatacopy(ctx)?,
        OpCode::EXTCODEHASH => external::extcodehash(ctx, host)?,

        OpCode::BLOCKHASH => external::blockhash(ctx, host)?,
        OpCode::COINBASE => external::coinbase(ctx, host)?,
        OpCode::TIMESTAMP => external::timestamp(ctx, host)?,
        OpCode::NUMBER => external::number(ctx, host)?,
        OpCode::DIFFICULTY => external::difficulty(ctx, host)?,
        OpCode::GASLIMIT => external::gaslimit(ctx, host)?,
        OpCode::CHAINID => external::chainid(ctx, host)?,
        OpCode::SELFBALANCE => external::selfbalance(ctx, host)?,
        OpCode::BASEFEE => external::basefee(ctx, host)?,
        OpCode::BLOBHASH => external::blobhash(ctx, host)?,
        OpCode::BLOBBASEFEE => external::blobbasefee(ctx, host)?,

        OpCode::POP => stack_manip::pop(ctx)?,
        OpCode::MLOAD => memory::mload(ctx)?,
        OpCode::MSTORE => memory::mstore(ctx)?,
        OpCode::MSTORE8 => memory::mstore8(ctx)?,
        OpCode::SLOAD => storage::sload(ctx, host)?,
        OpCode::SSTORE => storage::sstore(ctx, host)?,
        OpCode::JUMP => return control::jump(ctx),
        OpCode::JUMPI => return control::jumpi(ctx),
        OpCode::PC => control::pc(ctx)?,
        OpCode::MSIZE => memory::msize(ctx)?,
        OpCode::GAS => control::gas(ctx)?,
        OpCode::JUMPDEST => control::jumpdest(ctx)?,
        OpCode::TLOAD => storage::tload(ctx, host)?,
        OpCode::TSTORE => storage::tstore(ctx, host)?,
        OpCode::MCOPY => memory::mcopy(ctx)?,

        OpCode::CREATE => call::create(ctx, host)?,
        OpCode::CALL => call::call(ctx, host)?,
        OpCode::CALLCODE => call::callcode(ctx, host)?,
        OpCode::RETURN => control::ret(ctx)?,
        OpCode::DELEGATECALL => call::delegatecall(ctx, host)?,
        OpCode::CREATE2 => call::create2(ctx, host)?,
        OpCode::STATICCALL => call::staticcall(ctx, host)?,
        OpCode::REVERT => control::revert(ctx)?,
        OpCode::INVALID => ctx.status = Status::InvalidInstruction,
        OpCode::SELFDESTRUCT => sudo::selfdestruct(ctx, host)?,

        OpCode::NOOP => {}

        OpCode::SUPER_PUSH1_PUSH4_DUP3 => super_instructions::push1_push4_dup3(ctx, instr)?,
        OpCode::SUPER_PUSH1_PUSH1_PUSH1_SHL_SUB => super_instructions::push1_push1_push1_shl_sub(ctx, instr)?,
        OpCode::SUPER_AND_SWAP1_POP_SWAP2_SWAP1 => super_instructions::and_swap1_pop_swap2_swap1(ctx)?,
        OpCode::SUPER_ISZERO_PUSH2_JUMPI => return super_instructions::iszero_push2_jumpi(ctx, instr),
        OpCode::SUPER_SWAP2_SWAP1_POP_JUMP => return super_instructions::swap2_swap1_pop_jump(ctx),
        OpCode::SUPER_SWAP1_POP_SWAP2_SWAP1 => super_instructions::swap1_pop_swap2_swap1(ctx)?,
        OpCode::SUPER_POP_SWAP2_SWAP1_POP => super_instructions::pop_swap2_swap1_pop(ctx)?,
        OpCode::SUPER_PUSH2_JUMP => return super_instructions::push2_jump(ctx, instr),
        OpCode::SUPER_PUSH2_JUMPI => return super_instructions::push2_jumpi(ctx, instr),
        OpCode::SUPER_PUSH1_PUSH1 => super_instructions::push1_push1(ctx, instr)?,
        OpCode::SUPER_PUSH1_ADD => super_instructions::push1_add(ctx, instr)?,
        OpCode::SUPER_PUSH1_SHL => super_instructions::push1_shl(ctx, instr)?,
        OpCode::SUPER_PUSH1_DUP1 => super_instructions::push1_dup1(ctx, instr)?,
        OpCode::SUPER_SWAP1_POP => super_instructions::swap1_pop(ctx)?,
        OpCode::SUPER_POP_JUMP => return super_instructions::pop_jump(ctx),
        OpCode::SUPER_POP_POP => super_instructions::pop_pop(ctx)?,
        OpCode::SUPER_SWAP2_SWAP1 => super_instructions::swap2_swap1(ctx)?,
        OpCode::SUPER_SWAP2_POP => super_instructions::swap2_pop(ctx)?,
        OpCode::SUPER_DUP2_MSTORE => super_instructions::dup2_mstore(ctx)?,
        OpCode::SUPER_DUP2_LT => super_instructions::dup2_lt(ctx)?,

        _ => return Err(ErrorKind::InvalidCode),
    }

    Ok(false)
}
