//! The dispatch loop.
//!
//! A plain synchronous loop: handlers call `Host` methods directly and run
//! to completion without suspending, so there is no coroutine or async
//! boundary between a dispatched instruction and the host it talks to.

use bytes::Bytes;

use crate::common::{CallParams, ErrorKind, Status};
use crate::gas::{gas_costs, PROPERTIES};
use crate::host::Host;
use crate::instruction::Code;
use crate::instructions;
use crate::memory::Memory;
use crate::opcode::{OpCode, NUM_EXECUTABLE_OPCODES};
use crate::pcmap::PcMap;
use crate::stack::Stack;
use crate::word::Word;

/// All state scoped to a single invocation.
pub struct ExecutionContext<'a> {
    pub pc: usize,
    pub gas_left: i64,
    pub gas_refund: i64,
    pub stack: Stack,
    pub memory: Memory,
    pub status: Status,
    pub return_data: Bytes,
    pub output_data: Bytes,
    pub params: CallParams,
    pub code: &'a Code,
    pub pc_map: &'a PcMap,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(params: CallParams, code: &'a Code, pc_map: &'a PcMap) -> Self {
        let gas_left = params.gas;
        Self {
            pc: 0,
            gas_left,
            gas_refund: 0,
            stack: Stack::new(),
            memory: Memory::new(),
            status: Status::Running,
            return_data: Bytes::new(),
            output_data: Bytes::new(),
            params,
            code,
            pc_map,
        }
    }

    /// Charge `amount` against the gas meter, transitioning to
    /// `OUT_OF_GAS` on underflow. Returns whether the charge succeeded.
    #[must_use]
    pub fn consume_gas(&mut self, amount: u64) -> bool {
        match self.gas_left.checked_sub(amount as i64) {
            Some(left) if left >= 0 => {
                self.gas_left = left;
                true
            }
            _ => {
                self.gas_left = 0;
                self.status = Status::OutOfGas;
                false
            }
        }
    }

    fn fail(&mut self, kind: ErrorKind) {
        self.status = Status::Error(kind);
    }

    fn is_write_op(op: OpCode) -> bool {
        op == OpCode::SSTORE
            || op.is_log()
            || op == OpCode::CREATE
            || op == OpCode::CREATE2
            || op == OpCode::SELFDESTRUCT
            || op == OpCode::TSTORE
    }
}

/// Run the translated `code` against `host` until a terminal status is
/// reached, reporting each dispatched instruction and the final status to
/// `tracer`. Returns the context itself so the caller can read back
/// `gas_left`, `gas_refund`, and `output_data` alongside the final status.
pub fn run<'a, H: Host>(mut ctx: ExecutionContext<'a>, host: &mut H, tracer: &mut dyn crate::trace::Tracer) -> ExecutionContext<'a> {
    loop {
        if !ctx.status.is_running() {
            break;
        }

        // Step 1: end of translated stream.
        if ctx.pc >= ctx.code.len() {
            ctx.status = Status::Stopped;
            break;
        }

        // Step 2: decode.
        let mut instr = ctx.code[ctx.pc];
        let mut op = instr.op();

        // Step 3: pseudo-jump indirection.
        if op == OpCode::JUMP_TO {
            ctx.pc = instr.arg as usize;
            instr = ctx.code[ctx.pc];
            op = instr.op();
        }

        tracer.step(ctx.pc, op, ctx.gas_left);

        // Step 4: dispatch-tag range check. `DATA` sits below
        // `NUM_EXECUTABLE_OPCODES` but is never directly executable; it is
        // only ever reached by falling off the end of a PUSH decode path,
        // which this loop never does, so an arrival here means a
        // corrupted or adversarial translation.
        if op == OpCode::DATA {
            ctx.status = Status::SegmentationFault;
            break;
        }
        if op.to_u16() >= NUM_EXECUTABLE_OPCODES {
            ctx.fail(ErrorKind::InvalidCode);
            break;
        }

        // Step 6: readonly enforcement.
        if ctx.params.is_static {
            let is_value_call = op == OpCode::CALL && {
                // CALL's value argument is the third stack item (after gas,
                // address); peeking does not consume it.
                ctx.stack.back(2).map(|v| !v.is_zero()).unwrap_or(false)
            };
            if ExecutionContext::is_write_op(op) || is_value_call {
                ctx.fail(ErrorKind::WriteProtection);
                break;
            }
        }

        // CALL is bounds-checked before static gas; every other opcode
        // checks stack bounds then charges gas.
        if op == OpCode::NOOP {
            // Padding left behind by the super-instruction fusion pass: the
            // cost of what used to live here was already folded into the
            // super-instruction's static gas.
        } else if op.is_super_instruction() {
            // Super-instructions carry no PROPERTIES entry; stack safety
            // was proven at translation time by construction of the
            // fused pattern, so only gas is charged here.
            if !charge_static_gas(&mut ctx, op) {
                break;
            }
        } else {
            if let Err(kind) = check_stack_bounds(&ctx.stack, op) {
                ctx.fail(kind);
                break;
            }
            if !charge_static_gas(&mut ctx, op) {
                break;
            }
        }

        // Step 9: dispatch. `dispatch` returns whether it already
        // repositioned `pc` itself (taken `JUMP`/`JUMPI` and the
        // jump-shaped super-instructions) — step 10 only advances past the
        // head in the common case.
        let jumped = match instructions::dispatch(&mut ctx, host, instr) {
            Ok(jumped) => jumped,
            Err(kind) => {
                ctx.fail(kind);
                break;
            }
        };
        if ctx.params.config.enable_statistics {
            crate::stats::GLOBAL_STATS.record(op, jumped);
        }
        if !ctx.status.is_running() {
            break;
        }

        // Step 10.
        if !jumped {
            ctx.pc += 1;
        }
    }

    tracer.end(ctx.status, ctx.gas_left);
    ctx
}

fn check_stack_bounds(stack: &Stack, op: OpCode) -> Result<(), ErrorKind> {
    if op.to_u16() >= 256 {
        return Ok(());
    }
    if let Some(props) = PROPERTIES[op.to_usize()] {
        if stack.len() < props.stack_height_required as usize {
            return Err(ErrorKind::StackUnderflow);
        }
        let after = stack.len() as i64 + props.stack_height_change as i64;
        if after > Stack::limit() as i64 {
            return Err(ErrorKind::StackOverflow);
        }
    }
    Ok(())
}

fn charge_static_gas(ctx: &mut ExecutionContext<'_>, op: OpCode) -> bool {
    let table = gas_costs(ctx.params.revision);
    let cost = if op.is_super_instruction() {
        crate::translator::super_instruction_static_gas(op, table)
    } else {
        table[op.to_usize()].unwrap_or(0) as u64
    };
    ctx.consume_gas(cost)
}

/// `JUMP`/`JUMPI` destination validation. `dest` is the
/// original-bytecode offset popped from the stack.
pub fn validate_jump_dest(code: &Code, pc_map: &crate::pcmap::PcMap, dest: Word) -> Result<usize, ErrorKind> {
    if crate::word::bit_length(dest) > 33 {
        return Err(ErrorKind::InvalidJump);
    }
    let dest = dest.as_u64();
    if dest > u16::MAX as u64 {
        return Err(ErrorKind::InvalidJump);
    }
    let trans = pc_map
        .orig_to_trans(dest as u16)
        .ok_or(ErrorKind::InvalidJump)?;
    let trans = trans as usize;
    if trans >= code.len() || code[trans].op() != OpCode::JUMPDEST {
        return Err(ErrorKind::InvalidJump);
    }
    Ok(trans)
}
