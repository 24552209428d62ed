//! Step tracing.
//!
//! `Tracer` is the seam the interpreter calls into once per dispatched
//! instruction and once when a call terminates; it carries no behavior by
//! default; `NoopTracer` costs nothing, `LoggingTracer` emits `tracing`
//! events for anyone running with `RUST_LOG` turned up.

use crate::common::Status;
use crate::opcode::OpCode;

pub trait Tracer {
    /// Called once per dispatched instruction, before gas is charged.
    fn step(&mut self, _pc: usize, _op: OpCode, _gas_left: i64) {}

    /// Called once when the dispatch loop reaches a terminal status.
    fn end(&mut self, _status: Status, _gas_left: i64) {}
}

/// Does nothing; the default tracer for `InvocationConfig::enable_logging == false`.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTracer;

impl Tracer for NoopTracer {}

/// Emits a `tracing` event per step and one on completion.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoggingTracer;

impl Tracer for LoggingTracer {
    fn step(&mut self, pc: usize, op: OpCode, gas_left: i64) {
        tracing::trace!(pc, op = %op, gas_left, "step");
    }

    fn end(&mut self, status: Status, gas_left: i64) {
        tracing::debug!(?status, gas_left, "execution finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingTracer {
        steps: u32,
        ended: bool,
    }

    impl Tracer for CountingTracer {
        fn step(&mut self, _pc: usize, _op: OpCode, _gas_left: i64) {
            self.steps += 1;
        }

        fn end(&mut self, _status: Status, _gas_left: i64) {
            self.ended = true;
        }
    }

    #[test]
    fn custom_tracer_observes_every_step() {
        let translated = crate::translator::translate(&[0x60, 0x03, 0x60, 0x04, 0x01], false);
        let params = crate::common::CallParams {
            kind: crate::common::CallKind::Call,
            is_static: false,
            depth: 0,
            gas: 1000,
            recipient: Default::default(),
            sender: Default::default(),
            input_data: bytes::Bytes::new(),
            value: Default::default(),
            code_identity: None,
            code: bytes::Bytes::new(),
            revision: crate::common::Revision::Cancun,
            config: Default::default(),
        };
        let ctx = crate::interpreter::ExecutionContext::new(params, &translated.code, &translated.pc_map);
        let mut host = crate::host::DummyHost;
        let mut tracer = CountingTracer::default();
        let ctx = crate::interpreter::run(ctx, &mut host, &mut tracer);
        assert_eq!(ctx.status, Status::Stopped);
        assert_eq!(tracer.steps, 3);
        assert!(tracer.ended);
    }
}
