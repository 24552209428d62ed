//! A translating interpreter for EVM bytecode: raw bytecode is compiled
//! once into a fixed-width internal instruction stream (optionally fusing
//! common opcode sequences into super-instructions), then dispatched by a
//! synchronous loop that calls straight into a [`Host`] implementation.

pub use common::{CallKind, CallParams, ErrorKind, InvocationResult, Revision, Status};
pub use config::InvocationConfig;
pub use host::{AccessStatus, CallOutcome, Host, StorageStatus, TxContext};
pub use opcode::OpCode;

/// EIP-170: maximum size of deployed contract code.
pub const MAX_CODE_SIZE: usize = 0x6000;

pub mod common;
pub mod config;
pub mod error;
pub mod gas;
pub mod hash_cache;
pub mod host;
pub mod instruction;
#[doc(hidden)]
pub mod instructions;
pub mod interpreter;
pub mod memory;
pub mod opcode;
pub mod pcmap;
pub mod stack;
pub mod stats;
pub mod trace;
pub mod translator;
#[cfg(any(test, feature = "util"))]
pub mod util;
pub mod word;

use translator::{TranslateOptions, GLOBAL_TRANSLATION_CACHE};

/// Translate (or fetch the cached translation of) `params.code`, run it
/// to completion against `host`, and report the outcome.
///
/// Translation goes through the process-wide cache when
/// `params.config.enable_code_cache` is set; an ephemeral "create call"
/// (`code_identity: None`) is always translated fresh and never cached,
/// matching [`translator::TranslationCache::get_or_translate`]'s own rule.
///
/// Oversized code is rejected up front (see [`translator::validate`]) and
/// reported as `Status::Error(ErrorKind::InvalidCode)` rather than ever
/// panicking or escaping as a Rust `Result`.
#[tracing::instrument(level = "debug", skip(params, host), fields(gas = params.gas, depth = params.depth))]
pub fn execute<H: Host>(params: CallParams, host: &mut H) -> InvocationResult {
    if let Err(err) = translator::validate(&params.code) {
        tracing::debug!(%err, "rejecting oversized code before translation");
        return InvocationResult {
            success: false,
            output_data: bytes::Bytes::new(),
            gas_left: params.gas,
            gas_refund: 0,
        };
    }

    let translated = if params.config.enable_code_cache {
        GLOBAL_TRANSLATION_CACHE.get_or_translate(
            params.code_identity,
            &params.code,
            params.config.enable_super_instructions,
        )
    } else {
        std::sync::Arc::new(translator::translate_with(
            &params.code,
            TranslateOptions { enable_super_instructions: params.config.enable_super_instructions, build_pc_map: false },
        ))
    };

    let ctx = interpreter::ExecutionContext::new(params, &translated.code, &translated.pc_map);
    let enable_logging = ctx.params.config.enable_logging;
    let ctx = if enable_logging {
        interpreter::run(ctx, host, &mut trace::LoggingTracer)
    } else {
        interpreter::run(ctx, host, &mut trace::NoopTracer)
    };

    let success = matches!(ctx.status, Status::Stopped | Status::Returned);
    let output_data = match ctx.status {
        Status::Returned | Status::Reverted => ctx.output_data,
        _ => bytes::Bytes::new(),
    };

    InvocationResult {
        success,
        output_data,
        gas_left: ctx.gas_left,
        gas_refund: if success { ctx.gas_refund } else { 0 },
    }
}
