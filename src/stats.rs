//! Lock-free, process-wide execution counters, accumulated only when
//! [`crate::config::InvocationConfig::enable_statistics`] is set.
//!
//! Mirrors [`crate::translator::GLOBAL_TRANSLATION_CACHE`] and
//! [`crate::hash_cache::GLOBAL_KECCAK_CACHE`]: a lazily-initialized
//! process-global rather than a value threaded through every call site,
//! since [`crate::execute`]'s public signature only takes `CallParams` and
//! `&mut Host`.

use std::sync::atomic::{AtomicU64, Ordering};

use once_cell::sync::Lazy;

use crate::opcode::OpCode;

/// Per-opcode dispatch counters plus a couple of cross-cutting tallies.
/// Every field is incremented with `Ordering::Relaxed`: these are
/// best-effort counts for observability, never load-bearing for
/// correctness, so there is nothing for a stricter ordering to protect.
pub struct Stats {
    opcode_counts: [AtomicU64; 256],
    super_instructions_dispatched: AtomicU64,
    jumps_taken: AtomicU64,
}

/// A point-in-time copy of [`Stats`], safe to read without further
/// synchronization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub opcode_counts: Box<[u64; 256]>,
    pub super_instructions_dispatched: u64,
    pub jumps_taken: u64,
}

impl Stats {
    fn new() -> Self {
        Self {
            opcode_counts: std::array::from_fn(|_| AtomicU64::new(0)),
            super_instructions_dispatched: AtomicU64::new(0),
            jumps_taken: AtomicU64::new(0),
        }
    }

    /// Record the dispatch of `op`. Base opcodes (below 256) tally into
    /// `opcode_counts`; super-instructions and `JUMP`/`JUMPI`/fused-jump
    /// takes also bump their own cross-cutting counter. `DATA`/`NOOP`/
    /// `JUMP_TO` pseudo-ops are not dispatched opcodes and are not counted.
    pub(crate) fn record(&self, op: OpCode, jumped: bool) {
        if op.to_u16() < 256 {
            self.opcode_counts[op.to_usize()].fetch_add(1, Ordering::Relaxed);
        } else if op.is_super_instruction() {
            self.super_instructions_dispatched.fetch_add(1, Ordering::Relaxed);
        }
        if jumped {
            self.jumps_taken.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let mut opcode_counts = Box::new([0u64; 256]);
        for (slot, counter) in opcode_counts.iter_mut().zip(self.opcode_counts.iter()) {
            *slot = counter.load(Ordering::Relaxed);
        }
        StatsSnapshot {
            opcode_counts,
            super_instructions_dispatched: self.super_instructions_dispatched.load(Ordering::Relaxed),
            jumps_taken: self.jumps_taken.load(Ordering::Relaxed),
        }
    }
}

pub static GLOBAL_STATS: Lazy<Stats> = Lazy::new(Stats::new);
