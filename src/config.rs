//! Per-invocation feature flags: enable super-instructions, the Keccak
//! cache, the code-translation cache, logging, and statistics.
//!
//! A plain `Copy` struct rather than a builder: every flag here is read
//! hot-path-adjacent (translation, hashing), so there is no benefit to
//! deferred construction.

/// Feature flags threaded through a single invocation. Cheap to copy;
/// stored by value on [`crate::common::CallParams`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvocationConfig {
    /// Fuse recognized opcode sequences into super-instructions at
    /// translation time.
    pub enable_super_instructions: bool,
    /// Use the process-wide Keccak cache for `KECCAK256`.
    pub enable_hash_cache: bool,
    /// Reuse translations from the process-wide translation cache instead
    /// of re-translating on every invocation.
    pub enable_code_cache: bool,
    /// Emit `tracing` spans/events for each dispatched instruction.
    pub enable_logging: bool,
    /// Accumulate per-opcode execution counters into
    /// [`crate::stats::GLOBAL_STATS`].
    pub enable_statistics: bool,
}

impl Default for InvocationConfig {
    fn default() -> Self {
        Self {
            enable_super_instructions: true,
            enable_hash_cache: true,
            enable_code_cache: true,
            enable_logging: false,
            enable_statistics: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_every_optimization() {
        let cfg = InvocationConfig::default();
        assert!(cfg.enable_super_instructions);
        assert!(cfg.enable_hash_cache);
        assert!(cfg.enable_code_cache);
        assert!(!cfg.enable_logging);
        assert!(!cfg.enable_statistics);
    }
}
