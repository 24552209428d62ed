//! Bounded, sharded, concurrent Keccak-256 cache.
//!
//! `KECCAK256` is pure but not free: repeatedly hashing the same region of
//! a hot contract's code is wasted work. A single `Mutex<HashMap<..>>`
//! would serialize every hash across all concurrently executing
//! invocations, so the table is sharded, each shard a pair of
//! `lru::LruCache` tiers behind their own `parking_lot::Mutex`es, selected
//! by hashing the cache key.
//!
//! Each shard keeps two tiers: a small "active" LRU that every lookup and
//! insert hits first, and a larger "retained" LRU that an entry falls
//! into when the active tier evicts it instead of being dropped outright.
//! A hit in `retained` promotes the entry back into `active`. This gives
//! a working set that survives brief bursts of unrelated hashing without
//! paying the active tier's smaller capacity.

use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;

use ethereum_types::H256;
use lru::LruCache;
use parking_lot::Mutex;
use sha3::{Digest, Keccak256};

const SHARD_COUNT: usize = 16;

/// Identifies a hashed region: the code it came from plus the byte range,
/// so two different contracts hashing the same bytes don't collide and one
/// contract re-hashing an overlapping but distinct range doesn't either.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct RegionKey {
    pub code_identity: H256,
    pub offset: u32,
    pub len: u32,
}

struct Shard {
    active: Mutex<LruCache<RegionKey, H256>>,
    retained: Mutex<LruCache<RegionKey, H256>>,
}

impl Shard {
    fn new(active_capacity: NonZeroUsize, retained_capacity: NonZeroUsize) -> Self {
        Self {
            active: Mutex::new(LruCache::new(active_capacity)),
            retained: Mutex::new(LruCache::new(retained_capacity)),
        }
    }
}

/// Capacity target: ~2^16 entries active, ~2^18 retained, spread evenly
/// across shards.
pub struct KeccakCache {
    shards: Vec<Shard>,
}

impl KeccakCache {
    pub fn new() -> Self {
        Self::with_capacities(1 << 16, 1 << 18)
    }

    /// Build a cache with `active_capacity` as the hot tier and
    /// `retained_capacity` as the larger demotion tier.
    pub fn with_capacities(active_capacity: usize, retained_capacity: usize) -> Self {
        let per_shard = |total: usize| NonZeroUsize::new((total / SHARD_COUNT).max(1)).unwrap();
        let active_per_shard = per_shard(active_capacity);
        let retained_per_shard = per_shard(retained_capacity);
        Self {
            shards: (0..SHARD_COUNT).map(|_| Shard::new(active_per_shard, retained_per_shard)).collect(),
        }
    }

    /// Build a cache with only an active tier sized `total_capacity`; the
    /// retained tier is sized proportionally (the same 1:4 ratio as
    /// [`KeccakCache::new`]'s 2^16 / 2^18 defaults).
    pub fn with_capacity(total_capacity: usize) -> Self {
        Self::with_capacities(total_capacity, total_capacity * 4)
    }

    fn shard_for(&self, key: &RegionKey) -> &Shard {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        key.hash(&mut hasher);
        &self.shards[(hasher.finish() as usize) % self.shards.len()]
    }

    /// Return the Keccak-256 digest of `data`, computing and caching it on a
    /// miss. `key` must uniquely identify `data`'s contents.
    pub fn get_or_hash(&self, key: RegionKey, data: &[u8]) -> H256 {
        let shard = self.shard_for(&key);

        if let Some(hash) = shard.active.lock().get(&key).copied() {
            return hash;
        }

        if let Some(hash) = shard.retained.lock().pop(&key) {
            shard.active.lock().put(key, hash);
            return hash;
        }

        let digest = H256::from_slice(&Keccak256::digest(data));
        if let Some((evicted_key, evicted_hash)) = shard.active.lock().push(key, digest) {
            if evicted_key != key {
                shard.retained.lock().put(evicted_key, evicted_hash);
            }
        }
        digest
    }

    /// Entries held in the active tier only; the retained tier is not a
    /// user-visible "cached" count so much as a demotion buffer.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.active.lock().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for KeccakCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-global cache instance, mirroring
/// [`crate::translator::GLOBAL_TRANSLATION_CACHE`]: a lazily-initialized
/// static rather than a value threaded through every call site.
pub static GLOBAL_KECCAK_CACHE: once_cell::sync::Lazy<KeccakCache> = once_cell::sync::Lazy::new(KeccakCache::new);
