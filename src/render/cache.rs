//! # Bounded Raster Cache
//!
//! A key → value map with least-recently-used eviction. The compositor keeps
//! one per kind of sub-raster (decoded image sources, rendered image variants,
//! QR/barcode rasters), each with its own capacity.
//!
//! Keys encode everything that affects the raster (content hash, geometry,
//! options), so a changed option simply misses and the stale entry ages out.
//! There is no invalidation API.
//!
//! ```
//! use labelpress::render::cache::BoundedCache;
//!
//! let mut cache = BoundedCache::new("example", 2);
//! assert_eq!(cache.get_or_build("a", || 1), 1);
//! assert_eq!(cache.get_or_build("a", || unreachable!()), 1);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use tracing::trace;

struct Entry<V> {
    value: V,
    last_used: u64,
}

/// LRU cache with a fixed capacity.
///
/// Values are cloned out on every hit, so store cheap handles (`Arc<_>`).
pub struct BoundedCache<K, V> {
    name: &'static str,
    capacity: usize,
    entries: HashMap<K, Entry<V>>,
    /// last_used → key, oldest first
    order: BTreeMap<u64, K>,
    clock: u64,
}

impl<K, V> BoundedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a cache holding at most `capacity` entries (minimum 1).
    pub fn new(name: &'static str, capacity: usize) -> Self {
        Self {
            name,
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: BTreeMap::new(),
            clock: 0,
        }
    }

    /// Return the cached value for `key`, or build, store and return it.
    ///
    /// A hit promotes the entry to most-recently-used and does not call
    /// `build`.
    pub fn get_or_build(&mut self, key: K, build: impl FnOnce() -> V) -> V {
        if let Some(value) = self.get(&key) {
            return value;
        }
        let value = build();
        self.insert(key, value.clone());
        value
    }

    /// Like [`get_or_build`](Self::get_or_build) for fallible builders.
    /// Failures are returned and not cached.
    pub fn try_get_or_build<E>(
        &mut self,
        key: K,
        build: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        let value = build()?;
        self.insert(key, value.clone());
        Ok(value)
    }

    /// Look up and promote an entry.
    pub fn get(&mut self, key: &K) -> Option<V> {
        let tick = self.tick();
        let entry = self.entries.get_mut(key)?;
        self.order.remove(&entry.last_used);
        entry.last_used = tick;
        self.order.insert(tick, key.clone());
        Some(entry.value.clone())
    }

    /// Whether `key` is cached, without promoting it.
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Store a value as most-recently-used, evicting the oldest entries
    /// beyond capacity.
    pub fn insert(&mut self, key: K, value: V) {
        let tick = self.tick();
        if let Some(old) = self.entries.insert(
            key.clone(),
            Entry {
                value,
                last_used: tick,
            },
        ) {
            self.order.remove(&old.last_used);
        }
        self.order.insert(tick, key);

        while self.entries.len() > self.capacity {
            let Some((_, oldest)) = self.order.pop_first() else {
                break;
            };
            self.entries.remove(&oldest);
            trace!(cache = self.name, len = self.entries.len(), "evicted LRU entry");
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
}
