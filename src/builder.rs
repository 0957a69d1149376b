//! Builder for [`LruCache`] and [`LruCore`].
//!
//! ## Example
//!
//! ```rust
//! use lrukit::builder::LruCacheBuilder;
//!
//! let cache = LruCacheBuilder::new(100)
//!     .preallocate(false)
//!     .build::<u64, String>();
//! cache.set(1, "hello".to_string());
//! assert_eq!(cache.get(&1), Some("hello".to_string()));
//! ```

use std::hash::Hash;

use crate::error::ConfigError;
use crate::policy::lru::{LruCache, LruCore};

/// Configuration for an LRU cache.
///
/// | Field         | Default  | Description                                   |
/// |---------------|----------|-----------------------------------------------|
/// | `capacity`    | required | Maximum entries; must be greater than 0       |
/// | `preallocate` | `true`   | Reserve index and list storage up front       |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LruCacheBuilder {
    capacity: usize,
    preallocate: bool,
}

impl LruCacheBuilder {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            preallocate: true,
        }
    }

    /// Whether to reserve storage for `capacity` entries at construction and
    /// again each time the cache is cleared.
    pub fn preallocate(mut self, preallocate: bool) -> Self {
        self.preallocate = preallocate;
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Builds a thread-safe cache.
    ///
    /// # Panics
    ///
    /// Panics if the capacity is 0. Use [`try_build`](Self::try_build) for
    /// user-supplied configuration.
    pub fn build<K, V>(self) -> LruCache<K, V>
    where
        K: Eq + Hash + Clone,
    {
        match self.try_build() {
            Ok(cache) => cache,
            Err(err) => panic!("LruCacheBuilder::build: {err}"),
        }
    }

    /// Builds a thread-safe cache, rejecting invalid configuration.
    pub fn try_build<K, V>(self) -> Result<LruCache<K, V>, ConfigError>
    where
        K: Eq + Hash + Clone,
    {
        self.try_build_core().map(LruCache::from_core)
    }

    /// Builds an unsynchronized core for single-threaded use.
    pub fn try_build_core<K, V>(self) -> Result<LruCore<K, V>, ConfigError>
    where
        K: Eq + Hash + Clone,
    {
        LruCore::with_config(self.capacity, self.preallocate)
    }
}
