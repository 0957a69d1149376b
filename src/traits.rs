//! # Cache Traits
//!
//! [`Cache`] is the contract callers program against: a shared handle that
//! can be used from many threads at once, so every method takes `&self`.
//!
//! ```text
//!   ┌─────────────────────────────────────────┐
//!   │            Cache<K, V>                  │
//!   │                                         │
//!   │  set(&, K, V) → bool  (was present)     │
//!   │  get(&, &K) → Option<V>  (promotes)     │
//!   │  clear(&)                               │
//!   │  contains / len / is_empty / capacity   │
//!   └─────────────────────────────────────────┘
//! ```
//!
//! A missing key is never an error: `get` returns `None` and `set` reports
//! whether it overwrote an existing entry.
//!
//! ## Example Usage
//!
//! ```
//! use lrukit::policy::lru::LruCache;
//! use lrukit::traits::Cache;
//!
//! fn warm<C: Cache<u64, String>>(cache: &C, data: &[(u64, String)]) {
//!     for (key, value) in data {
//!         cache.set(*key, value.clone());
//!     }
//! }
//!
//! let cache = LruCache::new(8);
//! warm(&cache, &[(1, "one".to_string()), (2, "two".to_string())]);
//! assert_eq!(Cache::get(&cache, &1), Some("one".to_string()));
//! ```

/// Thread-safe key-value cache with a fixed capacity.
pub trait Cache<K, V>: Send + Sync {
    /// Stores `value` under `key`, marking it most recently used.
    ///
    /// Returns `true` if `key` was already present (its value is replaced),
    /// `false` if a new entry was created.
    fn set(&self, key: K, value: V) -> bool;

    /// Returns the value for `key` and marks it most recently used.
    fn get(&self, key: &K) -> Option<V>;

    /// Removes every entry.
    fn clear(&self);

    /// Returns `true` if `key` is present, without touching recency.
    fn contains(&self, key: &K) -> bool;

    /// Current number of entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries.
    fn capacity(&self) -> usize;
}
