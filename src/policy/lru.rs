//! # Least Recently Used (LRU) Cache
//!
//! A fixed-capacity key-value cache that evicts the least recently used entry
//! once an insert would exceed the capacity. Lookup, insert and eviction are
//! O(1) on average.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────────┐
//!   │                           LruCache<K, V>                                 │
//!   │                                                                          │
//!   │   ┌────────────────────────────────────────────────────────────────────┐ │
//!   │   │                     Mutex<LruCore<K, V>>                           │ │
//!   │   └────────────────────────────────────────────────────────────────────┘ │
//!   │                                  │                                       │
//!   │                                  ▼                                       │
//!   │   ┌────────────────────────────────────────────────────────────────────┐ │
//!   │   │                         LruCore<K, V>                              │ │
//!   │   │                                                                    │ │
//!   │   │   index: FxHashMap<K, SlotId>                                      │ │
//!   │   │     key_1 ─────────────┐                                           │ │
//!   │   │     key_2 ───────────────────────┐                                 │ │
//!   │   │     key_3 ─────────────────────────────────┐                       │ │
//!   │   │                        ▼         ▼         ▼                       │ │
//!   │   │   list: IntrusiveList<Entry<K, V>>                                 │ │
//!   │   │     head ──► [key_1,v] ◄──► [key_2,v] ◄──► [key_3,v] ◄── tail      │ │
//!   │   │               (MRU)                         (LRU)                  │ │
//!   │   └────────────────────────────────────────────────────────────────────┘ │
//!   └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each live entry is one index slot plus one list node holding `(key, value)`.
//! The node keeps its own key so eviction can delete the index slot without a
//! search.
//!
//! ## Operations Flow
//!
//! ```text
//!   set(D) on a full cache (capacity = 3)
//!
//!     head ──► [A] ◄──► [B] ◄──► [C] ◄── tail
//!
//!     1. push_front(D), index[D] = id
//!     2. len 4 > capacity 3: pop_back() → C, index.remove(C)
//!
//!     head ──► [D] ◄──► [A] ◄──► [B] ◄── tail
//!
//!   get(B)
//!
//!     1. id = index[B]
//!     2. move_to_front(id)
//!
//!     head ──► [B] ◄──► [D] ◄──► [A] ◄── tail
//! ```
//!
//! ## Concurrency Model
//!
//! `LruCache` puts the index and the list behind a single
//! `parking_lot::Mutex`. Even `get` reorders the list, so there is no shared
//! read path and no reader/writer split. Every method locks once, does O(1)
//! work, and unlocks; the two structures are never observable out of sync.
//!
//! Values displaced by `set` (overwritten or evicted), entries taken out by
//! `remove`, the spare key copies those operations leave behind, and the
//! contents dropped by `clear` are all released after the lock is gone. No
//! `Drop` impl of `K` or `V` runs inside the critical section. `get` and
//! `peek` do run `V::clone` under the lock.
//!
//! ## Capacity
//!
//! A capacity of 0 is rejected at construction: `try_new(0)` returns
//! [`ConfigError`] and `new(0)` panics. A constructed cache always holds at
//! least one entry.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::mem;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::ds::{IntrusiveList, SlotId};
use crate::error::{ConfigError, InvariantError, validate_capacity};
use crate::traits::Cache;

/// Upper bound on storage reserved up front; larger caches grow on demand.
const MAX_PREALLOCATED_ENTRIES: usize = 1 << 16;

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
}

/// Result of [`LruCore::insert`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Insertion<K, V> {
    /// The key existed; its previous value is returned.
    Updated { previous: V },
    /// A new entry was created; `evicted` holds the entry pushed out to make room.
    Inserted { evicted: Option<(K, V)> },
}

impl<K, V> Insertion<K, V> {
    /// `true` if the key was already present.
    pub fn was_present(&self) -> bool {
        matches!(self, Insertion::Updated { .. })
    }

    /// The entry evicted by this insert, if any.
    pub fn evicted(&self) -> Option<(&K, &V)> {
        match self {
            Insertion::Inserted {
                evicted: Some((key, value)),
            } => Some((key, value)),
            _ => None,
        }
    }
}

/// Single-threaded LRU core: index + recency list + capacity.
///
/// Not synchronized. Use [`LruCache`] to share a cache between threads.
///
/// # Example
///
/// ```
/// use lrukit::policy::lru::LruCore;
///
/// let mut cache = LruCore::new(2);
/// assert!(!cache.set("a", 1));
/// assert!(!cache.set("b", 2));
/// assert_eq!(cache.get("a"), Some(&1));
///
/// // "b" is now least recently used
/// cache.set("c", 3);
/// assert!(!cache.contains("b"));
/// ```
pub struct LruCore<K, V> {
    index: FxHashMap<K, SlotId>,
    list: IntrusiveList<Entry<K, V>>,
    capacity: usize,
    preallocate: bool,
}

impl<K, V> LruCore<K, V> {
    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<K, V> LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty core holding at most `capacity` entries.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Ok(core) => core,
            Err(err) => panic!("LruCore::new: {err}"),
        }
    }

    /// Fallible constructor; rejects a zero capacity.
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        Self::with_config(capacity, true)
    }

    pub(crate) fn with_config(capacity: usize, preallocate: bool) -> Result<Self, ConfigError> {
        let capacity = validate_capacity(capacity)?;
        Ok(Self::unchecked(capacity, preallocate))
    }

    fn unchecked(capacity: usize, preallocate: bool) -> Self {
        if preallocate {
            // one extra slot: a new entry is linked before the LRU one is evicted
            let slots = capacity.min(MAX_PREALLOCATED_ENTRIES) + 1;
            LruCore {
                index: FxHashMap::with_capacity_and_hasher(slots, Default::default()),
                list: IntrusiveList::with_capacity(slots),
                capacity,
                preallocate,
            }
        } else {
            LruCore {
                index: FxHashMap::default(),
                list: IntrusiveList::new(),
                capacity,
                preallocate,
            }
        }
    }

    /// Inserts or overwrites `key` and makes it the most recently used entry.
    ///
    /// On a new key, evicts the least recently used entry if the cache would
    /// otherwise exceed its capacity.
    pub fn insert(&mut self, key: K, value: V) -> Insertion<K, V> {
        self.insert_with_spare(key, value).0
    }

    /// [`insert`](Self::insert) that also returns the key copy it no longer
    /// needs: the caller's key on overwrite, or the index's copy of an
    /// evicted key.
    fn insert_with_spare(&mut self, key: K, value: V) -> (Insertion<K, V>, Option<K>) {
        if let Some(&id) = self.index.get(&key) {
            if let Some(entry) = self.list.get_mut(id) {
                let previous = mem::replace(&mut entry.value, value);
                self.list.move_to_front(id);
                return (Insertion::Updated { previous }, Some(key));
            }
        }

        let id = self.list.push_front(Entry {
            key: key.clone(),
            value,
        });
        self.index.insert(key, id);

        let (evicted, spare) = if self.list.len() > self.capacity {
            match self.evict_lru() {
                Some((key, value, spare)) => (Some((key, value)), spare),
                None => (None, None),
            }
        } else {
            (None, None)
        };

        debug_assert!(self.index.len() <= self.capacity);

        (Insertion::Inserted { evicted }, spare)
    }

    /// Inserts or overwrites `key`; returns `true` if it was already present.
    pub fn set(&mut self, key: K, value: V) -> bool {
        self.insert(key, value).was_present()
    }

    /// Returns the value for `key` and promotes it to most recently used.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = *self.index.get(key)?;
        self.list.move_to_front(id);
        self.list.get(id).map(|entry| &entry.value)
    }

    /// Returns the value for `key` without changing recency.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = *self.index.get(key)?;
        self.list.get(id).map(|entry| &entry.value)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    /// Removes `key` and returns its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_with_spare(key).map(|(_, value, _)| value)
    }

    /// Unlinks `key` and returns the stored key, its value, and the index's
    /// copy of the key.
    fn remove_with_spare<Q>(&mut self, key: &Q) -> Option<(K, V, K)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let (spare, id) = self.index.remove_entry(key)?;
        let entry = self.list.remove(id)?;
        Some((entry.key, entry.value, spare))
    }

    /// Returns the least recently used entry without promoting it.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        self.list.back().map(|entry| (&entry.key, &entry.value))
    }

    /// Keys from most to least recently used.
    pub fn keys_mru(&self) -> impl Iterator<Item = &K> + '_ {
        self.list.iter().map(|entry| &entry.key)
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.index.clear();
        self.list.clear();
    }

    /// Pops the least recently used entry; the third field is the index's
    /// copy of its key.
    fn evict_lru(&mut self) -> Option<(K, V, Option<K>)> {
        let entry = self.list.pop_back()?;
        let spare = self.index.remove_entry(&entry.key).map(|(key, _)| key);
        Some((entry.key, entry.value, spare))
    }

    /// Checks that index and list describe the same set of entries.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.list.check_invariants()?;

        if self.index.len() != self.list.len() {
            return Err(InvariantError::new(format!(
                "index has {} keys, list has {} nodes",
                self.index.len(),
                self.list.len()
            )));
        }
        if self.list.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "{} entries exceed capacity {}",
                self.list.len(),
                self.capacity
            )));
        }
        for (key, &id) in &self.index {
            match self.list.get(id) {
                Some(entry) if entry.key == *key => {},
                Some(_) => {
                    return Err(InvariantError::new(format!(
                        "index slot {} points at a node for a different key",
                        id.index()
                    )));
                },
                None => {
                    return Err(InvariantError::new(format!(
                        "index slot {} points at a dead node",
                        id.index()
                    )));
                },
            }
        }
        Ok(())
    }
}

impl<K, V> fmt::Debug for LruCore<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCore")
            .field("len", &self.index.len())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

/// Thread-safe LRU cache.
///
/// All operations serialize on one `parking_lot::Mutex` that guards the index
/// and the recency list together. Share it between threads with `Arc`.
///
/// `get` and `peek` hand out clones of the stored value, and `V::clone` runs
/// while the lock is held. Store `Arc<V>` to keep those clones cheap.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::thread;
///
/// use lrukit::policy::lru::LruCache;
///
/// let cache = Arc::new(LruCache::new(100));
/// let writer = {
///     let cache = Arc::clone(&cache);
///     thread::spawn(move || {
///         for i in 0..10u32 {
///             cache.set(i, i * 10);
///         }
///     })
/// };
/// writer.join().unwrap();
///
/// assert_eq!(cache.get(&3), Some(30));
/// assert_eq!(cache.len(), 10);
/// ```
pub struct LruCache<K, V> {
    inner: Mutex<LruCore<K, V>>,
    capacity: usize,
    preallocate: bool,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty cache holding at most `capacity` entries.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0. Use [`try_new`](Self::try_new) for
    /// user-supplied capacities.
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Ok(cache) => cache,
            Err(err) => panic!("LruCache::new: {err}"),
        }
    }

    /// Fallible constructor; rejects a zero capacity.
    ///
    /// ```
    /// use lrukit::policy::lru::LruCache;
    ///
    /// assert!(LruCache::<String, u32>::try_new(0).is_err());
    /// assert_eq!(LruCache::<String, u32>::try_new(3).unwrap().capacity(), 3);
    /// ```
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        LruCore::try_new(capacity).map(Self::from_core)
    }

    pub(crate) fn from_core(core: LruCore<K, V>) -> Self {
        let capacity = core.capacity();
        let preallocate = core.preallocate;
        debug!(capacity, preallocate, "created lru cache");
        LruCache {
            inner: Mutex::new(core),
            capacity,
            preallocate,
        }
    }

    /// Stores `value` under `key` and marks it most recently used.
    ///
    /// Returns `true` if `key` was already present (its value is overwritten
    /// in place), `false` if a new entry was created. Creating an entry in a
    /// full cache evicts the least recently used one.
    ///
    /// ```
    /// use lrukit::policy::lru::LruCache;
    ///
    /// let cache = LruCache::new(1);
    /// assert!(!cache.set("a", 1));
    /// assert!(cache.set("a", 2));
    /// assert!(!cache.set("b", 3)); // evicts "a"
    /// assert_eq!(cache.get("a"), None);
    /// ```
    pub fn set(&self, key: K, value: V) -> bool {
        self.insert(key, value).was_present()
    }

    /// Inserts like [`set`](Self::set) but hands back the displaced value or
    /// evicted entry instead of dropping it.
    pub fn insert(&self, key: K, value: V) -> Insertion<K, V> {
        let (outcome, spare) = self.inner.lock().insert_with_spare(key, value);
        drop(spare);
        if outcome.evicted().is_some() {
            trace!(capacity = self.capacity, "evicted least recently used entry");
        }
        outcome
    }

    /// Returns a clone of the value for `key` and marks it most recently used.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.inner.lock().get(key).cloned()
    }

    /// Returns a clone of the value for `key` without changing recency.
    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.inner.lock().peek(key).cloned()
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().contains(key)
    }

    /// Removes `key` and returns its value.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let removed = self.inner.lock().remove_with_spare(key);
        removed.map(|(_, value, _)| value)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Maximum number of entries. Fixed at construction; does not lock.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Snapshot of the keys from most to least recently used.
    pub fn keys(&self) -> Vec<K> {
        self.inner.lock().keys_mru().cloned().collect()
    }

    /// Removes every entry in one step.
    ///
    /// Concurrent callers see either the full contents or an empty cache,
    /// never a partly cleared one. The replacement core is built before the
    /// lock is taken, with the same preallocation as the original, and the
    /// old entries are dropped after the lock is released.
    pub fn clear(&self) {
        let fresh = LruCore::unchecked(self.capacity, self.preallocate);
        let old = mem::replace(&mut *self.inner.lock(), fresh);
        trace!(dropped = old.len(), "cleared lru cache");
        drop(old);
    }

    /// Checks the index/list consistency under the lock.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.inner.lock().check_invariants()
    }
}

impl<K, V> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.inner.lock();
        f.debug_struct("LruCache")
            .field("len", &core.len())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl<K, V> Cache<K, V> for LruCache<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Clone + Send,
{
    fn set(&self, key: K, value: V) -> bool {
        LruCache::set(self, key, value)
    }

    fn get(&self, key: &K) -> Option<V> {
        LruCache::get(self, key)
    }

    fn clear(&self) {
        LruCache::clear(self)
    }

    fn contains(&self, key: &K) -> bool {
        LruCache::contains(self, key)
    }

    fn len(&self) -> usize {
        LruCache::len(self)
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}
