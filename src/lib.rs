//! lrukit: a fixed-capacity, thread-safe LRU cache.
//!
//! The recency order lives in an arena-backed doubly linked list
//! ([`ds::IntrusiveList`]); the cache ([`policy::lru::LruCache`]) pairs it with
//! a key index under one lock.

pub mod builder;
pub mod ds;
pub mod error;
pub mod policy;
pub mod prelude;
pub mod traits;
