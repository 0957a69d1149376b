//! Error types for lrukit.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when a cache is configured with an unusable
//!   capacity (zero).
//! - [`InvariantError`]: Returned by `check_invariants` on the list and the
//!   cache when the index and recency list have drifted apart.
//!
//! Lookups never error: a missing key is an ordinary `None`.
//!
//! ## Example Usage
//!
//! ```
//! use lrukit::error::ConfigError;
//! use lrukit::policy::lru::LruCache;
//!
//! let cache: Result<LruCache<String, i32>, ConfigError> = LruCache::try_new(100);
//! assert!(cache.is_ok());
//!
//! let bad = LruCache::<String, i32>::try_new(0);
//! assert!(bad.is_err());
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when an internal invariant is violated.
///
/// Produced by [`IntrusiveList::check_invariants`](crate::ds::IntrusiveList::check_invariants)
/// and [`LruCache::check_invariants`](crate::policy::lru::LruCache::check_invariants).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration is invalid.
///
/// Produced by [`LruCache::try_new`](crate::policy::lru::LruCache::try_new) and
/// [`LruCacheBuilder::try_build`](crate::builder::LruCacheBuilder::try_build).
///
/// # Example
///
/// ```
/// use lrukit::policy::lru::LruCache;
///
/// let err = LruCache::<u64, u64>::try_new(0).unwrap_err();
/// assert!(err.to_string().contains("capacity"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }

    pub(crate) fn zero_capacity() -> Self {
        Self::new("capacity must be greater than 0")
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

/// Rejects configurations that could never hold an entry.
pub(crate) fn validate_capacity(capacity: usize) -> Result<usize, ConfigError> {
    if capacity == 0 {
        return Err(ConfigError::zero_capacity());
    }
    Ok(capacity)
}
