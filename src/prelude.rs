pub use crate::builder::LruCacheBuilder;
pub use crate::ds::{IntrusiveList, SlotArena, SlotId};
pub use crate::error::{ConfigError, InvariantError};
pub use crate::policy::lru::{Insertion, LruCache, LruCore};
pub use crate::traits::Cache;
