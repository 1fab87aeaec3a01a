//! Session-lifetime query cache for the users collection.
//!
//! This module provides `QueryCache`, the only stateful component of the
//! client. Entries are keyed by `QueryKey` (`["users"]` for the list,
//! `["users", id]` for one record) and move through
//! `absent -> pending -> success | error`.
//!
//! - Concurrent reads of one key share a single in-flight fetch
//! - Invalidation marks entries stale; the next read re-fetches
//! - There is no timer-driven refresh and no automatic retry

pub mod entry;
pub mod key;
pub mod store;

pub use entry::{CacheData, CacheEntry, CacheStatus};
pub use key::QueryKey;
pub use store::QueryCache;
