//! In-memory caching.
//!
//! # Design Decisions
//! - Entries carry their own TTL; the cache has a default for plain `set`
//! - Lazy eviction on read, plus an explicit `purge_expired` sweep
//! - Failed loads are never cached, so a retrying loader can be plugged in

pub mod ttl;

pub use ttl::{CacheStats, EntryStats, TtlCache};
