//! Local caching of news API reads.
//!
//! `CacheManager` stores responses as JSON files in the cache directory.
//! List pages are considered stale after 5 minutes, details and categories
//! after an hour. Writes through the news API invalidate affected entries.

pub mod manager;

pub use manager::{CacheManager, CachedData, DETAIL_TTL_SECS, LIST_TTL_SECS};
