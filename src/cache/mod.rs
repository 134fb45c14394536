//! Cache module for storing menu responses on disk
//!
//! `CacheManager` is a plain key to file store. `MenuCache` sits on top of it and
//! keys menus by day and meal, falling back to the API when allowed. A lookup
//! that is not allowed to fetch never touches the network, so the interactive
//! view can render from disk alone while a prefetch run fills the cache.

mod manager;
mod menu_cache;

pub use manager::CacheManager;
pub use menu_cache::{CorruptEntry, FetchPolicy, LookupError, MenuCache};
