//! Day/meal keyed menu cache with online fallback

use std::io;

use chrono::NaiveDate;
use thiserror::Error;

use super::CacheManager;
use crate::data::{FetchError, MealKind, MenuFetcher, RawMenuPayload};

/// Whether a cache lookup may go to the network on a miss
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPolicy {
    /// Only return what is already on disk
    CacheOnly,
    /// Fetch and store the menu if it is not on disk
    AllowOnline,
}

/// Why a menu could not be produced
#[derive(Debug, Error)]
pub enum LookupError {
    /// Nothing on disk and the policy did not allow fetching
    #[error("menu is not cached")]
    NotCached,

    /// The cache file exists but cannot be used
    #[error("cached menu is corrupt: {0}")]
    Corrupt(#[source] CorruptEntry),

    /// The API could not be reached or returned an error
    #[error("failed to fetch menu: {0}")]
    Fetch(#[from] FetchError),
}

/// What is wrong with a cache file that exists
#[derive(Debug, Error)]
pub enum CorruptEntry {
    /// The file could not be read, e.g. bad permissions or invalid UTF-8
    #[error("unreadable: {0}")]
    Unreadable(#[from] io::Error),

    #[error("not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Menu cache keyed by (day, meal)
///
/// Each slot maps to exactly one file, written on the first successful fetch.
#[derive(Debug, Clone)]
pub struct MenuCache<F> {
    store: CacheManager,
    fetcher: F,
}

impl<F: MenuFetcher> MenuCache<F> {
    pub fn new(store: CacheManager, fetcher: F) -> Self {
        Self { store, fetcher }
    }

    /// Cache key for a slot, e.g. `2024-05-06-LUNCH`
    pub fn cache_key(day: NaiveDate, kind: MealKind) -> String {
        format!("{}-{}", day.format("%Y-%m-%d"), kind.name())
    }

    pub fn store(&self) -> &CacheManager {
        &self.store
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Returns the menu payload for `day` and `kind`
    ///
    /// A cache file that cannot be read or parsed is treated as a miss. On a miss with
    /// [`FetchPolicy::AllowOnline`] the menu is fetched and written to the cache
    /// before being returned; failed fetches write nothing.
    pub async fn get(
        &self,
        day: NaiveDate,
        kind: MealKind,
        policy: FetchPolicy,
    ) -> Result<RawMenuPayload, LookupError> {
        let key = Self::cache_key(day, kind);

        let corrupt = match self.read_cached(&key) {
            Ok(Some(payload)) => return Ok(payload),
            Ok(None) => None,
            Err(e) => {
                log::warn!("Ignoring corrupt cache entry {}: {}", key, e);
                Some(e)
            }
        };

        if policy == FetchPolicy::CacheOnly {
            return Err(corrupt.map_or(LookupError::NotCached, LookupError::Corrupt));
        }

        log::info!("Fetching {} menu for {}", kind.display_name(), day);
        let payload = self.fetcher.fetch(day, kind.external_id()).await?;

        if let Err(e) = self.store.write(&key, payload.as_str()) {
            log::warn!("Failed to write cache entry {}: {}", key, e);
        }

        Ok(payload)
    }

    fn read_cached(&self, key: &str) -> Result<Option<RawMenuPayload>, CorruptEntry> {
        match self.store.read(key)? {
            Some(contents) => Ok(Some(RawMenuPayload::from_json(contents)?)),
            None => Ok(None),
        }
    }
}
