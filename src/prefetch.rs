//! Online cache population
//!
//! The interactive view only ever reads the cache. This module fills it: either
//! directly (`cafmenu prefetch`) or by starting that command as a background
//! process so the view can come up without waiting on the network.

use std::io;
use std::process::{ExitStatus, Stdio};

use chrono::{NaiveDate, NaiveDateTime};
use futures::stream::{self, StreamExt};
use tokio::process::Command;
use tokio::sync::oneshot::{self, error::TryRecvError};

use crate::cache::{FetchPolicy, MenuCache};
use crate::config::ExclusionConfig;
use crate::data::{MealSlot, MenuFetcher};

/// Upper bound on menu requests in flight at once
pub const MAX_CONCURRENT_FETCHES: usize = 4;

/// Outcome of a prefetch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrefetchSummary {
    /// Slots whose menu is now in the cache
    pub available: usize,
    /// Slots that could not be fetched
    pub failed: usize,
}

/// Makes sure every upcoming, non-excluded meal in the window is cached
///
/// Menus already on disk are not fetched again. At most
/// [`MAX_CONCURRENT_FETCHES`] lookups run at a time; each slot has its own
/// cache file.
pub async fn prefetch<F: MenuFetcher>(
    cache: &MenuCache<F>,
    exclusions: &ExclusionConfig,
    start: NaiveDate,
    num_days: u32,
    now: NaiveDateTime,
) -> PrefetchSummary {
    let slots: Vec<MealSlot> = MealSlot::window(start, num_days)
        .filter(|slot| !exclusions.ignores_meal(slot.kind) && !slot.is_over(now))
        .collect();

    let results: Vec<_> = stream::iter(&slots)
        .map(|slot| cache.get(slot.day, slot.kind, FetchPolicy::AllowOnline))
        .buffered(MAX_CONCURRENT_FETCHES)
        .collect()
        .await;

    let mut summary = PrefetchSummary::default();
    for (slot, result) in slots.iter().zip(results) {
        match result {
            Ok(_) => summary.available += 1,
            Err(e) => {
                log::warn!("Could not prefetch {} on {}: {}", slot.label(), slot.day, e);
                summary.failed += 1;
            }
        }
    }

    log::info!(
        "Prefetch finished: {} available, {} failed",
        summary.available,
        summary.failed
    );
    summary
}

/// Arguments that start a prefetch run for `num_days` days
pub fn prefetch_args(num_days: u32) -> Vec<String> {
    vec![
        "--days".to_string(),
        num_days.to_string(),
        "prefetch".to_string(),
    ]
}

/// A prefetch child process running alongside the interactive view
///
/// A tokio task waits on the child, so it is reaped as soon as it exits.
#[derive(Debug)]
pub struct BackgroundPrefetch {
    exited: oneshot::Receiver<io::Result<ExitStatus>>,
    running: bool,
}

impl BackgroundPrefetch {
    /// Starts `cafmenu --days N prefetch` from the current executable
    ///
    /// Its output is discarded; problems end up in the log file.
    pub fn spawn_current_exe(num_days: u32) -> io::Result<Self> {
        let mut command = Command::new(std::env::current_exe()?);
        command.args(prefetch_args(num_days));
        Self::spawn(command)
    }

    /// Starts `command` with null stdio and watches for its exit
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(mut command: Command) -> io::Result<Self> {
        let mut child = command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        log::info!("Started background prefetch (pid {:?})", child.id());

        let (tx, exited) = oneshot::channel();
        tokio::spawn(async move {
            let _ = tx.send(child.wait().await);
        });

        Ok(Self {
            exited,
            running: true,
        })
    }

    /// Whether the child is still running
    ///
    /// Never blocks. Once this returns `false` it keeps doing so.
    pub fn is_running(&mut self) -> bool {
        if self.running {
            match self.exited.try_recv() {
                Err(TryRecvError::Empty) => {}
                Ok(Ok(status)) => {
                    log::info!("Background prefetch exited with {}", status);
                    self.running = false;
                }
                Ok(Err(e)) => {
                    log::warn!("Lost track of background prefetch: {}", e);
                    self.running = false;
                }
                Err(TryRecvError::Closed) => self.running = false,
            }
        }
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheManager;
    use crate::data::{FetchError, MealKind, RawMenuPayload};
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tempfile::TempDir;

    const MENU_JSON: &str = r#"{"SelectedPeriodId": 1, "Menu": {"MenuStations": [], "MenuProducts": []}}"#;

    /// Records requested meal ids; fails for dinner
    #[derive(Default)]
    struct RecordingFetcher {
        requested: Mutex<Vec<(NaiveDate, u32)>>,
    }

    impl MenuFetcher for RecordingFetcher {
        fn fetch(
            &self,
            day: NaiveDate,
            meal_id: u32,
        ) -> impl Future<Output = Result<RawMenuPayload, FetchError>> + Send {
            self.requested.lock().unwrap().push((day, meal_id));
            let result = if meal_id == MealKind::Dinner.external_id() {
                Err(FetchError::InvalidBody(
                    serde_json::from_str::<serde_json::Value>("").unwrap_err(),
                ))
            } else {
                RawMenuPayload::from_json(MENU_JSON).map_err(FetchError::from)
            };
            async move { result }
        }
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[tokio::test]
    async fn test_prefetch_skips_past_and_excluded_meals() {
        let temp_dir = TempDir::new().unwrap();
        let cache = MenuCache::new(CacheManager::new(temp_dir.path()), RecordingFetcher::default());
        let exclusions = ExclusionConfig::new(["LUNCH"], Vec::<String>::new(), Vec::<String>::new());
        let now = date(6).and_hms_opt(12, 0, 0).unwrap();

        let summary = prefetch(&cache, &exclusions, date(6), 2, now).await;

        // today: dinner; tomorrow: breakfast and dinner
        let mut requested = cache.fetcher().requested.lock().unwrap().clone();
        requested.sort();
        assert_eq!(
            requested,
            vec![(date(6), 2085), (date(7), 2082), (date(7), 2085)]
        );
        assert_eq!(summary, PrefetchSummary { available: 1, failed: 2 });
        assert!(temp_dir.path().join("2024-05-07-BREAKFAST.json").exists());
        assert!(!temp_dir.path().join("2024-05-07-DINNER.json").exists());
    }

    #[tokio::test]
    async fn test_prefetch_does_not_refetch_cached_menus() {
        let temp_dir = TempDir::new().unwrap();
        let store = CacheManager::new(temp_dir.path());
        store.write("2024-05-07-BREAKFAST", MENU_JSON).unwrap();
        let cache = MenuCache::new(store, RecordingFetcher::default());
        let exclusions = ExclusionConfig::new(["lunch", "dinner"], Vec::<String>::new(), Vec::<String>::new());
        let now = date(7).and_hms_opt(7, 0, 0).unwrap();

        let summary = prefetch(&cache, &exclusions, date(7), 1, now).await;

        assert!(cache.fetcher().requested.lock().unwrap().is_empty());
        assert_eq!(summary, PrefetchSummary { available: 1, failed: 0 });
    }

    #[test]
    fn test_prefetch_args_put_options_before_command() {
        assert_eq!(prefetch_args(4), vec!["--days", "4", "prefetch"]);
    }

    /// Holds each request open briefly and records the most seen at once
    #[derive(Default)]
    struct SlowFetcher {
        in_flight: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
        calls: AtomicUsize,
    }

    impl MenuFetcher for SlowFetcher {
        fn fetch(
            &self,
            _day: NaiveDate,
            _meal_id: u32,
        ) -> impl Future<Output = Result<RawMenuPayload, FetchError>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let in_flight = Arc::clone(&self.in_flight);
            let peak = Arc::clone(&self.peak);
            async move {
                let current = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(current, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(2)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                RawMenuPayload::from_json(MENU_JSON).map_err(FetchError::from)
            }
        }
    }

    #[tokio::test]
    async fn test_prefetch_limits_requests_in_flight() {
        let temp_dir = TempDir::new().unwrap();
        let cache = MenuCache::new(CacheManager::new(temp_dir.path()), SlowFetcher::default());
        let now = date(1).and_hms_opt(0, 0, 0).unwrap();

        let summary = prefetch(&cache, &ExclusionConfig::default(), date(1), 120, now).await;

        assert_eq!(summary, PrefetchSummary { available: 360, failed: 0 });
        assert_eq!(cache.fetcher().calls.load(Ordering::SeqCst), 360);
        let peak = cache.fetcher().peak.load(Ordering::SeqCst);
        assert!(
            (1..=MAX_CONCURRENT_FETCHES).contains(&peak),
            "peak of {} requests in flight",
            peak
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_background_prefetch_reports_exit() {
        let mut background = BackgroundPrefetch::spawn(Command::new("true")).unwrap();

        let mut waited = Duration::ZERO;
        while background.is_running() {
            assert!(waited < Duration::from_secs(10), "child never reported exit");
            tokio::time::sleep(Duration::from_millis(10)).await;
            waited += Duration::from_millis(10);
        }

        assert!(!background.is_running(), "Exit is sticky");
    }
}
