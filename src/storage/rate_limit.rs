//! Sliding-window admission control.
//!
//! One timestamp list per user, persisted as a JSON object keyed by the
//! stringified user id. Pruning is lazy: stale timestamps and empty lists are
//! dropped on every hit, there is no cleanup pass.

use std::collections::BTreeMap;
use std::path::PathBuf;

use parking_lot::Mutex;
use tracing::warn;

use super::{load_json, save_json};
use crate::utils::now_ts;

type WindowMap = BTreeMap<u64, Vec<u64>>;

pub struct RateLimiter {
    path: PathBuf,
    enabled: bool,
    window_secs: u64,
    max_events: usize,
    lock: Mutex<()>,
}

impl RateLimiter {
    pub fn new(path: impl Into<PathBuf>, enabled: bool, window_secs: u64, max_events: usize) -> Self {
        Self {
            path: path.into(),
            enabled,
            window_secs,
            max_events,
            lock: Mutex::new(()),
        }
    }

    /// Record one event for `user_id` and report whether the user is now over
    /// the limit. Always false when the limiter is disabled.
    pub fn hit(&self, user_id: u64) -> bool {
        if !self.enabled {
            return false;
        }
        let _guard = self.lock.lock();
        let mut map = self.load();
        let count = record(&mut map, user_id, now_ts(), self.window_secs);
        if let Err(e) = save_json(&self.path, &map) {
            warn!("failed to persist rate-limit window: {e}");
        }
        count > self.max_events
    }

    fn load(&self) -> WindowMap {
        match load_json(&self.path) {
            Ok(map) => map,
            Err(e) => {
                warn!("failed to load {}: {e}", self.path.display());
                WindowMap::new()
            }
        }
    }
}

/// Drop timestamps that fell out of the window, append `now` for `user_id`,
/// prune users left with no recent events, and return the user's resulting
/// event count.
fn record(map: &mut WindowMap, user_id: u64, now: u64, window_secs: u64) -> usize {
    for events in map.values_mut() {
        events.retain(|t| now.saturating_sub(*t) < window_secs);
    }
    map.retain(|_, events| !events.is_empty());
    let events = map.entry(user_id).or_default();
    events.push(now);
    events.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn counts_events_inside_the_window() {
        let mut map = WindowMap::new();
        for i in 0..5u64 {
            assert_eq!(record(&mut map, 1, 100 + i, 60), (i + 1) as usize);
        }
        assert_eq!(record(&mut map, 1, 105, 60), 6);
    }

    #[test]
    fn window_slides() {
        let mut map = WindowMap::new();
        record(&mut map, 1, 100, 10);
        record(&mut map, 1, 105, 10);
        // 100 has fallen out by t=111, 105 has not
        assert_eq!(record(&mut map, 1, 111, 10), 2);
    }

    #[test]
    fn stale_users_are_pruned() {
        let mut map = WindowMap::new();
        record(&mut map, 1, 100, 10);
        record(&mut map, 2, 200, 10);
        assert!(!map.contains_key(&1));
        assert!(map.contains_key(&2));
    }

    #[test]
    fn rejects_exactly_above_the_limit() {
        let dir = tempdir().unwrap();
        let limiter = RateLimiter::new(dir.path().join("rate.json"), true, 60, 2);
        assert!(!limiter.hit(7));
        assert!(!limiter.hit(7));
        assert!(limiter.hit(7));
        // an unrelated user is unaffected
        assert!(!limiter.hit(8));
    }

    #[test]
    fn disabled_limiter_never_rejects() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rate.json");
        let limiter = RateLimiter::new(&path, false, 10, 1);
        for _ in 0..10 {
            assert!(!limiter.hit(7));
        }
        // disabled limiter does no bookkeeping at all
        assert!(!path.exists());
    }
}
