//! Reply routing table.
//!
//! Maps a message id in the admin chat (the forwarded copy or its info card)
//! back to the original sender and message, so a plain chat reply from the
//! admin can be relayed to the right person. Entries expire after a TTL and
//! the table is capped; both bounds are applied inline on every write, there
//! is no background sweep.

use std::collections::BTreeMap;
use std::path::PathBuf;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{StoreError, load_json, save_json};
use crate::utils::now_ts;

/// One routing record, keyed externally by the admin-side message id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    /// Original sender.
    pub user_id: u64,
    /// The sender's message the admin reply should reference.
    pub src_msg_id: i32,
    /// Unix timestamp of the forward.
    pub ts: u64,
}

type RouteMap = BTreeMap<i32, RouteEntry>;

pub struct RouteTable {
    path: PathBuf,
    ttl_secs: u64,
    max_entries: usize,
    lock: Mutex<()>,
}

impl RouteTable {
    pub fn new(path: impl Into<PathBuf>, ttl_secs: u64, max_entries: usize) -> Self {
        Self {
            path: path.into(),
            ttl_secs,
            max_entries,
            lock: Mutex::new(()),
        }
    }

    /// Record that `admin_msg_id` routes back to `user_id` / `src_msg_id`.
    pub fn put(&self, admin_msg_id: i32, user_id: u64, src_msg_id: i32) -> Result<(), StoreError> {
        let _guard = self.lock.lock();
        let mut map = self.load();
        let now = now_ts();
        map.insert(
            admin_msg_id,
            RouteEntry {
                user_id,
                src_msg_id,
                ts: now,
            },
        );
        prune(&mut map, now, self.ttl_secs, self.max_entries);
        save_json(&self.path, &map)
    }

    /// Look up the route for an admin-side message id. Read-only.
    pub fn get(&self, admin_msg_id: i32) -> Option<RouteEntry> {
        self.load().get(&admin_msg_id).cloned()
    }

    fn load(&self) -> RouteMap {
        match load_json(&self.path) {
            Ok(map) => map,
            Err(e) => {
                warn!("failed to load {}: {e}", self.path.display());
                RouteMap::new()
            }
        }
    }
}

/// Drop entries older than `ttl_secs`, then cap the table at `max_entries`,
/// evicting the oldest timestamps first.
fn prune(map: &mut RouteMap, now: u64, ttl_secs: u64, max_entries: usize) {
    map.retain(|_, entry| now.saturating_sub(entry.ts) <= ttl_secs);
    if map.len() > max_entries {
        let mut by_age: Vec<(i32, u64)> = map.iter().map(|(id, e)| (*id, e.ts)).collect();
        by_age.sort_by_key(|(_, ts)| *ts);
        let excess = by_age.len() - max_entries;
        for (id, _) in by_age.into_iter().take(excess) {
            map.remove(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn entry(user_id: u64, ts: u64) -> RouteEntry {
        RouteEntry {
            user_id,
            src_msg_id: 1,
            ts,
        }
    }

    #[test]
    fn prune_drops_expired_entries() {
        let mut map = RouteMap::new();
        map.insert(1, entry(10, 0));
        map.insert(2, entry(11, 90));
        prune(&mut map, 100, 60, 10);
        assert!(!map.contains_key(&1));
        assert!(map.contains_key(&2));
    }

    #[test]
    fn prune_drops_expired_regardless_of_capacity() {
        let mut map = RouteMap::new();
        map.insert(1, entry(10, 0));
        prune(&mut map, 1_000_000, 60, 10);
        assert!(map.is_empty());
    }

    #[test]
    fn prune_caps_at_newest_entries() {
        let mut map = RouteMap::new();
        for i in 0..10 {
            map.insert(i, entry(i as u64, i as u64));
        }
        prune(&mut map, 10, 1000, 4);
        assert_eq!(map.len(), 4);
        for i in 6..10 {
            assert!(map.contains_key(&i));
        }
        assert!(!map.contains_key(&5));
    }

    #[test]
    fn put_then_get_roundtrip() {
        let dir = tempdir().unwrap();
        let table = RouteTable::new(dir.path().join("routes.json"), 3600, 100);
        table.put(555, 42, 1234).unwrap();
        let got = table.get(555).unwrap();
        assert_eq!(got.user_id, 42);
        assert_eq!(got.src_msg_id, 1234);
        assert!(table.get(556).is_none());
    }

    #[test]
    fn capacity_bound_holds_across_puts() {
        let dir = tempdir().unwrap();
        let table = RouteTable::new(dir.path().join("routes.json"), 3600, 5);
        for i in 0..20 {
            table.put(i, i as u64, i).unwrap();
        }
        let surviving = (0..20).filter(|i| table.get(*i).is_some()).count();
        assert!(surviving <= 5);
        assert!(table.get(19).is_some());
    }
}
