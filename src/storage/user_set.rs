//! Persistent user-id sets.

use std::collections::HashSet;
use std::path::PathBuf;

use parking_lot::Mutex;
use tracing::warn;

use super::{StoreError, load_json, save_json};

/// A persistent set of user ids stored as a JSON array of integers.
///
/// Backs both the verified-user set and the banned-user set. Insertion order
/// is preserved on disk; duplicates are collapsed on every load and save.
pub struct UserSetStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl UserSetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Whether the set currently contains `user_id`.
    pub fn contains(&self, user_id: u64) -> bool {
        self.load().contains(&user_id)
    }

    /// Insert `user_id`. Returns true when the set changed.
    pub fn insert(&self, user_id: u64) -> Result<bool, StoreError> {
        let _guard = self.lock.lock();
        let mut ids = self.load();
        if ids.contains(&user_id) {
            return Ok(false);
        }
        ids.push(user_id);
        save_json(&self.path, &ids)?;
        Ok(true)
    }

    /// Remove `user_id`. Returns true when the set changed.
    pub fn remove(&self, user_id: u64) -> Result<bool, StoreError> {
        let _guard = self.lock.lock();
        let ids = self.load();
        let kept: Vec<u64> = ids.iter().copied().filter(|id| *id != user_id).collect();
        let changed = kept.len() != ids.len();
        save_json(&self.path, &kept)?;
        Ok(changed)
    }

    /// Snapshot of all ids, in insertion order.
    pub fn all(&self) -> Vec<u64> {
        self.load()
    }

    fn load(&self) -> Vec<u64> {
        match load_json::<Vec<u64>>(&self.path) {
            Ok(ids) => dedup(ids),
            Err(e) => {
                warn!("failed to load {}: {e}", self.path.display());
                Vec::new()
            }
        }
    }
}

fn dedup(ids: Vec<u64>) -> Vec<u64> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = UserSetStore::new(dir.path().join("banned.json"));
        assert!(!store.contains(1));
        assert!(store.all().is_empty());
    }

    #[test]
    fn ban_then_unban_leaves_no_trace() {
        let dir = tempdir().unwrap();
        let store = UserSetStore::new(dir.path().join("banned.json"));
        assert!(store.insert(42).unwrap());
        assert!(store.contains(42));
        assert!(store.remove(42).unwrap());
        assert!(!store.contains(42));
        assert!(!store.remove(42).unwrap());
    }

    #[test]
    fn double_insert_keeps_one_entry() {
        let dir = tempdir().unwrap();
        let store = UserSetStore::new(dir.path().join("verified.json"));
        assert!(store.insert(7).unwrap());
        assert!(!store.insert(7).unwrap());
        assert_eq!(store.all(), vec![7]);
    }

    #[test]
    fn survives_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("verified.json");
        UserSetStore::new(&path).insert(9).unwrap();
        let reopened = UserSetStore::new(&path);
        assert!(reopened.contains(9));
    }
}
