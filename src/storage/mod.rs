//! File-backed persistent stores.
//!
//! Every store keeps one small JSON document on disk and follows the same
//! cycle: load the whole document, mutate it in memory, write it back
//! atomically (temp file + rename). A per-store mutex serializes the cycle so
//! concurrent webhook deliveries cannot lose each other's writes. A missing
//! file loads as the empty collection; an unreadable one is logged and
//! treated the same way.

mod rate_limit;
mod routes;
mod user_set;

pub use rate_limit::RateLimiter;
pub use routes::{RouteEntry, RouteTable};
pub use user_set::UserSetStore;

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors surfaced by store operations.
///
/// Callers treat these as best-effort: a failed write is logged and the
/// request continues. It is never shown to the end user.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io: {0}")]
    Io(#[from] io::Error),

    #[error("store serialization: {0}")]
    Json(#[from] serde_json::Error),
}

/// Load a JSON document, returning the default value when the file is absent.
pub(crate) fn load_json<T>(path: &Path) -> Result<T, StoreError>
where
    T: DeserializeOwned + Default,
{
    match fs::read(path) {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(e.into()),
    }
}

/// Write a JSON document atomically: temp file in the same directory, then
/// rename over the target.
pub(crate) fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let tmp = tmp_path(path);
    fs::write(&tmp, serde_json::to_vec(value)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub(crate) fn tmp_path(path: &Path) -> PathBuf {
    let mut os: OsString = path.as_os_str().to_owned();
    os.push(".tmp");
    PathBuf::from(os)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_default() {
        let dir = tempdir().unwrap();
        let loaded: Vec<u64> = load_json(&dir.path().join("nope.json")).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn save_then_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ids.json");
        save_json(&path, &vec![1u64, 2, 3]).unwrap();
        let loaded: Vec<u64> = load_json(&path).unwrap();
        assert_eq!(loaded, vec![1, 2, 3]);
        // the temp file must not linger
        assert!(!tmp_path(&path).exists());
    }
}
