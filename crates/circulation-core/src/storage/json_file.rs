//! Single JSON document snapshot store.
//!
//! The whole dataset lives in one pretty-printed JSON file, replaced on every
//! commit via temp file + rename. Commits hold an exclusive OS lock on a
//! sidecar `<file>.lock` from the version check until the rename lands, so
//! compare-and-swap holds across handles and processes alike. Readers never
//! take the lock; the rename keeps them from seeing a half-written file.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use fs4::fs_std::FileExt;

use crate::error::{LedgerError, Result};
use crate::storage::traits::{CommitOutcome, SnapshotStore};
use crate::storage::types::Snapshot;

pub struct JsonFileStore {
    path: PathBuf,
    lock_path: PathBuf,
}

/// Exclusive hold on the sidecar lock file. Released on drop.
struct CommitLock {
    _file: File,
}

impl JsonFileStore {
    /// Open (lazily) the JSON store at `path`. The file is created on the
    /// first commit.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut lock_name = OsString::from(path.as_os_str());
        lock_name.push(".lock");
        Self {
            path,
            lock_path: PathBuf::from(lock_name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_commits(&self) -> Result<CommitLock> {
        if let Some(parent) = self.lock_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)
            .map_err(|e| {
                LedgerError::StoreUnavailable(format!(
                    "Failed to open {}: {}",
                    self.lock_path.display(),
                    e
                ))
            })?;
        // Blocks until any other writer, in this process or another, is done.
        FileExt::lock_exclusive(&file).map_err(|e| {
            LedgerError::StoreUnavailable(format!(
                "Failed to lock {}: {}",
                self.lock_path.display(),
                e
            ))
        })?;
        Ok(CommitLock { _file: file })
    }

    fn read_snapshot(&self) -> Result<Snapshot> {
        let contents = match fs::read(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Snapshot::default()),
            Err(err) => {
                return Err(LedgerError::StoreUnavailable(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    err
                )))
            }
        };
        serde_json::from_slice(&contents).map_err(|e| {
            LedgerError::StoreUnavailable(format!(
                "Failed to parse {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<Snapshot> {
        self.read_snapshot()
    }

    fn commit(&self, expected: u64, next: &Snapshot) -> Result<CommitOutcome> {
        let _lock = self.lock_commits()?;

        let current = self.read_snapshot()?.version;
        if current != expected {
            return Ok(CommitOutcome::Conflict { current });
        }

        let mut stored = next.clone();
        stored.version = expected + 1;
        let bytes = serde_json::to_vec_pretty(&stored)?;
        crate::fs::write_atomic(&self.path, &bytes).map_err(|e| {
            LedgerError::StoreUnavailable(format!(
                "Failed to write {}: {}",
                self.path.display(),
                e
            ))
        })?;

        Ok(CommitOutcome::Committed {
            version: stored.version,
        })
    }

    fn backend(&self) -> &'static str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_loads_empty_snapshot() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("library.json"));
        assert_eq!(store.load().unwrap(), Snapshot::default());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_commit_persists_across_handles() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("library.json");

        let store = JsonFileStore::open(&path);
        let mut next = store.load().unwrap();
        next.counters.next_transaction_id = 12;
        assert_eq!(
            store.commit(0, &next).unwrap(),
            CommitOutcome::Committed { version: 1 }
        );

        let reopened = JsonFileStore::open(&path);
        let loaded = reopened.load().unwrap();
        assert_eq!(loaded.version, 1);
        assert_eq!(loaded.counters.next_transaction_id, 12);
    }

    #[test]
    fn test_stale_version_conflicts() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("library.json"));
        let base = store.load().unwrap();
        store.commit(0, &base).unwrap();

        assert_eq!(
            store.commit(0, &base).unwrap(),
            CommitOutcome::Conflict { current: 1 }
        );
    }

    #[test]
    fn test_separate_handles_cannot_both_commit_same_version() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("library.json");
        let first = JsonFileStore::open(&path);
        let second = JsonFileStore::open(&path);

        let mut a = first.load().unwrap();
        a.counters.next_book_id = 5;
        let mut b = second.load().unwrap();
        b.counters.next_member_id = 9;

        assert_eq!(
            first.commit(0, &a).unwrap(),
            CommitOutcome::Committed { version: 1 }
        );
        assert_eq!(
            second.commit(0, &b).unwrap(),
            CommitOutcome::Conflict { current: 1 }
        );
        assert_eq!(second.load().unwrap().counters.next_book_id, 5);
        assert!(dir.path().join("library.json.lock").exists());
    }

    #[test]
    fn test_commit_waits_for_lock_held_elsewhere() {
        use std::sync::mpsc;
        use std::thread;
        use std::time::Duration;

        let dir = tempdir().unwrap();
        let path = dir.path().join("library.json");
        let holder = JsonFileStore::open(&path);
        let lock = holder.lock_commits().unwrap();

        let (tx, rx) = mpsc::channel();
        let writer_path = path.clone();
        let writer = thread::spawn(move || {
            let store = JsonFileStore::open(writer_path);
            let outcome = store.commit(0, &Snapshot::default()).unwrap();
            tx.send(outcome).unwrap();
        });

        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
        drop(lock);
        assert_eq!(
            rx.recv_timeout(Duration::from_secs(10)).unwrap(),
            CommitOutcome::Committed { version: 1 }
        );
        writer.join().unwrap();
    }

    #[test]
    fn test_corrupt_file_is_store_unavailable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("library.json");
        fs::write(&path, b"not json").unwrap();

        let err = JsonFileStore::open(&path).load().unwrap_err();
        assert!(matches!(err, LedgerError::StoreUnavailable(_)));
    }
}
