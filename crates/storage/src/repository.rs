use async_trait::async_trait;
use exam_core::timer::TimerSnapshot;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Durable key-value store for the running exam timer.
///
/// A session writes its snapshot under a fixed key and reads it once at
/// startup. No other party writes the key.
#[async_trait]
pub trait TimerSnapshotRepository: Send + Sync {
    /// Fetch the snapshot stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    async fn load_snapshot(&self, key: &str) -> Result<Option<TimerSnapshot>, StorageError>;

    /// Insert or replace the snapshot stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be stored.
    async fn save_snapshot(&self, key: &str, snapshot: &TimerSnapshot) -> Result<(), StorageError>;

    /// Remove the snapshot under `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be written.
    async fn delete_snapshot(&self, key: &str) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and offline runs.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    snapshots: Arc<Mutex<HashMap<String, TimerSnapshot>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TimerSnapshotRepository for InMemoryRepository {
    async fn load_snapshot(&self, key: &str) -> Result<Option<TimerSnapshot>, StorageError> {
        let guard = self
            .snapshots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).copied())
    }

    async fn save_snapshot(&self, key: &str, snapshot: &TimerSnapshot) -> Result<(), StorageError> {
        let mut guard = self
            .snapshots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_string(), *snapshot);
        Ok(())
    }

    async fn delete_snapshot(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .snapshots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub timer_snapshots: Arc<dyn TimerSnapshotRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let timer_snapshots: Arc<dyn TimerSnapshotRepository> = Arc::new(InMemoryRepository::new());
        Self { timer_snapshots }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn snapshot_round_trips_and_deletes() {
        let repo = InMemoryRepository::new();
        assert!(repo.load_snapshot("exam").await.unwrap().is_none());

        let snapshot = TimerSnapshot::new(540, false, 1_700_000_000_000);
        repo.save_snapshot("exam", &snapshot).await.unwrap();
        assert_eq!(repo.load_snapshot("exam").await.unwrap(), Some(snapshot));

        let newer = TimerSnapshot::new(510, true, 1_700_000_030_000);
        repo.save_snapshot("exam", &newer).await.unwrap();
        assert_eq!(repo.load_snapshot("exam").await.unwrap(), Some(newer));

        repo.delete_snapshot("exam").await.unwrap();
        repo.delete_snapshot("exam").await.unwrap();
        assert!(repo.load_snapshot("exam").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn keys_are_isolated() {
        let storage = Storage::in_memory();
        let snapshot = TimerSnapshot::new(10, false, 0);
        storage.timer_snapshots.save_snapshot("a", &snapshot).await.unwrap();
        assert!(storage.timer_snapshots.load_snapshot("b").await.unwrap().is_none());
    }
}
