use async_trait::async_trait;
use exam_core::timer::TimerSnapshot;

use super::SqliteRepository;
use super::mapping::{map_snapshot_row, paused_to_i64};
use crate::repository::{StorageError, TimerSnapshotRepository};

#[async_trait]
impl TimerSnapshotRepository for SqliteRepository {
    async fn load_snapshot(&self, key: &str) -> Result<Option<TimerSnapshot>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT remaining_seconds, paused, saved_at_ms
            FROM timer_snapshots
            WHERE session_key = ?1
            ",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        row.as_ref().map(map_snapshot_row).transpose()
    }

    async fn save_snapshot(&self, key: &str, snapshot: &TimerSnapshot) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO timer_snapshots (session_key, remaining_seconds, paused, saved_at_ms)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(session_key) DO UPDATE SET
                remaining_seconds = excluded.remaining_seconds,
                paused = excluded.paused,
                saved_at_ms = excluded.saved_at_ms
            ",
        )
        .bind(key)
        .bind(i64::from(snapshot.remaining_seconds))
        .bind(paused_to_i64(snapshot.paused))
        .bind(snapshot.saved_at_epoch_millis)
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        tracing::trace!(
            key,
            remaining = snapshot.remaining_seconds,
            paused = snapshot.paused,
            "timer snapshot saved"
        );
        Ok(())
    }

    async fn delete_snapshot(&self, key: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM timer_snapshots WHERE session_key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;
        Ok(())
    }
}
