use exam_core::timer::TimerSnapshot;
use storage::repository::{Storage, TimerSnapshotRepository};
use storage::sqlite::SqliteRepository;

#[tokio::test]
async fn sqlite_snapshot_upserts_and_deletes() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_snapshots?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert!(repo.load_snapshot("exam").await.unwrap().is_none());

    let first = TimerSnapshot::new(10_800, false, 1_700_000_000_000);
    repo.save_snapshot("exam", &first).await.unwrap();
    assert_eq!(repo.load_snapshot("exam").await.unwrap(), Some(first));

    let second = TimerSnapshot::new(10_770, true, 1_700_000_030_000);
    repo.save_snapshot("exam", &second).await.unwrap();
    assert_eq!(repo.load_snapshot("exam").await.unwrap(), Some(second));

    repo.delete_snapshot("exam").await.unwrap();
    assert!(repo.load_snapshot("exam").await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_migrate_twice?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.migrate().await.expect("second migrate");

    let snapshot = TimerSnapshot::new(5, false, 0);
    repo.save_snapshot("k", &snapshot).await.unwrap();
    assert_eq!(repo.load_snapshot("k").await.unwrap(), Some(snapshot));
}

#[tokio::test]
async fn storage_sqlite_wires_snapshot_repository() {
    let storage = Storage::sqlite("sqlite:file:memdb_storage?mode=memory&cache=shared")
        .await
        .expect("storage");
    let snapshot = TimerSnapshot::new(42, true, 99);
    storage
        .timer_snapshots
        .save_snapshot("session", &snapshot)
        .await
        .unwrap();
    assert_eq!(
        storage.timer_snapshots.load_snapshot("session").await.unwrap(),
        Some(snapshot)
    );
}
