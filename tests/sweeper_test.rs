use rust_photo_backend::services::file_store::{DiskFileStore, FileStore};
use rust_photo_backend::services::sweeper::RetentionSweeper;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

#[tokio::test]
async fn test_sweep_removes_entries_past_the_threshold() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("stale.png"), b"old output").unwrap();

    let store: Arc<dyn FileStore> = Arc::new(DiskFileStore::new(dir.path()));
    let (_tx, rx) = watch::channel(false);

    // Nothing is an hour old yet; the file survives.
    let sweeper = RetentionSweeper::new(
        store.clone(),
        Duration::from_secs(3600),
        Duration::from_secs(3600),
        rx.clone(),
    );
    assert_eq!(sweeper.sweep_once().await, 0);
    assert!(store.exists("stale.png").await.unwrap());

    // With a near-zero threshold the same file is past its expiry.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let sweeper = RetentionSweeper::new(
        store.clone(),
        Duration::from_secs(3600),
        Duration::from_millis(10),
        rx,
    );
    assert_eq!(sweeper.sweep_once().await, 1);
    assert!(!store.exists("stale.png").await.unwrap());
}

#[tokio::test]
async fn test_sweeper_stops_on_shutdown_signal() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn FileStore> = Arc::new(DiskFileStore::new(dir.path()));
    let (tx, rx) = watch::channel(false);

    let sweeper = RetentionSweeper::new(
        store,
        Duration::from_secs(3600),
        Duration::from_secs(3600),
        rx,
    );
    let handle = tokio::spawn(sweeper.run());

    tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("sweeper did not stop on shutdown")
        .unwrap();
}

#[tokio::test]
async fn test_sweep_tolerates_a_vanished_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().to_path_buf();
    drop(dir);

    let store: Arc<dyn FileStore> = Arc::new(DiskFileStore::new(path));
    let (_tx, rx) = watch::channel(false);
    let sweeper = RetentionSweeper::new(
        store,
        Duration::from_secs(3600),
        Duration::from_secs(3600),
        rx,
    );

    // Listing fails; the sweep logs and reports zero rather than erroring.
    assert_eq!(sweeper.sweep_once().await, 0);
}
