use crate::services::file_store::FileStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;

/// Periodic retention task over the upload directory. Files older than
/// `max_age` are deleted on every pass; the first pass runs one full
/// `interval` after start. Sweeps are best-effort and non-transactional:
/// a failed delete is logged and retried on the next pass, and nothing
/// here coordinates with in-flight requests touching the same files.
pub struct RetentionSweeper {
    store: Arc<dyn FileStore>,
    interval: Duration,
    max_age: Duration,
    shutdown: watch::Receiver<bool>,
}

impl RetentionSweeper {
    pub fn new(
        store: Arc<dyn FileStore>,
        interval: Duration,
        max_age: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            store,
            interval,
            max_age,
            shutdown,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(
            "🧹 Retention sweeper started (every {:?}, expiry {:?})",
            self.interval,
            self.max_age
        );

        loop {
            tokio::select! {
                _ = self.shutdown.changed() => {
                    tracing::info!("🛑 Retention sweeper shutting down");
                    break;
                }
                _ = sleep(self.interval) => {
                    let removed = self.sweep_once().await;
                    tracing::info!("✅ Retention sweep completed, {} file(s) removed", removed);
                }
            }
        }
    }

    /// One full pass over the store; returns how many entries were removed
    pub async fn sweep_once(&self) -> usize {
        let expired = match self.store.list_older_than(self.max_age).await {
            Ok(names) => names,
            Err(e) => {
                tracing::warn!("Retention sweep could not list entries: {}", e);
                return 0;
            }
        };

        let mut removed = 0;
        for name in expired {
            match self.store.delete(&name).await {
                Ok(()) => {
                    tracing::info!("Expired file removed: {}", name);
                    removed += 1;
                }
                Err(e) => {
                    // Retried implicitly on the next pass if it is still old enough.
                    tracing::warn!("Failed to delete expired file {}: {}", name, e);
                }
            }
        }
        removed
    }
}
