use crate::config::AppConfig;
use crate::services::file_store::DiskFileStore;
use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::sync::Arc;
use tracing::info;

/// Ensure the upload directory exists and hand back the store over it.
/// Single level only; a missing parent is a configuration error. Every
/// request needs this directory, so any failure other than "already
/// exists" is fatal to startup.
pub async fn setup_storage(config: &AppConfig) -> Result<Arc<DiskFileStore>> {
    match tokio::fs::create_dir(&config.upload_dir).await {
        Ok(()) => info!("📁 Created upload directory {}", config.upload_dir.display()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            info!("📁 Using upload directory {}", config.upload_dir.display())
        }
        Err(e) => {
            return Err(e).with_context(|| {
                format!(
                    "Failed to create upload directory {}",
                    config.upload_dir.display()
                )
            });
        }
    }

    Ok(Arc::new(DiskFileStore::new(config.upload_dir.clone())))
}
