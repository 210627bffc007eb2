use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncRead;

/// Narrow interface over the shared upload directory. Request handlers and
/// the retention sweeper both go through this; the directory itself stays an
/// unsynchronized shared resource, so callers must tolerate files vanishing
/// between calls.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Root directory backing this store
    fn root(&self) -> &Path;

    /// Absolute-or-relative path of a named entry, joined with the root
    fn path_of(&self, name: &str) -> PathBuf {
        self.root().join(name)
    }

    /// Stream the reader's bytes into a new entry, returning the byte count
    async fn put_stream<'a>(
        &self,
        name: &str,
        reader: Box<dyn AsyncRead + Unpin + Send + 'a>,
    ) -> Result<u64>;

    async fn exists(&self, name: &str) -> Result<bool>;

    async fn delete(&self, name: &str) -> Result<()>;

    /// Names of all flat entries whose mtime is older than `max_age`.
    /// Entries whose metadata cannot be read are skipped with a warning.
    async fn list_older_than(&self, max_age: Duration) -> Result<Vec<String>>;
}

pub struct DiskFileStore {
    root: PathBuf,
}

impl DiskFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl FileStore for DiskFileStore {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn put_stream<'a>(
        &self,
        name: &str,
        mut reader: Box<dyn AsyncRead + Unpin + Send + 'a>,
    ) -> Result<u64> {
        let path = self.path_of(name);
        let mut file = tokio::fs::File::create(&path)
            .await
            .with_context(|| format!("Failed to create {}", path.display()))?;

        let written = tokio::io::copy(&mut reader, &mut file)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        Ok(written)
    }

    async fn exists(&self, name: &str) -> Result<bool> {
        Ok(tokio::fs::try_exists(self.path_of(name)).await?)
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let path = self.path_of(name);
        tokio::fs::remove_file(&path)
            .await
            .with_context(|| format!("Failed to delete {}", path.display()))?;
        Ok(())
    }

    async fn list_older_than(&self, max_age: Duration) -> Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.root)
            .await
            .with_context(|| format!("Failed to list {}", self.root.display()))?;

        let mut expired = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();

            let metadata = match entry.metadata().await {
                Ok(m) => m,
                Err(e) => {
                    tracing::warn!("Skipping {}: failed to stat: {}", name, e);
                    continue;
                }
            };
            if !metadata.is_file() {
                continue;
            }

            match metadata.modified().ok().and_then(|m| m.elapsed().ok()) {
                Some(age) if age > max_age => expired.push(name),
                Some(_) => {}
                None => tracing::warn!("Skipping {}: mtime unavailable", name),
            }
        }

        Ok(expired)
    }
}

/// In-memory store with injectable entry ages (for sweeper tests)
#[cfg(test)]
pub struct MemoryFileStore {
    root: PathBuf,
    entries: std::sync::Mutex<std::collections::HashMap<String, Duration>>,
    failing_deletes: std::sync::Mutex<std::collections::HashSet<String>>,
}

#[cfg(test)]
impl MemoryFileStore {
    pub fn new() -> Self {
        Self {
            root: PathBuf::from("mem"),
            entries: std::sync::Mutex::new(std::collections::HashMap::new()),
            failing_deletes: std::sync::Mutex::new(std::collections::HashSet::new()),
        }
    }

    pub fn insert_with_age(&self, name: &str, age: Duration) {
        self.entries.lock().unwrap().insert(name.to_string(), age);
    }

    pub fn fail_delete_of(&self, name: &str) {
        self.failing_deletes.lock().unwrap().insert(name.to_string());
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.lock().unwrap().keys().cloned().collect()
    }
}

#[cfg(test)]
#[async_trait]
impl FileStore for MemoryFileStore {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn put_stream<'a>(
        &self,
        name: &str,
        mut reader: Box<dyn AsyncRead + Unpin + Send + 'a>,
    ) -> Result<u64> {
        use tokio::io::AsyncReadExt;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        self.insert_with_age(name, Duration::ZERO);
        Ok(buf.len() as u64)
    }

    async fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.entries.lock().unwrap().contains_key(name))
    }

    async fn delete(&self, name: &str) -> Result<()> {
        if self.failing_deletes.lock().unwrap().contains(name) {
            anyhow::bail!("delete of {} is wired to fail", name);
        }
        if self.entries.lock().unwrap().remove(name).is_none() {
            anyhow::bail!("{} not found", name);
        }
        Ok(())
    }

    async fn list_older_than(&self, max_age: Duration) -> Result<Vec<String>> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, age)| **age > max_age)
            .map(|(name, _)| name.clone())
            .collect())
    }
}
