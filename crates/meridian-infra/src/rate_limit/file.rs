//! JSON file snapshot store.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use meridian_core::ports::{PersistenceError, RateLimitSnapshot, SnapshotStore};

/// Stores the rate limit map as a JSON object in a single file.
///
/// Writes go to `<path>.tmp` first and are renamed over `<path>`, so readers
/// only ever see a complete snapshot.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("rate-limits.json"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SnapshotStore for JsonFileStore {
    async fn init(&self) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        // Creating a directory that already exists succeeds even on a
        // read-only mount, so check with a real write.
        let scratch = self.temp_path();
        fs::write(&scratch, b"{}").await?;
        fs::remove_file(&scratch).await?;
        Ok(())
    }

    async fn load(&self) -> Result<Option<RateLimitSnapshot>, PersistenceError> {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|e| PersistenceError::Corrupt(e.to_string()))
    }

    async fn save(&self, snapshot: &RateLimitSnapshot) -> Result<(), PersistenceError> {
        let data =
            serde_json::to_vec(snapshot).map_err(|e| PersistenceError::Corrupt(e.to_string()))?;

        let temp = self.temp_path();
        fs::write(&temp, &data).await?;
        if let Err(e) = fs::rename(&temp, &self.path).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }
        Ok(())
    }
}
