use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;

use super::{HotelStore, StoreError, StoreResult};
use crate::models::Hotel;

/// Collection stored as one pretty-printed JSON array.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create the data directory and an empty `[]` document if missing.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let store = Self::new(path);
        store.ensure_parent().await?;
        if tokio::fs::metadata(&store.path).await.is_err() {
            log::info!("Creating empty hotels file at {}", store.path.display());
            tokio::fs::write(&store.path, b"[]")
                .await
                .map_err(|source| io_error(&store.path, source))?;
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn ensure_parent(&self) -> StoreResult<()> {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| io_error(dir, source)),
            _ => Ok(()),
        }
    }

    async fn write(&self, hotels: &[Hotel]) -> StoreResult<()> {
        let data = serde_json::to_vec_pretty(hotels)?;
        self.ensure_parent().await?;

        let path = self.path.clone();
        tokio::task::spawn_blocking(move || atomic_write(&path, &data))
            .await
            .map_err(|e| io_error(&self.path, std::io::Error::new(ErrorKind::Other, e)))?
    }
}

/// Write beside the target and persist over it, so readers never see a
/// partial document. The temp file is unlinked if persisting fails.
fn atomic_write(path: &Path, data: &[u8]) -> StoreResult<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir).map_err(|source| io_error(dir, source))?;
    temp.write_all(data)
        .and_then(|()| temp.as_file().sync_all())
        .map_err(|source| io_error(temp.path(), source))?;
    temp.persist(path).map_err(|e| io_error(path, e.error))?;
    Ok(())
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[async_trait]
impl HotelStore for JsonFileStore {
    async fn load(&self) -> Vec<Hotel> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                log::error!("Error reading hotels data from {}: {e}", self.path.display());
                return Vec::new();
            }
        };

        match serde_json::from_slice(&raw) {
            Ok(hotels) => hotels,
            Err(e) => {
                log::error!(
                    "Hotels data at {} is corrupt, treating as empty: {e}",
                    self.path.display()
                );
                Vec::new()
            }
        }
    }

    async fn save(&self, hotels: &[Hotel]) -> StoreResult<()> {
        let result = self.write(hotels).await;
        if let Err(e) = &result {
            log::error!("Error writing hotels data: {e}");
        }
        result
    }
}
