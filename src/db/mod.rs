//! Persistence of the hotel collection as a single document.
//!
//! Every save rewrites the whole collection; there is no versioning and the
//! last writer wins. Callers serialize their own load-modify-save cycles.

mod file;
mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::Hotel;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait HotelStore: Send + Sync {
    /// The full collection in storage order.
    ///
    /// A missing or corrupt document reads as empty; this never fails.
    async fn load(&self) -> Vec<Hotel>;

    /// Replace the stored collection with `hotels`.
    async fn save(&self, hotels: &[Hotel]) -> StoreResult<()>;
}
