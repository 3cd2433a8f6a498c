use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use super::{HotelStore, StoreResult};
use crate::models::Hotel;

/// In-memory store, used by tests and throwaway runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    hotels: Mutex<Vec<Hotel>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hotels(hotels: Vec<Hotel>) -> Self {
        Self {
            hotels: Mutex::new(hotels),
        }
    }
}

#[async_trait]
impl HotelStore for MemoryStore {
    async fn load(&self) -> Vec<Hotel> {
        self.hotels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn save(&self, hotels: &[Hotel]) -> StoreResult<()> {
        *self.hotels.lock().unwrap_or_else(PoisonError::into_inner) = hotels.to_vec();
        Ok(())
    }
}
