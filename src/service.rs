//! Create, update and delete flows over the hotel collection.
//!
//! Each write takes the writer lock for its whole load-modify-save cycle, so
//! writes inside one process never lose each other's changes. Nothing guards
//! against a second process writing the same document.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use crate::db::HotelStore;
use crate::error::{ApiError, ApiResult};
use crate::images::{ImageDir, ImageUpload, MAX_IMAGES_PER_REQUEST};
use crate::models::hotel::build_rooms;
use crate::models::slug::{base_slug, new_id, taken_slugs, unique_slug};
use crate::models::{Hotel, HotelForm};

pub struct HotelService {
    store: Arc<dyn HotelStore>,
    images: ImageDir,
    write_lock: Mutex<()>,
}

impl HotelService {
    pub fn new(store: Arc<dyn HotelStore>, images: ImageDir) -> Self {
        Self {
            store,
            images,
            write_lock: Mutex::new(()),
        }
    }

    pub fn images(&self) -> &ImageDir {
        &self.images
    }

    pub async fn list(&self) -> Vec<Hotel> {
        self.store.load().await
    }

    pub async fn get_by_slug(&self, slug: &str) -> ApiResult<Hotel> {
        self.store
            .load()
            .await
            .into_iter()
            .find(|h| h.slug == slug)
            .ok_or(ApiError::NotFound)
    }

    pub async fn create(&self, form: HotelForm) -> ApiResult<Hotel> {
        // 1. Validate before touching the disk
        let new_hotel = form.into_new_hotel()?;

        // 2. Write the images
        let image_paths = self.images.save_all(&new_hotel.images).await?;

        let _guard = self.write_lock.lock().await;
        let mut hotels = self.store.load().await;

        // 3. Assign identity
        let slug = {
            let taken = taken_slugs(hotels.iter().map(|h| h.slug.as_str()));
            unique_slug(&base_slug(&new_hotel.title), &taken)
        };
        let now = Utc::now();
        let hotel = Hotel {
            id: new_id(),
            rooms: build_rooms(&slug, new_hotel.rooms),
            slug,
            title: new_hotel.title,
            description: new_hotel.description,
            guest_count: new_hotel.guest_count,
            bedroom_count: new_hotel.bedroom_count,
            bathroom_count: new_hotel.bathroom_count,
            amenities: new_hotel.amenities,
            host_information: new_hotel.host_information,
            address: new_hotel.address,
            latitude: new_hotel.latitude,
            longitude: new_hotel.longitude,
            images: image_paths,
            created_at: now,
            updated_at: now,
        };

        // 4. Persist, dropping the fresh images if that fails
        hotels.push(hotel.clone());
        if let Err(e) = self.store.save(&hotels).await {
            self.images.remove_all(&hotel.images).await;
            return Err(e.into());
        }

        log::info!("Created hotel {} ({})", hotel.slug, hotel.id);
        Ok(hotel)
    }

    /// Merge `form` into the hotel at `slug`. The slug itself never changes.
    pub async fn update(&self, slug: &str, form: HotelForm) -> ApiResult<Hotel> {
        let (mut patch, uploads) = form.into_patch()?;

        let _guard = self.write_lock.lock().await;
        let mut hotels = self.store.load().await;
        let index = position(&hotels, slug)?;

        let new_images = if uploads.is_empty() {
            Vec::new()
        } else {
            self.images.save_all(&uploads).await?
        };
        if !new_images.is_empty() {
            patch.images = Some(new_images.clone());
        }

        let replaced = hotels[index].apply(patch, Utc::now());
        let updated = hotels[index].clone();

        if let Err(e) = self.store.save(&hotels).await {
            self.images.remove_all(&new_images).await;
            return Err(e.into());
        }

        let orphaned: Vec<String> = replaced
            .into_iter()
            .filter(|path| !hotels.iter().any(|h| h.images.contains(path)))
            .collect();
        self.images.remove_all(&orphaned).await;

        log::info!("Updated hotel {slug}");
        Ok(updated)
    }

    /// Add images to the end of a hotel's image list.
    pub async fn append_images(
        &self,
        slug: &str,
        uploads: Vec<ImageUpload>,
    ) -> ApiResult<Vec<String>> {
        if uploads.is_empty() {
            return Err(ApiError::Validation("At least one image is required".to_string()));
        }
        if uploads.len() > MAX_IMAGES_PER_REQUEST {
            return Err(ApiError::Upload(format!(
                "At most {MAX_IMAGES_PER_REQUEST} images per request"
            )));
        }

        let _guard = self.write_lock.lock().await;
        let mut hotels = self.store.load().await;
        let index = position(&hotels, slug)?;

        let added = self.images.save_all(&uploads).await?;
        let hotel = &mut hotels[index];
        hotel.images.extend(added.iter().cloned());
        hotel.touch(Utc::now());

        if let Err(e) = self.store.save(&hotels).await {
            self.images.remove_all(&added).await;
            return Err(e.into());
        }

        log::info!("Added {} image(s) to hotel {slug}", added.len());
        Ok(added)
    }

    /// Remove the hotel, then its image files (best effort).
    pub async fn delete(&self, slug: &str) -> ApiResult<Hotel> {
        let _guard = self.write_lock.lock().await;
        let mut hotels = self.store.load().await;
        let index = position(&hotels, slug)?;

        let removed = hotels.remove(index);
        self.store.save(&hotels).await?;

        let orphaned: Vec<String> = removed
            .images
            .iter()
            .filter(|path| !hotels.iter().any(|h| h.images.contains(path)))
            .cloned()
            .collect();
        self.images.remove_all(&orphaned).await;

        log::info!("Deleted hotel {slug}");
        Ok(removed)
    }
}

fn position(hotels: &[Hotel], slug: &str) -> ApiResult<usize> {
    hotels
        .iter()
        .position(|h| h.slug == slug)
        .ok_or(ApiError::NotFound)
}
