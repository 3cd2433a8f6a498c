//! Conversion of multipart form fields into create/update payloads.
//!
//! Forms carry everything as text. Empty or unparseable values count as
//! "not provided"; on update a numeric zero does too, so existing clients
//! that send blank fields never wipe data.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use validator::Validate;

use super::hotel::{HotelPatch, RoomInput};
use crate::error::{ApiError, ApiResult};
use crate::images::{ImageUpload, MAX_IMAGES_PER_REQUEST};

/// Text field names a hotel form understands.
pub const FORM_FIELDS: [&str; 11] = [
    "title",
    "description",
    "guest_count",
    "bedroom_count",
    "bathroom_count",
    "amenities",
    "host_information",
    "address",
    "latitude",
    "longitude",
    "rooms",
];

/// Text fields and image parts of one request.
#[derive(Debug, Default)]
pub struct HotelForm {
    pub fields: HashMap<String, String>,
    pub images: Vec<ImageUpload>,
}

#[derive(Debug, Validate)]
pub struct NewHotel {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    pub guest_count: u32,
    pub bedroom_count: u32,
    pub bathroom_count: u32,
    pub amenities: Vec<String>,
    pub host_information: Map<String, Value>,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub rooms: Vec<RoomInput>,
    #[validate(length(min = 1, max = 10))]
    pub images: Vec<ImageUpload>,
}

impl HotelForm {
    pub fn into_new_hotel(self) -> ApiResult<NewHotel> {
        let new_hotel = NewHotel {
            title: self.text("title").unwrap_or_default(),
            description: self.text("description").unwrap_or_default(),
            guest_count: self.count("guest_count").unwrap_or(0),
            bedroom_count: self.count("bedroom_count").unwrap_or(0),
            bathroom_count: self.count("bathroom_count").unwrap_or(0),
            amenities: self.json("amenities")?.unwrap_or_default(),
            host_information: self.json("host_information")?.unwrap_or_default(),
            address: self.text("address").unwrap_or_default(),
            latitude: self.coordinate("latitude").unwrap_or(0.0),
            longitude: self.coordinate("longitude").unwrap_or(0.0),
            rooms: self.json("rooms")?.unwrap_or_default(),
            images: self.images,
        };
        new_hotel.validate()?;
        Ok(new_hotel)
    }

    /// Build an update. Image paths are filled in once uploads are written.
    pub fn into_patch(self) -> ApiResult<(HotelPatch, Vec<ImageUpload>)> {
        if self.images.len() > MAX_IMAGES_PER_REQUEST {
            return Err(ApiError::Upload(format!(
                "At most {MAX_IMAGES_PER_REQUEST} images per request"
            )));
        }
        let patch = HotelPatch {
            title: self.text("title"),
            description: self.text("description"),
            guest_count: self.count("guest_count").filter(|n| *n != 0),
            bedroom_count: self.count("bedroom_count").filter(|n| *n != 0),
            bathroom_count: self.count("bathroom_count").filter(|n| *n != 0),
            amenities: self.json("amenities")?,
            host_information: self.json("host_information")?,
            address: self.text("address"),
            latitude: self.coordinate("latitude").filter(|f| *f != 0.0),
            longitude: self.coordinate("longitude").filter(|f| *f != 0.0),
            rooms: self.json("rooms")?,
            images: None,
        };
        Ok((patch, self.images))
    }

    fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(String::from)
    }

    fn count(&self, name: &str) -> Option<u32> {
        self.text(name).as_deref().and_then(parse_count)
    }

    fn coordinate(&self, name: &str) -> Option<f64> {
        self.text(name)
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|f| f.is_finite())
    }

    fn json<T: DeserializeOwned>(&self, name: &str) -> ApiResult<Option<T>> {
        match self.text(name) {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| ApiError::Validation(format!("{name} is not valid JSON: {e}"))),
            None => Ok(None),
        }
    }
}

/// Leading-integer parse: `"3"` and `"3.7"` give 3; negatives and text give `None`.
pub fn parse_count(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<u32>() {
        return Some(n);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite() && *f >= 0.0 && *f <= f64::from(u32::MAX))
        .map(|f| f.trunc() as u32)
}
