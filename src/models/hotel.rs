use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::slug::{base_slug, unique_slug};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Hotel {
    #[serde(alias = "hotel_id")]
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub guest_count: u32,
    #[serde(default)]
    pub bedroom_count: u32,
    #[serde(default)]
    pub bathroom_count: u32,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub host_information: Map<String, Value>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Room {
    pub hotel_slug: String,
    pub room_slug: String,
    pub room_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_image: Option<String>,
    #[serde(default)]
    pub bedroom_count: u32,
}

/// A room as submitted by clients, before slugs are assigned.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RoomInput {
    pub room_title: String,
    #[serde(default)]
    pub room_image: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub bedroom_count: u32,
}

/// Partial update. `None` keeps the current value.
#[derive(Debug, Default, Clone)]
pub struct HotelPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub guest_count: Option<u32>,
    pub bedroom_count: Option<u32>,
    pub bathroom_count: Option<u32>,
    pub amenities: Option<Vec<String>>,
    pub host_information: Option<Map<String, Value>>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub rooms: Option<Vec<RoomInput>>,
    pub images: Option<Vec<String>>,
}

impl Hotel {
    /// Merge `patch` into this record and refresh `updated_at`.
    ///
    /// Returns the image paths that were dropped by an image replacement.
    pub fn apply(&mut self, patch: HotelPatch, now: DateTime<Utc>) -> Vec<String> {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(count) = patch.guest_count {
            self.guest_count = count;
        }
        if let Some(count) = patch.bedroom_count {
            self.bedroom_count = count;
        }
        if let Some(count) = patch.bathroom_count {
            self.bathroom_count = count;
        }
        if let Some(amenities) = patch.amenities {
            self.amenities = amenities;
        }
        if let Some(host) = patch.host_information {
            self.host_information = host;
        }
        if let Some(address) = patch.address {
            self.address = address;
        }
        if let Some(latitude) = patch.latitude {
            self.latitude = latitude;
        }
        if let Some(longitude) = patch.longitude {
            self.longitude = longitude;
        }
        if let Some(rooms) = patch.rooms {
            self.rooms = build_rooms(&self.slug, rooms);
        }

        let mut replaced = Vec::new();
        if let Some(images) = patch.images {
            replaced = std::mem::replace(&mut self.images, images)
                .into_iter()
                .filter(|old| !self.images.contains(old))
                .collect();
        }

        self.touch(now);
        replaced
    }

    /// Set `updated_at` to `now`, keeping it strictly increasing.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::microseconds(1)
        };
    }
}

/// Attach rooms to `hotel_slug`, giving each a slug unique within the hotel.
pub fn build_rooms(hotel_slug: &str, inputs: Vec<RoomInput>) -> Vec<Room> {
    let mut slugs: Vec<String> = Vec::with_capacity(inputs.len());
    let mut rooms = Vec::with_capacity(inputs.len());
    for input in inputs {
        let taken: HashSet<&str> = slugs.iter().map(String::as_str).collect();
        let room_slug = unique_slug(&base_slug(&input.room_title), &taken);
        slugs.push(room_slug.clone());
        rooms.push(Room {
            hotel_slug: hotel_slug.to_string(),
            room_slug,
            room_title: input.room_title,
            room_image: input.room_image,
            bedroom_count: input.bedroom_count,
        });
    }
    rooms
}

/// Accepts a count as a JSON number or numeric string; anything else is 0.
fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
            .unwrap_or(0),
        Value::String(s) => super::form::parse_count(&s).unwrap_or(0),
        _ => 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Hotel {
        let created = Utc::now();
        Hotel {
            id: "id-1".into(),
            slug: "sunset-inn".into(),
            title: "Sunset Inn".into(),
            description: "desc".into(),
            guest_count: 4,
            bedroom_count: 2,
            bathroom_count: 1,
            amenities: vec!["wifi".into()],
            host_information: json!({"name": "Ana"}).as_object().cloned().unwrap(),
            address: "1 Beach Rd".into(),
            latitude: 40.5,
            longitude: -74.25,
            images: vec!["/images/a.png".into(), "/images/b.png".into()],
            rooms: vec![],
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn empty_patch_only_moves_updated_at() {
        let mut hotel = sample();
        let before = hotel.clone();
        let replaced = hotel.apply(HotelPatch::default(), before.updated_at);

        assert!(replaced.is_empty());
        assert!(hotel.updated_at > before.updated_at);
        hotel.updated_at = before.updated_at;
        assert_eq!(hotel, before);
    }

    #[test]
    fn partial_patch_keeps_other_fields() {
        let mut hotel = sample();
        let before = hotel.clone();
        let patch = HotelPatch {
            guest_count: Some(6),
            address: Some("2 Hill St".into()),
            ..Default::default()
        };
        hotel.apply(patch, Utc::now());

        assert_eq!(hotel.guest_count, 6);
        assert_eq!(hotel.address, "2 Hill St");
        assert_eq!(hotel.title, before.title);
        assert_eq!(hotel.amenities, before.amenities);
        assert_eq!(hotel.host_information, before.host_information);
        assert_eq!(hotel.latitude, before.latitude);
        assert_eq!(hotel.images, before.images);
        assert_eq!(hotel.slug, before.slug);
    }

    #[test]
    fn title_change_keeps_slug() {
        let mut hotel = sample();
        let patch = HotelPatch {
            title: Some("Sunrise Lodge".into()),
            ..Default::default()
        };
        hotel.apply(patch, Utc::now());
        assert_eq!(hotel.title, "Sunrise Lodge");
        assert_eq!(hotel.slug, "sunset-inn");
    }

    #[test]
    fn collections_replace_wholesale() {
        let mut hotel = sample();
        let patch = HotelPatch {
            amenities: Some(vec!["pool".into(), "gym".into()]),
            host_information: Some(Map::new()),
            ..Default::default()
        };
        hotel.apply(patch, Utc::now());
        assert_eq!(hotel.amenities, vec!["pool", "gym"]);
        assert!(hotel.host_information.is_empty());
    }

    #[test]
    fn image_replacement_reports_dropped_paths() {
        let mut hotel = sample();
        let patch = HotelPatch {
            images: Some(vec!["/images/b.png".into(), "/images/c.png".into()]),
            ..Default::default()
        };
        let replaced = hotel.apply(patch, Utc::now());
        assert_eq!(hotel.images, vec!["/images/b.png", "/images/c.png"]);
        assert_eq!(replaced, vec!["/images/a.png"]);
    }

    #[test]
    fn touch_is_strictly_increasing_with_stalled_clock() {
        let mut hotel = sample();
        let stalled = hotel.updated_at - Duration::seconds(5);
        let before = hotel.updated_at;
        hotel.touch(stalled);
        assert!(hotel.updated_at > before);
    }

    #[test]
    fn rooms_get_unique_slugs() {
        let inputs = vec![
            RoomInput {
                room_title: "Ocean Suite".into(),
                room_image: None,
                bedroom_count: 2,
            },
            RoomInput {
                room_title: "Ocean Suite".into(),
                room_image: Some("/images/r.png".into()),
                bedroom_count: 1,
            },
        ];
        let rooms = build_rooms("sunset-inn", inputs);
        assert_eq!(rooms[0].room_slug, "ocean-suite");
        assert_eq!(rooms[1].room_slug, "ocean-suite-1");
        assert!(rooms.iter().all(|r| r.hotel_slug == "sunset-inn"));
    }

    #[test]
    fn room_input_accepts_string_counts() {
        let room: RoomInput =
            serde_json::from_value(json!({"room_title": "Loft", "bedroom_count": "3"})).unwrap();
        assert_eq!(room.bedroom_count, 3);

        let room: RoomInput =
            serde_json::from_value(json!({"room_title": "Loft", "bedroom_count": "many"})).unwrap();
        assert_eq!(room.bedroom_count, 0);
    }

    #[test]
    fn legacy_hotel_id_key_is_read() {
        let hotel: Hotel = serde_json::from_value(json!({
            "hotel_id": "h1a2",
            "slug": "old",
            "title": "Old",
        }))
        .unwrap();
        assert_eq!(hotel.id, "h1a2");
        assert!(hotel.images.is_empty());
    }
}
