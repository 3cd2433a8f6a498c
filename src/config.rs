use std::env;
use std::path::PathBuf;

use crate::images::DEFAULT_MAX_IMAGE_BYTES;

/// Runtime settings read from the environment (after `.env` is loaded).
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub hotels_file: PathBuf,
    pub images_dir: PathBuf,
    pub cors_origin: String,
    pub max_image_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = PathBuf::from("data");
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            hotels_file: data_dir.join("hotels.json"),
            images_dir: data_dir.join("images"),
            cors_origin: "http://localhost:3006".to_string(),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let data_dir = lookup("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data"));

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or("PORT", lookup("PORT"), defaults.port),
            hotels_file: lookup("HOTELS_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join("hotels.json")),
            images_dir: lookup("IMAGES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join("images")),
            cors_origin: lookup("CORS_ORIGIN").unwrap_or(defaults.cors_origin),
            max_image_bytes: parse_or(
                "MAX_IMAGE_BYTES",
                lookup("MAX_IMAGE_BYTES"),
                defaults.max_image_bytes,
            ),
        }
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
{
    match raw {
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring invalid {key}={value:?}, using {default}");
            default
        }),
        None => default,
    }
}
