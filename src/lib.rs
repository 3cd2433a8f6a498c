//! Hotel listing service: CRUD over a flat JSON document plus image uploads.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod images;
pub mod models;
pub mod service;

pub use config::AppConfig;
pub use error::{ApiError, ApiResult};
pub use service::HotelService;
