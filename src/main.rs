use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{http, middleware, web, App, HttpServer};
use dotenv::dotenv;
use env_logger::Env;

use hotel_listings::db::JsonFileStore;
use hotel_listings::handlers;
use hotel_listings::images::ImageDir;
use hotel_listings::{AppConfig, HotelService};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger and environment
    dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AppConfig::from_env();

    log::info!("Opening hotels data at {}", config.hotels_file.display());
    let store = JsonFileStore::open(&config.hotels_file)
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    std::fs::create_dir_all(&config.images_dir)?;

    let images = ImageDir::new(&config.images_dir).with_max_bytes(config.max_image_bytes);
    let service = web::Data::new(HotelService::new(Arc::new(store), images));

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    let images_dir = config.images_dir.clone();
    let cors_origin = config.cors_origin.clone();
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&cors_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allowed_headers(vec![http::header::CONTENT_TYPE, http::header::ACCEPT])
            .max_age(3600);

        App::new()
            .app_data(service.clone())
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .configure(handlers::configure(images_dir.clone()))
            .default_service(web::to(handlers::not_found))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
