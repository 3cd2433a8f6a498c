pub mod hotels;
pub mod multipart;

use std::path::PathBuf;

use actix_files::Files;
use actix_web::dev::{fn_service, ServiceRequest, ServiceResponse};
use actix_web::{guard, web, HttpResponse};

use crate::error::ErrorResponse;
use crate::images::PUBLIC_PREFIX;

/// Register the image mount and hotel routes.
///
/// Every resource falls back to the JSON 404, so a known path with an
/// unsupported method answers the same way as an unknown path.
pub fn configure(images_dir: PathBuf) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.service(
            Files::new(PUBLIC_PREFIX, images_dir)
                .guard(guard::Any(guard::Get()).or(guard::Head()))
                // only plain file names, never the directory itself
                .path_filter(|path, _| path.components().count() == 1)
                .default_handler(fn_service(|req: ServiceRequest| async {
                    let (req, _) = req.into_parts();
                    Ok::<_, actix_web::Error>(ServiceResponse::new(req, route_not_found()))
                })),
        )
        .service(
            web::resource("/")
                .route(web::get().to(hotels::get_hotels))
                .route(web::post().to(hotels::create_hotel))
                .default_service(web::to(not_found)),
        )
        .service(
            web::resource("/{slug}")
                .route(web::get().to(hotels::get_hotel))
                .route(web::put().to(hotels::update_hotel))
                .route(web::delete().to(hotels::delete_hotel))
                .default_service(web::to(not_found)),
        )
        .service(
            web::resource("/{slug}/images")
                .route(web::post().to(hotels::upload_images))
                .default_service(web::to(not_found)),
        );
    }
}

/// Fallback for unmatched routes.
pub async fn not_found() -> HttpResponse {
    route_not_found()
}

fn route_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse {
        error: "Route not found".to_string(),
    })
}
