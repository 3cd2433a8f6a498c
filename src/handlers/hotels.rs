use actix_web::{web, HttpRequest, HttpResponse};

use super::multipart::read_form;
use crate::error::ApiResult;
use crate::service::HotelService;

pub async fn get_hotels(service: web::Data<HotelService>) -> HttpResponse {
    HttpResponse::Ok().json(service.list().await)
}

pub async fn get_hotel(
    service: web::Data<HotelService>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let slug = path.into_inner();
    let hotel = service.get_by_slug(&slug).await?;
    Ok(HttpResponse::Ok().json(hotel))
}

pub async fn create_hotel(
    service: web::Data<HotelService>,
    req: HttpRequest,
    payload: web::Payload,
) -> ApiResult<HttpResponse> {
    let form = read_form(&req, payload, service.images()).await?;
    let hotel = service.create(form).await?;
    Ok(HttpResponse::Created().json(hotel))
}

pub async fn update_hotel(
    service: web::Data<HotelService>,
    path: web::Path<String>,
    req: HttpRequest,
    payload: web::Payload,
) -> ApiResult<HttpResponse> {
    let slug = path.into_inner();
    let form = read_form(&req, payload, service.images()).await?;
    let hotel = service.update(&slug, form).await?;
    Ok(HttpResponse::Ok().json(hotel))
}

pub async fn delete_hotel(
    service: web::Data<HotelService>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let slug = path.into_inner();
    service.delete(&slug).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Hotel deleted successfully",
        "slug": slug
    })))
}

pub async fn upload_images(
    service: web::Data<HotelService>,
    path: web::Path<String>,
    req: HttpRequest,
    payload: web::Payload,
) -> ApiResult<HttpResponse> {
    let slug = path.into_inner();
    let form = read_form(&req, payload, service.images()).await?;
    let images = service.append_images(&slug, form.images).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Images uploaded successfully",
        "images": images
    })))
}
