use actix_multipart::{Field, Multipart, MultipartError};
use actix_web::web::{self, BytesMut};
use actix_web::HttpRequest;
use futures_util::TryStreamExt;

use crate::error::{ApiError, ApiResult};
use crate::images::{ImageDir, ImageUpload, MAX_IMAGES_PER_REQUEST};
use crate::models::form::FORM_FIELDS;
use crate::models::HotelForm;

/// Largest text field accepted.
const MAX_TEXT_BYTES: usize = 64 * 1024;

fn is_image_field(name: &str) -> bool {
    name == "images" || name == "images[]"
}

/// Read a multipart request into text fields and image parts.
///
/// Image parts are type-checked here so a bad file fails the request before
/// anything is written.
pub async fn read_form(
    req: &HttpRequest,
    payload: web::Payload,
    images: &ImageDir,
) -> ApiResult<HotelForm> {
    let mut multipart = Multipart::new(req.headers(), payload);
    let mut form = HotelForm::default();

    while let Some(mut field) = multipart.try_next().await.map_err(upload_error)? {
        let disposition = field.content_disposition();
        let name = disposition
            .and_then(|d| d.get_name())
            .unwrap_or_default()
            .to_string();
        let file_name = disposition
            .and_then(|d| d.get_filename())
            .filter(|f| !f.is_empty())
            .map(String::from);

        if is_image_field(&name) {
            let bytes = read_image(&mut field, images).await?;
            // browsers send an empty part for an untouched file input
            if bytes.is_empty() && file_name.is_none() {
                continue;
            }
            if form.images.len() == MAX_IMAGES_PER_REQUEST {
                return Err(ApiError::Upload(format!(
                    "At most {MAX_IMAGES_PER_REQUEST} images per request"
                )));
            }
            let upload = ImageUpload {
                file_name,
                content_type: field.content_type().cloned(),
                bytes: bytes.freeze(),
            };
            upload.checked_extension()?;
            form.images.push(upload);
        } else if file_name.is_some() {
            return Err(ApiError::Upload(format!("Unexpected file field: {name}")));
        } else if !FORM_FIELDS.contains(&name.as_str()) {
            log::debug!("Skipping unknown form field {name:?}");
            skip_field(&mut field).await?;
        } else {
            let bytes = read_text(&mut field).await?;
            let value = String::from_utf8(bytes.to_vec())
                .map_err(|_| ApiError::Validation(format!("{name} is not valid UTF-8")))?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

async fn read_image(field: &mut Field, images: &ImageDir) -> ApiResult<BytesMut> {
    let mut buf = BytesMut::new();
    while let Some(chunk) = field.try_next().await.map_err(upload_error)? {
        images.check_size(buf.len() + chunk.len())?;
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}

async fn read_text(field: &mut Field) -> ApiResult<BytesMut> {
    let mut buf = BytesMut::new();
    while let Some(chunk) = field.try_next().await.map_err(upload_error)? {
        if buf.len() + chunk.len() > MAX_TEXT_BYTES {
            return Err(ApiError::Validation("Form field too large".to_string()));
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}

async fn skip_field(field: &mut Field) -> ApiResult<()> {
    while field.try_next().await.map_err(upload_error)?.is_some() {}
    Ok(())
}

fn upload_error(e: MultipartError) -> ApiError {
    ApiError::Upload(format!("Invalid multipart body: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header;
    use actix_web::{test, FromRequest};

    const BOUNDARY: &str = "form-test-boundary";

    async fn parse(fields: &[(String, String)]) -> ApiResult<HotelForm> {
        let mut body = String::new();
        for (name, value) in fields {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        let (req, mut payload) = test::TestRequest::post()
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(body)
            .to_http_parts();
        let payload = web::Payload::from_request(&req, &mut payload).await.unwrap();
        let dir = tempfile::tempdir().unwrap();
        read_form(&req, payload, &ImageDir::new(dir.path())).await
    }

    #[actix_web::test]
    async fn unknown_text_fields_are_dropped() {
        let mut fields: Vec<(String, String)> = (0..500)
            .map(|i| (format!("junk_{i}"), "x".repeat(1024)))
            .collect();
        fields.push(("title".into(), "Sunset Inn".into()));
        fields.push(("description".into(), "desc".into()));

        let form = parse(&fields).await.unwrap();
        assert_eq!(form.fields.len(), 2);
        assert_eq!(form.fields["title"], "Sunset Inn");
        assert!(form.images.is_empty());
    }

    #[actix_web::test]
    async fn oversized_known_field_is_rejected() {
        let fields = vec![("address".to_string(), "a".repeat(MAX_TEXT_BYTES + 1))];
        let err = parse(&fields).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
