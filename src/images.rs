//! Uploaded image files.
//!
//! Images live flat in one directory under generated names and are served
//! back at `/images/<name>`; records store that public path.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use actix_web::web::Bytes;
use mime::Mime;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

/// URL prefix the image directory is mounted at.
pub const PUBLIC_PREFIX: &str = "/images";

/// Most image parts accepted in one request.
pub const MAX_IMAGES_PER_REQUEST: usize = 10;

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "svg", "bmp", "avif"];

/// One image part read from a request, not yet written to disk.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    #[serde(skip)]
    pub content_type: Option<Mime>,
    #[serde(skip)]
    pub bytes: Bytes,
}

impl ImageUpload {
    /// Lowercased extension, taken from the file name or else the MIME subtype.
    ///
    /// Fails with [`ApiError::Upload`] unless both the type and extension are images.
    pub fn checked_extension(&self) -> ApiResult<String> {
        let label = self.file_name.as_deref().unwrap_or("upload");

        let is_image = self
            .content_type
            .as_ref()
            .map(|m| m.type_() == mime::IMAGE)
            .unwrap_or(false);
        if !is_image {
            return Err(ApiError::Upload(format!(
                "{label}: only image files are allowed"
            )));
        }

        let from_name = self
            .file_name
            .as_deref()
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let ext = match from_name {
            Some(ext) => ext,
            None => self
                .content_type
                .as_ref()
                .map(|m| m.subtype().as_str().trim_end_matches("+xml").to_ascii_lowercase())
                .unwrap_or_default(),
        };

        if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            Ok(ext)
        } else {
            Err(ApiError::Upload(format!(
                "{label}: only image files are allowed"
            )))
        }
    }
}

/// Per-file size cap unless configured otherwise.
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Directory holding uploaded images.
#[derive(Debug, Clone)]
pub struct ImageDir {
    root: PathBuf,
    max_bytes: usize,
}

impl ImageDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub fn check_size(&self, len: usize) -> ApiResult<()> {
        if len > self.max_bytes {
            return Err(ApiError::Upload(format!(
                "Image exceeds the {} byte limit",
                self.max_bytes
            )));
        }
        Ok(())
    }

    /// Write every upload, returning their public paths in order.
    ///
    /// Nothing is left behind if any write fails.
    pub async fn save_all(&self, uploads: &[ImageUpload]) -> ApiResult<Vec<String>> {
        let extensions = uploads
            .iter()
            .map(|upload| {
                self.check_size(upload.bytes.len())?;
                upload.checked_extension()
            })
            .collect::<ApiResult<Vec<_>>>()?;

        tokio::fs::create_dir_all(&self.root).await?;

        let mut saved = Vec::with_capacity(uploads.len());
        for (upload, ext) in uploads.iter().zip(extensions) {
            let file_name = format!("{}.{ext}", Uuid::new_v4());
            if let Err(e) = tokio::fs::write(self.root.join(&file_name), &upload.bytes).await {
                log::error!("Failed to write image {file_name}: {e}");
                self.remove_all(&saved).await;
                return Err(e.into());
            }
            saved.push(format!("{PUBLIC_PREFIX}/{file_name}"));
        }
        Ok(saved)
    }

    /// Delete the file behind a public path. Missing files are fine; other
    /// failures are logged.
    pub async fn remove(&self, public_path: &str) {
        let Some(path) = self.resolve(public_path) else {
            log::warn!("Refusing to remove image outside {}: {public_path}", self.root.display());
            return;
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => log::info!("Removed image {}", path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => log::warn!("Failed to remove image {}: {e}", path.display()),
        }
    }

    pub async fn remove_all(&self, public_paths: &[String]) {
        for path in public_paths {
            self.remove(path).await;
        }
    }

    /// Map `/images/<name>` to a file directly inside the root.
    fn resolve(&self, public_path: &str) -> Option<PathBuf> {
        let name = public_path
            .strip_prefix(PUBLIC_PREFIX)
            .unwrap_or(public_path)
            .trim_start_matches('/');
        let valid = !name.is_empty()
            && !name.contains(['/', '\\'])
            && name != "."
            && name != "..";
        valid.then(|| self.root.join(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: Option<&str>, mime: &str) -> ImageUpload {
        ImageUpload {
            file_name: name.map(String::from),
            content_type: mime.parse().ok(),
            bytes: Bytes::from_static(b"\x89PNG fake"),
        }
    }

    #[test]
    fn extension_from_file_name() {
        let ext = upload(Some("Beach.JPG"), "image/jpeg").checked_extension().unwrap();
        assert_eq!(ext, "jpg");
    }

    #[test]
    fn extension_from_mime_when_nameless() {
        assert_eq!(upload(None, "image/png").checked_extension().unwrap(), "png");
        assert_eq!(upload(None, "image/svg+xml").checked_extension().unwrap(), "svg");
    }

    #[test]
    fn rejects_non_images() {
        assert!(matches!(
            upload(Some("notes.txt"), "text/plain").checked_extension(),
            Err(ApiError::Upload(_))
        ));
        assert!(matches!(
            upload(Some("evil.exe"), "image/png").checked_extension(),
            Err(ApiError::Upload(_))
        ));
        assert!(matches!(
            upload(Some("photo.png"), "application/octet-stream").checked_extension(),
            Err(ApiError::Upload(_))
        ));
    }

    #[actix_web::test]
    async fn save_and_remove_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let images = ImageDir::new(dir.path().join("images"));

        let paths = images
            .save_all(&[upload(Some("a.png"), "image/png"), upload(Some("b.gif"), "image/gif")])
            .await
            .unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| p.starts_with("/images/")));
        assert!(paths[0].ends_with(".png"));

        let on_disk = images.resolve(&paths[0]).unwrap();
        assert!(on_disk.exists());

        images.remove_all(&paths).await;
        assert!(!on_disk.exists());

        // second removal is a no-op
        images.remove(&paths[0]).await;
    }

    #[actix_web::test]
    async fn invalid_upload_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let images = ImageDir::new(dir.path().join("images"));
        let result = images
            .save_all(&[upload(Some("a.png"), "image/png"), upload(Some("x.txt"), "text/plain")])
            .await;
        assert!(result.is_err());
        assert!(!images.root().exists());
    }

    #[test]
    fn resolve_rejects_traversal() {
        let images = ImageDir::new("/srv/images");
        assert_eq!(
            images.resolve("/images/abc.png"),
            Some(PathBuf::from("/srv/images/abc.png"))
        );
        assert_eq!(images.resolve("/images/../hotels.json"), None);
        assert_eq!(images.resolve("/images/"), None);
    }
}
