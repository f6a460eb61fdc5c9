//! Gallery images stored on disk under `<root>/gallery-<id>/<filename>`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::AppError;

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];
pub const IMAGE_CONTENT_TYPES: &[&str] = &["image/png", "image/jpeg", "image/gif"];

#[derive(Debug, Clone)]
pub struct Image {
    pub gallery_id: Uuid,
    pub filename: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn gallery_dir(&self, gallery_id: Uuid) -> PathBuf {
        self.root.join(format!("gallery-{gallery_id}"))
    }

    /// All images of a gallery, sorted by filename. A gallery without a
    /// directory simply has no images.
    pub async fn images(&self, gallery_id: Uuid) -> Result<Vec<Image>, AppError> {
        let dir = self.gallery_dir(gallery_id);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut images = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let Some(filename) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if has_image_extension(&filename) {
                images.push(Image {
                    gallery_id,
                    path: entry.path(),
                    filename,
                });
            }
        }
        images.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(images)
    }

    pub async fn image(&self, gallery_id: Uuid, filename: &str) -> Result<Image, AppError> {
        let filename = sanitize_filename(filename).ok_or_else(image_not_found)?;
        if !has_image_extension(&filename) {
            return Err(image_not_found());
        }

        let path = self.gallery_dir(gallery_id).join(&filename);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(Image {
                gallery_id,
                filename,
                path,
            }),
            Ok(_) => Err(image_not_found()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(image_not_found()),
            Err(e) => Err(e.into()),
        }
    }

    /// Store an uploaded image after [`validate_upload`] accepts it.
    pub async fn create_image(
        &self,
        gallery_id: Uuid,
        filename: &str,
        contents: &[u8],
    ) -> Result<Image, AppError> {
        let filename = validate_upload(filename, contents)?;

        let dir = self.gallery_dir(gallery_id);
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join(&filename);
        tokio::fs::write(&path, contents).await?;

        tracing::info!(%gallery_id, %filename, bytes = contents.len(), "Stored image");
        Ok(Image {
            gallery_id,
            filename,
            path,
        })
    }

    pub async fn delete_image(&self, gallery_id: Uuid, filename: &str) -> Result<(), AppError> {
        let image = self.image(gallery_id, filename).await?;
        tokio::fs::remove_file(&image.path).await?;
        Ok(())
    }

    /// Remove a gallery's whole image directory.
    pub async fn delete_gallery(&self, gallery_id: Uuid) -> Result<(), AppError> {
        match tokio::fs::remove_dir_all(self.gallery_dir(gallery_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Check an upload and return the name it will be stored under. Both the
/// extension and the sniffed content type must be on the allow lists.
pub fn validate_upload(filename: &str, contents: &[u8]) -> Result<String, AppError> {
    let filename = sanitize_filename(filename)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid filename: {filename}")))?;

    if !has_image_extension(&filename) {
        return Err(AppError::BadRequest(format!(
            "Invalid file type for {filename}; allowed extensions: {}",
            IMAGE_EXTENSIONS.join(", ")
        )));
    }

    match detect_content_type(contents) {
        Some(ct) if IMAGE_CONTENT_TYPES.contains(&ct) => Ok(filename),
        _ => Err(AppError::BadRequest(format!(
            "Invalid file contents for {filename}; only PNG, JPEG and GIF images are allowed"
        ))),
    }
}

fn image_not_found() -> AppError {
    AppError::NotFound("Image not found".to_string())
}

/// Reduce a client-supplied name to a safe final path component.
/// Characters outside `[A-Za-z0-9._-]` become `-`; hidden names are rejected.
pub fn sanitize_filename(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect();

    if cleaned.is_empty() || cleaned.starts_with('.') {
        None
    } else {
        Some(cleaned)
    }
}

pub fn has_image_extension(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Identify PNG, JPEG and GIF data by their magic bytes.
pub fn detect_content_type(data: &[u8]) -> Option<&'static str> {
    if data.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("image/png")
    } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        Some("image/gif")
    } else {
        None
    }
}
