//! Local image store served under `/images`
//!
//! Stored names are `{random base36}-{unix millis}.{ext}` so uploads never
//! collide and never reuse the client's file name.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

/// URL prefix the upload directory is mounted at
pub const IMAGES_URL_PREFIX: &str = "/images";

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Empty upload")]
    Empty,
    #[error("File exceeds the {0} MB limit")]
    TooLarge(u64),
    #[error("Only JPEG, PNG, GIF, WebP and AVIF images are accepted (got {0})")]
    NotAnImage(String),
    #[error("Invalid image path: {0}")]
    InvalidPath(String),
    #[error("Image not found")]
    NotFound,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedImage {
    /// Public URL, e.g. `/images/k3j9x0a1b2c-1760600000000.jpg`
    pub url: String,
    /// Stored file name, used to delete the image later
    pub path: String,
}

#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
    max_mb: u64,
}

fn base36(mut n: u128) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// Stored extension for an accepted image type
///
/// Only raster formats are accepted. The client's file name never picks the
/// extension, since `ServeDir` derives the served `Content-Type` from it.
/// SVG is refused because it can carry script.
fn image_extension(content_type: &str) -> Option<&'static str> {
    let mime = content_type.split(';').next()?.trim().to_ascii_lowercase();
    match mime.as_str() {
        "image/jpeg" | "image/jpg" | "image/pjpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/avif" => Some("avif"),
        _ => None,
    }
}

/// Stored names are a single path component of `[a-z0-9.-]`
fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains("..")
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == '_')
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>, max_mb: u64) -> Self {
        Self {
            dir: dir.into(),
            max_mb,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_mb.saturating_mul(1024 * 1024)
    }

    /// Validate and write an uploaded image
    pub async fn save(
        &self,
        original_name: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<SavedImage, UploadError> {
        if bytes.is_empty() {
            return Err(UploadError::Empty);
        }
        if bytes.len() as u64 > self.max_bytes() {
            return Err(UploadError::TooLarge(self.max_mb));
        }
        let Some(ext) = image_extension(content_type) else {
            return Err(UploadError::NotAnImage(content_type.to_string()));
        };

        let random = base36(uuid::Uuid::new_v4().as_u128());
        let random = &random[..random.len().min(11)];
        let millis = chrono::Utc::now().timestamp_millis();
        let name = format!("{random}-{millis}.{ext}");

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(&name), bytes).await?;

        tracing::info!(
            file = %name,
            original = %original_name,
            size = bytes.len(),
            "Image stored"
        );

        Ok(SavedImage {
            url: format!("{IMAGES_URL_PREFIX}/{name}"),
            path: name,
        })
    }

    /// Remove a stored image by its file name
    pub async fn delete(&self, name: &str) -> Result<(), UploadError> {
        if !is_safe_name(name) {
            return Err(UploadError::InvalidPath(name.to_string()));
        }
        match tokio::fs::remove_file(self.dir.join(name)).await {
            Ok(()) => {
                tracing::info!(file = %name, "Image deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(UploadError::NotFound),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_base36() {
        assert_eq!(base36(0), "0");
        assert_eq!(base36(35), "z");
        assert_eq!(base36(36), "10");
    }

    #[test]
    fn test_image_extension() {
        assert_eq!(image_extension("image/jpeg"), Some("jpg"));
        assert_eq!(image_extension("Image/PNG; charset=binary"), Some("png"));
        assert_eq!(image_extension("image/webp"), Some("webp"));
        assert_eq!(image_extension("image/avif"), Some("avif"));
        assert_eq!(image_extension("image/svg+xml"), None);
        assert_eq!(image_extension("text/html"), None);
        assert_eq!(image_extension(""), None);
    }

    #[test]
    fn test_safe_names() {
        assert!(is_safe_name("abc123-1760600000000.png"));
        assert!(!is_safe_name("../secret"));
        assert!(!is_safe_name("a/b.png"));
        assert!(!is_safe_name(".hidden"));
        assert!(!is_safe_name(""));
    }

    #[tokio::test]
    async fn test_save_and_delete() {
        let dir = TempDir::new().unwrap();
        let images = ImageStore::new(dir.path(), 1);
        let saved = images.save("rat.png", "image/png", b"\x89PNG").await.unwrap();
        assert!(saved.url.starts_with("/images/"));
        assert!(saved.url.ends_with(".png"));
        assert!(dir.path().join(&saved.path).exists());

        images.delete(&saved.path).await.unwrap();
        assert!(!dir.path().join(&saved.path).exists());
        assert!(matches!(
            images.delete(&saved.path).await,
            Err(UploadError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_client_name_never_picks_extension() {
        let dir = TempDir::new().unwrap();
        let images = ImageStore::new(dir.path(), 1);
        let saved = images
            .save("evil.html", "image/png", b"<script>alert(1)</script>")
            .await
            .unwrap();
        assert!(saved.path.ends_with(".png"));
        assert!(!saved.path.contains("html"));
    }

    #[test]
    fn test_max_bytes_saturates() {
        let images = ImageStore::new("unused", u64::MAX);
        assert_eq!(images.max_bytes(), u64::MAX);
    }

    #[tokio::test]
    async fn test_save_rejections() {
        let dir = TempDir::new().unwrap();
        let images = ImageStore::new(dir.path(), 1);
        assert!(matches!(
            images.save("a.png", "image/png", b"").await,
            Err(UploadError::Empty)
        ));
        assert!(matches!(
            images.save("a.txt", "text/plain", b"hello").await,
            Err(UploadError::NotAnImage(_))
        ));
        assert!(matches!(
            images.save("logo.svg", "image/svg+xml", b"<svg/>").await,
            Err(UploadError::NotAnImage(_))
        ));
        let big = vec![0u8; 1024 * 1024 + 1];
        assert!(matches!(
            images.save("a.png", "image/png", &big).await,
            Err(UploadError::TooLarge(1))
        ));
    }
}
