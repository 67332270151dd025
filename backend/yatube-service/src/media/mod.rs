/// Uploaded image storage
///
/// Images are decoded before they are accepted, stored under
/// `<root>/posts/<uuid>.<ext>` and referenced from the database by the path
/// relative to the root.
use image::{GenericImageView, ImageFormat};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

const POSTS_DIR: &str = "posts";

/// An upload that decoded successfully.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

impl UploadedImage {
    pub fn extension(&self) -> &'static str {
        self.format.extensions_str().first().copied().unwrap_or("img")
    }
}

/// Detect the format and fully decode the data; `None` if it is not an image.
pub fn detect_image(bytes: &[u8]) -> Option<ImageFormat> {
    let format = image::guess_format(bytes).ok()?;
    match image::load_from_memory_with_format(bytes, format) {
        Ok(img) => {
            let (width, height) = img.dimensions();
            debug!(
                width,
                height,
                ?format,
                "Decoded uploaded image"
            );
            Some(format)
        }
        Err(e) => {
            debug!("Rejected upload: {}", e);
            None
        }
    }
}

/// `detect_image` on the blocking pool.
pub async fn inspect_image(bytes: Vec<u8>) -> Option<UploadedImage> {
    let result = tokio::task::spawn_blocking(move || {
        detect_image(&bytes).map(|format| UploadedImage { bytes, format })
    })
    .await;

    match result {
        Ok(image) => image,
        Err(e) => {
            warn!("Image decoding task failed: {}", e);
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Write the image and return its path relative to the root.
    pub async fn save(&self, image: &UploadedImage) -> std::io::Result<String> {
        let dir = self.root.join(POSTS_DIR);
        tokio::fs::create_dir_all(&dir).await?;

        let file_name = format!("{}.{}", Uuid::new_v4(), image.extension());
        tokio::fs::write(dir.join(&file_name), &image.bytes).await?;

        let relative = format!("{}/{}", POSTS_DIR, file_name);
        debug!(path = %relative, bytes = image.bytes.len(), "Stored uploaded image");
        Ok(relative)
    }

    /// Map a request path onto the media root, refusing anything that would
    /// escape it.
    pub fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let path = Path::new(relative);
        if relative.is_empty()
            || !path
                .components()
                .all(|c| matches!(c, Component::Normal(_)))
        {
            return None;
        }
        Some(self.root.join(path))
    }
}

/// Content type served for a stored file.
pub fn content_type_for(path: &Path) -> mime::Mime {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => mime::IMAGE_PNG,
        "jpg" | "jpeg" => mime::IMAGE_JPEG,
        "gif" => mime::IMAGE_GIF,
        "bmp" => mime::IMAGE_BMP,
        "webp" => "image/webp".parse().unwrap_or(mime::APPLICATION_OCTET_STREAM),
        "ico" => "image/x-icon".parse().unwrap_or(mime::APPLICATION_OCTET_STREAM),
        "tif" | "tiff" => "image/tiff".parse().unwrap_or(mime::APPLICATION_OCTET_STREAM),
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

/// A 1x1 GIF, handy for exercising upload paths.
#[cfg(test)]
pub(crate) const SMALL_GIF: &[u8] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00,
    0x00, 0xff, 0xff, 0xff, 0x21, 0xf9, 0x04, 0x01, 0x00, 0x00, 0x00, 0x00, 0x2c, 0x00, 0x00,
    0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x44, 0x01, 0x00, 0x3b,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_real_images_only() {
        assert_eq!(detect_image(SMALL_GIF), Some(ImageFormat::Gif));
        assert_eq!(detect_image(b"definitely not an image"), None);
        assert_eq!(detect_image(&SMALL_GIF[..10]), None);
    }

    #[test]
    fn resolve_rejects_traversal() {
        let store = MediaStore::new("/srv/media");
        assert_eq!(
            store.resolve("posts/a.gif"),
            Some(PathBuf::from("/srv/media/posts/a.gif"))
        );
        assert!(store.resolve("../etc/passwd").is_none());
        assert!(store.resolve("posts/../../secret").is_none());
        assert!(store.resolve("/etc/passwd").is_none());
        assert!(store.resolve("").is_none());
    }

    #[test]
    fn content_types() {
        assert_eq!(content_type_for(Path::new("a.PNG")), mime::IMAGE_PNG);
        assert_eq!(content_type_for(Path::new("a.jpeg")), mime::IMAGE_JPEG);
        assert_eq!(
            content_type_for(Path::new("a.bin")),
            mime::APPLICATION_OCTET_STREAM
        );
    }

    #[actix_web::test]
    async fn save_writes_under_posts() {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path());

        let image = inspect_image(SMALL_GIF.to_vec()).await.unwrap();
        let relative = store.save(&image).await.unwrap();

        assert!(relative.starts_with("posts/"));
        assert!(relative.ends_with(".gif"));
        let written = std::fs::read(dir.path().join(&relative)).unwrap();
        assert_eq!(written, SMALL_GIF);
    }
}
