use crate::types::DataUrl;
use failure::Error;
use futures::future::BoxFuture;
use std::path::Path;
use tokio::fs;

/// A live preview feed bound to one video device.
pub trait CameraFeed: Send + Sync {
    /// Grabs a single still frame from the feed as a JPEG data URL string
    /// (`data:image/jpeg;base64,…`).
    fn grab_frame(&self) -> BoxFuture<'_, Result<String, Error>>;
}

// Mirrors the client-side accept filter of a file picker: anything without
// an image extension is rejected before the file is read.
fn image_mime(path: &Path) -> Result<&'static str, Error> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => Ok("image/jpeg"),
        Some("png") => Ok("image/png"),
        Some("gif") => Ok("image/gif"),
        Some("webp") => Ok("image/webp"),
        Some("bmp") => Ok("image/bmp"),
        _ => Err(format_err!("Not an image file: {:?}", path)),
    }
}

pub async fn read_image_file(path: &Path) -> Result<DataUrl, Error> {
    let mime = image_mime(path)?;
    let bytes = fs::read(path).await?;
    Ok(DataUrl::new(mime, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_by_extension() {
        assert_eq!(image_mime(Path::new("a.jpg")).unwrap(), "image/jpeg");
        assert_eq!(image_mime(Path::new("b.JPEG")).unwrap(), "image/jpeg");
        assert_eq!(image_mime(Path::new("c.png")).unwrap(), "image/png");
        assert!(image_mime(Path::new("notes.txt")).is_err());
        assert!(image_mime(Path::new("no-extension")).is_err());
    }

    #[tokio::test]
    async fn reads_file_into_data_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.jpg");
        std::fs::write(&path, b"jpeg-bytes").unwrap();

        let image = read_image_file(&path).await.unwrap();
        assert_eq!(image.mime, "image/jpeg");
        assert_eq!(image.bytes, b"jpeg-bytes".to_vec());
    }

    #[tokio::test]
    async fn unreadable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_image_file(&dir.path().join("missing.jpg")).await.is_err());
    }
}
