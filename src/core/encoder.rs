use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use image::ImageFormat;
use std::path::Path;
use tokio::fs;

use super::error::MockupError;
use super::request::SourceImage;

/// Upload limit for source images (10 MB)
pub const MAX_SOURCE_BYTES: usize = 10 * 1024 * 1024;

const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// Encode raw image bytes for transfer and detect their media type
pub fn encode_image(bytes: &[u8], path_hint: Option<&Path>) -> Result<SourceImage, MockupError> {
    if bytes.is_empty() {
        return Err(MockupError::Validation("The product image is empty.".to_string()));
    }
    if bytes.len() > MAX_SOURCE_BYTES {
        return Err(MockupError::Validation(format!(
            "The product image is {:.1} MB; the limit is 10 MB.",
            bytes.len() as f64 / (1024.0 * 1024.0)
        )));
    }

    let media_type = sniff_media_type(bytes)
        .or_else(|| path_hint.and_then(media_type_from_extension))
        .unwrap_or(FALLBACK_MEDIA_TYPE);

    Ok(SourceImage {
        data: BASE64.encode(bytes),
        media_type: media_type.to_string(),
    })
}

/// Load an image file and encode it
pub async fn load_source_image(path: &Path) -> Result<SourceImage, MockupError> {
    let bytes = fs::read(path).await?;
    tracing::debug!("Loaded {} bytes from {}", bytes.len(), path.display());
    encode_image(&bytes, Some(path))
}

fn sniff_media_type(bytes: &[u8]) -> Option<&'static str> {
    match image::guess_format(bytes).ok()? {
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::WebP => Some("image/webp"),
        ImageFormat::Gif => Some("image/gif"),
        _ => None,
    }
}

fn media_type_from_extension(path: &Path) -> Option<&'static str> {
    match path.extension()?.to_str()?.to_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}
