//! Source decode: raw bytes → `DynamicImage`.

use crate::error::CaptureError;
use image::DynamicImage;
use tracing::debug;

/// Decode image bytes (JPEG, PNG or WebP) into an in-memory raster.
///
/// The raster is ephemeral: it is owned by the transform call that decoded
/// it and dropped once the re-encoded output exists.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, CaptureError> {
    let img = image::load_from_memory(bytes).map_err(|e| CaptureError::Decode {
        detail: e.to_string(),
    })?;
    debug!("Decoded source → {}x{} px", img.width(), img.height());
    Ok(img)
}
