//! Square crop transforms for profile photos.
//!
//! Two entry points share one pipeline: [`crop_square_centered`] computes the
//! largest centered square itself, [`crop_region`] takes the square from the
//! caller (an interactive crop preview). Both scale the extracted region to a
//! fixed square size and re-encode, returning a *named* artifact suitable for
//! multipart upload rather than a bare payload string.

use crate::config::CropConfig;
use crate::error::CaptureError;
use crate::transform::decode::decode_image;
use crate::transform::encode::{encode_webp, EncodedImage};
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// A square region in source-image pixel coordinates.
///
/// Invariant: `x + size <= source_width` and `y + size <= source_height`.
/// The transforms verify this and fail with
/// [`CaptureError::RegionOutOfBounds`] instead of silently clamping — a
/// clamped crop would change the output framing behind the caller's back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRegion {
    /// Left edge of the square, in source pixels.
    pub x: u32,
    /// Top edge of the square, in source pixels.
    pub y: u32,
    /// Edge length of the square, in source pixels.
    pub size: u32,
}

impl CropRegion {
    /// The largest centered square within a `width x height` source.
    pub fn centered(width: u32, height: u32) -> Self {
        let size = width.min(height);
        Self {
            x: (width - size) / 2,
            y: (height - size) / 2,
            size,
        }
    }

    /// Whether the region lies entirely inside a `width x height` source.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.size > 0
            && self.x.checked_add(self.size).is_some_and(|r| r <= width)
            && self.y.checked_add(self.size).is_some_and(|b| b <= height)
    }
}

/// An encoded image paired with its artifact file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageArtifact {
    /// Source file name with the extension rewritten to the output format's.
    pub file_name: String,
    /// The encoded square image.
    pub image: EncodedImage,
}

/// Crop the largest centered square from the source and scale it to the
/// configured square size.
///
/// No source content is discarded asymmetrically, and the output is a
/// perfect square regardless of the input aspect ratio.
pub fn crop_square_centered(
    bytes: &[u8],
    source_name: &str,
    config: &CropConfig,
) -> Result<ImageArtifact, CaptureError> {
    let img = decode_image(bytes)?;
    let region = CropRegion::centered(img.width(), img.height());
    crop_to_artifact(img, region, source_name, config)
}

/// Crop exactly the caller-specified square region and scale it to the
/// configured square size.
pub fn crop_region(
    bytes: &[u8],
    source_name: &str,
    region: CropRegion,
    config: &CropConfig,
) -> Result<ImageArtifact, CaptureError> {
    let img = decode_image(bytes)?;
    if !region.fits_within(img.width(), img.height()) {
        return Err(CaptureError::RegionOutOfBounds {
            x: region.x,
            y: region.y,
            size: region.size,
            width: img.width(),
            height: img.height(),
        });
    }
    crop_to_artifact(img, region, source_name, config)
}

fn crop_to_artifact(
    img: image::DynamicImage,
    region: CropRegion,
    source_name: &str,
    config: &CropConfig,
) -> Result<ImageArtifact, CaptureError> {
    debug!(
        "Cropping {}px square at ({}, {}) from {}x{}",
        region.size,
        region.x,
        region.y,
        img.width(),
        img.height()
    );
    let square = img.crop_imm(region.x, region.y, region.size, region.size);
    // Lanczos3: avatars are viewed up close and re-scaled by browsers, so
    // the better resampler is worth the extra milliseconds here.
    let scaled = square.resize_exact(config.target_size, config.target_size, FilterType::Lanczos3);
    let image = encode_webp(&scaled, config.quality)?;

    Ok(ImageArtifact {
        file_name: artifact_name(source_name),
        image,
    })
}

/// Rewrite a source file name's extension to the output format's canonical
/// one (`photo.jpg` → `photo.webp`).
fn artifact_name(source_name: &str) -> String {
    Path::new(source_name)
        .with_extension("webp")
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageBuffer, Rgba};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(ImageBuffer::from_fn(width, height, |x, y| {
            Rgba([(x % 199) as u8, (y % 211) as u8, 60, 255])
        }));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .expect("png encode");
        buf
    }

    #[test]
    fn centered_region_math_wide_source() {
        // 1600x900: the 900px square starts 350px in, flush to the top.
        let r = CropRegion::centered(1600, 900);
        assert_eq!(r, CropRegion { x: 350, y: 0, size: 900 });
    }

    #[test]
    fn centered_region_math_tall_source() {
        let r = CropRegion::centered(600, 1000);
        assert_eq!(r, CropRegion { x: 0, y: 200, size: 600 });
    }

    #[test]
    fn center_crop_output_is_exact_square() {
        for (w, h) in [(1600, 900), (900, 1600), (800, 800), (37, 91)] {
            let artifact =
                crop_square_centered(&png_bytes(w, h), "p.jpg", &CropConfig::default()).unwrap();
            assert_eq!(artifact.image.width(), 800, "{w}x{h}");
            assert_eq!(artifact.image.height(), 800, "{w}x{h}");
        }
    }

    #[test]
    fn artifact_name_rewrites_extension() {
        assert_eq!(artifact_name("portrait.jpg"), "portrait.webp");
        assert_eq!(artifact_name("photos/me.PNG"), "photos/me.webp");
        assert_eq!(artifact_name("noext"), "noext.webp");
    }

    #[test]
    fn region_crop_honours_caller_region() {
        let cfg = CropConfig::builder().target_size(64).build().unwrap();
        let region = CropRegion { x: 10, y: 20, size: 50 };
        let artifact = crop_region(&png_bytes(200, 100), "x.png", region, &cfg).unwrap();
        assert_eq!(artifact.image.width(), 64);
        assert_eq!(artifact.image.height(), 64);
        assert_eq!(artifact.file_name, "x.webp");
    }

    #[test]
    fn out_of_range_region_fails_not_clamps() {
        let region = CropRegion { x: 180, y: 0, size: 50 };
        let err =
            crop_region(&png_bytes(200, 100), "x.png", region, &CropConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            CaptureError::RegionOutOfBounds { x: 180, size: 50, width: 200, .. }
        ));
    }

    #[test]
    fn zero_size_region_is_rejected() {
        let region = CropRegion { x: 0, y: 0, size: 0 };
        assert!(!region.fits_within(100, 100));
        assert!(crop_region(
            &png_bytes(100, 100),
            "x.png",
            region,
            &CropConfig::default()
        )
        .is_err());
    }

    #[test]
    fn overflowing_coordinates_do_not_panic() {
        let region = CropRegion { x: u32::MAX, y: 0, size: 2 };
        assert!(!region.fits_within(100, 100));
    }
}
