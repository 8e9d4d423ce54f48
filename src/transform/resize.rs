//! Bounded proportional resize + re-encode: the capture-frame transform.
//!
//! ## Why fit-within, not crop?
//!
//! The frame is evidence. Cropping could cut away the context a reviewer
//! needs (the classroom behind the face), so the transform only scales —
//! proportionally, never past either bound, and not at all when the source
//! already fits. Typical front cameras deliver 1280x720 previews, making
//! the common case a straight re-encode.

use crate::config::EncodeConfig;
use crate::error::CaptureError;
use crate::transform::decode::decode_image;
use crate::transform::encode::{encode_webp, EncodedImage};
use image::{imageops::FilterType, DynamicImage};
use tracing::debug;

/// Compute output dimensions that fit `width x height` inside
/// `max_width x max_height` preserving aspect ratio.
///
/// Identity when the source already fits. Otherwise the more-constraining
/// dimension lands exactly on its bound and the other is derived from the
/// aspect ratio, rounded to the nearest integer pixel (minimum 1).
pub fn fit_dimensions(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width <= max_width && height <= max_height {
        return (width, height);
    }
    let scale = f64::min(
        max_width as f64 / width as f64,
        max_height as f64 / height as f64,
    );
    let out_w = ((width as f64 * scale).round() as u32).max(1);
    let out_h = ((height as f64 * scale).round() as u32).max(1);
    (out_w, out_h)
}

/// Scale a raster down to fit the configured bounds; returns the input
/// unchanged when it already fits.
pub fn resize_to_fit(img: DynamicImage, config: &EncodeConfig) -> DynamicImage {
    let (w, h) = (img.width(), img.height());
    let (out_w, out_h) = fit_dimensions(w, h, config.max_width, config.max_height);
    if (out_w, out_h) == (w, h) {
        return img;
    }
    debug!("Resizing {w}x{h} → {out_w}x{out_h}");
    // Triangle: a frame headed for manual review doesn't need Lanczos
    // ringing control, and capture latency is user-visible.
    img.resize_exact(out_w, out_h, FilterType::Triangle)
}

/// Decode a source image, fit it inside the configured bounds, and
/// re-encode as lossy WebP at the configured quality.
///
/// This is the transform `capture()` runs on every held frame; it is also
/// usable standalone for any payload-bound image.
pub fn resize_encode(bytes: &[u8], config: &EncodeConfig) -> Result<EncodedImage, CaptureError> {
    let img = decode_image(bytes)?;
    let img = resize_to_fit(img, config);
    encode_webp(&img, config.quality)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(ImageBuffer::from_fn(width, height, |x, y| {
            Rgba([(x % 251) as u8, (y % 241) as u8, 100, 255])
        }));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .expect("png encode");
        buf
    }

    #[test]
    fn within_bounds_is_identity() {
        assert_eq!(fit_dimensions(1280, 720, 1280, 720), (1280, 720));
        assert_eq!(fit_dimensions(320, 240, 1280, 720), (320, 240));
        assert_eq!(fit_dimensions(1, 1, 1280, 720), (1, 1));
    }

    #[test]
    fn landscape_overflow_clamps_width_bound() {
        // 1920x1080 → exactly 1280x720 (same 16:9 ratio).
        assert_eq!(fit_dimensions(1920, 1080, 1280, 720), (1280, 720));
    }

    #[test]
    fn portrait_overflow_clamps_height_bound() {
        // 900x1600 → height hits 720, width derives from aspect.
        let (w, h) = fit_dimensions(900, 1600, 1280, 720);
        assert_eq!(h, 720);
        assert_eq!(w, 405); // 900 * (720/1600) = 405 exactly
    }

    #[test]
    fn near_square_respects_both_bounds() {
        // Clamping only the larger dimension would leave height at 1189 here.
        let (w, h) = fit_dimensions(1400, 1300, 1280, 720);
        assert!(w <= 1280 && h <= 720, "got {w}x{h}");
        assert_eq!(h, 720);
        let in_ratio = 1400.0 / 1300.0;
        let out_ratio = w as f64 / h as f64;
        assert!(
            (in_ratio - out_ratio).abs() < 0.01,
            "aspect drifted: {in_ratio} vs {out_ratio}"
        );
    }

    #[test]
    fn aspect_preserved_within_one_pixel() {
        for (w, h) in [(3000, 701), (4032, 3024), (701, 3000), (2560, 720)] {
            let (ow, oh) = fit_dimensions(w, h, 1280, 720);
            assert!(ow <= 1280 && oh <= 720, "{w}x{h} → {ow}x{oh}");
            // The derived dimension is within ±1 px of the exact ratio.
            let exact_oh = oh as f64;
            let implied_oh = ow as f64 * h as f64 / w as f64;
            assert!(
                (exact_oh - implied_oh).abs() <= 1.0,
                "{w}x{h} → {ow}x{oh}: implied {implied_oh}"
            );
        }
    }

    #[test]
    fn extreme_aspect_never_rounds_to_zero() {
        assert_eq!(fit_dimensions(10000, 2, 1280, 720).1, 1);
    }

    #[test]
    fn encode_within_bounds_keeps_dimensions() {
        let out = resize_encode(&png_bytes(640, 480), &EncodeConfig::default()).unwrap();
        assert_eq!((out.width(), out.height()), (640, 480));
    }

    #[test]
    fn encode_oversized_lands_on_bounds() {
        let out = resize_encode(&png_bytes(1920, 1080), &EncodeConfig::default()).unwrap();
        assert_eq!((out.width(), out.height()), (1280, 720));
    }

    #[test]
    fn undecodable_source_is_a_decode_error() {
        let err = resize_encode(b"\xff\xfe junk", &EncodeConfig::default()).unwrap_err();
        assert!(matches!(err, CaptureError::Decode { .. }));
    }
}
