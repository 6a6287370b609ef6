use std::io::Cursor;

use chrono::{DateTime, Utc};
use image::{DynamicImage, ImageFormat, codecs::jpeg::JpegEncoder, imageops::FilterType};
use thiserror::Error;

use crate::policy::Dimensions;

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("Failed to load image")]
    Decode(#[source] image::ImageError),
    #[error("Failed to compress image")]
    Encode(#[source] image::ImageError),
    #[error("Unsupported image type: {0}")]
    UnsupportedType(String),
}

/// A file that came back out of the transcoder. Name and MIME type are the
/// caller's originals; dimensions and timestamp reflect the new encoding.
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub last_modified: DateTime<Utc>,
}

fn format_for_mime(mime_type: &str) -> Option<ImageFormat> {
    match mime_type {
        "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
        "image/png" => Some(ImageFormat::Png),
        "image/webp" => Some(ImageFormat::WebP),
        _ => None,
    }
}

/// Computes output dimensions under the resize policy: only the dominant
/// axis is bounded, the other follows proportionally. Images already inside
/// the bound keep their size; nothing is ever upscaled.
pub fn bounded_dimensions(
    width: u32,
    height: u32,
    max_width: u32,
    max_height: u32,
) -> (u32, u32) {
    if width > height {
        if width > max_width {
            let scaled = (height as f64 * max_width as f64 / width as f64).round() as u32;
            return (max_width, scaled.max(1));
        }
    } else if height > max_height {
        let scaled = (width as f64 * max_height as f64 / height as f64).round() as u32;
        return (scaled.max(1), max_height);
    }
    (width, height)
}

/// Decodes `data`, resizes it to fit `bounds` and re-encodes it in its
/// original format. JPEG output honours `quality` (0.0..=1.0); PNG and WebP
/// re-encode losslessly.
pub fn transcode(
    name: &str,
    mime_type: &str,
    data: &[u8],
    bounds: Dimensions,
    quality: f32,
) -> Result<ProcessedImage, TranscodeError> {
    let format = format_for_mime(mime_type)
        .ok_or_else(|| TranscodeError::UnsupportedType(mime_type.to_string()))?;

    let decoded = image::load_from_memory(data).map_err(TranscodeError::Decode)?;
    let (target_w, target_h) = bounded_dimensions(
        decoded.width(),
        decoded.height(),
        bounds.width,
        bounds.height,
    );

    let resized = if (target_w, target_h) == (decoded.width(), decoded.height()) {
        decoded
    } else {
        decoded.resize_exact(target_w, target_h, FilterType::Lanczos3)
    };

    let mut buffer = Cursor::new(Vec::new());
    match format {
        ImageFormat::Jpeg => {
            let q = (quality.clamp(0.0, 1.0) * 100.0).round() as u8;
            let encoder = JpegEncoder::new_with_quality(&mut buffer, q);
            // JPEG has no alpha channel; flatten before encoding.
            DynamicImage::ImageRgb8(resized.to_rgb8())
                .write_with_encoder(encoder)
                .map_err(TranscodeError::Encode)?;
        }
        _ => {
            resized
                .write_to(&mut buffer, format)
                .map_err(TranscodeError::Encode)?;
        }
    }

    Ok(ProcessedImage {
        name: name.to_string(),
        mime_type: mime_type.to_string(),
        data: buffer.into_inner(),
        width: target_w,
        height: target_h,
        last_modified: Utc::now(),
    })
}

/// Reads the pixel dimensions of an encoded image without a full decode.
pub fn probe_dimensions(data: &[u8]) -> Result<(u32, u32), TranscodeError> {
    image::ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|err| TranscodeError::Decode(image::ImageError::IoError(err)))?
        .into_dimensions()
        .map_err(TranscodeError::Decode)
}

#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([10, 120, 200, 255]));
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut buffer, ImageFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([200, 30, 30]));
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buffer, ImageFormat::Jpeg)
            .unwrap();
        buffer.into_inner()
    }

    const BOUNDS: Dimensions = Dimensions {
        width: 800,
        height: 600,
    };

    #[test]
    fn landscape_is_capped_by_width() {
        assert_eq!(bounded_dimensions(1600, 400, 800, 600), (800, 200));
    }

    #[test]
    fn portrait_is_capped_by_height() {
        assert_eq!(bounded_dimensions(500, 1200, 800, 600), (250, 600));
    }

    #[test]
    fn square_falls_under_the_height_cap() {
        assert_eq!(bounded_dimensions(1000, 1000, 800, 600), (600, 600));
    }

    #[test]
    fn small_images_are_never_upscaled() {
        assert_eq!(bounded_dimensions(320, 240, 800, 600), (320, 240));
        // Landscape wider than tall but within the width cap.
        assert_eq!(bounded_dimensions(799, 700, 800, 600), (799, 700));
    }

    #[test]
    fn aspect_ratio_survives_within_rounding() {
        let (w, h) = bounded_dimensions(1333, 1000, 800, 600);
        let original = 1333.0 / 1000.0;
        let scaled = w as f64 / h as f64;
        assert!((original - scaled).abs() < 0.01, "{original} vs {scaled}");
    }

    #[test]
    fn transcode_resizes_and_keeps_identity() {
        let data = png_bytes(1600, 400);
        let out = transcode("wide.png", "image/png", &data, BOUNDS, 0.8).unwrap();
        assert_eq!((out.width, out.height), (800, 200));
        assert_eq!(out.name, "wide.png");
        assert_eq!(out.mime_type, "image/png");
        let reloaded = image::load_from_memory(&out.data).unwrap();
        assert_eq!((reloaded.width(), reloaded.height()), (800, 200));
    }

    #[test]
    fn transcode_keeps_small_images_at_original_size() {
        let data = jpeg_bytes(100, 80);
        let out = transcode("small.jpg", "image/jpeg", &data, BOUNDS, 0.8).unwrap();
        assert_eq!((out.width, out.height), (100, 80));
    }

    #[test]
    fn garbage_bytes_fail_with_load_message() {
        let err = transcode("x.png", "image/png", b"not an image", BOUNDS, 0.8).unwrap_err();
        assert_eq!(err.to_string(), "Failed to load image");
    }

    #[test]
    fn jpeg_with_alpha_source_still_encodes() {
        // Declared jpeg, actual bytes are an RGBA png. The alpha channel is
        // flattened rather than failing the encode.
        let data = png_bytes(50, 40);
        let out = transcode("odd.jpg", "image/jpeg", &data, BOUNDS, 0.8).unwrap();
        assert_eq!(out.mime_type, "image/jpeg");
        assert!(image::load_from_memory(&out.data).is_ok());
    }

    #[test]
    fn probe_reads_dimensions_and_rejects_garbage() {
        assert_eq!(probe_dimensions(&png_bytes(320, 240)).unwrap(), (320, 240));
        let err = probe_dimensions(b"not an image").unwrap_err();
        assert_eq!(err.to_string(), "Failed to load image");
    }
}
