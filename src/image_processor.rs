use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbaImage};
use std::path::Path;

use crate::errors::{AppError, AppResult};
use crate::security::InputValidator;

/// Images larger than this on either side are scaled down before encoding.
pub const MAX_DIMENSION: u32 = 4096;

/// Encode a captured RGBA pixel buffer as JPEG. Alpha is discarded.
pub fn encode_rgba_to_jpeg(
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    quality: u8,
) -> AppResult<Vec<u8>> {
    InputValidator::validate_quality(quality)?;

    if width == 0 || height == 0 {
        return Err(AppError::validation("dimensions", "Width and height must be non-zero"));
    }

    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| {
            AppError::validation(
                "dimensions",
                &format!("{}x{} RGBA buffer is too large", width, height),
            )
        })?;
    if pixels.len() != expected {
        return Err(AppError::validation(
            "pixels",
            &format!(
                "Expected {} bytes for a {}x{} RGBA buffer, got {}",
                expected,
                width,
                height,
                pixels.len()
            ),
        ));
    }

    let buffer = RgbaImage::from_raw(width, height, pixels)
        .ok_or_else(|| AppError::validation("pixels", "Pixel buffer does not match dimensions"))?;

    encode_jpeg(&DynamicImage::ImageRgba8(buffer), quality)
}

/// Open an image file in any supported format and re-encode it as JPEG.
pub fn load_as_jpeg(file_path: &str, quality: u8) -> AppResult<Vec<u8>> {
    InputValidator::validate_image_file(file_path)?;
    InputValidator::validate_quality(quality)?;

    let img = load_image_bounded(file_path)?;
    let output = encode_jpeg(&img, quality)?;

    log::info!(
        "Converted {} to JPEG ({}x{}, {} bytes, quality {})",
        file_path,
        img.width(),
        img.height(),
        output.len(),
        quality
    );

    Ok(output)
}

fn load_image_bounded(file_path: &str) -> AppResult<DynamicImage> {
    let img = image::open(Path::new(file_path))?;

    if img.width() > MAX_DIMENSION || img.height() > MAX_DIMENSION {
        log::info!("Resizing large image from {}x{}", img.width(), img.height());
        return Ok(img.resize(
            MAX_DIMENSION,
            MAX_DIMENSION,
            image::imageops::FilterType::Lanczos3,
        ));
    }

    Ok(img)
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> AppResult<Vec<u8>> {
    // JPEG has no alpha channel.
    let rgb = img.to_rgb8();

    let mut output = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut output, quality);
    rgb.write_with_encoder(encoder)?;

    Ok(output)
}
