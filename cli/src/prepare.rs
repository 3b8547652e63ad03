//! Turn an image file into the same JPEG data URL the browser would send.

#[cfg(test)]
#[path = "prepare_test.rs"]
mod prepare_test;

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use workflow::image::{CAPTURE_MIME, JPEG_QUALITY, capture_size, validate_upload};
use workflow::{AcquireError, CapturedImage, ImageSource};

use crate::error::CliError;

/// Read, validate, downscale and re-encode an upload.
pub fn load_upload(path: &Path) -> Result<CapturedImage, CliError> {
    let read_error = |source| CliError::Read {
        path: path.display().to_string(),
        source,
    };
    let size = std::fs::metadata(path).map_err(read_error)?.len();
    validate_upload(guess_mime(path), size)?;

    let bytes = std::fs::read(path).map_err(read_error)?;
    let image = encode_capture(&bytes)?;
    tracing::info!(
        path = %path.display(),
        width = image.width,
        height = image.height,
        kb = image.encoded_kb(),
        "image prepared"
    );
    Ok(image)
}

/// MIME type implied by the file extension.
pub fn guess_mime(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        _ => "application/octet-stream",
    }
}

/// Decode `bytes`, fit them inside the capture box and encode as JPEG.
pub fn encode_capture(bytes: &[u8]) -> Result<CapturedImage, AcquireError> {
    let decoded = image::load_from_memory(bytes).map_err(|error| AcquireError::Decode(error.to_string()))?;
    let (source_width, source_height) = (decoded.width(), decoded.height());
    if source_width == 0 || source_height == 0 {
        return Err(AcquireError::EmptyImage);
    }

    let (width, height) = capture_size(source_width, source_height);
    let resized = if (width, height) == (source_width, source_height) {
        decoded
    } else {
        decoded.resize_exact(width, height, FilterType::Triangle)
    };

    let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());
    let mut jpeg = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut jpeg, jpeg_quality()))
        .map_err(|error| AcquireError::Encode(error.to_string()))?;

    let data_url = format!("data:{CAPTURE_MIME};base64,{}", STANDARD.encode(&jpeg));
    CapturedImage::new(data_url, width, height, ImageSource::Upload)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn jpeg_quality() -> u8 {
    (JPEG_QUALITY * 100.0).round().clamp(1.0, 100.0) as u8
}
