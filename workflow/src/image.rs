//! Captured image value and the sizing policy shared by camera and upload.
//!
//! Both acquisition paths end in the same place: a JPEG data URL no larger
//! than [`CAPTURE_MAX_WIDTH`] x [`CAPTURE_MAX_HEIGHT`]. The browser does the
//! pixel work on a canvas; this module only decides the target size and
//! validates what comes back.

#[cfg(test)]
#[path = "image_test.rs"]
mod image_test;

use serde::{Deserialize, Serialize};

use crate::error::AcquireError;

/// Capture-time width cap in pixels.
pub const CAPTURE_MAX_WIDTH: u32 = 600;
/// Capture-time height cap in pixels.
pub const CAPTURE_MAX_HEIGHT: u32 = 450;
/// Width cap for the result-panel redraw.
pub const DISPLAY_MAX_WIDTH: u32 = 800;
/// Height cap for the result-panel redraw.
pub const DISPLAY_MAX_HEIGHT: u32 = 600;
/// JPEG quality used when re-encoding captures and uploads.
pub const JPEG_QUALITY: f64 = 0.6;
/// MIME type of every re-encoded capture.
pub const CAPTURE_MIME: &str = "image/jpeg";
/// Uploads at or above this size are rejected before decoding.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;
/// Ideal camera resolution requested from the device.
pub const CAMERA_IDEAL_WIDTH: u32 = 1280;
/// Ideal camera resolution requested from the device.
pub const CAMERA_IDEAL_HEIGHT: u32 = 720;

/// Where a captured image came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSource {
    /// Frame grabbed from the live camera preview.
    #[default]
    Camera,
    /// File picked through the upload input.
    Upload,
}

/// An encoded raster image ready to be sent for analysis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapturedImage {
    /// `data:<mime>;base64,<payload>` URL.
    pub data_url: String,
    /// MIME type parsed from the data URL.
    pub mime: String,
    /// Pixel width after downscaling.
    pub width: u32,
    /// Pixel height after downscaling.
    pub height: u32,
    /// Acquisition path that produced the image.
    pub source: ImageSource,
}

impl CapturedImage {
    /// Wrap an encoded data URL produced by a canvas or encoder.
    ///
    /// # Errors
    ///
    /// Returns [`AcquireError::Encode`] if the URL is not a base64 image data
    /// URL, or [`AcquireError::EmptyImage`] if either dimension is zero.
    pub fn new(data_url: String, width: u32, height: u32, source: ImageSource) -> Result<Self, AcquireError> {
        let mime = data_url_mime(&data_url)
            .ok_or_else(|| AcquireError::Encode("canvas produced an invalid data URL".to_owned()))?
            .to_owned();
        if width == 0 || height == 0 {
            return Err(AcquireError::EmptyImage);
        }
        Ok(Self { data_url, mime, width, height, source })
    }

    /// Encoded length in bytes, as sent over the wire.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        self.data_url.len()
    }

    /// Encoded size rounded to kilobytes, for logging.
    #[must_use]
    pub fn encoded_kb(&self) -> usize {
        (self.encoded_len() + 512) / 1024
    }
}

/// Scale `(width, height)` down to fit inside `(max_width, max_height)`.
///
/// The ratio `min(max_width / width, max_height / height)` is applied only
/// when at least one side exceeds its cap; results are floored and never
/// drop below one pixel. Images already inside the box are returned as-is.
#[must_use]
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width, height);
    }
    if width <= max_width && height <= max_height {
        return (width, height);
    }
    let ratio = (f64::from(max_width) / f64::from(width)).min(f64::from(max_height) / f64::from(height));
    (scale_floor(width, ratio), scale_floor(height, ratio))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scale_floor(value: u32, ratio: f64) -> u32 {
    ((f64::from(value) * ratio).floor() as u32).max(1)
}

/// Target size for a capture or upload.
#[must_use]
pub fn capture_size(width: u32, height: u32) -> (u32, u32) {
    fit_within(width, height, CAPTURE_MAX_WIDTH, CAPTURE_MAX_HEIGHT)
}

/// Target size for the result-panel redraw.
#[must_use]
pub fn display_size(width: u32, height: u32) -> (u32, u32) {
    fit_within(width, height, DISPLAY_MAX_WIDTH, DISPLAY_MAX_HEIGHT)
}

/// Check an upload's MIME type and size before any decode work starts.
///
/// # Errors
///
/// Returns [`AcquireError::UnsupportedType`] for non-`image/*` types and
/// [`AcquireError::TooLarge`] for files of [`MAX_UPLOAD_BYTES`] or more.
pub fn validate_upload(mime: &str, size_bytes: u64) -> Result<(), AcquireError> {
    if !mime.trim().to_ascii_lowercase().starts_with("image/") {
        return Err(AcquireError::UnsupportedType(mime.to_owned()));
    }
    if size_bytes >= MAX_UPLOAD_BYTES {
        return Err(AcquireError::TooLarge(size_bytes));
    }
    Ok(())
}

/// MIME type of a base64 image data URL, e.g. `image/jpeg`.
#[must_use]
pub fn data_url_mime(data_url: &str) -> Option<&str> {
    let rest = data_url.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime = header.strip_suffix(";base64")?;
    if !mime.starts_with("image/") || payload.is_empty() {
        return None;
    }
    Some(mime)
}
