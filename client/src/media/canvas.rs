//! Canvas encode and redraw.
//!
//! Camera frames and uploads are drawn onto a scratch canvas sized by
//! `workflow::image::capture_size` and re-encoded as JPEG. The result panel
//! redraws the stored data URL into a visible canvas capped by
//! `display_size`, with the decode raced against a watchdog.

#[cfg(test)]
#[path = "canvas_test.rs"]
mod canvas_test;

#[cfg(feature = "csr")]
use wasm_bindgen::{JsCast, JsValue};
#[cfg(feature = "csr")]
use wasm_bindgen_futures::JsFuture;
#[cfg(feature = "csr")]
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};
#[cfg(feature = "csr")]
use workflow::deadline::with_deadline;
#[cfg(feature = "csr")]
use workflow::feedback::IMAGE_DECODE_TIMEOUT;
#[cfg(feature = "csr")]
use workflow::image::{CAPTURE_MIME, JPEG_QUALITY, ImageSource, capture_size, display_size, validate_upload};
#[cfg(feature = "csr")]
use workflow::{AcquireError, CapturedImage};

/// Blob sizes arrive as JS numbers; clamp them into a byte count.
#[cfg(any(test, feature = "csr"))]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn blob_size_bytes(size: f64) -> u64 {
    if size.is_finite() && size > 0.0 { size as u64 } else { 0 }
}

#[cfg(feature = "csr")]
fn js_text(err: &JsValue) -> String {
    js_sys::Reflect::get(err, &JsValue::from_str("message"))
        .ok()
        .and_then(|v| v.as_string())
        .or_else(|| err.as_string())
        .unwrap_or_else(|| format!("{err:?}"))
}

#[cfg(feature = "csr")]
fn scratch_canvas(width: u32, height: u32) -> Result<HtmlCanvasElement, AcquireError> {
    let canvas = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| AcquireError::Encode("no document".to_owned()))?
        .create_element("canvas")
        .map_err(|e| AcquireError::Encode(js_text(&e)))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| AcquireError::Encode("canvas element expected".to_owned()))?;
    canvas.set_width(width);
    canvas.set_height(height);
    Ok(canvas)
}

#[cfg(feature = "csr")]
fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, AcquireError> {
    canvas
        .get_context("2d")
        .ok()
        .flatten()
        .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
        .ok_or_else(|| AcquireError::Encode("2d context unavailable".to_owned()))
}

#[cfg(feature = "csr")]
fn encode(canvas: &HtmlCanvasElement, source: ImageSource) -> Result<CapturedImage, AcquireError> {
    let data_url = canvas
        .to_data_url_with_type_and_encoder_options(CAPTURE_MIME, &JsValue::from_f64(JPEG_QUALITY))
        .map_err(|e| AcquireError::Encode(js_text(&e)))?;
    CapturedImage::new(data_url, canvas.width(), canvas.height(), source)
}

/// Grab the current preview frame as a capped JPEG.
///
/// # Errors
///
/// [`AcquireError::EmptyImage`] before the first frame has arrived, or
/// [`AcquireError::Encode`] if the canvas cannot be drawn or encoded.
#[cfg(feature = "csr")]
pub fn capture_frame(video: &web_sys::HtmlVideoElement) -> Result<CapturedImage, AcquireError> {
    let (width, height) = (video.video_width(), video.video_height());
    if width == 0 || height == 0 {
        return Err(AcquireError::EmptyImage);
    }
    let (w, h) = capture_size(width, height);
    let canvas = scratch_canvas(w, h)?;
    context_2d(&canvas)?
        .draw_image_with_html_video_element_and_dw_and_dh(video, 0.0, 0.0, f64::from(w), f64::from(h))
        .map_err(|e| AcquireError::Encode(js_text(&e)))?;
    encode(&canvas, ImageSource::Camera)
}

/// Validate, decode and re-encode a picked file.
///
/// # Errors
///
/// Type and size rejections from `validate_upload`, [`AcquireError::Decode`]
/// when the browser cannot decode the file, or [`AcquireError::Encode`].
#[cfg(feature = "csr")]
pub async fn ingest_file(file: &web_sys::File) -> Result<CapturedImage, AcquireError> {
    validate_upload(&file.type_(), blob_size_bytes(file.size()))?;

    let window = web_sys::window().ok_or_else(|| AcquireError::Decode("no window".to_owned()))?;
    let promise = window
        .create_image_bitmap_with_blob(file)
        .map_err(|e| AcquireError::Decode(js_text(&e)))?;
    let bitmap = JsFuture::from(promise)
        .await
        .map_err(|e| AcquireError::Decode(js_text(&e)))?
        .dyn_into::<web_sys::ImageBitmap>()
        .map_err(|_| AcquireError::Decode("image bitmap expected".to_owned()))?;

    let (w, h) = capture_size(bitmap.width(), bitmap.height());
    let canvas = scratch_canvas(w, h)?;
    let drawn = context_2d(&canvas)?
        .draw_image_with_image_bitmap_and_dw_and_dh(&bitmap, 0.0, 0.0, f64::from(w), f64::from(h))
        .map_err(|e| AcquireError::Encode(js_text(&e)));
    bitmap.close();
    drawn?;
    encode(&canvas, ImageSource::Upload)
}

/// Redraw `data_url` into the result canvas, capped at the display size.
///
/// # Errors
///
/// [`AcquireError::Decode`] if the image fails to decode or the watchdog
/// fires first.
#[cfg(feature = "csr")]
pub async fn redraw(canvas: &HtmlCanvasElement, data_url: &str) -> Result<(), AcquireError> {
    let img = web_sys::HtmlImageElement::new().map_err(|e| AcquireError::Decode(js_text(&e)))?;
    img.set_src(data_url);

    let decode = JsFuture::from(img.decode());
    match with_deadline(decode, gloo_timers::future::sleep(IMAGE_DECODE_TIMEOUT)).await {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => return Err(AcquireError::Decode(js_text(&e))),
        Err(_) => return Err(AcquireError::Decode("image decode timed out".to_owned())),
    }

    let (w, h) = display_size(img.natural_width(), img.natural_height());
    if w == 0 || h == 0 {
        return Err(AcquireError::EmptyImage);
    }
    canvas.set_width(w);
    canvas.set_height(h);
    context_2d(canvas)?
        .draw_image_with_html_image_element_and_dw_and_dh(&img, 0.0, 0.0, f64::from(w), f64::from(h))
        .map_err(|e| AcquireError::Decode(js_text(&e)))
}
