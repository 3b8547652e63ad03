//! Rear-camera stream lifecycle.
//!
//! DESIGN
//! ======
//! [`CameraStream`] is the only owner of the `MediaStream`. Dropping it stops
//! every track, so releasing the camera is a matter of dropping the value
//! (leaving the camera sub-tab, resetting, starting analysis, unmount).

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

#[cfg(any(test, feature = "csr"))]
use workflow::machine::CameraStatus;

#[cfg(feature = "csr")]
use std::cell::RefCell;
#[cfg(feature = "csr")]
use std::rc::Rc;

#[cfg(feature = "csr")]
use wasm_bindgen::{JsCast, JsValue, closure::Closure};
#[cfg(feature = "csr")]
use wasm_bindgen_futures::JsFuture;
#[cfg(feature = "csr")]
use workflow::AcquireError;
#[cfg(feature = "csr")]
use workflow::image::{CAMERA_IDEAL_HEIGHT, CAMERA_IDEAL_WIDTH};

/// Human-readable text for a browser media error.
#[cfg(any(test, feature = "csr"))]
fn error_text(name: Option<String>, message: Option<String>) -> String {
    message
        .filter(|m| !m.is_empty())
        .or(name.filter(|n| !n.is_empty()))
        .unwrap_or_else(|| "unknown error".to_owned())
}

/// Camera status after `play()` on the preview was rejected.
///
/// `NotAllowedError` here means autoplay was blocked, not that camera access
/// was refused; a click on "Enable camera" retries playback.
#[cfg(any(test, feature = "csr"))]
fn play_rejected_status(name: Option<&str>, text: String) -> CameraStatus {
    match name {
        Some("NotAllowedError") => CameraStatus::NeedsGesture,
        Some("AbortError") => CameraStatus::Starting,
        _ => CameraStatus::Failed(text),
    }
}

#[cfg(feature = "csr")]
fn js_field(value: &JsValue, field: &str) -> Option<String> {
    js_sys::Reflect::get(value, &JsValue::from_str(field))
        .ok()
        .and_then(|v| v.as_string())
}

#[cfg(feature = "csr")]
fn js_error_text(err: &JsValue) -> String {
    error_text(js_field(err, "name"), js_field(err, "message").or_else(|| err.as_string()))
}

/// Live camera stream. Tracks stop on drop.
#[cfg(feature = "csr")]
pub struct CameraStream {
    stream: web_sys::MediaStream,
}

#[cfg(feature = "csr")]
impl CameraStream {
    /// Ask for the rear camera at the ideal capture resolution.
    ///
    /// # Errors
    ///
    /// Returns [`AcquireError::Camera`] with the browser's message when the
    /// device is missing or permission is refused.
    pub async fn open() -> Result<Self, AcquireError> {
        let window = web_sys::window().ok_or_else(|| AcquireError::Camera("no window".to_owned()))?;
        let devices = window
            .navigator()
            .media_devices()
            .map_err(|e| AcquireError::Camera(js_error_text(&e)))?;

        let constraints = web_sys::MediaStreamConstraints::new();
        constraints.set_video(&video_constraints());
        constraints.set_audio(&JsValue::FALSE);

        let promise = devices
            .get_user_media_with_constraints(&constraints)
            .map_err(|e| AcquireError::Camera(js_error_text(&e)))?;
        let stream = JsFuture::from(promise)
            .await
            .map_err(|e| AcquireError::Camera(js_error_text(&e)))?
            .dyn_into::<web_sys::MediaStream>()
            .map_err(|_| AcquireError::Camera("unexpected getUserMedia result".to_owned()))?;
        Ok(Self { stream })
    }

    /// Bind the stream to the preview element and try to start playback.
    pub async fn attach(&self, video: &web_sys::HtmlVideoElement) -> CameraStatus {
        video.set_src_object(Some(&self.stream));
        play(video).await
    }

    /// Stop every track. Safe to call more than once.
    pub fn stop(&self) {
        for track in self.stream.get_tracks().iter() {
            if let Ok(track) = track.dyn_into::<web_sys::MediaStreamTrack>() {
                track.stop();
            }
        }
    }
}

#[cfg(feature = "csr")]
impl Drop for CameraStream {
    fn drop(&mut self) {
        self.stop();
        leptos::logging::log!("camera stream released");
    }
}

/// `beforeunload` listener that drops whatever stream is in `slot`.
///
/// The listener is removed when the hook is dropped.
#[cfg(feature = "csr")]
pub struct ReleaseOnUnload {
    listener: Closure<dyn FnMut()>,
}

#[cfg(feature = "csr")]
impl ReleaseOnUnload {
    pub fn install(slot: Rc<RefCell<Option<CameraStream>>>) -> Option<Self> {
        let window = web_sys::window()?;
        let listener = Closure::wrap(Box::new(move || {
            slot.borrow_mut().take();
        }) as Box<dyn FnMut()>);
        window
            .add_event_listener_with_callback("beforeunload", listener.as_ref().unchecked_ref())
            .ok()?;
        Some(Self { listener })
    }
}

#[cfg(feature = "csr")]
impl Drop for ReleaseOnUnload {
    fn drop(&mut self) {
        if let Some(window) = web_sys::window() {
            let _ = window.remove_event_listener_with_callback("beforeunload", self.listener.as_ref().unchecked_ref());
        }
    }
}

/// Start (or retry) playback of the preview element.
#[cfg(feature = "csr")]
pub async fn play(video: &web_sys::HtmlVideoElement) -> CameraStatus {
    let promise = match video.play() {
        Ok(promise) => promise,
        Err(e) => return CameraStatus::Failed(js_error_text(&e)),
    };
    match JsFuture::from(promise).await {
        Ok(_) => CameraStatus::Live,
        Err(e) => {
            let name = js_field(&e, "name");
            leptos::logging::warn!("camera preview play() rejected: {}", js_error_text(&e));
            play_rejected_status(name.as_deref(), js_error_text(&e))
        }
    }
}

#[cfg(feature = "csr")]
fn video_constraints() -> JsValue {
    let ideal = |value: u32| {
        let obj = js_sys::Object::new();
        let _ = js_sys::Reflect::set(&obj, &JsValue::from_str("ideal"), &JsValue::from(value));
        obj
    };
    let video = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&video, &JsValue::from_str("facingMode"), &JsValue::from_str("environment"));
    let _ = js_sys::Reflect::set(&video, &JsValue::from_str("width"), &ideal(CAMERA_IDEAL_WIDTH));
    let _ = js_sys::Reflect::set(&video, &JsValue::from_str("height"), &ideal(CAMERA_IDEAL_HEIGHT));
    video.into()
}
