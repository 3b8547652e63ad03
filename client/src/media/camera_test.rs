use super::*;

#[test]
fn error_text_prefers_message() {
    assert_eq!(
        error_text(Some("NotAllowedError".to_owned()), Some("Permission denied".to_owned())),
        "Permission denied"
    );
}

#[test]
fn error_text_falls_back_to_name_then_placeholder() {
    assert_eq!(error_text(Some("NotFoundError".to_owned()), Some(String::new())), "NotFoundError");
    assert_eq!(error_text(None, None), "unknown error");
}

#[test]
fn blocked_autoplay_needs_gesture() {
    assert_eq!(
        play_rejected_status(Some("NotAllowedError"), "play() failed".to_owned()),
        CameraStatus::NeedsGesture
    );
}

#[test]
fn interrupted_play_keeps_starting() {
    assert_eq!(play_rejected_status(Some("AbortError"), "interrupted".to_owned()), CameraStatus::Starting);
}

#[test]
fn other_play_errors_fail() {
    assert_eq!(
        play_rejected_status(Some("NotSupportedError"), "no source".to_owned()),
        CameraStatus::Failed("no source".to_owned())
    );
    assert_eq!(play_rejected_status(None, "boom".to_owned()), CameraStatus::Failed("boom".to_owned()));
}
