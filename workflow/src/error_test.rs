use super::*;

// =============================================================
// classify by status
// =============================================================

#[test]
fn classify_uses_specific_statuses() {
    assert_eq!(classify(Some(401), ""), ErrorKind::Auth);
    assert_eq!(classify(Some(403), ""), ErrorKind::Consent);
    assert_eq!(classify(Some(408), ""), ErrorKind::Timeout);
    assert_eq!(classify(Some(504), ""), ErrorKind::Timeout);
    assert_eq!(classify(Some(413), ""), ErrorKind::PayloadTooLarge);
    assert_eq!(classify(Some(415), ""), ErrorKind::UnsupportedFormat);
    assert_eq!(classify(Some(429), ""), ErrorKind::Quota);
    assert_eq!(classify(Some(502), ""), ErrorKind::ServiceUnavailable);
    assert_eq!(classify(Some(503), ""), ErrorKind::ServiceUnavailable);
}

#[test]
fn classify_generic_status_is_unknown() {
    assert_eq!(classify(Some(500), "HTTP error! Status: 500"), ErrorKind::Unknown);
    assert_eq!(classify(Some(404), "HTTP error! Status: 404"), ErrorKind::Unknown);
}

#[test]
fn classify_status_beats_message() {
    assert_eq!(classify(Some(401), "quota exceeded"), ErrorKind::Auth);
}

// =============================================================
// classify by message
// =============================================================

#[test]
fn classify_matches_message_fragments() {
    assert_eq!(classify(None, "Authentication required. Please log in."), ErrorKind::Auth);
    assert_eq!(classify(None, "User has not given consent"), ErrorKind::Consent);
    assert_eq!(classify(None, "Permission denied"), ErrorKind::Consent);
    assert_eq!(classify(None, "upstream request timed out"), ErrorKind::Timeout);
    assert_eq!(classify(None, "Image too large for model"), ErrorKind::PayloadTooLarge);
    assert_eq!(classify(None, "Unsupported image type"), ErrorKind::UnsupportedFormat);
    assert_eq!(classify(None, "Model overloaded"), ErrorKind::ServiceUnavailable);
    assert_eq!(classify(None, "You exceeded your current quota"), ErrorKind::Quota);
    assert_eq!(classify(None, "Failed to fetch"), ErrorKind::Transport);
    assert_eq!(classify(None, "something odd"), ErrorKind::Unknown);
}

#[test]
fn classify_is_case_insensitive() {
    assert_eq!(classify(None, "RATE LIMIT reached"), ErrorKind::Quota);
    assert_eq!(classify(None, "NetworkError when attempting to fetch resource."), ErrorKind::Transport);
}

#[test]
fn classify_prefers_quota_over_permission() {
    assert_eq!(classify(None, "rate limit: permission to retry later"), ErrorKind::Quota);
}

// =============================================================
// AnalysisError
// =============================================================

#[test]
fn analysis_error_kinds_follow_variants() {
    let auth = AnalysisError::AuthRequired { login_url: "/auth/login?next=%2F".to_owned() };
    assert_eq!(auth.kind(), ErrorKind::Auth);
    assert_eq!(auth.status(), Some(401));
    assert_eq!(auth.login_url(), Some("/auth/login?next=%2F"));

    assert_eq!(AnalysisError::Timeout(45).kind(), ErrorKind::Timeout);
    assert_eq!(
        AnalysisError::PayloadTooLarge { size: 6, limit: 5 }.kind(),
        ErrorKind::PayloadTooLarge
    );
    assert_eq!(AnalysisError::Transport("dns".to_owned()).kind(), ErrorKind::Transport);
}

#[test]
fn analysis_error_http_embeds_status_in_message() {
    let error = AnalysisError::Http(500);
    assert_eq!(error.to_string(), "HTTP error! Status: 500");
    assert_eq!(error.kind(), ErrorKind::Unknown);
    assert_eq!(AnalysisError::Http(403).kind(), ErrorKind::Consent);
}

#[test]
fn analysis_error_server_message_is_classified() {
    let error = AnalysisError::Server("OpenAI API error: insufficient_quota".to_owned());
    assert_eq!(error.kind(), ErrorKind::Quota);
    assert_eq!(error.login_url(), None);
}

#[test]
fn every_kind_has_message_and_action() {
    let kinds = [
        ErrorKind::Auth,
        ErrorKind::Consent,
        ErrorKind::Timeout,
        ErrorKind::PayloadTooLarge,
        ErrorKind::UnsupportedFormat,
        ErrorKind::ServiceUnavailable,
        ErrorKind::Quota,
        ErrorKind::Transport,
        ErrorKind::Unknown,
    ];
    for kind in kinds {
        assert!(!kind.user_message().is_empty());
        assert!(!kind.suggested_action().is_empty());
    }
}

#[test]
fn transition_error_no_image_message() {
    assert_eq!(TransitionError::NoImage.to_string(), "Please capture or upload an image first.");
}
