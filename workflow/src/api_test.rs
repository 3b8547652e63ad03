use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::time::Duration;

use futures::executor::block_on;
use futures::future;

use super::*;
use crate::error::ErrorKind;
use crate::image::{CapturedImage, ImageSource};

// =============================================================
// Scripted transport
// =============================================================

#[derive(Clone, Debug, PartialEq, Eq)]
enum Call {
    Get(String),
    Post(String, String),
}

/// Replays canned replies in order and records every call.
#[derive(Default)]
struct Scripted {
    replies: RefCell<VecDeque<Result<HttpReply, String>>>,
    calls: RefCell<Vec<Call>>,
    hang: bool,
    hang_get: bool,
}

impl Scripted {
    fn with(replies: Vec<Result<HttpReply, String>>) -> Self {
        Self {
            replies: RefCell::new(replies.into()),
            ..Self::default()
        }
    }

    fn hanging() -> Self {
        Self { hang: true, ..Self::default() }
    }

    fn hanging_get() -> Self {
        Self {
            hang_get: true,
            ..Self::default()
        }
    }

    fn next(&self) -> Result<HttpReply, String> {
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err("no scripted reply".to_owned()))
    }
}

impl Transport for &Scripted {
    async fn get(&self, path: &str) -> Result<HttpReply, String> {
        self.calls.borrow_mut().push(Call::Get(path.to_owned()));
        if self.hang_get {
            future::pending::<()>().await;
        }
        self.next()
    }

    async fn post_json(&self, path: &str, body: String) -> Result<HttpReply, String> {
        self.calls.borrow_mut().push(Call::Post(path.to_owned(), body));
        if self.hang {
            future::pending::<()>().await;
        }
        self.next()
    }
}

fn reply(status: u16, body: &str) -> Result<HttpReply, String> {
    Ok(HttpReply {
        status,
        url: "https://tutor.example/api/whatever".to_owned(),
        body: body.to_owned(),
    })
}

fn client(transport: &Scripted) -> AnalysisClient<&Scripted> {
    AnalysisClient::new(transport, Endpoints::default())
}

fn request(mode: AnalysisMode) -> AnalysisRequest {
    let image =
        CapturedImage::new("data:image/jpeg;base64,/9j/4AAQ".to_owned(), 600, 450, ImageSource::Camera).expect("image");
    AnalysisRequest::new(mode, "Mathematics", &image)
}

fn never(_: Duration) -> future::Pending<()> {
    future::pending()
}

// =============================================================
// HttpReply / Endpoints
// =============================================================

#[test]
fn landed_on_login_checks_path_only() {
    let bounced = HttpReply {
        status: 200,
        url: "https://tutor.example/auth/login?next=%2Fcapture".to_owned(),
        body: String::new(),
    };
    assert!(bounced.landed_on_login());

    let host_only = HttpReply {
        status: 200,
        url: "https://login.example/api/analyze-answer".to_owned(),
        body: String::new(),
    };
    assert!(!host_only.landed_on_login());
}

#[test]
fn login_redirect_encodes_next_path() {
    let endpoints = Endpoints::default();
    assert_eq!(
        endpoints.login_redirect("/capture?mode=answer feedback"),
        "/auth/login?next=%2Fcapture%3Fmode%3Danswer%20feedback"
    );
}

#[test]
fn analyze_endpoint_follows_mode() {
    let endpoints = Endpoints::default();
    assert_eq!(endpoints.analyze(AnalysisMode::ExplanationOnly), "/api/analyze-captured-image");
    assert_eq!(endpoints.analyze(AnalysisMode::AnswerFeedback), "/api/analyze-answer");
}

// =============================================================
// Service probe
// =============================================================

#[test]
fn probe_available_on_success_body() {
    let transport = Scripted::with(vec![reply(200, r#"{"success":true}"#)]);
    assert_eq!(block_on(client(&transport).probe_service()), ProbeOutcome::Available);
    assert_eq!(*transport.calls.borrow(), vec![Call::Get("/api/test-openai".to_owned())]);
}

#[test]
fn probe_unavailable_carries_details() {
    let transport = Scripted::with(vec![reply(200, r#"{"success":false,"message":"API key missing"}"#)]);
    assert_eq!(
        block_on(client(&transport).probe_service()),
        ProbeOutcome::Unavailable {
            details: Some("API key missing".to_owned())
        }
    );

    let transport = Scripted::with(vec![reply(500, "")]);
    assert_eq!(
        block_on(client(&transport).probe_service()),
        ProbeOutcome::Unavailable {
            details: Some("HTTP error! Status: 500".to_owned())
        }
    );

    let transport = Scripted::with(vec![Err("offline".to_owned())]);
    assert_eq!(
        block_on(client(&transport).probe_service()),
        ProbeOutcome::Unavailable {
            details: Some("offline".to_owned())
        }
    );
}

// =============================================================
// Consent
// =============================================================

#[test]
fn consent_granted_and_denied() {
    let transport = Scripted::with(vec![
        reply(200, r#"{"success":true,"consent_given":true}"#),
        reply(200, r#"{"success":true,"consent_given":false,"reason":"not_given"}"#),
    ]);
    let api = client(&transport);
    assert!(block_on(api.check_consent()).expect("consent").granted);
    let denied = block_on(api.check_consent()).expect("consent");
    assert!(!denied.granted);
    assert_eq!(denied.reason.as_deref(), Some("not_given"));
    assert_eq!(transport.calls.borrow().len(), 2);
}

#[test]
fn consent_failures_are_errors_not_denials() {
    let transport = Scripted::with(vec![Err("offline".to_owned()), reply(500, ""), reply(200, "<html>")]);
    let api = client(&transport);
    assert_eq!(block_on(api.check_consent()), Err(ConsentError::Transport("offline".to_owned())));
    assert_eq!(block_on(api.check_consent()), Err(ConsentError::Http(500)));
    assert!(matches!(block_on(api.check_consent()), Err(ConsentError::Decode(_))));
}

#[test]
fn stalled_consent_check_times_out_as_transport_error() {
    let transport = Scripted::hanging_get();
    let asked = Cell::new(Duration::ZERO);
    let sleep = |d: Duration| {
        asked.set(d);
        future::ready(())
    };
    let err = block_on(client(&transport).check_consent_within(sleep)).expect_err("timeout");
    assert_eq!(
        err,
        ConsentError::Transport("consent check timed out after 15 seconds".to_owned())
    );
    assert_eq!(asked.get(), CONSENT_TIMEOUT);
    assert_eq!(transport.calls.borrow().as_slice(), [Call::Get("/api/check-ai-consent".to_owned())]);
}

#[test]
fn consent_check_within_deadline_passes_result_through() {
    let transport = Scripted::with(vec![reply(200, r#"{"success":true,"consent_given":true}"#)]);
    let state = block_on(client(&transport).check_consent_within(never)).expect("consent");
    assert!(state.granted);

    let transport = Scripted::with(vec![reply(503, "")]);
    assert_eq!(
        block_on(client(&transport).check_consent_within(never)),
        Err(ConsentError::Http(503))
    );
}

// =============================================================
// Analyze
// =============================================================

#[test]
fn answer_feedback_end_to_end() {
    let transport = Scripted::with(vec![reply(
        200,
        r#"{"success":true,"explanation":"Factor first.","feedback":"Mostly right.","tips":"Show working.","subject":"Mathematics","score":"7/10"}"#,
    )]);
    let out = block_on(client(&transport).analyze(&request(AnalysisMode::AnswerFeedback), "/capture", never))
        .expect("analysis");
    assert_eq!(out.score.as_deref(), Some("7/10"));
    assert_eq!(out.feedback.as_deref(), Some("Mostly right."));

    let calls = transport.calls.borrow();
    let Call::Post(path, body) = &calls[0] else {
        panic!("expected a POST, got {calls:?}");
    };
    assert_eq!(path, "/api/analyze-answer");
    let body: serde_json::Value = serde_json::from_str(body).expect("json body");
    assert_eq!(body["question_image"], body["answer_image"]);
    assert_eq!(body["combined_image"], true);
}

#[test]
fn explanation_only_end_to_end() {
    let transport = Scripted::with(vec![reply(200, r#"{"success":true,"explanation":"Newton's second law."}"#)]);
    let out = block_on(client(&transport).analyze(&request(AnalysisMode::ExplanationOnly), "/capture", never))
        .expect("analysis");
    assert_eq!(out.explanation.as_deref(), Some("Newton's second law."));
    assert_eq!(out.score, None);

    let calls = transport.calls.borrow();
    let Call::Post(path, body) = &calls[0] else {
        panic!("expected a POST, got {calls:?}");
    };
    assert_eq!(path, "/api/analyze-captured-image");
    let body: serde_json::Value = serde_json::from_str(body).expect("json body");
    assert_eq!(body["mode"], "question-only");
    assert_eq!(body["image_data"], "data:image/jpeg;base64,/9j/4AAQ");
}

#[test]
fn oversized_payload_is_rejected_without_sending() {
    let transport = Scripted::default();
    let image = CapturedImage::new(
        format!("data:image/jpeg;base64,{}", "A".repeat(MAX_PAYLOAD_BYTES)),
        600,
        450,
        ImageSource::Upload,
    )
    .expect("image");
    let big = AnalysisRequest::new(AnalysisMode::ExplanationOnly, "Physics", &image);
    let err = block_on(client(&transport).analyze(&big, "/capture", never)).expect_err("too large");
    assert!(matches!(err, AnalysisError::PayloadTooLarge { limit: MAX_PAYLOAD_BYTES, .. }));
    assert!(transport.calls.borrow().is_empty());
}

#[test]
fn deadline_uses_mode_duration() {
    let transport = Scripted::hanging();
    let asked = Cell::new(Duration::ZERO);
    let sleep = |d: Duration| {
        asked.set(d);
        future::ready(())
    };
    let err = block_on(client(&transport).analyze(&request(AnalysisMode::AnswerFeedback), "/capture", sleep))
        .expect_err("timeout");
    assert_eq!(err, AnalysisError::Timeout(90));
    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert_eq!(asked.get(), Duration::from_secs(90));

    let transport = Scripted::hanging();
    let err = block_on(client(&transport).analyze(
        &request(AnalysisMode::ExplanationOnly),
        "/capture",
        |_| future::ready(()),
    ))
    .expect_err("timeout");
    assert_eq!(err, AnalysisError::Timeout(45));
}

#[test]
fn unauthorized_yields_login_redirect() {
    let transport = Scripted::with(vec![reply(401, "")]);
    let err = block_on(client(&transport).analyze(&request(AnalysisMode::AnswerFeedback), "/capture", never))
        .expect_err("auth");
    assert_eq!(err.login_url(), Some("/auth/login?next=%2Fcapture"));
    assert_eq!(err.kind(), ErrorKind::Auth);
}

#[test]
fn login_bounce_yields_login_redirect() {
    let transport = Scripted::with(vec![Ok(HttpReply {
        status: 200,
        url: "https://tutor.example/auth/login?next=%2Fapi%2Fanalyze-answer".to_owned(),
        body: "<html>login</html>".to_owned(),
    })]);
    let err = block_on(client(&transport).analyze(&request(AnalysisMode::AnswerFeedback), "/tutor", never))
        .expect_err("auth");
    assert!(matches!(err, AnalysisError::AuthRequired { .. }));
    assert_eq!(err.login_url(), Some("/auth/login?next=%2Ftutor"));
}

#[test]
fn non_success_status_is_http_error() {
    let transport = Scripted::with(vec![reply(500, "boom")]);
    let err = block_on(client(&transport).analyze(&request(AnalysisMode::AnswerFeedback), "/capture", never))
        .expect_err("http");
    assert_eq!(err, AnalysisError::Http(500));
    assert_eq!(err.to_string(), "HTTP error! Status: 500");

    let transport = Scripted::with(vec![reply(429, "")]);
    let err = block_on(client(&transport).analyze(&request(AnalysisMode::AnswerFeedback), "/capture", never))
        .expect_err("http");
    assert_eq!(err.kind(), ErrorKind::Quota);
}

#[test]
fn transport_failure_is_classified() {
    let transport = Scripted::with(vec![Err("NetworkError when attempting to fetch resource.".to_owned())]);
    let err = block_on(client(&transport).analyze(&request(AnalysisMode::AnswerFeedback), "/capture", never))
        .expect_err("transport");
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[test]
fn server_failure_and_bad_json() {
    let transport = Scripted::with(vec![
        reply(200, r#"{"success":false,"message":"User has not given AI consent"}"#),
        reply(200, "not json"),
    ]);
    let api = client(&transport);
    let err = block_on(api.analyze(&request(AnalysisMode::AnswerFeedback), "/capture", never)).expect_err("server");
    assert_eq!(err, AnalysisError::Server("User has not given AI consent".to_owned()));
    assert_eq!(err.kind(), ErrorKind::Consent);

    let err = block_on(api.analyze(&request(AnalysisMode::AnswerFeedback), "/capture", never)).expect_err("decode");
    assert!(matches!(err, AnalysisError::Decode(_)));
}

#[test]
fn configured_deadline_overrides_mode_default() {
    let transport = Scripted::hanging();
    let api = client(&transport).with_deadlines(Deadlines {
        explanation_only: Duration::from_secs(10),
        answer_feedback: Duration::from_secs(20),
    });
    let asked = Cell::new(Duration::ZERO);
    let err = block_on(api.analyze(&request(AnalysisMode::AnswerFeedback), "/capture", |d| {
        asked.set(d);
        future::ready(())
    }))
    .expect_err("timeout");
    assert_eq!(err, AnalysisError::Timeout(20));
    assert_eq!(asked.get(), Duration::from_secs(20));
}

#[test]
fn default_deadlines_match_modes() {
    let deadlines = Deadlines::default();
    assert_eq!(deadlines.for_mode(AnalysisMode::ExplanationOnly), Duration::from_secs(45));
    assert_eq!(deadlines.for_mode(AnalysisMode::AnswerFeedback), Duration::from_secs(90));
}
