use super::*;
use crate::feedback::NO_SCORE;

fn image(source: ImageSource) -> CapturedImage {
    CapturedImage::new("data:image/jpeg;base64,QUJD".to_owned(), 600, 450, source).expect("image")
}

fn granted() -> Result<ConsentState, ConsentError> {
    Ok(ConsentState { granted: true, reason: None })
}

fn denied() -> Result<ConsentState, ConsentError> {
    Ok(ConsentState {
        granted: false,
        reason: Some("no_consent_record".to_owned()),
    })
}

fn captured() -> Workflow {
    let mut wf = Workflow::default();
    wf.service_checked(ProbeOutcome::Available);
    wf.select_input(ImageSource::Camera);
    wf.image_acquired(image(ImageSource::Camera)).expect("acquire");
    wf
}

fn analyzing() -> (Workflow, u64) {
    let mut wf = captured();
    let attempt = wf.begin_analysis().expect("begin");
    assert!(matches!(wf.consent_resolved(attempt, granted()), ConsentStep::Proceed(_)));
    (wf, attempt)
}

// =============================================================
// Acquisition
// =============================================================

#[test]
fn starts_idle_on_capture_step() {
    let wf = Workflow::default();
    assert_eq!(wf.phase, Phase::Idle);
    assert_eq!(wf.subject, DEFAULT_SUBJECT);
    assert_eq!(wf.mode, AnalysisMode::AnswerFeedback);
    let view = wf.view();
    assert_eq!(view.step, Step::Capture);
    assert!(!view.feedback_tab_enabled);
    assert!(!view.analyze_enabled);
    assert!(view.show_placeholder);
}

#[test]
fn selecting_input_enters_acquiring() {
    let mut wf = Workflow::default();
    wf.select_input(ImageSource::Upload);
    assert_eq!(wf.phase, Phase::Acquiring);
    assert!(!wf.wants_camera());
    assert!(wf.view().show_upload);

    wf.select_input(ImageSource::Camera);
    assert!(wf.wants_camera());
    assert!(wf.view().show_camera);
}

#[test]
fn acquiring_image_enables_analyze() {
    let wf = captured();
    assert_eq!(wf.phase, Phase::Captured);
    assert!(!wf.wants_camera());
    let view = wf.view();
    assert!(view.show_capture_result);
    assert!(view.analyze_enabled);
    assert_eq!(view.analyze_label, "Get AI Feedback & Marking");
    assert_eq!(view.retake_label, "Try Again");
}

#[test]
fn upload_replaces_previous_image() {
    let mut wf = captured();
    wf.image_acquired(image(ImageSource::Upload)).expect("replace");
    assert_eq!(wf.image().map(|img| img.source), Some(ImageSource::Upload));
    assert_eq!(wf.input, ImageSource::Upload);
    assert_eq!(wf.view().retake_label, "Upload Different Image");
}

#[test]
fn late_decode_is_rejected_while_busy() {
    let (mut wf, _) = analyzing();
    assert_eq!(wf.image_acquired(image(ImageSource::Upload)), Err(TransitionError::InvalidPhase));
    assert_eq!(wf.image().map(|img| img.source), Some(ImageSource::Camera));
}

#[test]
fn acquisition_failure_is_inline() {
    let mut wf = Workflow::default();
    wf.acquisition_failed(&AcquireError::TooLarge(11 * 1024 * 1024));
    assert_eq!(wf.phase, Phase::Acquiring);
    assert!(wf.view().inline_error.is_some());

    wf.acquisition_failed(&AcquireError::Camera("Permission denied".to_owned()));
    assert_eq!(wf.camera, CameraStatus::Failed("Permission denied".to_owned()));
    assert_eq!(wf.view().camera_error.as_deref(), Some("Permission denied"));
}

#[test]
fn camera_status_drives_capture_controls() {
    let mut wf = Workflow::default();
    wf.select_input(ImageSource::Camera);
    assert!(!wf.view().capture_enabled);
    wf.camera_changed(CameraStatus::NeedsGesture);
    assert!(wf.view().show_enable_camera);
    wf.camera_changed(CameraStatus::Live);
    assert!(wf.view().capture_enabled);
    assert!(!wf.view().show_enable_camera);
}

#[test]
fn retake_clears_image() {
    let mut wf = captured();
    wf.retake().expect("retake");
    assert_eq!(wf.phase, Phase::Acquiring);
    assert!(wf.image().is_none());
    assert!(wf.wants_camera());
    assert_eq!(wf.retake(), Err(TransitionError::InvalidPhase));
}

// =============================================================
// Analyze guards
// =============================================================

#[test]
fn analyze_without_image_sets_inline_error() {
    let mut wf = Workflow::default();
    wf.select_input(ImageSource::Camera);
    assert_eq!(wf.begin_analysis(), Err(TransitionError::NoImage));
    assert_eq!(wf.phase, Phase::Acquiring);
    assert_eq!(
        wf.view().inline_error.as_deref(),
        Some("Please capture or upload an image first.")
    );
}

#[test]
fn analyze_is_single_flight() {
    let mut wf = captured();
    let first = wf.begin_analysis().expect("begin");
    assert_eq!(wf.phase, Phase::ConsentPending);
    assert_eq!(wf.begin_analysis(), Err(TransitionError::Busy));
    assert_eq!(wf.attempt(), first);
    let view = wf.view();
    assert!(!view.analyze_enabled);
    assert_eq!(view.analyze_label, "Processing...");
}

#[test]
fn analyze_blocked_when_service_unavailable() {
    let mut wf = captured();
    wf.service_checked(ProbeOutcome::Unavailable { details: None });
    assert!(!wf.view().analyze_enabled);
    assert_eq!(wf.begin_analysis(), Err(TransitionError::ServiceUnavailable));
    assert_eq!(wf.phase, Phase::Captured);

    wf.service_checking();
    assert!(wf.begin_analysis().is_ok());
}

#[test]
fn request_uses_mode_and_subject_at_begin() {
    let mut wf = captured();
    wf.set_mode(AnalysisMode::ExplanationOnly);
    wf.set_subject("Chemistry");
    let attempt = wf.begin_analysis().expect("begin");
    wf.set_mode(AnalysisMode::AnswerFeedback);
    wf.set_subject("Biology");

    let ConsentStep::Proceed(request) = wf.consent_resolved(attempt, granted()) else {
        panic!("expected proceed");
    };
    assert_eq!(request.mode, AnalysisMode::ExplanationOnly);
    assert_eq!(request.subject, "Chemistry");
    assert_eq!(wf.phase, Phase::Analyzing);
    assert_eq!(wf.view().step, Step::Feedback);
    assert!(wf.view().show_loading);
}

// =============================================================
// Consent
// =============================================================

#[test]
fn denied_consent_opens_modal_once() {
    let mut wf = captured();
    let attempt = wf.begin_analysis().expect("begin");
    assert_eq!(
        wf.consent_resolved(attempt, denied()),
        ConsentStep::ShowModal {
            reason: Some("no_consent_record".to_owned())
        }
    );
    assert_eq!(wf.phase, Phase::Captured);
    assert!(wf.view().consent_modal_open);
    assert_eq!(wf.consent_prompts, 1);

}

#[test]
fn consent_error_after_denial_shows_no_second_modal() {
    let mut wf = captured();
    let attempt = wf.begin_analysis().expect("begin");
    wf.consent_resolved(attempt, denied());
    assert_eq!(wf.consent_prompts, 1);

    let again = wf.begin_analysis().expect("begin");
    let step = wf.consent_resolved(again, Err(ConsentError::Transport("offline".to_owned())));
    assert!(matches!(step, ConsentStep::Notify(_)));
    assert_eq!(wf.consent_prompts, 1);
    assert!(!wf.consent_modal_open);
    assert_eq!(wf.phase, Phase::Captured);
}

#[test]
fn accepting_consent_reruns_attempt() {
    let mut wf = captured();
    let attempt = wf.begin_analysis().expect("begin");
    wf.consent_resolved(attempt, denied());
    let next = wf.accept_consent().expect("accept");
    assert!(next > attempt);
    assert!(!wf.consent_modal_open);
    assert_eq!(wf.phase, Phase::ConsentPending);
    assert!(matches!(wf.consent_resolved(next, granted()), ConsentStep::Proceed(_)));
}

#[test]
fn closing_modal_keeps_image() {
    let mut wf = captured();
    let attempt = wf.begin_analysis().expect("begin");
    wf.consent_resolved(attempt, denied());
    wf.close_consent_modal();
    assert!(!wf.view().consent_modal_open);
    assert!(wf.view().analyze_enabled);
    assert!(wf.image().is_some());
}

#[test]
fn consent_check_error_notifies() {
    let mut wf = captured();
    let attempt = wf.begin_analysis().expect("begin");
    let step = wf.consent_resolved(attempt, Err(ConsentError::Http(500)));
    assert_eq!(
        step,
        ConsentStep::Notify(Notice {
            title: CONSENT_CHECK_ERROR_TITLE.to_owned(),
            body: CONSENT_CHECK_ERROR_BODY.to_owned(),
        })
    );
    assert_eq!(wf.phase, Phase::Captured);
    assert!(!wf.consent_modal_open);
}

// =============================================================
// Settlement
// =============================================================

#[test]
fn success_renders_result() {
    let (mut wf, attempt) = analyzing();
    let result = AnalysisSuccess {
        explanation: Some("Expand the bracket.".to_owned()),
        feedback: Some("Correct.".to_owned()),
        score: Some("9/10".to_owned()),
        ..AnalysisSuccess::default()
    };
    assert_eq!(wf.analysis_settled(attempt, Ok(result)), AnalysisStep::Render);
    assert_eq!(wf.phase, Phase::Result);

    let view = wf.view();
    assert!(view.show_result);
    assert!(!view.show_loading);
    assert!(!view.show_placeholder);

    let feedback = wf.feedback_view().expect("feedback view");
    assert_eq!(feedback.score_badge.as_deref(), Some("9/10"));
    assert_eq!(feedback.subject, "Mathematics");
}

#[test]
fn missing_score_shows_placeholder_badge() {
    let (mut wf, attempt) = analyzing();
    let result = AnalysisSuccess {
        feedback: Some("Good.".to_owned()),
        ..AnalysisSuccess::default()
    };
    wf.analysis_settled(attempt, Ok(result));
    assert_eq!(
        wf.feedback_view().and_then(|view| view.score_badge).as_deref(),
        Some(NO_SCORE)
    );
}

#[test]
fn failure_enters_error_phase() {
    let (mut wf, attempt) = analyzing();
    let step = wf.analysis_settled(attempt, Err(AnalysisError::Timeout(90)));
    assert_eq!(step, AnalysisStep::Failed { redirect: None });
    assert_eq!(wf.phase, Phase::Error);
    let failure = wf.failure().expect("failure");
    assert_eq!(failure.kind, ErrorKind::Timeout);
    assert_eq!(failure.message(), ErrorKind::Timeout.user_message());
    assert!(wf.view().show_error);
    assert!(wf.feedback_view().is_none());
}

#[test]
fn auth_failure_carries_redirect() {
    let (mut wf, attempt) = analyzing();
    let step = wf.analysis_settled(
        attempt,
        Err(AnalysisError::AuthRequired {
            login_url: "/auth/login?next=%2Fcapture".to_owned(),
        }),
    );
    assert_eq!(
        step,
        AnalysisStep::Failed {
            redirect: Some("/auth/login?next=%2Fcapture".to_owned())
        }
    );
}

#[test]
fn stale_settlements_are_ignored() {
    let (mut wf, attempt) = analyzing();
    wf.start_over();
    assert_eq!(
        wf.analysis_settled(attempt, Ok(AnalysisSuccess::default())),
        AnalysisStep::Stale
    );
    assert_eq!(wf.phase, Phase::Acquiring);
    assert!(wf.result().is_none());

    let mut wf = captured();
    let attempt = wf.begin_analysis().expect("begin");
    wf.new_upload();
    assert_eq!(wf.consent_resolved(attempt, granted()), ConsentStep::Stale);
    assert_eq!(wf.phase, Phase::Acquiring);
}

#[test]
fn settlement_for_wrong_phase_is_stale() {
    let mut wf = captured();
    let attempt = wf.begin_analysis().expect("begin");
    assert_eq!(
        wf.analysis_settled(attempt, Ok(AnalysisSuccess::default())),
        AnalysisStep::Stale
    );
    assert_eq!(wf.phase, Phase::ConsentPending);
}

// =============================================================
// Reset
// =============================================================

#[test]
fn retry_keeps_image_for_resume() {
    let (mut wf, attempt) = analyzing();
    wf.analysis_settled(attempt, Err(AnalysisError::Http(500)));
    wf.retry().expect("retry");
    assert_eq!(wf.phase, Phase::Acquiring);
    assert!(wf.failure().is_none());
    assert!(wf.image().is_some());
    assert!(wf.view().show_resume);

    wf.resume_captured().expect("resume");
    assert_eq!(wf.phase, Phase::Captured);
    assert!(wf.view().analyze_enabled);
}

#[test]
fn retry_only_from_error() {
    let mut wf = captured();
    assert_eq!(wf.retry(), Err(TransitionError::InvalidPhase));
}

#[test]
fn resume_requires_kept_image() {
    let mut wf = Workflow::default();
    wf.select_input(ImageSource::Camera);
    assert_eq!(wf.resume_captured(), Err(TransitionError::NoImage));
}

#[test]
fn start_over_and_new_upload_clear_everything() {
    let (mut wf, attempt) = analyzing();
    wf.analysis_settled(attempt, Ok(AnalysisSuccess::default()));

    wf.start_over();
    assert_eq!(wf.phase, Phase::Acquiring);
    assert_eq!(wf.input, ImageSource::Camera);
    assert!(wf.image().is_none());
    assert!(wf.result().is_none());
    assert!(wf.wants_camera());
    assert_eq!(wf.view().step, Step::Capture);

    wf.image_acquired(image(ImageSource::Camera)).expect("acquire");
    wf.new_upload();
    assert_eq!(wf.input, ImageSource::Upload);
    assert!(wf.image().is_none());
    assert!(wf.view().show_upload);
    assert!(!wf.view().show_resume);
}

#[test]
fn analyze_after_reset_needs_new_image() {
    let (mut wf, attempt) = analyzing();
    wf.analysis_settled(attempt, Ok(AnalysisSuccess::default()));

    wf.start_over();
    assert_eq!(wf.begin_analysis(), Err(TransitionError::NoImage));
    assert_eq!(wf.view().inline_error.as_deref(), Some("Please capture or upload an image first."));

    wf.image_acquired(image(ImageSource::Camera)).expect("acquire");
    wf.new_upload();
    assert_eq!(wf.begin_analysis(), Err(TransitionError::NoImage));
    assert_eq!(wf.inline_error.as_deref(), Some("Please capture or upload an image first."));
    assert_eq!(wf.phase, Phase::Acquiring);
}

#[test]
fn explanation_only_view_labels() {
    let mut wf = captured();
    wf.set_mode(AnalysisMode::ExplanationOnly);
    let view = wf.view();
    assert_eq!(view.analyze_label, "Get AI Explanation");
    assert_eq!(view.capture_title, "Capture or Upload Question");
    assert_eq!(view.result_label, "Question Image:");
}
