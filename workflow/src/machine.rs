//! The capture-to-feedback state machine.
//!
//! ARCHITECTURE
//! ============
//! `Idle -> Acquiring -> Captured -> ConsentPending -> Analyzing -> Result | Error`,
//! and back to `Acquiring` from the end states. The machine is cyclic; there
//! is no terminal phase.
//!
//! [`Workflow`] is the single owner of the captured image. Async work
//! (camera, decode, consent, analyze) happens outside and reports back
//! through the event methods here. Each analyze attempt gets an id from
//! [`Workflow::begin_analysis`]; settlements carrying an older id are
//! ignored, so a slow response can never overwrite a newer run.
//!
//! The UI never toggles visibility itself: it renders [`Workflow::view`],
//! which is recomputed from the phase after every event.

#[cfg(test)]
#[path = "machine_test.rs"]
mod machine_test;

use crate::api::ProbeOutcome;
use crate::error::{AcquireError, AnalysisError, ConsentError, ErrorKind, TransitionError};
use crate::feedback::FeedbackView;
use crate::image::{CapturedImage, ImageSource};
use crate::mode::{AnalysisMode, DEFAULT_SUBJECT};
use crate::types::{AnalysisRequest, AnalysisSuccess, ConsentState};

/// Workflow phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Acquiring,
    Captured,
    ConsentPending,
    Analyzing,
    Result,
    Error,
}

impl Phase {
    /// An attempt is in flight; analyze must stay disabled.
    #[must_use]
    pub fn is_busy(self) -> bool {
        matches!(self, Self::ConsentPending | Self::Analyzing)
    }
}

/// Top-level step tab.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Step {
    #[default]
    Capture,
    Feedback,
}

/// Live camera state as reported by the browser glue.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CameraStatus {
    #[default]
    Off,
    Starting,
    Live,
    /// Stream granted but autoplay was blocked; needs a click to play.
    NeedsGesture,
    /// Permission denied or hardware error, with the raw browser message.
    Failed(String),
}

/// AI service availability from the page-load probe.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ServiceStatus {
    #[default]
    Checking,
    Available,
    Unavailable { details: Option<String> },
}

/// Transient notification raised by a transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub body: String,
}

/// Classified analysis failure shown in the error panel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Failure {
    pub kind: ErrorKind,
    /// Raw error text, for the details line and logs.
    pub detail: String,
}

impl Failure {
    #[must_use]
    pub fn message(&self) -> &'static str {
        self.kind.user_message()
    }

    #[must_use]
    pub fn suggested_action(&self) -> &'static str {
        self.kind.suggested_action()
    }
}

/// What the controller should do after a consent check settles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConsentStep {
    /// Consent granted; send this request.
    Proceed(AnalysisRequest),
    /// Consent missing; the modal is now open.
    ShowModal { reason: Option<String> },
    /// The check itself failed; show this notice instead of the modal.
    Notify(Notice),
    /// The attempt was superseded; do nothing.
    Stale,
}

/// What the controller should do after an analyze call settles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnalysisStep {
    /// Result phase entered; render it.
    Render,
    /// Error phase entered. `redirect` is set for auth failures.
    Failed { redirect: Option<String> },
    /// The attempt was superseded; do nothing.
    Stale,
}

/// Title of the notice raised when the consent check cannot be completed.
pub const CONSENT_CHECK_ERROR_TITLE: &str = "Consent Check Error";
/// Body of the notice raised when the consent check cannot be completed.
pub const CONSENT_CHECK_ERROR_BODY: &str =
    "There was an error checking your AI consent status. Please try again.";

/// Workflow state for one page session.
#[derive(Clone, Debug)]
pub struct Workflow {
    pub phase: Phase,
    pub mode: AnalysisMode,
    pub subject: String,
    /// Active acquisition sub-tab.
    pub input: ImageSource,
    pub camera: CameraStatus,
    pub service: ServiceStatus,
    pub consent_modal_open: bool,
    /// How many times the consent modal has been opened this session.
    pub consent_prompts: u32,
    /// Inline message under the capture controls.
    pub inline_error: Option<String>,
    image: Option<CapturedImage>,
    attempt: u64,
    request_mode: AnalysisMode,
    request_subject: String,
    result: Option<AnalysisSuccess>,
    failure: Option<Failure>,
}

impl Default for Workflow {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            mode: AnalysisMode::default(),
            subject: DEFAULT_SUBJECT.to_owned(),
            input: ImageSource::Camera,
            camera: CameraStatus::Off,
            service: ServiceStatus::Checking,
            consent_modal_open: false,
            consent_prompts: 0,
            inline_error: None,
            image: None,
            attempt: 0,
            request_mode: AnalysisMode::default(),
            request_subject: DEFAULT_SUBJECT.to_owned(),
            result: None,
            failure: None,
        }
    }
}

impl Workflow {
    #[must_use]
    pub fn image(&self) -> Option<&CapturedImage> {
        self.image.as_ref()
    }

    #[must_use]
    pub fn result(&self) -> Option<&AnalysisSuccess> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn failure(&self) -> Option<&Failure> {
        self.failure.as_ref()
    }

    /// Id of the most recent analyze attempt.
    #[must_use]
    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    /// Mode the current result or failure was requested with.
    #[must_use]
    pub fn request_mode(&self) -> AnalysisMode {
        self.request_mode
    }

    // =============================================================
    // Selection
    // =============================================================

    pub fn set_mode(&mut self, mode: AnalysisMode) {
        self.mode = mode;
    }

    pub fn set_subject(&mut self, subject: &str) {
        self.subject = subject.to_owned();
    }

    /// Switch the acquisition sub-tab. Entering from `Idle` starts acquiring.
    pub fn select_input(&mut self, input: ImageSource) {
        self.input = input;
        self.inline_error = None;
        if self.phase == Phase::Idle {
            self.phase = Phase::Acquiring;
        }
    }

    /// The camera should be streaming: acquiring on the camera sub-tab.
    #[must_use]
    pub fn wants_camera(&self) -> bool {
        self.phase == Phase::Acquiring && self.input == ImageSource::Camera
    }

    // =============================================================
    // Acquisition
    // =============================================================

    pub fn camera_changed(&mut self, status: CameraStatus) {
        self.camera = status;
    }

    /// Store a freshly acquired image, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::InvalidPhase`] if no acquisition is open,
    /// e.g. a decode that finished after the user moved on.
    pub fn image_acquired(&mut self, image: CapturedImage) -> Result<(), TransitionError> {
        match self.phase {
            Phase::Idle | Phase::Acquiring | Phase::Captured => {
                self.input = image.source;
                self.image = Some(image);
                self.inline_error = None;
                self.phase = Phase::Captured;
                Ok(())
            }
            _ => Err(TransitionError::InvalidPhase),
        }
    }

    /// Record a camera or upload failure. The phase does not change.
    pub fn acquisition_failed(&mut self, error: &AcquireError) {
        if let AcquireError::Camera(message) = error {
            self.camera = CameraStatus::Failed(message.clone());
        }
        self.inline_error = Some(error.to_string());
        if self.phase == Phase::Idle {
            self.phase = Phase::Acquiring;
        }
    }

    /// Discard the current capture and go back to the camera or picker.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::InvalidPhase`] unless in `Captured`.
    pub fn retake(&mut self) -> Result<(), TransitionError> {
        if self.phase != Phase::Captured {
            return Err(TransitionError::InvalidPhase);
        }
        self.image = None;
        self.phase = Phase::Acquiring;
        Ok(())
    }

    /// Re-use the image kept by [`Workflow::retry`] without recapturing.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::NoImage`] if nothing was kept, or
    /// [`TransitionError::InvalidPhase`] outside `Acquiring`.
    pub fn resume_captured(&mut self) -> Result<(), TransitionError> {
        if self.phase != Phase::Acquiring {
            return Err(TransitionError::InvalidPhase);
        }
        if self.image.is_none() {
            return Err(TransitionError::NoImage);
        }
        self.phase = Phase::Captured;
        Ok(())
    }

    // =============================================================
    // Service probe
    // =============================================================

    pub fn service_checking(&mut self) {
        self.service = ServiceStatus::Checking;
    }

    pub fn service_checked(&mut self, outcome: ProbeOutcome) {
        self.service = match outcome {
            ProbeOutcome::Available => ServiceStatus::Available,
            ProbeOutcome::Unavailable { details } => ServiceStatus::Unavailable { details },
        };
    }

    // =============================================================
    // Analysis
    // =============================================================

    /// Start an attempt: `Captured -> ConsentPending`.
    ///
    /// Returns the attempt id to pass back with the consent and analyze
    /// settlements.
    ///
    /// # Errors
    ///
    /// [`TransitionError::Busy`] while an attempt is in flight,
    /// [`TransitionError::NoImage`] with nothing captured (also shown
    /// inline), [`TransitionError::InvalidPhase`] outside `Captured`, and
    /// [`TransitionError::ServiceUnavailable`] when the probe failed.
    pub fn begin_analysis(&mut self) -> Result<u64, TransitionError> {
        if self.phase.is_busy() {
            return Err(TransitionError::Busy);
        }
        if self.image.is_none() {
            self.inline_error = Some(TransitionError::NoImage.to_string());
            return Err(TransitionError::NoImage);
        }
        if self.phase != Phase::Captured {
            return Err(TransitionError::InvalidPhase);
        }
        if matches!(self.service, ServiceStatus::Unavailable { .. }) {
            return Err(TransitionError::ServiceUnavailable);
        }

        self.attempt += 1;
        self.phase = Phase::ConsentPending;
        self.consent_modal_open = false;
        self.inline_error = None;
        self.request_mode = self.mode;
        self.request_subject = self.subject.clone();
        Ok(self.attempt)
    }

    /// Apply the consent check outcome for `attempt`.
    pub fn consent_resolved(&mut self, attempt: u64, outcome: Result<ConsentState, ConsentError>) -> ConsentStep {
        if attempt != self.attempt || self.phase != Phase::ConsentPending {
            return ConsentStep::Stale;
        }
        match outcome {
            Ok(state) if state.granted => {
                let Some(image) = self.image.as_ref() else {
                    self.phase = Phase::Acquiring;
                    return ConsentStep::Stale;
                };
                let request = AnalysisRequest::new(self.request_mode, &self.request_subject, image);
                self.phase = Phase::Analyzing;
                self.result = None;
                self.failure = None;
                ConsentStep::Proceed(request)
            }
            Ok(state) => {
                self.phase = Phase::Captured;
                if !self.consent_modal_open {
                    self.consent_modal_open = true;
                    self.consent_prompts += 1;
                }
                ConsentStep::ShowModal { reason: state.reason }
            }
            Err(_) => {
                self.phase = Phase::Captured;
                ConsentStep::Notify(Notice {
                    title: CONSENT_CHECK_ERROR_TITLE.to_owned(),
                    body: CONSENT_CHECK_ERROR_BODY.to_owned(),
                })
            }
        }
    }

    pub fn close_consent_modal(&mut self) {
        self.consent_modal_open = false;
    }

    /// The student accepted in the consent modal: close it and re-run the
    /// attempt on the same image.
    ///
    /// # Errors
    ///
    /// Same as [`Workflow::begin_analysis`].
    pub fn accept_consent(&mut self) -> Result<u64, TransitionError> {
        self.consent_modal_open = false;
        self.begin_analysis()
    }

    /// Apply the analyze outcome for `attempt`.
    pub fn analysis_settled(
        &mut self,
        attempt: u64,
        outcome: Result<AnalysisSuccess, AnalysisError>,
    ) -> AnalysisStep {
        if attempt != self.attempt || self.phase != Phase::Analyzing {
            return AnalysisStep::Stale;
        }
        match outcome {
            Ok(result) => {
                self.result = Some(result);
                self.phase = Phase::Result;
                AnalysisStep::Render
            }
            Err(error) => {
                let redirect = error.login_url().map(str::to_owned);
                self.failure = Some(Failure {
                    kind: error.kind(),
                    detail: error.to_string(),
                });
                self.phase = Phase::Error;
                AnalysisStep::Failed { redirect }
            }
        }
    }

    // =============================================================
    // Reset
    // =============================================================

    /// "Try again" from the error panel: back to acquiring, image kept.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::InvalidPhase`] outside `Error`.
    pub fn retry(&mut self) -> Result<(), TransitionError> {
        if self.phase != Phase::Error {
            return Err(TransitionError::InvalidPhase);
        }
        self.failure = None;
        self.phase = Phase::Acquiring;
        Ok(())
    }

    /// "Start over": clear everything and reopen the camera.
    pub fn start_over(&mut self) {
        self.reset_to(ImageSource::Camera);
    }

    /// "New upload": clear everything and reopen the file picker.
    pub fn new_upload(&mut self) {
        self.reset_to(ImageSource::Upload);
    }

    fn reset_to(&mut self, input: ImageSource) {
        // Bumping the attempt makes any in-flight settlement stale.
        self.attempt += 1;
        self.image = None;
        self.result = None;
        self.failure = None;
        self.inline_error = None;
        self.consent_modal_open = false;
        self.input = input;
        self.phase = Phase::Acquiring;
    }

    // =============================================================
    // Projection
    // =============================================================

    /// Render model for the result panel, present only in `Result`.
    #[must_use]
    pub fn feedback_view(&self) -> Option<FeedbackView> {
        if self.phase != Phase::Result {
            return None;
        }
        self.result
            .as_ref()
            .map(|result| FeedbackView::build(self.request_mode, &self.request_subject, result))
    }

    /// Pure projection of the current state onto UI visibility and labels.
    #[must_use]
    pub fn view(&self) -> WorkflowView {
        let phase = self.phase;
        let step = match phase {
            Phase::Analyzing | Phase::Result | Phase::Error => Step::Feedback,
            _ => Step::Capture,
        };
        let acquiring = phase == Phase::Acquiring || phase == Phase::Idle;
        WorkflowView {
            step,
            feedback_tab_enabled: step == Step::Feedback,
            show_camera: acquiring && self.input == ImageSource::Camera,
            show_upload: acquiring && self.input == ImageSource::Upload,
            show_capture_result: matches!(phase, Phase::Captured | Phase::ConsentPending),
            show_resume: phase == Phase::Acquiring && self.image.is_some(),
            capture_enabled: self.camera == CameraStatus::Live,
            show_enable_camera: self.camera == CameraStatus::NeedsGesture,
            camera_error: match &self.camera {
                CameraStatus::Failed(message) => Some(message.clone()),
                _ => None,
            },
            analyze_enabled: phase == Phase::Captured
                && self.image.is_some()
                && !matches!(self.service, ServiceStatus::Unavailable { .. }),
            analyze_label: if phase.is_busy() { "Processing..." } else { self.mode.analyze_label() },
            retake_label: match self.input {
                ImageSource::Camera => "Try Again",
                ImageSource::Upload => "Upload Different Image",
            },
            instruction: self.mode.instruction(),
            capture_title: self.mode.capture_title(),
            result_label: self.mode.result_label(),
            show_loading: phase == Phase::Analyzing,
            show_result: phase == Phase::Result,
            show_error: phase == Phase::Error,
            show_placeholder: !matches!(phase, Phase::Analyzing | Phase::Result | Phase::Error),
            consent_modal_open: self.consent_modal_open,
            inline_error: self.inline_error.clone(),
        }
    }
}

/// Visibility flags and labels derived from a [`Workflow`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkflowView {
    pub step: Step,
    pub feedback_tab_enabled: bool,
    pub show_camera: bool,
    pub show_upload: bool,
    pub show_capture_result: bool,
    /// Offer "use previous image" after a retry.
    pub show_resume: bool,
    pub capture_enabled: bool,
    pub show_enable_camera: bool,
    pub camera_error: Option<String>,
    pub analyze_enabled: bool,
    pub analyze_label: &'static str,
    pub retake_label: &'static str,
    pub instruction: &'static str,
    pub capture_title: &'static str,
    pub result_label: &'static str,
    pub show_loading: bool,
    pub show_result: bool,
    pub show_error: bool,
    pub show_placeholder: bool,
    pub consent_modal_open: bool,
    pub inline_error: Option<String>,
}
