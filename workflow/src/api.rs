//! Consent check, service probe and the single-attempt analyze call.
//!
//! SYSTEM CONTEXT
//! ==============
//! The browser client plugs in a `gloo-net` transport and the CLI a
//! `reqwest` one. Everything above raw HTTP (deadline race, payload ceiling,
//! auth detection, body normalization) lives here so both front ends behave
//! identically.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::future::Future;
use std::time::Duration;

use crate::deadline::with_deadline;
use crate::error::{AnalysisError, ConsentError};
use crate::mode::AnalysisMode;
use crate::types::{AnalysisRequest, AnalysisResponse, AnalysisSuccess, ConsentResponse, ConsentState, ServiceProbeResponse};

/// Serialized analyze bodies at or above this size are rejected locally.
pub const MAX_PAYLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Deadline for the consent round trip before an analyze request.
pub const CONSENT_TIMEOUT: Duration = Duration::from_secs(15);

/// Raw HTTP response as seen by the workflow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    /// Final URL after redirects.
    pub url: String,
    pub body: String,
}

impl HttpReply {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether redirects ended on a login page.
    #[must_use]
    pub fn landed_on_login(&self) -> bool {
        url_path(&self.url).contains("login")
    }
}

fn url_path(url: &str) -> &str {
    match url.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("", |idx| &rest[idx..]),
        None => url,
    }
}

/// HTTP seam. Implementations return `Err` only when no response arrived.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Issue a `GET` for a same-origin path.
    async fn get(&self, path: &str) -> Result<HttpReply, String>;
    /// Issue a `POST` with a JSON body.
    async fn post_json(&self, path: &str, body: String) -> Result<HttpReply, String>;
}

/// Server paths consumed by the client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    pub service_probe: String,
    pub consent: String,
    pub analyze_question: String,
    pub analyze_answer: String,
    pub login: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            service_probe: "/api/test-openai".to_owned(),
            consent: "/api/check-ai-consent".to_owned(),
            analyze_question: "/api/analyze-captured-image".to_owned(),
            analyze_answer: "/api/analyze-answer".to_owned(),
            login: "/auth/login".to_owned(),
        }
    }
}

impl Endpoints {
    /// Analyze endpoint for `mode`.
    #[must_use]
    pub fn analyze(&self, mode: AnalysisMode) -> &str {
        match mode {
            AnalysisMode::ExplanationOnly => &self.analyze_question,
            AnalysisMode::AnswerFeedback => &self.analyze_answer,
        }
    }

    /// Login URL that returns the user to `next_path` afterwards.
    #[must_use]
    pub fn login_redirect(&self, next_path: &str) -> String {
        format!("{}?next={}", self.login, urlencoding::encode(next_path))
    }
}

/// Per-mode analyze deadlines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Deadlines {
    pub explanation_only: Duration,
    pub answer_feedback: Duration,
}

impl Default for Deadlines {
    fn default() -> Self {
        Self {
            explanation_only: AnalysisMode::ExplanationOnly.deadline(),
            answer_feedback: AnalysisMode::AnswerFeedback.deadline(),
        }
    }
}

impl Deadlines {
    #[must_use]
    pub fn for_mode(&self, mode: AnalysisMode) -> Duration {
        match mode {
            AnalysisMode::ExplanationOnly => self.explanation_only,
            AnalysisMode::AnswerFeedback => self.answer_feedback,
        }
    }
}

/// Outcome of the AI service probe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProbeOutcome {
    Available,
    Unavailable { details: Option<String> },
}

/// Workflow-level API client over a [`Transport`].
#[derive(Clone, Debug)]
pub struct AnalysisClient<T> {
    transport: T,
    endpoints: Endpoints,
    deadlines: Deadlines,
}

impl<T: Transport> AnalysisClient<T> {
    #[must_use]
    pub fn new(transport: T, endpoints: Endpoints) -> Self {
        Self {
            transport,
            endpoints,
            deadlines: Deadlines::default(),
        }
    }

    /// Replace the per-mode deadlines.
    #[must_use]
    pub fn with_deadlines(mut self, deadlines: Deadlines) -> Self {
        self.deadlines = deadlines;
        self
    }

    #[must_use]
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Ask the server whether the AI backend is reachable.
    pub async fn probe_service(&self) -> ProbeOutcome {
        let reply = match self.transport.get(&self.endpoints.service_probe).await {
            Ok(reply) => reply,
            Err(e) => return ProbeOutcome::Unavailable { details: Some(e) },
        };
        if !reply.is_success() {
            return ProbeOutcome::Unavailable {
                details: Some(format!("HTTP error! Status: {}", reply.status)),
            };
        }
        match serde_json::from_str::<ServiceProbeResponse>(&reply.body) {
            Ok(body) if body.success => ProbeOutcome::Available,
            Ok(body) => ProbeOutcome::Unavailable { details: body.message },
            Err(e) => ProbeOutcome::Unavailable { details: Some(e.to_string()) },
        }
    }

    /// Fetch the current consent state. One round trip, never cached.
    ///
    /// # Errors
    ///
    /// Returns a [`ConsentError`] when the state could not be determined;
    /// "not granted" is an `Ok` with `granted == false`.
    pub async fn check_consent(&self) -> Result<ConsentState, ConsentError> {
        let reply = self
            .transport
            .get(&self.endpoints.consent)
            .await
            .map_err(ConsentError::Transport)?;
        if !reply.is_success() {
            return Err(ConsentError::Http(reply.status));
        }
        let body: ConsentResponse =
            serde_json::from_str(&reply.body).map_err(|e| ConsentError::Decode(e.to_string()))?;
        Ok(body.into())
    }

    /// [`Self::check_consent`] raced against [`CONSENT_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// As [`Self::check_consent`]; an expired timer is reported as
    /// [`ConsentError::Transport`].
    pub async fn check_consent_within<S, Fut>(&self, sleep: S) -> Result<ConsentState, ConsentError>
    where
        S: FnOnce(Duration) -> Fut,
        Fut: Future<Output = ()>,
    {
        with_deadline(self.check_consent(), sleep(CONSENT_TIMEOUT))
            .await
            .map_err(|_| {
                ConsentError::Transport(format!(
                    "consent check timed out after {} seconds",
                    CONSENT_TIMEOUT.as_secs()
                ))
            })?
    }

    /// Send one analysis request, racing it against the mode's deadline.
    ///
    /// `sleep` builds the timer future for the deadline. `current_path` is
    /// the page path carried in the login redirect on auth failure.
    ///
    /// # Errors
    ///
    /// Returns an [`AnalysisError`] for oversized payloads (without sending),
    /// timeouts, transport failures, auth bounces, non-2xx statuses,
    /// undecodable bodies and explicit `success: false` replies.
    pub async fn analyze<S, Fut>(
        &self,
        request: &AnalysisRequest,
        current_path: &str,
        sleep: S,
    ) -> Result<AnalysisSuccess, AnalysisError>
    where
        S: FnOnce(Duration) -> Fut,
        Fut: Future<Output = ()>,
    {
        let body = request.to_json().map_err(|e| AnalysisError::Decode(e.to_string()))?;
        if body.len() >= MAX_PAYLOAD_BYTES {
            return Err(AnalysisError::PayloadTooLarge {
                size: body.len(),
                limit: MAX_PAYLOAD_BYTES,
            });
        }

        let deadline = self.deadlines.for_mode(request.mode);
        let path = self.endpoints.analyze(request.mode);
        let reply = with_deadline(self.transport.post_json(path, body), sleep(deadline))
            .await
            .map_err(|_| AnalysisError::Timeout(deadline.as_secs()))?
            .map_err(AnalysisError::Transport)?;

        if reply.status == 401 || reply.landed_on_login() {
            return Err(AnalysisError::AuthRequired {
                login_url: self.endpoints.login_redirect(current_path),
            });
        }
        if !reply.is_success() {
            return Err(AnalysisError::Http(reply.status));
        }

        let parsed: AnalysisResponse =
            serde_json::from_str(&reply.body).map_err(|e| AnalysisError::Decode(e.to_string()))?;
        parsed.into_result()
    }
}
