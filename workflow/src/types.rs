//! Request bodies and response DTOs for the tutoring API.
//!
//! DESIGN
//! ======
//! Response structs are lenient on purpose: every field is optional and the
//! server's loose success signalling is normalized in one place
//! ([`AnalysisResponse::into_result`]) rather than at each call site.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::AnalysisError;
use crate::image::CapturedImage;
use crate::mode::AnalysisMode;

/// Explanation shown when the server reports success but sends no content.
pub const EMPTY_RESULT_MESSAGE: &str =
    "The analysis finished but returned no content. Try again with a clearer photo.";

/// Message used when the server reports failure without saying why.
pub const DEFAULT_FAILURE_MESSAGE: &str = "An error occurred";

/// One analysis request: mode, subject and the captured image payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub mode: AnalysisMode,
    pub subject: String,
    /// Data URL of the captured image.
    pub image_data: String,
}

impl AnalysisRequest {
    #[must_use]
    pub fn new(mode: AnalysisMode, subject: &str, image: &CapturedImage) -> Self {
        Self {
            mode,
            subject: subject.to_owned(),
            image_data: image.data_url.clone(),
        }
    }

    /// Serialize the mode-specific JSON body.
    ///
    /// Answer feedback sends the same image as both question and answer and
    /// flags it as a combined page.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        match self.mode {
            AnalysisMode::ExplanationOnly => serde_json::to_string(&QuestionOnlyBody {
                image_data: &self.image_data,
                subject: &self.subject,
                mode: self.mode.wire_mode(),
            }),
            AnalysisMode::AnswerFeedback => serde_json::to_string(&AnswerFeedbackBody {
                question_image: &self.image_data,
                answer_image: &self.image_data,
                subject: &self.subject,
                mode: self.mode.wire_mode(),
                combined_image: true,
            }),
        }
    }
}

#[derive(Serialize)]
struct QuestionOnlyBody<'a> {
    image_data: &'a str,
    subject: &'a str,
    mode: &'static str,
}

#[derive(Serialize)]
struct AnswerFeedbackBody<'a> {
    question_image: &'a str,
    answer_image: &'a str,
    subject: &'a str,
    mode: &'static str,
    combined_image: bool,
}

/// Body of `GET /api/test-openai`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ServiceProbeResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `GET /api/check-ai-consent`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ConsentResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub consent_given: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Result of one consent check. Never cached beyond a single attempt.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConsentState {
    pub granted: bool,
    pub reason: Option<String>,
}

impl From<ConsentResponse> for ConsentState {
    fn from(resp: ConsentResponse) -> Self {
        Self {
            granted: resp.success && resp.consent_given,
            reason: non_blank(resp.reason),
        }
    }
}

/// Body of either analyze endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct AnalysisResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub tips: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    /// Sent as `"7/10"` or as a bare number depending on the grader.
    #[serde(default, deserialize_with = "deserialize_score")]
    pub score: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Success-shaped analysis payload, ready for rendering.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnalysisSuccess {
    pub explanation: Option<String>,
    pub feedback: Option<String>,
    pub tips: Option<String>,
    pub subject: Option<String>,
    pub score: Option<String>,
    /// Set when the server said success but sent no explanation or feedback.
    pub empty: bool,
}

impl AnalysisResponse {
    /// Normalize the loose server contract.
    ///
    /// Only an explicit `success: false` is a failure. A missing flag counts
    /// as success, and a success with neither explanation nor feedback gets a
    /// placeholder explanation instead of an error.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Server`] when `success` is `false`.
    pub fn into_result(self) -> Result<AnalysisSuccess, AnalysisError> {
        if self.success == Some(false) {
            let message = non_blank(self.message)
                .or_else(|| non_blank(self.error))
                .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_owned());
            return Err(AnalysisError::Server(message));
        }

        let mut out = AnalysisSuccess {
            explanation: non_blank(self.explanation),
            feedback: non_blank(self.feedback),
            tips: non_blank(self.tips),
            subject: non_blank(self.subject),
            score: non_blank(self.score),
            empty: false,
        };
        if out.explanation.is_none() && out.feedback.is_none() {
            out.explanation = Some(EMPTY_RESULT_MESSAGE.to_owned());
            out.empty = true;
        }
        Ok(out)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn deserialize_score<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(text) => Some(text),
        serde_json::Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}
