//! Analysis modes and everything that varies by mode.

#[cfg(test)]
#[path = "mode_test.rs"]
mod mode_test;

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Subjects offered in the subject picker.
pub const SUBJECTS: &[&str] = &["Mathematics", "Physics", "Chemistry", "Biology"];

/// Subject preselected on page load.
pub const DEFAULT_SUBJECT: &str = "Mathematics";

/// Which kind of analysis the student asked for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisMode {
    /// Photo of a question only; the server explains it.
    ExplanationOnly,
    /// Photo of a question with the student's answer; the server marks it.
    #[default]
    AnswerFeedback,
}

impl AnalysisMode {
    /// Value used by the mode `<select>`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ExplanationOnly => "explanation-only",
            Self::AnswerFeedback => "answer-feedback",
        }
    }

    /// Parse the `<select>` value. Unknown values fall back to the default.
    #[must_use]
    pub fn from_select_value(value: &str) -> Self {
        match value {
            "explanation-only" | "question-only" => Self::ExplanationOnly,
            _ => Self::AnswerFeedback,
        }
    }

    /// `mode` field sent in the request body.
    #[must_use]
    pub fn wire_mode(self) -> &'static str {
        match self {
            Self::ExplanationOnly => "question-only",
            Self::AnswerFeedback => "answer-feedback",
        }
    }

    /// Client-side deadline for one analyze call.
    #[must_use]
    pub fn deadline(self) -> Duration {
        match self {
            Self::ExplanationOnly => Duration::from_secs(45),
            Self::AnswerFeedback => Duration::from_secs(90),
        }
    }

    /// Whether the score badge is shown for results in this mode.
    #[must_use]
    pub fn shows_score(self) -> bool {
        matches!(self, Self::AnswerFeedback)
    }

    /// Instruction paragraph above the capture controls.
    #[must_use]
    pub fn instruction(self) -> &'static str {
        match self {
            Self::ExplanationOnly => "Upload or take a clear photo of just the question to get an explanation.",
            Self::AnswerFeedback => {
                "Upload or take a photo that shows both the question and your answer on the same page."
            }
        }
    }

    /// Heading of the capture step.
    #[must_use]
    pub fn capture_title(self) -> &'static str {
        match self {
            Self::ExplanationOnly => "Capture or Upload Question",
            Self::AnswerFeedback => "Capture or Upload Your Work",
        }
    }

    /// Label above the captured preview.
    #[must_use]
    pub fn result_label(self) -> &'static str {
        match self {
            Self::ExplanationOnly => "Question Image:",
            Self::AnswerFeedback => "Captured Image:",
        }
    }

    /// Short name shown next to a result.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::ExplanationOnly => "Explanation Only",
            Self::AnswerFeedback => "Answer Feedback",
        }
    }

    /// Text on the analyze button.
    #[must_use]
    pub fn analyze_label(self) -> &'static str {
        match self {
            Self::ExplanationOnly => "Get AI Explanation",
            Self::AnswerFeedback => "Get AI Feedback & Marking",
        }
    }
}
