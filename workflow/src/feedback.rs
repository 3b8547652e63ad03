//! Rendering model for the feedback step.
//!
//! [`FeedbackView`] turns an [`AnalysisSuccess`] into the three HTML regions
//! and the metadata badges. The client injects the strings as-is; all
//! fallback and filler decisions are made here.

#[cfg(test)]
#[path = "feedback_test.rs"]
mod feedback_test;

use std::time::Duration;

use crate::mode::AnalysisMode;
use crate::types::AnalysisSuccess;

pub const NO_FEEDBACK: &str = "No feedback available";
pub const NO_EXPLANATION: &str = "No explanation available";
pub const NO_TIPS: &str = "No tips available";
pub const UNKNOWN_SUBJECT: &str = "Unknown";
pub const NO_SCORE: &str = "N/A";
/// Shown beside the score badge; the badge itself carries only the score.
pub const SCORE_LABEL: &str = "Score:";
pub const EXPLANATION_ONLY_FEEDBACK: &str = "Explanation-only mode: see the full explanation tab for details.";
pub const EXPLANATION_ONLY_TIPS: &str = "Review the full explanation to understand this question thoroughly.";

/// Placeholder text when the result image cannot be redrawn.
pub const IMAGE_UNAVAILABLE: &str = "Image preview unavailable";
/// Watchdog for decoding the captured image into the result canvas.
pub const IMAGE_DECODE_TIMEOUT: Duration = Duration::from_secs(5);

/// Everything the result panel shows, as display-ready strings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedbackView {
    pub explanation_html: String,
    pub feedback_html: String,
    pub tips_html: String,
    pub subject: String,
    /// `None` hides the score badge.
    pub score_badge: Option<String>,
}

impl FeedbackView {
    /// Build the view for a successful result.
    ///
    /// `requested_subject` is used when the server does not echo one back.
    #[must_use]
    pub fn build(mode: AnalysisMode, requested_subject: &str, result: &AnalysisSuccess) -> Self {
        let explanation = result
            .explanation
            .as_deref()
            .map_or_else(|| NO_EXPLANATION.to_owned(), format_explanation);
        let subject = result
            .subject
            .clone()
            .or_else(|| Some(requested_subject.trim().to_owned()).filter(|s| !s.is_empty()))
            .unwrap_or_else(|| UNKNOWN_SUBJECT.to_owned());

        match mode {
            AnalysisMode::ExplanationOnly => Self {
                explanation_html: explanation,
                feedback_html: note("info", EXPLANATION_ONLY_FEEDBACK),
                tips_html: note("success", EXPLANATION_ONLY_TIPS),
                subject,
                score_badge: None,
            },
            AnalysisMode::AnswerFeedback => Self {
                explanation_html: explanation,
                feedback_html: result.feedback.clone().unwrap_or_else(|| NO_FEEDBACK.to_owned()),
                tips_html: result.tips.clone().unwrap_or_else(|| NO_TIPS.to_owned()),
                subject,
                score_badge: Some(result.score.clone().unwrap_or_else(|| NO_SCORE.to_owned())),
            },
        }
    }
}

fn note(tone: &str, text: &str) -> String {
    format!(r#"<div class="feedback-note feedback-note--{tone}">{text}</div>"#)
}

/// Format a plain-text explanation as HTML paragraphs.
///
/// Text that already carries markup is passed through untouched. Otherwise
/// it is escaped, blank lines become paragraph breaks and single newlines
/// become `<br>`.
#[must_use]
pub fn format_explanation(text: &str) -> String {
    if looks_like_html(text) {
        return text.to_owned();
    }
    let escaped = escape_html(text.trim()).replace("\r\n", "\n");
    let paragraphs: Vec<String> = escaped
        .split("\n\n")
        .map(|para| para.trim_matches('\n'))
        .filter(|para| !para.is_empty())
        .map(|para| para.replace('\n', "<br>"))
        .collect();
    format!("<p>{}</p>", paragraphs.join("</p><p>"))
}

fn looks_like_html(text: &str) -> bool {
    text.char_indices().any(|(idx, ch)| {
        ch == '<'
            && text[idx + 1..]
                .chars()
                .next()
                .is_some_and(|next| next.is_ascii_alphabetic() || next == '/')
    })
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Timestamp line under the result metadata.
#[must_use]
pub fn generated_label(date: &str, time: &str) -> String {
    format!("Generated on {date} at {time}")
}

/// Expand/collapse state of the result image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ImageDisplay {
    #[default]
    Collapsed,
    Expanded,
}

impl ImageDisplay {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Collapsed => Self::Expanded,
            Self::Expanded => Self::Collapsed,
        }
    }

    /// CSS `max-height` for the image container.
    #[must_use]
    pub fn max_height(self) -> &'static str {
        match self {
            Self::Collapsed => "150px",
            Self::Expanded => "none",
        }
    }

    /// Label of the toggle button, describing what a click will do.
    #[must_use]
    pub fn toggle_label(self) -> &'static str {
        match self {
            Self::Collapsed => "Expand Image",
            Self::Expanded => "Collapse Image",
        }
    }
}
