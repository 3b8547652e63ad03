//! Error types and the pure error classifier.
//!
//! DESIGN
//! ======
//! The backend reports failures as free-form messages and HTTP statuses, not
//! structured codes. [`classify`] is the single place that pattern-matches
//! them into an [`ErrorKind`]; everything user-facing (message, suggested
//! action) hangs off the kind so the matcher can later be swapped for codes
//! without touching the UI.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

/// Failure while acquiring an image from the camera or an upload.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AcquireError {
    /// The picked file is not an `image/*` type.
    #[error("Please select an image file (JPG, PNG, or GIF).")]
    UnsupportedType(String),
    /// The picked file is at or above the upload ceiling.
    #[error("File size exceeds 10MB limit. Please select a smaller file.")]
    TooLarge(u64),
    /// The browser could not decode the file or frame.
    #[error("Could not read that image: {0}")]
    Decode(String),
    /// Canvas re-encoding failed.
    #[error("Could not process that image: {0}")]
    Encode(String),
    /// The source had no pixels (camera not ready, empty file).
    #[error("The image is empty. Please try again.")]
    EmptyImage,
    /// Camera permission denied or hardware unavailable.
    #[error("Unable to access camera: {0}")]
    Camera(String),
}

/// Failure of the consent round trip. Any variant means "could not tell",
/// which is deliberately distinct from "consent not given".
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConsentError {
    /// Network failure before a response arrived.
    #[error("Failed to fetch: {0}")]
    Transport(String),
    /// Non-2xx response.
    #[error("HTTP error! Status: {0}")]
    Http(u16),
    /// Response body was not the expected JSON.
    #[error("invalid consent response: {0}")]
    Decode(String),
}

/// Failure of a single analysis attempt.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    /// 401, or the request was bounced to the login page.
    #[error("Authentication required. Please log in.")]
    AuthRequired {
        /// Login URL carrying the page path to return to.
        login_url: String,
    },
    /// Any other non-2xx status.
    #[error("HTTP error! Status: {0}")]
    Http(u16),
    /// The client-side deadline fired first.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),
    /// Serialized request body at or above the local ceiling.
    #[error("Payload too large: {size} bytes (limit {limit})")]
    PayloadTooLarge {
        /// Serialized body size.
        size: usize,
        /// Ceiling that was hit.
        limit: usize,
    },
    /// The server answered `success: false`.
    #[error("{0}")]
    Server(String),
    /// Network failure before a response arrived.
    #[error("Failed to fetch: {0}")]
    Transport(String),
    /// A 2xx body that was not valid JSON.
    #[error("invalid analysis response: {0}")]
    Decode(String),
}

impl AnalysisError {
    /// HTTP status carried by the error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http(status) => Some(*status),
            Self::AuthRequired { .. } => Some(401),
            _ => None,
        }
    }

    /// Classification used to pick the message and suggested action.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AuthRequired { .. } => ErrorKind::Auth,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::PayloadTooLarge { .. } => ErrorKind::PayloadTooLarge,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Http(_) | Self::Server(_) | Self::Decode(_) => classify(self.status(), &self.to_string()),
        }
    }

    /// Login redirect target for [`AnalysisError::AuthRequired`].
    #[must_use]
    pub fn login_url(&self) -> Option<&str> {
        match self {
            Self::AuthRequired { login_url } => Some(login_url),
            _ => None,
        }
    }
}

/// Invalid workflow transition requested by the UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// Analyze pressed with no captured image.
    #[error("Please capture or upload an image first.")]
    NoImage,
    /// Analyze pressed while an attempt is already in flight.
    #[error("An analysis is already in progress.")]
    Busy,
    /// The AI service probe reported it unavailable.
    #[error("AI analysis is currently unavailable.")]
    ServiceUnavailable,
    /// Event does not apply to the current phase.
    #[error("That action is not available right now.")]
    InvalidPhase,
}

/// Coarse failure category derived from status and message text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Auth,
    Consent,
    Timeout,
    PayloadTooLarge,
    UnsupportedFormat,
    ServiceUnavailable,
    Quota,
    Transport,
    Unknown,
}

impl ErrorKind {
    /// Headline shown in the error panel.
    #[must_use]
    pub fn user_message(self) -> &'static str {
        match self {
            Self::Auth => "Your session has expired. Please log in again.",
            Self::Consent => "Permission error: You may need to provide AI consent or purchase more credits.",
            Self::Timeout => "The analysis took too long to respond.",
            Self::PayloadTooLarge => "The image is too large to send for analysis.",
            Self::UnsupportedFormat => "The image format could not be processed.",
            Self::ServiceUnavailable => "The AI service is temporarily unavailable.",
            Self::Quota => "The AI usage limit has been reached.",
            Self::Transport => "Connection error: Please check your internet connection and try again.",
            Self::Unknown => "Error processing your request. Please try again.",
        }
    }

    /// Next step suggested under the headline.
    #[must_use]
    pub fn suggested_action(self) -> &'static str {
        match self {
            Self::Auth => "You will be redirected to the login page.",
            Self::Consent => "Review your AI consent settings, then try again.",
            Self::Timeout => "Try again, or use a smaller or clearer photo.",
            Self::PayloadTooLarge => "Retake the photo closer to the page or upload a smaller image.",
            Self::UnsupportedFormat => "Upload a JPG, PNG, or GIF image.",
            Self::ServiceUnavailable => "Wait a minute and try again.",
            Self::Quota => "Wait a while before trying again, or purchase more credits.",
            Self::Transport => "Check your connection and try again.",
            Self::Unknown => "Try again. If the problem continues, start over with a new image.",
        }
    }
}

/// Classify a failure from its HTTP status (if any) and message text.
///
/// Status wins when it is specific; otherwise the message is matched
/// case-insensitively against known fragments.
#[must_use]
pub fn classify(status: Option<u16>, message: &str) -> ErrorKind {
    match status {
        Some(401) => return ErrorKind::Auth,
        Some(403) => return ErrorKind::Consent,
        Some(408 | 504) => return ErrorKind::Timeout,
        Some(413) => return ErrorKind::PayloadTooLarge,
        Some(415) => return ErrorKind::UnsupportedFormat,
        Some(429) => return ErrorKind::Quota,
        Some(502 | 503) => return ErrorKind::ServiceUnavailable,
        _ => {}
    }

    let text = message.to_ascii_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|needle| text.contains(needle));

    if has(&["authentication", "log in", "unauthorized", "401"]) {
        ErrorKind::Auth
    } else if has(&["quota", "rate limit", "too many requests", "429"]) {
        ErrorKind::Quota
    } else if has(&["consent", "permission", "forbidden", "403"]) {
        ErrorKind::Consent
    } else if has(&["timed out", "timeout"]) {
        ErrorKind::Timeout
    } else if has(&["too large", "payload", "413"]) {
        ErrorKind::PayloadTooLarge
    } else if has(&["unsupported", "invalid image", "image format", "could not decode"]) {
        ErrorKind::UnsupportedFormat
    } else if has(&["unavailable", "overloaded", "503", "502"]) {
        ErrorKind::ServiceUnavailable
    } else if has(&["failed to fetch", "networkerror", "network error", "connection"]) {
        ErrorKind::Transport
    } else {
        ErrorKind::Unknown
    }
}
