//! Page-level client configuration.
//!
//! The hosting template may override endpoint paths, the consent page and the
//! analyze deadlines through `data-*` attributes on `<body>`:
//!
//! | Attribute | Field |
//! |-----------|-------|
//! | `data-probe-url` | service probe endpoint |
//! | `data-consent-url` | consent check endpoint |
//! | `data-analyze-question-url` | explanation-only analyze endpoint |
//! | `data-analyze-answer-url` | answer-feedback analyze endpoint |
//! | `data-login-url` | login page used for auth redirects |
//! | `data-consent-page` | page linked from the consent modal |
//! | `data-question-timeout` | explanation-only deadline, seconds |
//! | `data-answer-timeout` | answer-feedback deadline, seconds |
//!
//! Missing, blank or unparseable attributes keep their defaults.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

use workflow::{Deadlines, Endpoints};

/// Default page linked from the consent modal.
pub const DEFAULT_CONSENT_PAGE: &str = "/ai-consent";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub endpoints: Endpoints,
    pub consent_page: String,
    pub deadlines: Deadlines,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            consent_page: DEFAULT_CONSENT_PAGE.to_owned(),
            deadlines: Deadlines::default(),
        }
    }
}

impl ClientConfig {
    /// Build a config from an attribute lookup keyed by attribute name.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |name: &str| lookup(name).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());
        let secs = |name: &str| {
            text(name)
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|v| *v > 0)
                .map(Duration::from_secs)
        };

        let mut config = Self::default();
        let endpoints = &mut config.endpoints;
        for (name, slot) in [
            ("data-probe-url", &mut endpoints.service_probe),
            ("data-consent-url", &mut endpoints.consent),
            ("data-analyze-question-url", &mut endpoints.analyze_question),
            ("data-analyze-answer-url", &mut endpoints.analyze_answer),
            ("data-login-url", &mut endpoints.login),
        ] {
            if let Some(value) = text(name) {
                *slot = value;
            }
        }
        if let Some(page) = text("data-consent-page") {
            config.consent_page = page;
        }
        if let Some(deadline) = secs("data-question-timeout") {
            config.deadlines.explanation_only = deadline;
        }
        if let Some(deadline) = secs("data-answer-timeout") {
            config.deadlines.answer_feedback = deadline;
        }
        config
    }

    /// Read overrides from the document body. Defaults outside the browser.
    pub fn from_document() -> Self {
        #[cfg(feature = "csr")]
        {
            let body = web_sys::window().and_then(|w| w.document()).and_then(|d| d.body());
            match body {
                Some(body) => Self::from_lookup(|name| body.get_attribute(name)),
                None => Self::default(),
            }
        }
        #[cfg(not(feature = "csr"))]
        {
            Self::default()
        }
    }
}
