use workflow::{AcquireError, ConsentError, TransitionError};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("http client setup failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid session cookie: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("{0}")]
    Acquire(#[from] AcquireError),
    #[error("{0}")]
    Refused(#[from] TransitionError),
    #[error("consent check failed: {0}")]
    Consent(#[from] ConsentError),
    #[error("AI consent has not been given{}", consent_reason(.reason.as_deref()))]
    ConsentRequired { reason: Option<String> },
    #[error("{title}: {body}")]
    ConsentCheck { title: String, body: String },
    #[error("authentication required; log in at {login_url}")]
    AuthRequired { login_url: String },
    #[error("{message} {action} ({detail})")]
    Analysis {
        message: &'static str,
        action: &'static str,
        detail: String,
    },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

fn consent_reason(reason: Option<&str>) -> String {
    reason.map(|r| format!(": {r}")).unwrap_or_default()
}
