//! One analysis run driven through the same state machine as the browser.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::future::Future;
use std::time::Duration;

use workflow::feedback::FeedbackView;
use workflow::machine::{AnalysisStep, ConsentStep};
use workflow::{AnalysisClient, AnalysisMode, CapturedImage, Transport, TransitionError, Workflow};

use crate::error::CliError;

/// Page path handed to the login redirect; the CLI has no page of its own.
pub const RETURN_PATH: &str = "/";

/// Run probe, consent check and analyze for a single image.
///
/// `sleep` builds the deadline timers for the consent check and the
/// analyze call.
pub async fn analyze_image<T, S, Fut>(
    client: &AnalysisClient<T>,
    mode: AnalysisMode,
    subject: &str,
    image: CapturedImage,
    sleep: S,
) -> Result<FeedbackView, CliError>
where
    T: Transport,
    S: Fn(Duration) -> Fut,
    Fut: Future<Output = ()>,
{
    let mut workflow = Workflow::default();
    workflow.set_mode(mode);
    workflow.set_subject(subject);

    workflow.service_checked(client.probe_service().await);
    workflow.image_acquired(image)?;
    let attempt = workflow.begin_analysis()?;
    tracing::info!(attempt, mode = mode.as_str(), subject, "analysis started");

    let request = match workflow.consent_resolved(attempt, client.check_consent_within(&sleep).await) {
        ConsentStep::Proceed(request) => request,
        ConsentStep::ShowModal { reason } => return Err(CliError::ConsentRequired { reason }),
        ConsentStep::Notify(notice) => {
            return Err(CliError::ConsentCheck {
                title: notice.title,
                body: notice.body,
            });
        }
        ConsentStep::Stale => return Err(TransitionError::InvalidPhase.into()),
    };

    let outcome = client.analyze(&request, RETURN_PATH, sleep).await;
    match workflow.analysis_settled(attempt, outcome) {
        AnalysisStep::Render => workflow
            .feedback_view()
            .ok_or_else(|| TransitionError::InvalidPhase.into()),
        AnalysisStep::Failed { redirect: Some(login_url) } => Err(CliError::AuthRequired { login_url }),
        AnalysisStep::Failed { redirect: None } => match workflow.failure() {
            Some(failure) => Err(CliError::Analysis {
                message: failure.message(),
                action: failure.suggested_action(),
                detail: failure.detail.clone(),
            }),
            None => Err(TransitionError::InvalidPhase.into()),
        },
        AnalysisStep::Stale => Err(TransitionError::InvalidPhase.into()),
    }
}
