//! Snap-and-analyze page.
//!
//! ARCHITECTURE
//! ============
//! Each analyze attempt runs as one `spawn_local` task:
//! `begin_analysis` -> consent check -> `consent_resolved` -> analyze ->
//! `analysis_settled`. Every step reports back to the `Workflow` signal with
//! the attempt id it was started with, and the workflow discards settlements
//! from attempts that have since been superseded.

#[cfg(test)]
#[path = "tutor_test.rs"]
mod tutor_test;

use leptos::prelude::*;

use workflow::machine::Step;
use workflow::{TransitionError, Workflow};

use crate::components::capture_panel::CapturePanel;
use crate::components::consent_modal::ConsentModal;
use crate::components::feedback_panel::FeedbackPanel;
use crate::components::mode_picker::ModePicker;
use crate::components::service_banner::ServiceBanner;
use crate::components::toast_stack::ToastStack;
use crate::config::ClientConfig;
use crate::state::ui::{ToastLevel, UiState};

#[cfg(feature = "csr")]
use std::time::Duration;

#[cfg(feature = "csr")]
use workflow::api::ProbeOutcome;
#[cfg(feature = "csr")]
use workflow::machine::{AnalysisStep, ConsentStep};

#[cfg(feature = "csr")]
use crate::net::api::{analysis_client, current_path, redirect_to, sleep};
#[cfg(feature = "csr")]
use crate::util::{clock::generated_now, mathjax::typeset_results};

/// How long the "connected" banner stays up after a successful probe.
#[cfg(feature = "csr")]
const SERVICE_OK_BANNER: Duration = Duration::from_secs(3);
/// Delay before typesetting so the injected regions are in the DOM.
#[cfg(feature = "csr")]
const TYPESET_DELAY: Duration = Duration::from_millis(100);

pub const ANALYSIS_COMPLETE_MESSAGE: &str = "Analysis complete!";

/// Toast for an analyze press the workflow refused, if one is warranted.
///
/// `NoImage` is reported inline instead; `Busy` and `InvalidPhase` are
/// silent.
fn refusal_toast(err: TransitionError) -> Option<(ToastLevel, String)> {
    match err {
        TransitionError::ServiceUnavailable => Some((ToastLevel::Warning, err.to_string())),
        TransitionError::NoImage | TransitionError::Busy | TransitionError::InvalidPhase => None,
    }
}

/// Re-run the service probe and update the banner.
fn probe_service(workflow: RwSignal<Workflow>, ui: RwSignal<UiState>, config: ClientConfig) {
    workflow.update(Workflow::service_checking);
    ui.update(|u| u.service_banner_dismissed = false);

    #[cfg(feature = "csr")]
    leptos::task::spawn_local(async move {
        let outcome = analysis_client(&config).probe_service().await;
        let available = outcome == ProbeOutcome::Available;
        if let ProbeOutcome::Unavailable { details } = &outcome {
            leptos::logging::warn!("AI service unavailable: {}", details.as_deref().unwrap_or("no details"));
        }
        workflow.update(|wf| wf.service_checked(outcome));
        if available {
            sleep(SERVICE_OK_BANNER).await;
            ui.update(|u| u.service_banner_dismissed = true);
        }
    });
    #[cfg(not(feature = "csr"))]
    let _ = config;
}

/// Start an attempt from `begin` (analyze press or consent acceptance).
fn launch_attempt<F>(workflow: RwSignal<Workflow>, ui: RwSignal<UiState>, config: ClientConfig, begin: F)
where
    F: FnOnce(&mut Workflow) -> Result<u64, TransitionError>,
{
    let attempt = match workflow.try_update(begin) {
        Some(Ok(attempt)) => attempt,
        Some(Err(err)) => {
            leptos::logging::log!("analyze refused: {err}");
            if let Some((level, body)) = refusal_toast(err) {
                ui.update(|u| {
                    u.push_toast(level, &body);
                });
            }
            return;
        }
        None => return,
    };

    #[cfg(feature = "csr")]
    leptos::task::spawn_local(run_attempt(attempt, workflow, ui, config));
    #[cfg(not(feature = "csr"))]
    let _ = (attempt, config);
}

#[cfg(feature = "csr")]
async fn run_attempt(attempt: u64, workflow: RwSignal<Workflow>, ui: RwSignal<UiState>, config: ClientConfig) {
    let client = analysis_client(&config);

    let consent = client.check_consent_within(sleep).await;
    if let Err(e) = &consent {
        leptos::logging::warn!("error checking AI consent: {e}");
    }
    let request = match workflow.try_update(|wf| wf.consent_resolved(attempt, consent)) {
        Some(ConsentStep::Proceed(request)) => request,
        Some(ConsentStep::ShowModal { reason }) => {
            leptos::logging::log!("AI consent required: {}", reason.as_deref().unwrap_or("unknown"));
            return;
        }
        Some(ConsentStep::Notify(notice)) => {
            ui.update(|u| {
                u.push_titled(ToastLevel::Danger, &notice.title, &notice.body);
            });
            return;
        }
        Some(ConsentStep::Stale) | None => return,
    };

    leptos::logging::log!(
        "sending analysis request ({}) for subject: {}",
        request.mode.as_str(),
        request.subject
    );
    let outcome = client.analyze(&request, &current_path(), sleep).await;
    if let Err(e) = &outcome {
        leptos::logging::warn!("analysis failed: {e}");
    }

    match workflow.try_update(|wf| wf.analysis_settled(attempt, outcome)) {
        Some(AnalysisStep::Render) => {
            ui.update(|u| {
                u.result_shown(generated_now());
                u.push_toast(ToastLevel::Success, ANALYSIS_COMPLETE_MESSAGE);
            });
            sleep(TYPESET_DELAY).await;
            typeset_results().await;
        }
        Some(AnalysisStep::Failed { redirect: Some(url) }) => redirect_to(&url),
        Some(AnalysisStep::Failed { redirect: None } | AnalysisStep::Stale) | None => {}
    }
}

/// The tutor page: step tabs, capture and feedback panels, consent modal.
#[component]
pub fn TutorPage() -> impl IntoView {
    let workflow = expect_context::<RwSignal<Workflow>>();
    let ui = expect_context::<RwSignal<UiState>>();
    let config = expect_context::<ClientConfig>();

    let step = Memo::new(move |_| workflow.with(|wf| wf.view().step));
    let feedback_enabled = Memo::new(move |_| workflow.with(|wf| wf.view().feedback_tab_enabled));

    workflow.update(|wf| {
        let input = wf.input;
        wf.select_input(input);
    });
    probe_service(workflow, ui, config.clone());

    let on_retry_probe = Callback::new({
        let config = config.clone();
        move |()| probe_service(workflow, ui, config.clone())
    });
    let on_analyze = Callback::new({
        let config = config.clone();
        move |()| launch_attempt(workflow, ui, config.clone(), Workflow::begin_analysis)
    });
    let on_accept_consent = Callback::new({
        let config = config.clone();
        move |()| launch_attempt(workflow, ui, config.clone(), Workflow::accept_consent)
    });
    let on_retry = Callback::new(move |()| {
        if let Some(Err(e)) = workflow.try_update(Workflow::retry) {
            leptos::logging::warn!("retry ignored: {e}");
        }
    });
    let on_start_over = Callback::new(move |()| workflow.update(Workflow::start_over));
    let on_new_upload = Callback::new(move |()| workflow.update(Workflow::new_upload));

    view! {
        <div class="tutor-page">
            <header class="tutor-page__header">
                <h1>"Snap & Analyze"</h1>
                <ModePicker/>
            </header>

            <ServiceBanner on_retry=on_retry_probe/>

            <nav class="tutor-page__steps" role="tablist">
                <button class="tutor-page__step" class:tutor-page__step--active=move || step.get() == Step::Capture role="tab">
                    "1. Capture"
                </button>
                <button
                    class="tutor-page__step"
                    class:tutor-page__step--active=move || step.get() == Step::Feedback
                    prop:disabled=move || !feedback_enabled.get()
                    role="tab"
                >
                    "2. Feedback"
                </button>
            </nav>

            <div class="tutor-page__step-body" class:hidden=move || step.get() != Step::Capture>
                <CapturePanel on_analyze=on_analyze/>
            </div>
            <div class="tutor-page__step-body" class:hidden=move || step.get() != Step::Feedback>
                <FeedbackPanel on_retry=on_retry on_start_over=on_start_over on_new_upload=on_new_upload/>
            </div>

            <ConsentModal on_accept=on_accept_consent/>
            <ToastStack/>
        </div>
    }
}
