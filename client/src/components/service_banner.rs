//! AI service status banner with a re-probe action.

use leptos::prelude::*;

use workflow::Workflow;
use workflow::machine::ServiceStatus;

use crate::state::ui::UiState;

pub const CHECKING_MESSAGE: &str = "Checking AI service connection...";
pub const AVAILABLE_MESSAGE: &str = "AI service connection successful. You can analyze images.";
pub const UNAVAILABLE_MESSAGE: &str = "AI service connection failed. Image analysis will not work.";

/// Banner above the workflow reflecting the service probe.
#[component]
pub fn ServiceBanner(on_retry: Callback<()>) -> impl IntoView {
    let workflow = expect_context::<RwSignal<Workflow>>();
    let ui = expect_context::<RwSignal<UiState>>();

    let status = Memo::new(move |_| workflow.with(|wf| wf.service.clone()));
    let visible = move || !matches!(status.get(), ServiceStatus::Available) || !ui.with(|u| u.service_banner_dismissed);

    let class = move || match status.get() {
        ServiceStatus::Checking => "service-banner service-banner--checking",
        ServiceStatus::Available => "service-banner service-banner--ok",
        ServiceStatus::Unavailable { .. } => "service-banner service-banner--error",
    };
    let message = move || match status.get() {
        ServiceStatus::Checking => CHECKING_MESSAGE,
        ServiceStatus::Available => AVAILABLE_MESSAGE,
        ServiceStatus::Unavailable { .. } => UNAVAILABLE_MESSAGE,
    };
    let details = move || match status.get() {
        ServiceStatus::Unavailable { details } => details,
        _ => None,
    };

    view! {
        <Show when=visible>
            <div class=class role="status">
                <span class="service-banner__message">{message}</span>
                {move || details().map(|d| view! { <span class="service-banner__details">{format!("Details: {d}")}</span> })}
                <Show when=move || matches!(status.get(), ServiceStatus::Unavailable { .. })>
                    <button class="service-banner__retry" on:click=move |_| on_retry.run(())>
                        "Retry Connection"
                    </button>
                </Show>
            </div>
        </Show>
    }
}
