//! Root application component and context providers.

use leptos::prelude::*;
use leptos_meta::{Title, provide_meta_context};

use workflow::Workflow;

use crate::config::ClientConfig;
use crate::pages::tutor::TutorPage;
use crate::state::ui::UiState;

/// Root application component.
///
/// Provides the workflow, UI chrome and configuration contexts, then renders
/// the single tutor page.
#[component]
pub fn App(config: ClientConfig) -> impl IntoView {
    provide_meta_context();

    let workflow = RwSignal::new(Workflow::default());
    let ui = RwSignal::new(UiState::default());

    provide_context(workflow);
    provide_context(ui);
    provide_context(config);

    view! {
        <Title text="Snap & Analyze"/>
        <TutorPage/>
    }
}
