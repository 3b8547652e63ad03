//! Analysis mode and subject selectors.

use leptos::prelude::*;

use workflow::mode::SUBJECTS;
use workflow::{AnalysisMode, Workflow};

const MODE_OPTIONS: [(AnalysisMode, &str); 2] = [
    (AnalysisMode::AnswerFeedback, "Get feedback on my answer"),
    (AnalysisMode::ExplanationOnly, "Explain this question"),
];

/// Mode and subject pickers. Changes apply to the next analyze attempt.
#[component]
pub fn ModePicker() -> impl IntoView {
    let workflow = expect_context::<RwSignal<Workflow>>();
    let busy = move || workflow.with(|wf| wf.phase.is_busy());

    view! {
        <div class="mode-picker">
            <label class="mode-picker__field">
                <span>"Mode"</span>
                <select
                    class="mode-picker__select"
                    prop:value=move || workflow.with(|wf| wf.mode.as_str())
                    prop:disabled=busy
                    on:change=move |ev| {
                        let mode = AnalysisMode::from_select_value(&event_target_value(&ev));
                        workflow.update(|wf| wf.set_mode(mode));
                    }
                >
                    {MODE_OPTIONS
                        .iter()
                        .map(|(mode, label)| view! { <option value=mode.as_str()>{*label}</option> })
                        .collect_view()}
                </select>
            </label>
            <label class="mode-picker__field">
                <span>"Subject"</span>
                <select
                    class="mode-picker__select"
                    prop:value=move || workflow.with(|wf| wf.subject.clone())
                    prop:disabled=busy
                    on:change=move |ev| {
                        let subject = event_target_value(&ev);
                        workflow.update(|wf| wf.set_subject(&subject));
                    }
                >
                    {SUBJECTS.iter().map(|subject| view! { <option value=*subject>{*subject}</option> }).collect_view()}
                </select>
            </label>
        </div>
    }
}
