//! Feedback step: loading state, result regions and the error panel.
//!
//! SYSTEM CONTEXT
//! ==============
//! Region HTML comes pre-built from `workflow::feedback::FeedbackView`; this
//! component injects it, redraws the captured image into the result canvas
//! and exposes the reset actions.

#[cfg(test)]
#[path = "feedback_panel_test.rs"]
mod feedback_panel_test;

use leptos::prelude::*;

use workflow::Workflow;
#[cfg(feature = "csr")]
use workflow::Phase;
use workflow::feedback::{FeedbackView, IMAGE_UNAVAILABLE, SCORE_LABEL};

use crate::state::ui::{PreviewStatus, UiState};

/// Label and badge text for the score, or `None` when the badge is hidden.
fn score_parts(view: &FeedbackView) -> Option<(&'static str, String)> {
    view.score_badge.clone().map(|score| (SCORE_LABEL, score))
}

/// Feedback step body.
#[component]
pub fn FeedbackPanel(on_retry: Callback<()>, on_start_over: Callback<()>, on_new_upload: Callback<()>) -> impl IntoView {
    let workflow = expect_context::<RwSignal<Workflow>>();
    let ui = expect_context::<RwSignal<UiState>>();
    let view_state = Memo::new(move |_| workflow.with(Workflow::view));
    let feedback = Memo::new(move |_| workflow.with(Workflow::feedback_view));
    let failure = Memo::new(move |_| workflow.with(|wf| wf.failure().cloned()));
    let mode_label = move || workflow.with(|wf| wf.request_mode().display_name());

    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();

    #[cfg(feature = "csr")]
    {
        let result_image = Memo::new(move |_| {
            workflow.with(|wf| {
                if wf.phase == Phase::Result {
                    wf.image().map(|img| (wf.attempt(), img.data_url.clone()))
                } else {
                    None
                }
            })
        });
        Effect::new(move || {
            let Some((attempt, data_url)) = result_image.get() else {
                return;
            };
            let Some(canvas) = canvas_ref.get() else {
                return;
            };
            leptos::task::spawn_local(async move {
                let drawn = crate::media::canvas::redraw(&canvas, &data_url).await;
                if workflow.with_untracked(Workflow::attempt) != attempt {
                    return;
                }
                let status = match drawn {
                    Ok(()) => PreviewStatus::Drawn,
                    Err(e) => {
                        leptos::logging::warn!("result image redraw failed: {e}");
                        PreviewStatus::Unavailable
                    }
                };
                ui.update(|u| u.preview = status);
            });
        });
    }

    view! {
        <section class="feedback-panel">
            <Show when=move || view_state.get().show_placeholder>
                <div class="feedback-panel__placeholder">
                    "Capture or upload an image, then press analyze to see feedback here."
                </div>
            </Show>

            <Show when=move || view_state.get().show_loading>
                <div class="feedback-panel__loading" role="status">
                    <div class="spinner"></div>
                    <p>"Analyzing your work. This can take up to a minute..."</p>
                </div>
            </Show>

            <div class="feedback-panel__result" class:hidden=move || !view_state.get().show_result>
                <div class="feedback-panel__meta">
                    <span class="badge badge--subject">
                        {move || feedback.get().map(|f| f.subject).unwrap_or_default()}
                    </span>
                    {move || {
                        feedback.get().as_ref().and_then(score_parts).map(|(label, score)| {
                            view! {
                                <span class="feedback-panel__score-label">{label}</span>
                                <span class="badge badge--score">{score}</span>
                            }
                        })
                    }}
                    <span class="feedback-panel__mode">{mode_label}</span>
                    <span class="feedback-panel__generated">
                        {move || ui.with(|u| u.generated_label.clone()).unwrap_or_default()}
                    </span>
                </div>

                <div class="feedback-panel__image">
                    <div
                        class="feedback-panel__image-frame"
                        style=move || format!("max-height: {}; overflow: hidden;", ui.with(|u| u.image_display.max_height()))
                    >
                        <canvas class="feedback-panel__canvas" node_ref=canvas_ref></canvas>
                    </div>
                    <Show when=move || ui.with(|u| u.preview == PreviewStatus::Unavailable)>
                        <div class="feedback-panel__image-missing">{IMAGE_UNAVAILABLE}</div>
                    </Show>
                    <button class="btn btn--link" on:click=move |_| ui.update(UiState::toggle_image)>
                        {move || ui.with(|u| u.image_display.toggle_label())}
                    </button>
                </div>

                <h3>"Feedback"</h3>
                <div id="feedback-content" class="feedback-panel__region" inner_html=move || {
                    feedback.get().map(|f| f.feedback_html).unwrap_or_default()
                }></div>
                <h3>"Explanation"</h3>
                <div id="explanation-content" class="feedback-panel__region" inner_html=move || {
                    feedback.get().map(|f| f.explanation_html).unwrap_or_default()
                }></div>
                <h3>"Tips"</h3>
                <div id="tips-content" class="feedback-panel__region" inner_html=move || {
                    feedback.get().map(|f| f.tips_html).unwrap_or_default()
                }></div>

                <div class="feedback-panel__actions">
                    <button class="btn btn--secondary" on:click=move |_| on_new_upload.run(())>
                        "New Upload"
                    </button>
                    <button class="btn btn--primary" on:click=move |_| on_start_over.run(())>
                        "Start Over"
                    </button>
                </div>
            </div>

            <Show when=move || view_state.get().show_error>
                <div class="feedback-panel__error" role="alert">
                    {move || {
                        failure
                            .get()
                            .map(|f| {
                                view! {
                                    <p class="feedback-panel__error-message">{f.message()}</p>
                                    <p class="feedback-panel__error-action">{f.suggested_action()}</p>
                                    <p class="feedback-panel__error-detail">{format!("Details: {}", f.detail)}</p>
                                }
                            })
                    }}
                    <div class="feedback-panel__actions">
                        <button class="btn btn--primary" on:click=move |_| on_retry.run(())>
                            "Try Again"
                        </button>
                        <button class="btn btn--secondary" on:click=move |_| on_start_over.run(())>
                            "Start Over"
                        </button>
                    </div>
                </div>
            </Show>
        </section>
    }
}
