//! Modal asking the student to give AI consent before analysis.

use leptos::prelude::*;

use workflow::Workflow;

use crate::config::ClientConfig;

/// Consent modal. Accepting re-runs the attempt on the same image.
#[component]
pub fn ConsentModal(on_accept: Callback<()>) -> impl IntoView {
    let workflow = expect_context::<RwSignal<Workflow>>();
    let config = expect_context::<ClientConfig>();
    let consent_page = config.consent_page;

    let close = move || workflow.update(Workflow::close_consent_modal);
    let on_keydown = move |ev: leptos::ev::KeyboardEvent| {
        if ev.key() == "Escape" {
            ev.prevent_default();
            close();
        }
    };

    view! {
        <Show when=move || workflow.with(|wf| wf.consent_modal_open)>
            <div class="consent-modal__backdrop" on:click=move |_| close()>
                <div
                    class="consent-modal"
                    role="dialog"
                    aria-modal="true"
                    tabindex="0"
                    on:click=move |ev| ev.stop_propagation()
                    on:keydown=on_keydown
                >
                    <div class="consent-modal__header">
                        <h2>"AI Consent Required"</h2>
                        <button class="consent-modal__close" on:click=move |_| close() title="Close">
                            "✕"
                        </button>
                    </div>
                    <p>
                        "Your work is analyzed by an AI service. Before we can send your image, "
                        "please review and accept the AI consent terms."
                    </p>
                    <a class="consent-modal__link" href=consent_page.clone() target="_blank" rel="noopener">
                        "Review AI consent terms"
                    </a>
                    <div class="consent-modal__actions">
                        <button class="btn btn--secondary" on:click=move |_| close()>
                            "Cancel"
                        </button>
                        <button class="btn btn--primary" on:click=move |_| on_accept.run(())>
                            "I have given consent, continue"
                        </button>
                    </div>
                </div>
            </div>
        </Show>
    }
}
