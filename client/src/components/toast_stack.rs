//! Dismissible toast notifications.

use leptos::prelude::*;

use crate::state::ui::{Toast, UiState};

#[cfg(feature = "csr")]
const AUTO_HIDE_MS: u32 = 5_000;

/// Toast stack in the page corner.
#[component]
pub fn ToastStack() -> impl IntoView {
    let ui = expect_context::<RwSignal<UiState>>();

    view! {
        <div class="toast-stack" aria-live="polite">
            <For each=move || ui.with(|u| u.toasts.clone()) key=|toast| toast.id let:toast>
                <ToastItem toast=toast/>
            </For>
        </div>
    }
}

#[component]
fn ToastItem(toast: Toast) -> impl IntoView {
    let ui = expect_context::<RwSignal<UiState>>();
    let id = toast.id;

    #[cfg(feature = "csr")]
    if !toast.level.sticky() {
        gloo_timers::callback::Timeout::new(AUTO_HIDE_MS, move || {
            ui.update(|u| u.dismiss_toast(id));
        })
        .forget();
    }

    view! {
        <div class=format!("toast {}", toast.level.class()) role="alert">
            <div class="toast__header">
                <strong>{toast.title}</strong>
                <button class="toast__close" title="Dismiss" on:click=move |_| ui.update(|u| u.dismiss_toast(id))>
                    "✕"
                </button>
            </div>
            <div class="toast__body">{toast.body}</div>
        </div>
    }
}
