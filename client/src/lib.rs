//! # client
//!
//! Leptos + WASM frontend for the snap-and-analyze tutoring page.
//!
//! The workflow itself (state machine, sizing policy, wire types, error
//! classification) lives in the `workflow` crate. This crate binds it to
//! browser APIs: camera and canvas through `web-sys`, HTTP through
//! `gloo-net`, timers through `gloo-timers`, and rendering through Leptos
//! signals. Browser-only code is gated behind the `csr` feature so the
//! pure helpers still build and test natively.

pub mod app;
pub mod components;
pub mod config;
pub mod media;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

/// WASM entry point: install logging and mount the app on `<body>`.
#[cfg(feature = "csr")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    let config = config::ClientConfig::from_document();
    leptos::logging::log!("snap client starting: consent page {}", config.consent_page);
    leptos::mount::mount_to_body(move || leptos::view! { <app::App config=config.clone()/> });
}
