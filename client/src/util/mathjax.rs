//! Best-effort MathJax typesetting.
//!
//! MathJax is loaded by the host page, not by this crate. When it is missing
//! or typesetting fails the failure is logged and the raw TeX stays visible.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "mathjax_test.rs"]
mod mathjax_test;

/// Element ids of the result regions that may contain TeX.
pub const RESULT_REGION_IDS: [&str; 3] = ["explanation-content", "feedback-content", "tips-content"];

/// Outcome of a typesetting pass, for logging.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Typeset {
    Done,
    Unavailable,
    Failed(String),
}

#[cfg(any(test, feature = "csr"))]
fn describe(outcome: &Typeset) -> String {
    match outcome {
        Typeset::Done => "MathJax typesetting complete".to_owned(),
        Typeset::Unavailable => "MathJax not available for typesetting".to_owned(),
        Typeset::Failed(err) => format!("MathJax typesetting failed: {err}"),
    }
}

/// Typeset the result regions. Never fails the caller.
pub async fn typeset_results() -> Typeset {
    #[cfg(feature = "csr")]
    {
        let outcome = typeset(&RESULT_REGION_IDS).await;
        match &outcome {
            Typeset::Done => leptos::logging::log!("{}", describe(&outcome)),
            _ => leptos::logging::warn!("{}", describe(&outcome)),
        }
        outcome
    }
    #[cfg(not(feature = "csr"))]
    {
        Typeset::Unavailable
    }
}

#[cfg(feature = "csr")]
async fn typeset(ids: &[&str]) -> Typeset {
    use wasm_bindgen::{JsCast, JsValue};

    let Some(window) = web_sys::window() else {
        return Typeset::Unavailable;
    };
    let Ok(mathjax) = js_sys::Reflect::get(&window, &JsValue::from_str("MathJax")) else {
        return Typeset::Unavailable;
    };
    if mathjax.is_undefined() || mathjax.is_null() {
        return Typeset::Unavailable;
    }
    let Some(func) = js_sys::Reflect::get(&mathjax, &JsValue::from_str("typesetPromise"))
        .ok()
        .and_then(|f| f.dyn_into::<js_sys::Function>().ok())
    else {
        return Typeset::Unavailable;
    };

    let elements = js_sys::Array::new();
    if let Some(document) = window.document() {
        for id in ids {
            if let Some(el) = document.get_element_by_id(id) {
                elements.push(&el);
            }
        }
    }

    let promise = match func.call1(&mathjax, &elements) {
        Ok(value) => match value.dyn_into::<js_sys::Promise>() {
            Ok(promise) => promise,
            Err(_) => return Typeset::Done,
        },
        Err(e) => return Typeset::Failed(format!("{e:?}")),
    };
    match wasm_bindgen_futures::JsFuture::from(promise).await {
        Ok(_) => Typeset::Done,
        Err(e) => Typeset::Failed(format!("{e:?}")),
    }
}
