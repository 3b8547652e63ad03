//! Browser HTTP transport and navigation helpers.
//!
//! Client-side (csr): real HTTP calls via `gloo-net`.
//! Native builds and tests: the transport reports itself unavailable so the
//! workflow degrades into its normal transport-error path.
//!
//! ERROR HANDLING
//! ==============
//! The transport only returns `Err` when no response arrived. Status codes,
//! login bounces and body parsing are interpreted by
//! `workflow::AnalysisClient`, never here.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::time::Duration;

use workflow::{AnalysisClient, HttpReply, Transport};

use crate::config::ClientConfig;

#[cfg(any(test, feature = "csr"))]
fn page_path(pathname: &str) -> String {
    if pathname.is_empty() { "/".to_owned() } else { pathname.to_owned() }
}

#[cfg(any(test, feature = "csr"))]
fn read_body_failed_message(status: u16, err: &str) -> String {
    format!("failed to read response body (status {status}): {err}")
}

/// Same-origin `fetch` transport.
#[derive(Clone, Copy, Debug, Default)]
pub struct GlooTransport;

impl Transport for GlooTransport {
    async fn get(&self, path: &str) -> Result<HttpReply, String> {
        #[cfg(feature = "csr")]
        {
            let resp = gloo_net::http::Request::get(path)
                .send()
                .await
                .map_err(|e| e.to_string())?;
            into_reply(resp).await
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = path;
            Err("not available outside the browser".to_owned())
        }
    }

    async fn post_json(&self, path: &str, body: String) -> Result<HttpReply, String> {
        #[cfg(feature = "csr")]
        {
            let resp = gloo_net::http::Request::post(path)
                .header("Content-Type", "application/json")
                .body(body)
                .map_err(|e| e.to_string())?
                .send()
                .await
                .map_err(|e| e.to_string())?;
            into_reply(resp).await
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = (path, body);
            Err("not available outside the browser".to_owned())
        }
    }
}

#[cfg(feature = "csr")]
async fn into_reply(resp: gloo_net::http::Response) -> Result<HttpReply, String> {
    let status = resp.status();
    let url = resp.url();
    let body = resp
        .text()
        .await
        .map_err(|e| read_body_failed_message(status, &e.to_string()))?;
    Ok(HttpReply { status, url, body })
}

/// Analysis client wired to the page configuration.
pub fn analysis_client(config: &ClientConfig) -> AnalysisClient<GlooTransport> {
    AnalysisClient::new(GlooTransport, config.endpoints.clone()).with_deadlines(config.deadlines)
}

/// Path of the current page, carried through the login redirect.
pub fn current_path() -> String {
    #[cfg(feature = "csr")]
    {
        let pathname = web_sys::window()
            .and_then(|w| w.location().pathname().ok())
            .unwrap_or_default();
        page_path(&pathname)
    }
    #[cfg(not(feature = "csr"))]
    {
        "/".to_owned()
    }
}

/// Navigate the whole page to `url`.
pub fn redirect_to(url: &str) {
    #[cfg(feature = "csr")]
    {
        if let Some(window) = web_sys::window() {
            if window.location().set_href(url).is_err() {
                leptos::logging::warn!("redirect to {url} failed");
            }
        }
    }
    #[cfg(not(feature = "csr"))]
    {
        let _ = url;
    }
}

/// Timer future for the consent and analyze deadline races.
pub async fn sleep(duration: Duration) {
    #[cfg(feature = "csr")]
    {
        gloo_timers::future::sleep(duration).await;
    }
    #[cfg(not(feature = "csr"))]
    {
        let _ = duration;
        std::future::pending::<()>().await;
    }
}
