//! `reqwest` implementation of the workflow transport.
//!
//! Redirects are followed by the client, so a session bounced to the login
//! page comes back as a 2xx reply whose final URL names the login route.

#[cfg(test)]
#[path = "transport_test.rs"]
mod transport_test;

use reqwest::header::{CONTENT_TYPE, COOKIE, HeaderMap, HeaderValue};
use workflow::{HttpReply, Transport};

use crate::error::CliError;

/// Cookie name used when `--session-cookie` is a bare value.
const SESSION_COOKIE_NAME: &str = "session";

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(base_url: &str, session_cookie: Option<&str>) -> Result<Self, CliError> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = session_cookie {
            headers.insert(COOKIE, HeaderValue::from_str(&cookie_header(cookie))?);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Absolute URL for a server path.
    pub fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }
}

impl Transport for ReqwestTransport {
    async fn get(&self, path: &str) -> Result<HttpReply, String> {
        let url = self.url(path);
        tracing::debug!(%url, "GET");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|error| error.to_string())?;
        into_reply(response).await
    }

    async fn post_json(&self, path: &str, body: String) -> Result<HttpReply, String> {
        let url = self.url(path);
        tracing::debug!(%url, bytes = body.len(), "POST");
        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|error| error.to_string())?;
        into_reply(response).await
    }
}

async fn into_reply(response: reqwest::Response) -> Result<HttpReply, String> {
    let status = response.status().as_u16();
    let url = response.url().to_string();
    let body = response.text().await.map_err(|error| error.to_string())?;
    Ok(HttpReply { status, url, body })
}

fn join_url(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_owned();
    }
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// `Cookie` header value. A bare token is sent as the session cookie; a
/// `name=value` pair (or several) is passed through.
fn cookie_header(cookie: &str) -> String {
    let cookie = cookie.trim();
    if cookie.contains('=') {
        cookie.to_owned()
    } else {
        format!("{SESSION_COOKIE_NAME}={cookie}")
    }
}
