//! HTTP utilities for Apps Script calls

use anyhow::{anyhow, Context, Result};
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

const USER_AGENT: &str = concat!("tupi/", env!("CARGO_PKG_VERSION"));

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// HTTP client wrapper shared by the script clients
#[derive(Clone)]
pub struct ScriptHttpClient {
    client: Client,
}

impl ScriptHttpClient {
    /// Create a new HTTP client with no request timeout
    pub fn new() -> Result<Self> {
        Self::with_options(HeaderMap::new(), None)
    }

    /// Create a client that sends `headers` on every request
    pub fn with_options(headers: HeaderMap, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers);

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// GET `url` and parse the JSON body.
    /// Any non-2xx status fails with `failure`.
    pub async fn get_json(&self, url: &str, failure: &str) -> Result<Value> {
        tracing::debug!("GET {}", url);

        let request = self
            .client
            .get(url)
            .header(CONTENT_TYPE, "application/json");

        self.execute(request, failure).await
    }

    /// POST `body` as JSON to `url` and parse the JSON response.
    /// Any non-2xx status fails with `failure`.
    pub async fn post_json<T>(&self, url: &str, body: &T, failure: &str) -> Result<Value>
    where
        T: Serialize + ?Sized,
    {
        tracing::debug!("POST {}", url);

        let payload = serde_json::to_vec(body).context("Failed to serialize request body")?;
        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload);

        self.execute(request, failure).await
    }

    async fn execute(&self, request: RequestBuilder, failure: &str) -> Result<Value> {
        // Transport errors are surfaced as the reqwest error itself
        let response = request.send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!("Script error: {} - {}", status, sanitize_for_log(&body));
            return Err(anyhow!("{}", failure));
        }

        serde_json::from_str(&body).context("Failed to parse response JSON")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_short_bodies() {
        assert_eq!(sanitize_for_log("{\"ok\": true}"), "{\"ok\": true}");
    }

    #[test]
    fn test_sanitize_truncates_long_bodies() {
        let body = "x".repeat(500);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.starts_with(&"x".repeat(MAX_LOG_BODY_LENGTH)));
        assert!(sanitized.ends_with("[truncated, 500 bytes total]"));
    }

    #[test]
    fn test_sanitize_respects_char_boundaries() {
        let body = "é".repeat(150);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.contains("[truncated, 300 bytes total]"));
    }

    #[test]
    fn test_sanitize_strips_control_characters() {
        assert_eq!(sanitize_for_log("line\nbreak\ttab"), "linebreaktab");
    }
}
