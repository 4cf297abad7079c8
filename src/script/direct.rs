//! Direct client
//!
//! Calls a pre-routed base URL (`DATA_URL`) where each operation is a path
//! segment, authenticating with a `Secret` header.

use super::http::ScriptHttpClient;
use crate::record::{DeleteRequest, InsertRequest};
use anyhow::{bail, Context, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Header carrying the shared secret (`Secret`; header names are case-insensitive)
pub const SECRET_HEADER: HeaderName = HeaderName::from_static("secret");

/// Transport timeout for direct calls
pub const DIRECT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct DirectClient {
    http: ScriptHttpClient,
    base_url: Url,
}

impl DirectClient {
    pub fn new(base_url: &str, secret: &str) -> Result<Self> {
        Self::with_timeout(base_url, secret, DIRECT_TIMEOUT)
    }

    /// Same as [`DirectClient::new`] with a custom transport timeout
    pub fn with_timeout(base_url: &str, secret: &str, timeout: Duration) -> Result<Self> {
        if base_url.is_empty() {
            bail!("Missing DATA_URL");
        }

        // Keep a trailing slash so `join` appends instead of replacing the last segment
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized).context("Invalid DATA_URL")?;

        let mut headers = HeaderMap::new();
        let mut value = HeaderValue::from_str(secret).context("Invalid DATA_SECRET")?;
        value.set_sensitive(true);
        headers.insert(SECRET_HEADER, value);

        let http = ScriptHttpClient::with_options(headers, Some(timeout))?;

        Ok(Self { http, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("Invalid endpoint path: {path}"))
    }

    /// List the records of `sheet`
    pub async fn list(&self, sheet: &str) -> Result<Value> {
        let mut url = self.endpoint("list")?;
        url.query_pairs_mut().append_pair("sheet", sheet);
        self.http.get_json(url.as_str(), &failure("list")).await
    }

    pub async fn insert(&self, request: &InsertRequest) -> Result<Value> {
        let url = self.endpoint("insert")?;
        self.http
            .post_json(url.as_str(), request, &failure("insert"))
            .await
    }

    /// Delete the record stored at `row` in `sheet`
    pub async fn delete(&self, sheet: &str, row: u64) -> Result<Value> {
        let url = self.endpoint("delete")?;
        let body = DeleteRequest::new(sheet, row);
        self.http
            .post_json(url.as_str(), &body, &failure("delete"))
            .await
    }
}

fn failure(operation: &str) -> String {
    format!("API request failed: {operation}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_base_url_is_rejected() {
        let err = DirectClient::new("", "secret").err().unwrap();
        assert_eq!(err.to_string(), "Missing DATA_URL");
    }

    #[test]
    fn test_unparsable_base_url_is_rejected() {
        let err = DirectClient::new("not a url", "secret").err().unwrap();
        assert_eq!(err.to_string(), "Invalid DATA_URL");
    }

    #[test]
    fn test_endpoint_appends_to_base_path() {
        let client = DirectClient::new("https://example.com/macros/s/ABC/exec", "s").unwrap();
        assert_eq!(
            client.endpoint("list").unwrap().as_str(),
            "https://example.com/macros/s/ABC/exec/list"
        );
    }

    #[test]
    fn test_secret_must_be_a_valid_header() {
        let err = DirectClient::new("https://example.com", "bad\nsecret").err().unwrap();
        assert_eq!(err.to_string(), "Invalid DATA_SECRET");
    }
}
