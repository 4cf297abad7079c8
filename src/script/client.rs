//! Data Client
//!
//! Talks to a deployment through generated `/exec` URLs.

use super::http::ScriptHttpClient;
use super::url::{generate_url_from, SCRIPT_BASE_URL};
use crate::record::DeleteRequest;
use anyhow::{bail, Result};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Operation exposed by the remote script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Api {
    List,
    Insert,
    Delete,
}

impl Api {
    pub fn as_str(self) -> &'static str {
        match self {
            Api::List => "list",
            Api::Insert => "insert",
            Api::Delete => "delete",
        }
    }

    /// Error message returned when the operation gets a non-2xx response
    fn failure(self) -> &'static str {
        match self {
            Api::List => "Failed to fetch list",
            Api::Insert => "Failed to insert data",
            Api::Delete => "Failed to delete data",
        }
    }
}

impl fmt::Display for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client bound to one Apps Script deployment
#[derive(Clone)]
pub struct DataClient {
    http: ScriptHttpClient,
    deployment_id: String,
    base_url: String,
}

impl DataClient {
    /// Create a client for the given deployment
    pub fn new(deployment_id: &str) -> Result<Self> {
        Self::with_base_url(deployment_id, SCRIPT_BASE_URL)
    }

    /// Create a client against a custom endpoint base (e.g. a local mock)
    pub fn with_base_url(deployment_id: &str, base_url: &str) -> Result<Self> {
        if deployment_id.is_empty() {
            bail!("Missing DEPLOYMENT_ID");
        }

        Ok(Self {
            http: ScriptHttpClient::new()?,
            deployment_id: deployment_id.to_string(),
            base_url: base_url.to_string(),
        })
    }

    /// Execution URL for `api` with extra query pairs
    pub fn url(&self, api: Api, params: &[(&str, &str)]) -> Result<url::Url> {
        generate_url_from(&self.base_url, &self.deployment_id, api.as_str(), params)
    }

    /// Fetch every record the script returns for `list`
    pub async fn list(&self) -> Result<Value> {
        self.list_with(&[]).await
    }

    /// `list` with extra query parameters, e.g. `[("sheet", "people")]`
    pub async fn list_with(&self, params: &[(&str, &str)]) -> Result<Value> {
        let url = self.url(Api::List, params)?;
        self.http.get_json(url.as_str(), Api::List.failure()).await
    }

    /// Insert a record; `data` is sent as the JSON request body unchanged
    pub async fn insert<T>(&self, data: &T) -> Result<Value>
    where
        T: Serialize + ?Sized,
    {
        let url = self.url(Api::Insert, &[])?;
        self.http
            .post_json(url.as_str(), data, Api::Insert.failure())
            .await
    }

    /// Delete the record stored at `row` in `sheet`
    pub async fn delete(&self, sheet: &str, row: u64) -> Result<Value> {
        let url = self.url(Api::Delete, &[])?;
        let body = DeleteRequest::new(sheet, row);
        self.http
            .post_json(url.as_str(), &body, Api::Delete.failure())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_deployment_id_is_rejected() {
        let err = DataClient::new("").err().expect("empty id must fail");
        assert_eq!(err.to_string(), "Missing DEPLOYMENT_ID");
    }

    #[test]
    fn test_urls_route_on_api_name() {
        let client = DataClient::new("ABC").unwrap();
        for api in [Api::List, Api::Insert, Api::Delete] {
            let url = client.url(api, &[]).unwrap();
            assert_eq!(
                url.as_str(),
                format!("https://script.google.com/macros/s/ABC/exec?%24REQUEST_URI=%2F{api}")
            );
        }
    }

    #[test]
    fn test_api_display() {
        assert_eq!(Api::List.to_string(), "list");
        assert_eq!(Api::Insert.to_string(), "insert");
        assert_eq!(Api::Delete.to_string(), "delete");
    }
}
