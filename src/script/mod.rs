//! Apps Script interaction module
//!
//! This module provides the functionality for talking to a spreadsheet-backed
//! Google Apps Script deployment.
//!
//! # Module Structure
//!
//! - [`url`] - `/exec` URL generation with the `$REQUEST_URI` routing parameter
//! - [`http`] - HTTP utilities shared by both clients
//! - [`client`] - Deployment-id based data client (`list`, `insert`, `delete`)
//! - [`direct`] - Client for a pre-routed base URL authenticated with a `Secret` header
//!
//! # Example
//!
//! ```no_run
//! use serde_json::json;
//! use tupi::DataClient;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = DataClient::new("AKfycbx-deployment")?;
//!     client
//!         .insert(&json!({ "sheet": "people", "data": { "name": "Ada", "value": 42 } }))
//!         .await?;
//!     let rows = client.list().await?;
//!     println!("{rows}");
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod direct;
pub mod http;
pub mod url;
