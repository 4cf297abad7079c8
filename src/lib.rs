//! Client for spreadsheet-backed data stores published as Google Apps Script
//! web apps.
//!
//! The remote script routes on a `$REQUEST_URI` query parameter, so every
//! operation is a request against the same `/exec` endpoint with a different
//! `$REQUEST_URI=/<api>` value. See [`script`] for the clients and
//! [`record`] for the request and response shapes.

pub mod config;
pub mod record;
pub mod script;

pub use record::{rows, DeleteRequest, InsertRequest, Row};
pub use script::client::{Api, DataClient};
pub use script::direct::DirectClient;
pub use script::url::generate_url;
