//! Fixtures for tests that talk to a live deployment
//!
//! Each test builds its own fixture; nothing is shared between tests.

use serde_json::{json, Value};
use tupi::config::{DATA_SECRET_ENV, DATA_URL_ENV, DEPLOYMENT_ID_ENV};
use tupi::{DataClient, DirectClient, InsertRequest};

/// A scratch sheet name unique to this run
pub fn scratch_sheet() -> String {
    format!("test_sheet_{}", chrono::Utc::now().timestamp_millis())
}

pub fn sample_record(sheet: &str) -> InsertRequest {
    InsertRequest::new(sheet, json!({ "name": "Test Record", "value": 42 }))
}

fn env(name: &str) -> Option<String> {
    let _ = dotenvy::dotenv();
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

pub struct ScriptFixture {
    pub client: DataClient,
    pub sheet: String,
}

/// Client for `DEPLOYMENT_ID`, or `None` when the variable is unset
pub fn script_fixture() -> Option<ScriptFixture> {
    let Some(deployment_id) = env(DEPLOYMENT_ID_ENV) else {
        eprintln!("{DEPLOYMENT_ID_ENV} not set, skipping live test");
        return None;
    };

    Some(ScriptFixture {
        client: DataClient::new(&deployment_id).expect("valid deployment id"),
        sheet: scratch_sheet(),
    })
}

pub struct DirectFixture {
    pub client: DirectClient,
    pub sheet: String,
}

/// Client for `DATA_URL` + `DATA_SECRET`, or `None` when either is unset
pub fn direct_fixture() -> Option<DirectFixture> {
    let (Some(url), Some(secret)) = (env(DATA_URL_ENV), env(DATA_SECRET_ENV)) else {
        eprintln!("{DATA_URL_ENV}/{DATA_SECRET_ENV} not set, skipping live test");
        return None;
    };

    Some(DirectFixture {
        client: DirectClient::new(&url, &secret).expect("valid DATA_URL"),
        sheet: scratch_sheet(),
    })
}

/// Row id of the single record an insert returned
pub fn inserted_row(response: &Value) -> u64 {
    let rows = tupi::rows(response);
    assert_eq!(rows.len(), 1, "insert should return one row: {response}");
    rows[0].row
}
