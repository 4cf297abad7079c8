//! Apps Script URL generation
//!
//! A deployment serves every operation from a single `/exec` endpoint and
//! routes on the `$REQUEST_URI` query parameter.

use anyhow::{bail, Context, Result};
use url::Url;

/// Base of every Apps Script web-app execution URL
pub const SCRIPT_BASE_URL: &str = "https://script.google.com/macros/s";

/// Query parameter the remote script routes on
pub const REQUEST_URI_PARAM: &str = "$REQUEST_URI";

/// Build the execution URL for `api` on the given deployment.
///
/// The query carries the caller's `params` in order plus
/// `$REQUEST_URI=/<api>`, serialized as `application/x-www-form-urlencoded`:
///
/// ```
/// let url = tupi::generate_url("ABC", "insert", &[]).unwrap();
/// assert_eq!(
///     url.as_str(),
///     "https://script.google.com/macros/s/ABC/exec?%24REQUEST_URI=%2Finsert"
/// );
/// ```
pub fn generate_url(deployment_id: &str, api: &str, params: &[(&str, &str)]) -> Result<Url> {
    generate_url_from(SCRIPT_BASE_URL, deployment_id, api, params)
}

/// Same as [`generate_url`] against a custom endpoint base
pub fn generate_url_from(
    base: &str,
    deployment_id: &str,
    api: &str,
    params: &[(&str, &str)],
) -> Result<Url> {
    if deployment_id.is_empty() {
        bail!("Missing DEPLOYMENT_ID");
    }
    // Dot-segments would be normalized out of the path
    if matches!(deployment_id, "." | "..") {
        bail!("Invalid DEPLOYMENT_ID: {:?}", deployment_id);
    }

    let endpoint = format!(
        "{}/{}/exec",
        base.trim_end_matches('/'),
        urlencoding::encode(deployment_id)
    );
    let mut url =
        Url::parse(&endpoint).with_context(|| format!("Invalid script endpoint: {endpoint}"))?;

    let route = format!("/{api}");
    let pairs = with_request_uri(params, &route);
    url.query_pairs_mut().extend_pairs(&pairs);

    Ok(url)
}

/// Merge the routing parameter into the caller's pairs.
/// A caller-supplied `$REQUEST_URI` keeps its position but takes the route value.
fn with_request_uri<'a>(params: &[(&'a str, &'a str)], route: &'a str) -> Vec<(&'a str, &'a str)> {
    let mut merged = Vec::with_capacity(params.len() + 1);
    let mut injected = false;

    for &(key, value) in params {
        if key != REQUEST_URI_PARAM {
            merged.push((key, value));
            continue;
        }
        if !injected {
            tracing::warn!(
                "Overwriting caller {} value {:?} with {:?}",
                REQUEST_URI_PARAM,
                value,
                route
            );
            merged.push((REQUEST_URI_PARAM, route));
            injected = true;
        }
    }

    if !injected {
        merged.push((REQUEST_URI_PARAM, route));
    }

    merged
}
