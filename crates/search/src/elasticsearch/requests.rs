//! Elasticsearch request construction and response interpretation.

use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::{Value, json};

use conductor_core::error::{SearchError, SearchResult};

/// Longest error body kept in a [`SearchError::RequestError`].
pub const MAX_ERROR_BODY: usize = 512;

const REFRESH: (&str, &str) = ("refresh", "wait_for");

// =============================================================================
// URLs
// =============================================================================

/// Parse and validate the node URL.
pub fn base_url(url: &str) -> SearchResult<Url> {
    let base = Url::parse(url)
        .map_err(|e| SearchError::ConnectionError(format!("invalid node URL {url}: {e}")))?;
    if base.cannot_be_a_base() {
        return Err(SearchError::ConnectionError(format!(
            "invalid node URL {url}: not a base URL"
        )));
    }
    Ok(base)
}

/// Append path segments to the node URL, percent-encoding each one.
fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

/// `POST /{index}/_update/{id}?refresh=wait_for`
pub fn update_url(base: &Url, index: &str, id: &str) -> Url {
    let mut url = endpoint(base, &[index, "_update", id]);
    url.query_pairs_mut().append_pair(REFRESH.0, REFRESH.1);
    url
}

/// `DELETE /{index}/_doc/{id}?refresh=wait_for`
pub fn delete_url(base: &Url, index: &str, id: &str) -> Url {
    let mut url = endpoint(base, &[index, "_doc", id]);
    url.query_pairs_mut().append_pair(REFRESH.0, REFRESH.1);
    url
}

/// `GET /{index}/_doc/{id}`
pub fn get_url(base: &Url, index: &str, id: &str) -> Url {
    endpoint(base, &[index, "_doc", id])
}

/// `GET /{index}/_count`
pub fn count_url(base: &Url, index: &str) -> Url {
    endpoint(base, &[index, "_count"])
}

// =============================================================================
// Bodies
// =============================================================================

/// Partial-update body creating the document when absent.
pub fn upsert_body(doc: Value) -> Value {
    json!({
        "doc": doc,
        "doc_as_upsert": true,
    })
}

// =============================================================================
// Responses
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct GetResponse {
    #[serde(default)]
    pub found: bool,
    #[serde(rename = "_source")]
    pub source: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

/// Error for a non-success status, keeping a bounded excerpt of the body.
pub fn request_error(status: StatusCode, body: &str) -> SearchError {
    let body = match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((cut, _)) => format!("{}…", &body[..cut]),
        None => body.to_string(),
    };
    SearchError::RequestError {
        status: status.as_u16(),
        body,
    }
}

/// Map a transport failure.
pub fn transport_error(err: reqwest::Error) -> SearchError {
    if err.is_timeout() {
        SearchError::Timeout(err.to_string())
    } else if err.is_decode() {
        SearchError::SerializationError(err.to_string())
    } else {
        SearchError::ConnectionError(err.to_string())
    }
}
