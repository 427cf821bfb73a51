//! Uniform response envelopes
//!
//! Success bodies are `{"error": false, "code": N, "<name>": ...}` and
//! failures are `{"error": true, "code": N, "errorNum": M,
//! "errorMessage": S}`. Responses that carry a document or graph revision
//! repeat it in the `etag` header.

use crate::graph::GraphError;
use axum::http::header::ETAG;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

/// Success code for a mutation: 202 unless the client asked to wait for
/// the write to be synced, then 200.
pub fn mutation_code(wait_for_sync: bool) -> StatusCode {
    if wait_for_sync {
        StatusCode::OK
    } else {
        StatusCode::ACCEPTED
    }
}

/// Success code for an initial creation: the synced "OK" upgrades to 201.
pub fn creation_code(wait_for_sync: bool) -> StatusCode {
    if wait_for_sync {
        StatusCode::CREATED
    } else {
        StatusCode::ACCEPTED
    }
}

/// Build a success envelope, optionally stamping the revision as `etag`.
pub fn success(code: StatusCode, name: &str, body: Value, etag: Option<&str>) -> Response {
    let mut payload = json!({
        "error": false,
        "code": code.as_u16(),
    });
    payload[name] = body;

    let mut response = (code, Json(payload)).into_response();
    if let Some(rev) = etag {
        if let Ok(value) = rev.parse() {
            response.headers_mut().insert(ETAG, value);
        }
    }
    response
}

/// The successful empty answer to a matching `If-None-Match`.
pub fn not_modified() -> Response {
    StatusCode::NOT_MODIFIED.into_response()
}

impl IntoResponse for GraphError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let payload = json!({
            "error": true,
            "code": status.as_u16(),
            "errorNum": self.error_num(),
            "errorMessage": self.to_string(),
        });
        (status, Json(payload)).into_response()
    }
}
