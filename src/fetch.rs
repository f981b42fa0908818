//! Fetch boundary
//!
//! The HTTP transport lives outside this crate. It hands over a
//! `FetchResponse` (or a transport error); this module decides whether the
//! body is usable JSON.
//!
//! ## Failure mapping
//! - transport failure or non-2xx status → `Network`
//! - content type without `application/json` → `Schema`
//! - body that does not parse → `Schema`

use serde_json::Value;

use crate::error::{Result, StoreError};
use crate::model::EntityKind;

/// Raw response handed over by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl FetchResponse {
    /// A 200 JSON response
    pub fn json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: Some("application/json".to_string()),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Source of raw payloads, one endpoint per kind
pub trait Fetcher {
    fn fetch(&self, kind: EntityKind) -> Result<FetchResponse>;
}

/// Validate a response and parse its body
pub fn decode_response(response: &FetchResponse) -> Result<Value> {
    if !response.is_success() {
        return Err(StoreError::Network {
            status: Some(response.status),
            message: format!("Remote response was a {}", response.status),
        });
    }

    let is_json = response
        .content_type
        .as_deref()
        .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
        .unwrap_or(false);
    if !is_json {
        return Err(StoreError::Schema(
            "Remote response did not have the content type application/json".to_string(),
        ));
    }

    serde_json::from_str(&response.body)
        .map_err(|e| StoreError::Schema(format!("Remote response body is not JSON: {}", e)))
}
