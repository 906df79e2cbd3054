//! Debug trace assembly.
//!
//! # Responsibilities
//! - Record the outbound request with the credential replaced by a marker
//! - Record the inbound response (or a synthetic failure response)
//! - Render the `_debug` object attached to every envelope
//!
//! # Design Decisions
//! - The trace is built per call and dropped once the response is sent
//! - The envelope schema is versioned; the shorthand fields older clients
//!   read are only emitted on request

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::gateway::classify::RawResponse;

/// Marker stored in place of credential values.
pub const REDACTED: &str = "[REDACTED]";

/// Current `_debug` schema version.
pub const TRACE_VERSION: u32 = 2;

/// Outbound request as shown to the operator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Value,
}

/// Inbound response (or synthetic failure) as shown to the operator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: BTreeMap<String, String>,
    pub body: Value,
}

/// Request/response pair captured for one proxied call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebugTrace {
    pub request: RecordedRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<RecordedResponse>,
}

impl DebugTrace {
    /// Start a trace from an already-redacted request.
    pub fn begin(request: RecordedRequest) -> Self {
        Self {
            request,
            response: None,
        }
    }

    /// Record the gateway's answer with the body as parsed (or raw text).
    pub fn record_response(&mut self, raw: &RawResponse, body: Value) {
        self.response = Some(RecordedResponse {
            status: raw.status.as_u16(),
            status_text: raw.status_text.clone(),
            headers: raw.headers.clone(),
            body,
        });
    }

    /// Record a call that never produced a response.
    pub fn record_failure(&mut self, error: &str) {
        self.response = Some(RecordedResponse {
            status: 500,
            status_text: "Error".to_string(),
            headers: BTreeMap::new(),
            body: json!({ "error": error }),
        });
    }

    /// Render the `_debug` value.
    pub fn to_value(&self, legacy_fields: bool) -> Value {
        let mut debug = Map::new();
        debug.insert("version".to_string(), json!(TRACE_VERSION));
        debug.insert("request".to_string(), json!(self.request));
        if let Some(response) = &self.response {
            debug.insert("response".to_string(), json!(response));
        }

        if legacy_fields {
            debug.insert(
                "endpoint".to_string(),
                json!(format!("{} {}", self.request.method, self.request.url)),
            );
            if !self.request.body.is_null() {
                debug.insert("requestBody".to_string(), self.request.body.clone());
            }
            if let Some(response) = &self.response {
                debug.insert("responseStatus".to_string(), json!(response.status));
            }
        }

        Value::Object(debug)
    }
}
