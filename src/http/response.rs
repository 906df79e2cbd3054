//! Response envelope.
//!
//! # Responsibilities
//! - Flatten upstream fields to the top level
//! - Attach the `_debug` trace to every outcome
//! - Pick the status: mirrored upstream, 400 for validation, 500 for transport
//!
//! # Design Decisions
//! - `_debug` is inserted last, so an upstream field of that name is shadowed

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Map, Value};

use crate::gateway::{Classified, DebugTrace, Rejected, TransportFailure};

pub const DEBUG_FIELD: &str = "_debug";

/// Uniform JSON body returned for every proxied operation.
#[derive(Debug, Clone)]
pub struct ResultEnvelope {
    status: StatusCode,
    body: Map<String, Value>,
}

impl ResultEnvelope {
    /// Gateway answered (any status, any content type).
    pub fn upstream(classified: Classified, trace: &DebugTrace, legacy_fields: bool) -> Self {
        Self::with_trace(classified.status, classified.payload, trace, legacy_fields)
    }

    /// Gateway never answered.
    pub fn transport_failure(
        failure: &TransportFailure,
        trace: &DebugTrace,
        legacy_fields: bool,
    ) -> Self {
        let mut body = Map::new();
        body.insert("error".into(), json!(failure.message));
        Self::with_trace(StatusCode::INTERNAL_SERVER_ERROR, body, trace, legacy_fields)
    }

    /// Input failed validation; nothing was sent.
    pub fn rejected(rejected: &Rejected, legacy_fields: bool) -> Self {
        let mut body = Map::new();
        body.insert("error".into(), json!(rejected.reason.to_string()));
        let trace = DebugTrace::begin(rejected.request.clone());
        Self::with_trace(StatusCode::BAD_REQUEST, body, &trace, legacy_fields)
    }

    fn with_trace(
        status: StatusCode,
        mut body: Map<String, Value>,
        trace: &DebugTrace,
        legacy_fields: bool,
    ) -> Self {
        body.insert(DEBUG_FIELD.into(), trace.to_value(legacy_fields));
        Self { status, body }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }
}

impl IntoResponse for ResultEnvelope {
    fn into_response(self) -> Response {
        (self.status, Json(Value::Object(self.body))).into_response()
    }
}
