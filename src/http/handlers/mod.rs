//! Proxy endpoint handlers.
//!
//! Every gateway handler follows the same path:
//! ```text
//! VALIDATING ──fail──▶ 400 envelope
//!     │
//! BUILDING → DISPATCHING ──no response──▶ classify transport error → 500 envelope
//!     │
//! CLASSIFYING_RESPONSE → ASSEMBLING_TRACE → envelope (mirrored status)
//! ```
//! Each call is attempted exactly once.

pub mod device;
pub mod meta;
pub mod report;
pub mod session;

use std::time::Instant;

use crate::gateway::{
    classify_reqwest_error, classify_response, DebugTrace, Rejected, UpstreamRequest,
};
use crate::http::response::ResultEnvelope;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Run one built (or rejected) request through dispatch, classification,
/// and trace assembly.
pub(crate) async fn forward(
    state: &AppState,
    built: Result<UpstreamRequest, Rejected>,
) -> ResultEnvelope {
    let legacy_fields = state.config.envelope.legacy_debug_fields;

    let request = match built {
        Ok(request) => request,
        Err(rejected) => {
            tracing::debug!(
                operation = %rejected.operation,
                reason = %rejected.reason,
                "Request rejected before dispatch"
            );
            metrics::record_rejected(rejected.operation.name());
            return ResultEnvelope::rejected(&rejected, legacy_fields);
        }
    };

    let operation = request.operation;
    let mut trace = DebugTrace::begin(request.redacted());
    let start = Instant::now();

    tracing::debug!(
        operation = %operation,
        method = %request.method,
        url = %request.url,
        "Dispatching to gateway"
    );

    match state.client.dispatch(&request).await {
        Ok(raw) => {
            let classified = classify_response(&raw, state.config.gateway.preview_limit);
            trace.record_response(&raw, classified.trace_body.clone());
            metrics::record_upstream(operation.name(), raw.status.as_u16(), start);

            match &classified.error {
                Some(label) => tracing::warn!(
                    operation = %operation,
                    status = %raw.status,
                    error = %label,
                    latency_ms = start.elapsed().as_millis() as u64,
                    "Gateway returned an error"
                ),
                None => tracing::info!(
                    operation = %operation,
                    status = %raw.status,
                    latency_ms = start.elapsed().as_millis() as u64,
                    "Gateway call completed"
                ),
            }

            ResultEnvelope::upstream(classified, &trace, legacy_fields)
        }
        Err(err) => {
            let failure = classify_reqwest_error(&err, &request.url);
            trace.record_failure(&failure.detail);
            metrics::record_transport_failure(operation.name(), failure.kind.as_str(), start);

            tracing::error!(
                operation = %operation,
                kind = failure.kind.as_str(),
                error = %failure.detail,
                "Gateway unreachable"
            );

            ResultEnvelope::transport_failure(&failure, &trace, legacy_fields)
        }
    }
}
