//! Payment session endpoints.

use axum::extract::State;

use crate::gateway::{CancelSession, GatewayTarget, InitiateSession, RequestBuilder};
use crate::http::extract::{ApiJson, ApiPath, ApiQuery};
use crate::http::handlers::forward;
use crate::http::response::ResultEnvelope;
use crate::http::server::AppState;

/// `POST /api/session`
pub async fn initiate_session(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<InitiateSession>,
) -> ResultEnvelope {
    let built = RequestBuilder::new(&state.config.gateway).initiate_session(&input);
    forward(&state, built).await
}

/// `GET /api/session/{id}`
pub async fn session_status(
    State(state): State<AppState>,
    ApiPath(session_id): ApiPath<String>,
    ApiQuery(target): ApiQuery<GatewayTarget>,
) -> ResultEnvelope {
    let built = RequestBuilder::new(&state.config.gateway).session_status(&target, &session_id);
    forward(&state, built).await
}

/// `DELETE /api/session/{id}`; the gateway cancels via `POST /Session/cancel`.
pub async fn cancel_session(
    State(state): State<AppState>,
    ApiPath(session_id): ApiPath<String>,
    ApiJson(input): ApiJson<CancelSession>,
) -> ResultEnvelope {
    let built = RequestBuilder::new(&state.config.gateway).cancel_session(&session_id, &input);
    forward(&state, built).await
}
