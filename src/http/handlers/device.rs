//! Device registration and management endpoints.

use axum::extract::State;

use crate::gateway::{GatewayTarget, RegisterDevice, RequestBuilder, UpdateDevice};
use crate::http::extract::{ApiJson, ApiPath, ApiQuery};
use crate::http::handlers::forward;
use crate::http::response::ResultEnvelope;
use crate::http::server::AppState;

/// `POST /api/device`
pub async fn register_device(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<RegisterDevice>,
) -> ResultEnvelope {
    let built = RequestBuilder::new(&state.config.gateway).register_device(&input);
    forward(&state, built).await
}

/// `GET /api/device`
pub async fn list_devices(
    State(state): State<AppState>,
    ApiQuery(target): ApiQuery<GatewayTarget>,
) -> ResultEnvelope {
    let built = RequestBuilder::new(&state.config.gateway).list_devices(&target);
    forward(&state, built).await
}

/// `GET /api/device/{id}`
pub async fn device_status(
    State(state): State<AppState>,
    ApiPath(device_id): ApiPath<String>,
    ApiQuery(target): ApiQuery<GatewayTarget>,
) -> ResultEnvelope {
    let built = RequestBuilder::new(&state.config.gateway).device_status(&target, &device_id);
    forward(&state, built).await
}

/// `PUT /api/device/{id}`
pub async fn update_device(
    State(state): State<AppState>,
    ApiPath(device_id): ApiPath<String>,
    ApiJson(input): ApiJson<UpdateDevice>,
) -> ResultEnvelope {
    let built = RequestBuilder::new(&state.config.gateway).update_device(&device_id, &input);
    forward(&state, built).await
}

/// `DELETE /api/device/{id}`
pub async fn delete_device(
    State(state): State<AppState>,
    ApiPath(device_id): ApiPath<String>,
    ApiJson(target): ApiJson<GatewayTarget>,
) -> ResultEnvelope {
    let built = RequestBuilder::new(&state.config.gateway).delete_device(&target, &device_id);
    forward(&state, built).await
}
