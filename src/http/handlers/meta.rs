//! Non-proxied endpoints.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::gateway::{BaseUrl, Environment};
use crate::http::server::AppState;

#[derive(Serialize)]
pub struct HealthStatus {
    pub version: &'static str,
    pub status: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentListing {
    pub production: BaseUrl,
    pub test: BaseUrl,
    pub report: String,
    pub api_version: String,
}

/// `GET /api/health`
pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "ok",
    })
}

/// `GET /api/environments`
pub async fn environments(State(state): State<AppState>) -> Json<EnvironmentListing> {
    let gateway = &state.config.gateway;
    Json(EnvironmentListing {
        production: gateway.resolve_base_url(Environment::Production, None),
        test: gateway.resolve_base_url(Environment::Test, None),
        report: gateway.report_endpoint(),
        api_version: gateway.api_version.clone(),
    })
}
