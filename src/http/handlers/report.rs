use axum::extract::State;

use crate::gateway::{RequestBuilder, TransactionReport};
use crate::http::extract::ApiJson;
use crate::http::handlers::forward;
use crate::http::response::ResultEnvelope;
use crate::http::server::AppState;

/// `POST /api/report`
pub async fn transaction_report(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<TransactionReport>,
) -> ResultEnvelope {
    let built = RequestBuilder::new(&state.config.gateway).transaction_report(&input);
    forward(&state, built).await
}
