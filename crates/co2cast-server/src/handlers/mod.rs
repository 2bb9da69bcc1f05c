pub mod api;
pub mod form;

use std::sync::Arc;

use axum::{extract::State, Json};
use co2cast_core::GatewayStatus;

use crate::dto::HealthResponse;
use crate::state::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let (status, model, error) = match &state.gateway {
        GatewayStatus::Ready(gateway) => ("ok", Some(gateway.model().describe()), None),
        GatewayStatus::Unavailable(e) => ("degraded", None, Some(e.to_string())),
    };

    Json(HealthResponse {
        status,
        variant: state.variant,
        model_source: state.model_source.clone(),
        model,
        error,
    })
}
