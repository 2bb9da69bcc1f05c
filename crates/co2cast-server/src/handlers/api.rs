use std::sync::Arc;

use axum::{extract::State, Json};
use co2cast_core::{present, submit_once, Outcome};
use tracing::info;
use uuid::Uuid;

use crate::dto::{FeatureField, FeaturesResponse, PredictRequest, PredictResponse};
use crate::error::AppError;
use crate::state::AppState;

pub async fn features(State(state): State<Arc<AppState>>) -> Json<FeaturesResponse> {
    let profile = state.profile();
    Json(FeaturesResponse {
        variant: state.variant,
        title: profile.title,
        unit: profile.unit_label,
        features: state.schema.specs().iter().map(FeatureField::from).collect(),
    })
}

pub async fn predict(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, AppError> {
    let submission_id = Uuid::new_v4();
    let pairs = req.values.into_iter().map(|(k, v)| (k, v.into_text()));
    let outcome = submit_once(&state.gateway, state.schema.clone(), pairs);

    let view = present(&outcome, state.profile(), &state.schema);
    match outcome {
        Outcome::Succeeded { vector, result } => {
            info!(%submission_id, value = result.value, "api prediction");
            Ok(Json(PredictResponse {
                submission_id,
                value: result.value,
                unit: state.profile().unit_label,
                display: view.headline,
                inputs: vector,
                importances: result.importances,
                advisories: view.advisories,
            }))
        }
        Outcome::Failed(e) => Err(e.into()),
    }
}
