use std::sync::Arc;

use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::Html,
};
use co2cast_core::{present, submit_collected, Outcome};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;
use crate::views;

pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let fields = state.collector().fields();
    Html(views::page(
        state.profile(),
        &fields,
        state.gateway.load_error(),
        None,
    ))
}

/// Runs one submission and re-renders the form with the entered values kept.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> (StatusCode, Html<String>) {
    let submission_id = Uuid::new_v4();

    // Known fields keep their text even when another key is rejected.
    let mut collector = state.collector();
    let mut rejected = None;
    for (key, value) in pairs {
        if let Err(e) = collector.set(&key, value) {
            rejected.get_or_insert(e);
        }
    }

    let fields = collector.fields();
    let outcome = match rejected {
        Some(e) => Outcome::Failed(e.into()),
        None => submit_collected(&state.gateway, collector),
    };
    let status = match &outcome {
        Outcome::Succeeded { result, .. } => {
            info!(%submission_id, value = result.value, "form prediction");
            StatusCode::OK
        }
        Outcome::Failed(e) => {
            warn!(%submission_id, "form submission failed: {}", e);
            AppError::from(e.clone()).status()
        }
    };

    let view = present(&outcome, state.profile(), &state.schema);
    let html = views::page(
        state.profile(),
        &fields,
        state.gateway.load_error(),
        Some(&view),
    );
    (status, Html(html))
}
