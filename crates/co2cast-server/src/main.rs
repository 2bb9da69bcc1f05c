mod dto;
mod error;
mod handlers;
mod state;
mod views;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::routing::{get, post};
use axum::Router;
use co2cast_core::Co2castConfig;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .compact()
        .init();

    let config = Co2castConfig::from_env()?;
    info!("Variant: {}, model source: {}", config.variant, config.model_source());

    let state = Arc::new(AppState::from_config(&config).await?);
    if let Some(e) = state.gateway.load_error() {
        warn!("Serving without a model: {}", e);
    }

    let addr = config.bind_addr();
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, build_router(state)).await?;

    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %req.method(),
                uri = %req.uri(),
                version = ?req.version(),
            )
        })
        .on_response(|res: &Response<Body>, latency: Duration, _span: &tracing::Span| {
            info!(
                latency = %format!("{} ms", latency.as_millis()),
                status = %res.status().as_u16(),
                "finished processing request"
            );
        });

    let logged_routes = Router::new()
        .route("/", get(handlers::form::index))
        .route("/predict", post(handlers::form::predict))
        .route("/api/features", get(handlers::api::features))
        .route("/api/predict", post(handlers::api::predict))
        .layer(trace_layer);

    Router::new()
        .merge(logged_routes)
        .route("/health", get(handlers::health))
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::http::{header, StatusCode};
    use co2cast_core::{
        FeatureFrame, GatewayStatus, LoadError, PredictionError, Predictor, Variant,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;

    struct FixedModel(f64);

    impl Predictor for FixedModel {
        fn predict(&self, _frame: &FeatureFrame) -> Result<f64, PredictionError> {
            Ok(self.0)
        }
    }

    struct FailingModel;

    impl Predictor for FailingModel {
        fn predict(&self, _frame: &FeatureFrame) -> Result<f64, PredictionError> {
            Err(PredictionError::Inference("model exploded".to_string()))
        }
    }

    /// Reports one weight per column so the total variant draws a chart.
    struct EvenImportance(Vec<f64>);

    impl Predictor for EvenImportance {
        fn predict(&self, frame: &FeatureFrame) -> Result<f64, PredictionError> {
            Ok(frame.row().iter().sum::<f64>() / 1e9)
        }

        fn feature_importances(&self) -> Option<&[f64]> {
            Some(&self.0)
        }
    }

    fn app(variant: Variant, model: Option<Arc<dyn Predictor>>) -> Router {
        let schema = variant.schema().unwrap();
        let loaded = model.ok_or_else(|| LoadError::NotFound("models/missing.json".to_string()));
        let gateway = GatewayStatus::from_load(loaded, schema.clone());
        let state = AppState::new(variant, schema, gateway, "models/test.json".to_string());
        build_router(Arc::new(state))
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, String) {
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn form_post(body: &str) -> Request<Body> {
        Request::post("/predict")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn json_post(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_index_renders_form() {
        let app = app(Variant::PerCapita, Some(Arc::new(FixedModel(1.0))));
        let (status, html) = send(app, Request::get("/").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("<form method=\"post\" action=\"/predict\">"));
        assert!(html.contains("name=\"gni_per_cap\""));
        assert!(!html.contains("class=\"error\""));
    }

    #[tokio::test]
    async fn test_form_predict_success() {
        let app = app(Variant::PerCapita, Some(Arc::new(FixedModel(7.42))));
        let (status, html) = send(app, form_post("cereal_yield=3000&gdp=100")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("7.42 metric tons"));
        // submitted values are kept in the form
        assert!(html.contains("value=\"3000\""));
    }

    #[tokio::test]
    async fn test_form_predict_model_error() {
        let app = app(Variant::PerCapita, Some(Arc::new(FailingModel)));
        let (status, html) = send(app, form_post("gdp=100")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(html.contains("Prediction failed: Inference failed: model exploded"));
    }

    #[tokio::test]
    async fn test_form_predict_bad_number() {
        let app = app(Variant::PerCapita, Some(Arc::new(FixedModel(1.0))));
        let (status, html) = send(app, form_post("gdp=lots")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(html.contains("Invalid input"));
        assert!(html.contains("value=\"lots\""));
    }

    #[tokio::test]
    async fn test_form_predict_unknown_field_keeps_known_values() {
        let app = app(Variant::PerCapita, Some(Arc::new(FixedModel(1.0))));
        let (status, html) = send(app, form_post("co2=1&gdp=55")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(html.contains("Unknown field: co2"));
        assert!(html.contains("value=\"55\""));
        assert!(!html.contains("class=\"success\""));
    }

    #[tokio::test]
    async fn test_total_index_has_input_summary() {
        let app = app(Variant::Total, Some(Arc::new(FixedModel(1.0))));
        let (_, html) = send(app, Request::get("/").body(Body::empty()).unwrap()).await;
        assert!(html.contains("<details><summary>🔎 Input Summary</summary>"));
    }

    #[tokio::test]
    async fn test_form_without_model() {
        let app = app(Variant::Total, None);
        let (status, html) = send(app.clone(), Request::get("/").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Failed to load model"));

        let (status, html) = send(app, form_post("gdp=1")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(html.contains("Failed to load model"));
        assert!(!html.contains("class=\"success\""));
    }

    #[tokio::test]
    async fn test_total_variant_renders_chart_and_summary() {
        let weights = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let app = app(Variant::Total, Some(Arc::new(EvenImportance(weights))));
        let (status, html) = send(app, form_post("")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("million tonnes"));
        assert_eq!(html.matches("<rect").count(), 7);
        assert!(html.contains("<details>"));
    }

    #[tokio::test]
    async fn test_api_features() {
        let app = app(Variant::Total, None);
        let (status, body) = send(app, Request::get("/api/features").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);

        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["variant"], "total");
        let keys: Vec<&str> = body["features"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["key"].as_str().unwrap())
            .collect();
        assert_eq!(keys[0], "cereal_yield");
        assert_eq!(keys.len(), 7);
        assert_eq!(body["features"][4]["default"], 1e10);
    }

    #[tokio::test]
    async fn test_api_predict() {
        let app = app(Variant::PerCapita, Some(Arc::new(FixedModel(7.42))));
        let req = json_post("/api/predict", json!({ "values": { "gdp": 120.5, "cereal_yield": "4,000" } }));
        let (status, body) = send(app, req).await;
        assert_eq!(status, StatusCode::OK);

        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["value"], 7.42);
        assert_eq!(body["unit"], "metric tons");
        assert_eq!(body["inputs"]["gdp"], 120.5);
        assert_eq!(body["inputs"]["cereal_yield"], 4000.0);
        assert!(body["submission_id"].is_string());
    }

    #[tokio::test]
    async fn test_api_predict_unknown_field() {
        let app = app(Variant::PerCapita, Some(Arc::new(FixedModel(7.42))));
        let req = json_post("/api/predict", json!({ "values": { "co2": 1 } }));
        let (status, body) = send(app, req).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.contains("Unknown field: co2"));
    }

    #[tokio::test]
    async fn test_api_predict_unavailable() {
        let app = app(Variant::PerCapita, None);
        let (status, body) = send(app, json_post("/api/predict", json!({}))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = serde_json::from_str(&body).unwrap();
        assert!(body["error"].as_str().unwrap().starts_with("Failed to load model"));
    }

    #[tokio::test]
    async fn test_health() {
        let (_, body) = send(
            app(Variant::PerCapita, Some(Arc::new(FixedModel(1.0)))),
            Request::get("/health").body(Body::empty()).unwrap(),
        )
        .await;
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["variant"], "per-capita");

        let (_, body) = send(app(Variant::Total, None), Request::get("/health").body(Body::empty()).unwrap()).await;
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["status"], "degraded");
        assert!(body["error"].as_str().unwrap().contains("models/missing.json"));
    }
}
