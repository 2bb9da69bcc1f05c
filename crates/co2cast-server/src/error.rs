use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use co2cast_core::SubmitError;
use serde::Serialize;

#[derive(Debug)]
pub enum AppError {
    Unprocessable(String),
    Unavailable(String),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SubmitError> for AppError {
    fn from(e: SubmitError) -> Self {
        let message = e.to_string();
        match e {
            SubmitError::GatewayUnavailable(_) => AppError::Unavailable(message),
            SubmitError::Input(_) => AppError::Unprocessable(message),
            SubmitError::Prediction(_) => AppError::Internal(message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::Unprocessable(msg)
            | AppError::Unavailable(msg)
            | AppError::Internal(msg) => msg,
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
