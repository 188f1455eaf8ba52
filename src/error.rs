use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Errors raised by the model provider itself.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model expects feature '{0}' which the request does not supply")]
    FeatureMismatch(String),
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("unexpected model output: {0}")]
    UnexpectedOutput(String),
}

/// Per-request error taxonomy. Startup load errors are anyhow chains out of
/// main and fatal; everything here is fatal only to the single request.
#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error("{0}")]
    InvalidInput(String),
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl IntoResponse for PredictError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            PredictError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            PredictError::Model(err) => {
                tracing::error!("model invocation failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "prediction failed, see server logs".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
