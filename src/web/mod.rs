pub mod middleware;
pub mod routes;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::warn;

use crate::error::Error;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::ActivityNotFound(_) | Error::ParticipationNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            Error::NotAuthorized => StatusCode::FORBIDDEN,
            Error::SelfInterest
            | Error::DuplicateInterest
            | Error::InvalidState(_)
            | Error::CapacityExceeded => StatusCode::CONFLICT,
            Error::Transient(e) => {
                warn!("storage error while handling request: {}", e);
                StatusCode::SERVICE_UNAVAILABLE
            }
        };

        let body = Json(json!({
            "code": self.code(),
            "error": self.to_string(),
        }));
        (status, body).into_response()
    }
}
