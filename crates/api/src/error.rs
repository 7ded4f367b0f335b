//! Mapping from engine errors to HTTP responses.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use engine::EngineError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

/// JSON body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDto {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The request body could not be read as the expected payload.
    #[error("{0}")]
    BadRequest(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Engine(err) => match err {
                EngineError::Validation(_) => StatusCode::BAD_REQUEST,
                EngineError::NotFound(_) => StatusCode::NOT_FOUND,
                EngineError::Conflict(_) => StatusCode::CONFLICT,
                EngineError::Collaborator { .. } => StatusCode::BAD_GATEWAY,
                EngineError::Compensation { .. } | EngineError::Persistence(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Store and rollback failures are logged in full but not echoed back.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorDto { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::Action;
    use provisioning::mock::rejected;

    #[test]
    fn engine_errors_map_to_statuses() {
        let cases = [
            (EngineError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (EngineError::NotFound("repo-a".into()), StatusCode::NOT_FOUND),
            (EngineError::Conflict("repo-a".into()), StatusCode::CONFLICT),
            (
                EngineError::Collaborator {
                    step: Action::CreateJob,
                    source: rejected("ci-proxy", "down"),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (
                EngineError::Compensation {
                    failed_step: Action::EnableReleaseTracking,
                    cause: rejected("release-tracking", "down"),
                    compensation: Action::DeleteJob,
                    source: rejected("ci-proxy", "down"),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                EngineError::Persistence(db::DbError::NotFound),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn bad_request_is_400() {
        let err = ApiError::BadRequest("expected value".into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
