use axum::{Json, http::StatusCode, response::IntoResponse, response::Response};
use serde_json::json;

use crate::domain::DomainError;

impl DomainError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DomainError::NotFound => StatusCode::NOT_FOUND,
            DomainError::Validation(_) | DomainError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            DomainError::LocationUnavailable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            DomainError::TooFar { .. } | DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
            DomainError::Conflict(_) => StatusCode::CONFLICT,
            DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            DomainError::Database(_) | DomainError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let body = match &self {
            DomainError::TooFar {
                distance_m,
                threshold_m,
            } => json!({
                "error": self.to_string(),
                "distance_m": distance_m,
                "threshold_m": threshold_m,
            }),
            DomainError::NotFound => json!({ "error": "Not found" }),
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses() {
        assert_eq!(DomainError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            DomainError::InvalidInput("lat".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            DomainError::TooFar {
                distance_m: 60.0,
                threshold_m: 50.0
            }
            .status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            DomainError::LocationUnavailable("denied".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
