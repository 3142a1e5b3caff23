//! Error responses for the asset server.

use axum::{Json, http::StatusCode, response::IntoResponse};
use tracing::{debug, error};

use crate::domain::{AppError, ErrorDetail, ErrorResponse};

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_type) = match &self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            AppError::Resolution(_) => (StatusCode::UNPROCESSABLE_ENTITY, "resolution_error"),
            AppError::Wallet(_) => (StatusCode::BAD_GATEWAY, "wallet_error"),
            AppError::Network(_) => (StatusCode::CONFLICT, "network_error"),
            AppError::Submission(_) => (StatusCode::BAD_GATEWAY, "submission_error"),
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error"),
            AppError::Serialization(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "serialization_error")
            }
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };
        let message = self.to_string();

        if status.is_server_error() {
            error!(error_type = %error_type, message = %message, "Server error");
        } else {
            debug!(error_type = %error_type, message = %message, "Client error");
        }

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                r#type: error_type.to_string(),
                message,
            },
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ValidationError;

    #[test]
    fn test_not_found_maps_to_404() {
        let response = AppError::NotFound("/missing.js".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_validation_maps_to_400() {
        let response = AppError::from(ValidationError::InvalidAmount).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_maps_to_500() {
        let response = AppError::Internal("boom".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
