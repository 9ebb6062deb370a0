use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::auth::AuthError;
use crate::db::StoreError;
use crate::services::practice::PracticeError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
}

#[derive(Debug, Clone)]
pub struct AppError {
    status: StatusCode,
    code: String,
    message: String,
    is_operational: bool,
}

impl AppError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::operational(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::operational(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::operational(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::operational(StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::operational(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL_ERROR".to_string(),
            message: message.into(),
            is_operational: false,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    fn operational(
        status: StatusCode,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            is_operational: true,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = if self.is_operational {
            self.message
        } else {
            tracing::error!(code = %self.code, error = %self.message, "request failed");
            "Internal server error".to_string()
        };

        let body = ErrorResponse {
            success: false,
            error: message,
            code: self.code,
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<PracticeError> for AppError {
    fn from(err: PracticeError) -> Self {
        match err {
            PracticeError::NoActiveSession => {
                Self::operational(StatusCode::BAD_REQUEST, "NO_ACTIVE_SESSION", err.to_string())
            }
            PracticeError::WordMismatch { .. } => {
                Self::operational(StatusCode::BAD_REQUEST, "WORD_MISMATCH", err.to_string())
            }
            PracticeError::Gateway(_) => {
                Self::upstream("Error communicating with validation service.")
            }
            PracticeError::Store(store) => store.into(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::internal(err.to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingSecret => Self::internal(err.to_string()),
            AuthError::MissingToken => Self::unauthorized("Missing bearer token"),
            AuthError::InvalidToken => Self::unauthorized("Invalid authentication credentials"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::scoring::GatewayError;

    #[test]
    fn test_practice_errors_map_to_client_or_upstream_status() {
        let no_session: AppError = PracticeError::NoActiveSession.into();
        assert_eq!(no_session.status(), StatusCode::BAD_REQUEST);
        assert_eq!(no_session.code(), "NO_ACTIVE_SESSION");

        let mismatch: AppError = PracticeError::WordMismatch {
            submitted: "dog".to_string(),
            expected: "cat".to_string(),
        }
        .into();
        assert_eq!(mismatch.code(), "WORD_MISMATCH");

        let decode = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let upstream: AppError = PracticeError::Gateway(GatewayError::Decode(decode)).into();
        assert_eq!(upstream.status(), StatusCode::BAD_GATEWAY);

        let store: AppError =
            PracticeError::Store(StoreError::Unavailable("down".to_string())).into();
        assert_eq!(store.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
