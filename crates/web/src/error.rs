use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use storage::error::StorageError;
use validator::ValidationErrors;

/// Web layer errors
#[derive(Debug)]
pub enum WebError {
    Storage(StorageError),
    Validation(ValidationErrors),
    BadRequest(String),
    Unauthorized,
    Forbidden(String),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "Storage error: {}", e),
            Self::Validation(e) => write!(f, "Validation error: {}", e),
            Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            Self::Unauthorized => write!(f, "Unauthorized"),
            Self::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
        }
    }
}

impl WebError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Storage(StorageError::NotFound) => StatusCode::NOT_FOUND,
            Self::Storage(StorageError::ConstraintViolation(_)) => StatusCode::CONFLICT,
            Self::Storage(StorageError::InvalidTransition(_)) => StatusCode::CONFLICT,
            Self::Storage(StorageError::InvalidResult(_)) => StatusCode::BAD_REQUEST,
            Self::Storage(StorageError::RegistrationIncomplete(_)) => StatusCode::BAD_REQUEST,
            Self::Storage(StorageError::Forbidden(_)) => StatusCode::FORBIDDEN,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let body = match &self {
            Self::Storage(StorageError::NotFound) => {
                json!({
                    "error": "Resource not found"
                })
            }
            Self::Storage(StorageError::ConstraintViolation(msg))
            | Self::Storage(StorageError::Forbidden(msg)) => {
                json!({
                    "error": msg
                })
            }
            Self::Storage(StorageError::InvalidTransition(e)) => {
                json!({
                    "error": e.to_string()
                })
            }
            Self::Storage(StorageError::InvalidResult(e)) => {
                json!({
                    "error": "Invalid result",
                    "details": [e.to_string()]
                })
            }
            Self::Storage(StorageError::RegistrationIncomplete(report)) => {
                json!({
                    "error": "Team registration is incomplete",
                    "details": report.issues
                })
            }
            Self::Storage(e) => {
                tracing::error!("Storage error: {:?}", e);
                json!({
                    "error": "An internal error occurred"
                })
            }
            Self::Validation(errors) => {
                let field_errors: Vec<String> = errors
                    .field_errors()
                    .iter()
                    .flat_map(|(field, errors)| {
                        errors.iter().map(move |e| {
                            format!(
                                "{}: {}",
                                field,
                                e.message
                                    .as_ref()
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| e.code.to_string())
                            )
                        })
                    })
                    .collect();

                json!({
                    "error": "Validation failed",
                    "details": field_errors
                })
            }
            Self::BadRequest(msg) => {
                json!({
                    "error": msg
                })
            }
            Self::Unauthorized => {
                json!({
                    "error": "Unauthorized"
                })
            }
            Self::Forbidden(msg) => {
                json!({
                    "error": msg
                })
            }
        };

        (status_code, Json(body)).into_response()
    }
}

impl From<StorageError> for WebError {
    fn from(error: StorageError) -> Self {
        Self::Storage(error)
    }
}

impl From<ValidationErrors> for WebError {
    fn from(error: ValidationErrors) -> Self {
        Self::Validation(error)
    }
}

pub type WebResult<T> = Result<T, WebError>;

#[cfg(test)]
mod tests {
    use super::*;
    use storage::models::{RegistrationStatus, TransitionError};
    use storage::services::recorder::ResultValidationError;
    use storage::services::registration::{RegistrationIssue, RegistrationReport};

    async fn body_json(error: WebError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_status_mapping() {
        let illegal = RegistrationStatus::Accepted
            .transition(RegistrationStatus::Draft)
            .unwrap_err();

        let cases = [
            (WebError::from(StorageError::NotFound), StatusCode::NOT_FOUND),
            (
                WebError::from(StorageError::ConstraintViolation("Slug already exists".into())),
                StatusCode::CONFLICT,
            ),
            (WebError::from(StorageError::from(illegal)), StatusCode::CONFLICT),
            (
                WebError::from(StorageError::from(ResultValidationError::Negative)),
                StatusCode::BAD_REQUEST,
            ),
            (
                WebError::from(StorageError::Forbidden("event is completed".into())),
                StatusCode::FORBIDDEN,
            ),
            (
                WebError::from(StorageError::Database(sqlx::Error::PoolTimedOut)),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (WebError::Unauthorized, StatusCode::UNAUTHORIZED),
            (WebError::Forbidden("judges cannot do that".into()), StatusCode::FORBIDDEN),
        ];

        for (error, expected) in cases {
            assert_eq!(error.status_code(), expected, "{error}");
        }
    }

    #[tokio::test]
    async fn test_registration_report_is_returned_as_details() {
        let report = RegistrationReport {
            issues: vec![RegistrationIssue::TooFewAthletes { count: 2, min: 3 }],
        };

        let (status, body) = body_json(StorageError::RegistrationIncomplete(report).into()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"][0]["code"], "too_few_athletes");
    }

    #[tokio::test]
    async fn test_internal_errors_are_not_leaked() {
        let (status, body) = body_json(WebError::from(StorageError::Database(
            sqlx::Error::Protocol("password authentication failed".into()),
        )))
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "An internal error occurred");
    }

    #[tokio::test]
    async fn test_transition_message_in_body() {
        let (_, body) = body_json(StorageError::from(TransitionError::RegistrationClosed).into()).await;
        assert_eq!(body["error"], "event is not open for registration");
    }
}
