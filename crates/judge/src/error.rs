use thiserror::Error;

pub type Result<T> = std::result::Result<T, JudgeError>;

#[derive(Error, Debug)]
pub enum JudgeError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Failed to parse JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Outbox I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("API responded {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl JudgeError {
    /// Transport failures, server errors and throttling may succeed later.
    /// Anything else the API said no to will be refused again.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RequestError(e) => !e.is_builder() && !e.is_decode(),
            Self::ApiError { status, .. } => *status >= 500 || *status == 429,
            Self::ParseError(_) | Self::IoError(_) | Self::ValidationError(_) => false,
        }
    }

    /// The API refused the key, not the result.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::ApiError { status: 401 | 403, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16) -> JudgeError {
        JudgeError::ApiError {
            status,
            message: "nope".to_string(),
        }
    }

    #[test]
    fn test_server_errors_are_retryable() {
        assert!(api(500).is_retryable());
        assert!(api(503).is_retryable());
        assert!(api(429).is_retryable());
    }

    #[test]
    fn test_client_errors_are_terminal() {
        assert!(!api(400).is_retryable());
        assert!(!api(404).is_retryable());
        assert!(!api(409).is_retryable());
        assert!(!JudgeError::ValidationError("value".to_string()).is_retryable());
    }

    #[test]
    fn test_auth_failures_are_recognised() {
        assert!(api(401).is_auth_failure());
        assert!(api(403).is_auth_failure());
        assert!(!api(400).is_auth_failure());
        assert!(!api(503).is_auth_failure());
        assert!(!api(401).is_retryable());
    }
}
