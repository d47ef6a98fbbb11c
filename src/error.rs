use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum AppError {
    /// The API rejected the session token (HTTP 401).
    #[error("Session expired or invalid, please log in again")]
    Unauthorized,

    /// Resource not found error.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The API answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status returned by the API.
        status: StatusCode,
        /// Message taken from the `error` field of the payload, if any.
        message: String,
    },

    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Local state database error.
    #[error("Database error: {0}")]
    Database(String),

    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input.
    #[error("{0}")]
    InvalidInput(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error must end the local session.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, AppError::Unauthorized)
    }

    /// Message shown to the user when an action fails.
    ///
    /// API payload messages win; anything else collapses to `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            AppError::Api { message, .. } if !message.is_empty() => message.clone(),
            AppError::InvalidInput(message) => message.clone(),
            AppError::Unauthorized => self.to_string(),
            _ => fallback.to_string(),
        }
    }

    /// Turn a failed action into the error the user sees.
    ///
    /// Auth rejections pass through untouched so the caller can log out.
    pub fn for_user(self, fallback: &str) -> AppError {
        if self.is_auth_rejection() {
            return self;
        }
        tracing::debug!(error = %self, "Action failed");
        AppError::InvalidInput(self.user_message(fallback))
    }
}

/// Result type alias for the application.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_prefers_api_payload() {
        let err = AppError::Api {
            status: StatusCode::BAD_REQUEST,
            message: "Already friends".to_string(),
        };
        assert_eq!(err.user_message("Failed to send request"), "Already friends");
    }

    #[test]
    fn user_message_falls_back() {
        let err = AppError::Api {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: String::new(),
        };
        assert_eq!(err.user_message("Failed to upload book"), "Failed to upload book");

        let err = AppError::Database("locked".to_string());
        assert_eq!(err.user_message("Login failed"), "Login failed");
    }

    #[test]
    fn for_user_keeps_auth_rejection() {
        assert!(matches!(
            AppError::Unauthorized.for_user("Failed to accept request"),
            AppError::Unauthorized
        ));

        let err = AppError::Internal("boom".to_string()).for_user("Failed to accept request");
        assert_eq!(err.to_string(), "Failed to accept request");
    }

    #[test]
    fn only_unauthorized_forces_logout() {
        assert!(AppError::Unauthorized.is_auth_rejection());
        assert!(!AppError::NotFound("book".to_string()).is_auth_rejection());
    }
}
