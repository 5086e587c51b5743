use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error; // Use thiserror for cleaner error definitions
use uuid::Uuid;

// --- Store-layer errors ---

#[derive(Error, Debug)]
pub enum RepoError {
    #[error("Store backend error: {0}")]
    BackendError(#[from] anyhow::Error), // Wrap anyhow errors from the backend

    #[error("Stored data could not be parsed: {0}")]
    DataCorruption(String),
}

// --- Web Layer Error ---

#[derive(Error, Debug)]
pub enum AppError {
    // Input validation / request parsing errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid meme ID format: {0}")]
    InvalidId(#[from] uuid::Error),

    // Domain level errors (mapped from RepoError)
    #[error("Meme not found with ID: {0}")]
    MemeNotFound(Uuid),
    #[error("Could not access meme store")]
    RepositoryError(#[source] RepoError), // Source allows seeing underlying RepoError

    // Configuration / Startup errors
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Initialization error: {0}")]
    InitError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    // Generic Internal Server Error
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

// --- Conversions from Domain Errors to AppError ---

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        AppError::RepositoryError(err)
    }
}

impl From<crate::config::ConfigError> for AppError {
    fn from(err: crate::config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

// --- Axum Response Implementation ---

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            // 4xx Client Errors
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::InvalidId(e) => {
                (StatusCode::BAD_REQUEST, format!("Invalid ID format: {}", e))
            }
            AppError::MemeNotFound(id) => {
                (StatusCode::NOT_FOUND, format!("Meme not found with ID: {}", id))
            }

            // 5xx Server Errors: log the cause, never leak it to the client
            AppError::RepositoryError(e) => {
                tracing::error!(error.source = ?e, "Repository error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, "Store operation failed".to_string())
            }
            AppError::ConfigError(msg) => {
                tracing::error!("Configuration error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server configuration error".to_string())
            }
            AppError::InitError(msg) => {
                tracing::error!("Initialization error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server initialization error".to_string())
            }
            AppError::Io(e) => {
                tracing::error!("I/O error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "An internal server error occurred".to_string())
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal server error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "An internal server error occurred".to_string())
            }
        };

        tracing::error!(error.message=%error_message, error.detail=%self, "Responding with error");

        // All error bodies share the {"error": <message>} shape
        let body = Json(serde_json::json!({ "error": error_message }));
        (status, body).into_response()
    }
}
