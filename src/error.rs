// Error types and their HTTP responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::path::PathBuf;

// Failures while loading a CSV file from the store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("CSV file not found: {}", .path.display())]
    Missing { path: PathBuf },
    #[error("Error reading {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

// Route-level application error
#[derive(Debug)]
pub enum AppError {
    InternalServerError(anyhow::Error),
    NotFound(String), // Message is returned as the plain-text body
    ExportFailed(anyhow::Error),
}

// Implement conversion from anyhow::Error for easier error propagation
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::InternalServerError(error)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InternalServerError(e) => {
                tracing::error!("Internal server error: {:?}", e);
                // Don't expose internal details to the client
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
            AppError::NotFound(message) => {
                tracing::warn!("Not found: {}", message);
                (StatusCode::NOT_FOUND, message)
            }
            AppError::ExportFailed(e) => {
                tracing::error!("Export failed: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Error exporting file.".to_string())
            }
        };

        (status, error_message).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
