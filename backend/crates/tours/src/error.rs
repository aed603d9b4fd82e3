//! Tour Error Types
//!
//! This module provides tour-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Tour-specific result type alias
pub type TourResult<T> = Result<T, TourError>;

/// Tour-specific error variants
#[derive(Debug, Error)]
pub enum TourError {
    #[error("No tour found with that ID")]
    TourNotFound,

    /// Field-level validation messages, reported together
    #[error("Invalid input data. {}", .0.join(". "))]
    Validation(Vec<String>),

    #[error("Invalid year: {0}.")]
    InvalidYear(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    App(#[from] AppError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TourError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            TourError::TourNotFound => ErrorKind::NotFound,
            TourError::Validation(_) => ErrorKind::BadRequest,
            TourError::InvalidYear(_) => ErrorKind::BadRequest,
            TourError::Database(_) | TourError::Internal(_) => ErrorKind::InternalServerError,
            TourError::App(err) => err.kind(),
        }
    }

    /// Convert to AppError
    pub fn into_app_error(self) -> AppError {
        match self {
            TourError::App(err) => err,
            TourError::Database(err) => AppError::from(err),
            TourError::Validation(messages) => AppError::validation(messages),
            TourError::Internal(detail) => {
                tracing::error!(detail = %detail, "Tour internal error");
                AppError::internal("Internal error")
            }
            other => AppError::new(other.kind(), other.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            TourError::Database(e) => {
                tracing::error!(error = %e, "Tour database error");
            }
            TourError::Validation(messages) => {
                tracing::debug!(?messages, "Tour rejected");
            }
            _ => {
                tracing::debug!(error = %self, "Tour error");
            }
        }
    }
}

impl IntoResponse for TourError {
    fn into_response(self) -> Response {
        self.log();
        self.into_app_error().into_response()
    }
}
