//! HTTP rendering of [`AppError`] (feature `axum`)
//!
//! Every error leaves a handler rendered in the production shape, with an
//! [`ErrorReport`] attached to the response extensions. The application's
//! error pipeline may swap the body for the development shape using that
//! report; nothing else needs to know which mode the server runs in.
//!
//! Production shapes:
//! - operational: `{ "status": "fail", "message": "..." }`
//! - unexpected:  `{ "status": "error", "message": "An unexpected error occurred...", "supportId": "x7Gk2P" }`

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use nid::Nanoid;
use nid::alphabet::Base62Alphabet;
use serde_json::{Value, json};

use super::app_error::AppError;
use super::kind::ErrorKind;

/// Client-facing message for non-operational errors.
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again later.";

/// Length of the support id handed to clients for unexpected errors.
pub const SUPPORT_ID_LENGTH: usize = 6;

/// Generate a short alphanumeric correlation id, e.g. `x7Gk2P`.
pub fn generate_support_id() -> String {
    Nanoid::<SUPPORT_ID_LENGTH, Base62Alphabet>::new().to_string()
}

/// Everything the pipeline needs to re-render an error.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
    pub action: Option<String>,
    pub operational: bool,
    pub source_chain: Vec<String>,
    pub debug: String,
    pub support_id: Option<String>,
}

impl ErrorReport {
    fn from_error(err: &AppError, support_id: Option<String>) -> Self {
        Self {
            kind: err.kind(),
            message: err.message().to_string(),
            action: err.action().map(str::to_string),
            operational: err.is_operational(),
            source_chain: err.source_chain(),
            debug: format!("{err:?}"),
            support_id,
        }
    }

    /// Body returned outside development.
    pub fn production_body(&self) -> Value {
        if self.operational {
            let mut body = json!({
                "status": self.kind.envelope_status(),
                "message": self.message,
            });
            if let Some(action) = &self.action {
                body["action"] = json!(action);
            }
            body
        } else {
            json!({
                "status": "error",
                "message": GENERIC_ERROR_MESSAGE,
                "supportId": self.support_id,
            })
        }
    }

    /// Body returned in development: full message plus the cause chain.
    pub fn development_body(&self) -> Value {
        json!({
            "status": self.kind.envelope_status(),
            "message": self.message,
            "stack": self.source_chain,
            "error": {
                "kind": self.kind,
                "statusCode": self.kind.status_code(),
                "isOperational": self.operational,
                "action": self.action,
                "supportId": self.support_id,
                "debug": self.debug,
            },
        })
    }

    fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.kind.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Rebuild the response in the development shape, keeping the report.
    pub fn into_development_response(self) -> Response {
        let mut response = (self.status(), Json(self.development_body())).into_response();
        response.extensions_mut().insert(self);
        response
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let support_id = (!self.is_operational()).then(generate_support_id);

        match &support_id {
            Some(id) => tracing::error!(
                support_id = %id,
                kind = %self.kind(),
                error = %self,
                source_chain = ?self.source_chain(),
                "Unexpected error"
            ),
            None if self.is_server_error() => {
                tracing::warn!(error = %self, "Operational server error")
            }
            None => tracing::debug!(error = %self, "Request failed"),
        }

        let report = ErrorReport::from_error(&self, support_id);
        let mut response = (report.status(), Json(report.production_body())).into_response();
        response.extensions_mut().insert(report);
        response
    }
}
