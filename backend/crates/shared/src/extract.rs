//! Request extractors whose rejections render through [`AppError`] (feature `axum`)
//!
//! axum's own `Json` / `Query` reject with plain-text bodies. These wrappers
//! keep the same parsing but turn every rejection into the JSON envelope:
//! malformed or mistyped bodies are 400, bodies over the configured limit
//! are 413.

use std::convert::Infallible;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::app_error::AppError;

#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

impl<T: Serialize> IntoResponse for ApiJson<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

#[derive(Debug, Clone, Copy, Default, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::payload_too_large("Request body is too large");
        }
        let message = match &rejection {
            JsonRejection::MissingJsonContentType(_) => {
                "Expected request with `Content-Type: application/json`".to_string()
            }
            _ => format!("Invalid JSON body: {}", rejection.body_text()),
        };
        AppError::bad_request(message).with_source(rejection)
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::bad_request(format!("Invalid query string: {}", rejection.body_text()))
            .with_source(rejection)
    }
}

/// When the request reached the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestedAt(pub DateTime<Utc>);

impl<S> FromRequestParts<S> for RequestedAt
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Falls back to now when the stamping middleware is not installed
        Ok(parts
            .extensions
            .get::<RequestedAt>()
            .copied()
            .unwrap_or_else(|| RequestedAt(Utc::now())))
    }
}

/// Middleware recording [`RequestedAt`] in the request extensions.
pub async fn stamp_request_time(mut req: Request, next: Next) -> Response {
    req.extensions_mut().insert(RequestedAt(Utc::now()));
    next.run(req).await
}
