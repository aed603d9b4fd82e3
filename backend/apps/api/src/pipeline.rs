//! Centralized error pipeline
//!
//! Handlers render errors in the production shape and attach an
//! [`ErrorReport`]. In development the pipeline swaps the body for the
//! detailed shape; unmatched routes end up here as 404s. Error responses
//! produced by the framework itself carry no report and are wrapped in
//! the usual envelope first.

use axum::extract::{OriginalUri, State};
use axum::response::{IntoResponse, Response};
use kernel::error::app_error::AppError;
use kernel::error::kind::ErrorKind;
use kernel::error::response::ErrorReport;

use crate::config::AppEnv;

/// Response mapper installed with `map_response_with_state`.
pub async fn render_errors(State(env): State<AppEnv>, response: Response) -> Response {
    let report = response.extensions().get::<ErrorReport>().cloned();
    let report = match report {
        Some(report) => report,
        None => match ErrorKind::from_status(response.status().as_u16()) {
            Some(kind) => return wrap_bare_error(env, kind),
            None => return response,
        },
    };
    if env.is_development() {
        report.into_development_response()
    } else {
        response
    }
}

fn wrap_bare_error(env: AppEnv, kind: ErrorKind) -> Response {
    let response = AppError::new(kind, kind.as_str()).into_response();
    if !env.is_development() {
        return response;
    }
    match response.extensions().get::<ErrorReport>().cloned() {
        Some(report) => report.into_development_response(),
        None => response,
    }
}

/// Fallback for every unmatched route
pub async fn not_found(OriginalUri(uri): OriginalUri) -> AppError {
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    AppError::not_found(format!("Can't find {target} on this server"))
}
