//! Natours API server
//!
//! Composes the tours, auth and users routers under `/api/v1` with the
//! shared middleware stack. `main.rs` wires PostgreSQL and the mailer;
//! the integration tests wire the in-memory adapters.

pub mod config;
pub mod pipeline;

use auth::domain::{EmailClient, UserRepository};
use auth::{AuthAppState, auth_router, users_router};
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{HeaderValue, Method, header};
use axum::middleware::{from_fn, map_response_with_state};
use axum::Router;
use axum::routing::get;
use chrono::{DateTime, Utc};
use kernel::envelope::SUCCESS;
use kernel::extract::{ApiJson, stamp_request_time};
use serde::Serialize;
use tours::{TourRepository, ToursAppState, tours_router};
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::HttpConfig;

pub const API_PREFIX: &str = "/api/v1";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Health {
    status: &'static str,
    started_at: DateTime<Utc>,
    message: &'static str,
}

/// GET /health
async fn health(State(started_at): State<DateTime<Utc>>) -> ApiJson<Health> {
    ApiJson(Health {
        status: SUCCESS,
        started_at,
        message: "Natours API is up and running",
    })
}

fn cors(origins: &[String]) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true)
}

/// The whole HTTP surface
pub fn build_router<T, R, M>(
    http: &HttpConfig,
    tours: ToursAppState<T>,
    auth: AuthAppState<R, M>,
    started_at: DateTime<Utc>,
) -> Router
where
    T: TourRepository + Sync + 'static,
    R: UserRepository + Sync + 'static,
    M: EmailClient + Sync + 'static,
{
    let api = Router::new()
        .nest("/tours", tours_router(tours, auth.guard()))
        .nest("/auth", auth_router(auth.clone()))
        .nest("/users", users_router(auth));

    Router::new()
        .route("/health", get(health))
        .with_state(started_at)
        .nest(API_PREFIX, api)
        .fallback(pipeline::not_found)
        .layer(map_response_with_state(http.env, pipeline::render_errors))
        .layer(DefaultBodyLimit::max(http.body_limit))
        .layer(from_fn(stamp_request_time))
        .layer(TraceLayer::new_for_http())
        .layer(cors(&http.frontend_origins))
}
