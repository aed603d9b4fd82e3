//! Tours Router

use auth::domain::UserRepository;
use auth::{AuthGuard, UserRole};
use axum::Router;
use axum::routing::{get, patch, post};

use crate::domain::repository::TourRepository;
use crate::presentation::handlers::{self, ToursAppState};

/// Roles allowed to create, change and delete tours
pub const TOUR_MANAGERS: &[UserRole] = &[UserRole::Admin, UserRole::LeadGuide];

/// Routes under `/api/v1/tours`. Reads are public, writes go through `guard`.
pub fn tours_router<T, R>(state: ToursAppState<T>, guard: AuthGuard<R>) -> Router
where
    T: TourRepository + Sync + 'static,
    R: UserRepository + Sync + 'static,
{
    Router::new()
        .route("/top-5-cheap", get(handlers::top_five_cheap::<T>))
        .route("/tour-stats", get(handlers::tour_stats::<T>))
        .route("/monthly-plan/{year}", get(handlers::monthly_plan::<T>))
        .route(
            "/",
            get(handlers::list_tours::<T>).merge(
                guard.restrict(post(handlers::create_tour::<T>), TOUR_MANAGERS),
            ),
        )
        .route(
            "/{id}",
            get(handlers::get_tour::<T>).merge(guard.restrict(
                patch(handlers::update_tour::<T>)
                    .delete(handlers::delete_tour::<T>),
                TOUR_MANAGERS,
            )),
        )
        .with_state(state)
}
