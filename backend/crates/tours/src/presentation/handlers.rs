//! HTTP Handlers

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use kernel::envelope::{DataEnvelope, ListEnvelope};
use kernel::error::app_error::AppError;
use kernel::extract::{ApiJson, ApiQuery, RequestedAt};
use kernel::id::TourId;
use kernel::query::{QueryTranslator, ResourceDefaults};

use crate::application::{
    CreateTourUseCase, DeleteTourUseCase, GetTourUseCase, ListToursUseCase, MonthlyPlanUseCase,
    TourStatsUseCase, UpdateTourUseCase,
};
use crate::domain::repository::TourRepository;
use crate::error::TourResult;
use crate::presentation::dto::{
    CreateTourRequest, PlanData, StatsData, TourData, ToursData, UpdateTourRequest,
};

/// Fields hidden from listings unless asked for
pub const HIDDEN_FIELDS: [&str; 1] = ["secretTour"];

/// Query of the `top-5-cheap` alias
const TOP_FIVE_CHEAP: [(&str, &str); 2] = [("limit", "5"), ("sort", "-ratingsAverage,price")];

/// Shared state for tour handlers
pub struct ToursAppState<T> {
    pub repo: Arc<T>,
}

// Manual impl: a derive would require `T: Clone`.
impl<T> Clone for ToursAppState<T> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
        }
    }
}

impl<T> ToursAppState<T>
where
    T: TourRepository + Sync + 'static,
{
    pub fn new(repo: T) -> Self {
        Self {
            repo: Arc::new(repo),
        }
    }
}

fn translator() -> QueryTranslator {
    QueryTranslator::new(ResourceDefaults::default().excluding(HIDDEN_FIELDS))
}

/// Replace `limit` and `sort` with the alias values, keep everything else.
fn with_alias(mut pairs: Vec<(String, String)>, alias: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs.retain(|(key, _)| !alias.iter().any(|(k, _)| k == key));
    pairs.extend(alias.iter().map(|(k, v)| (k.to_string(), v.to_string())));
    pairs
}

async fn list<T>(
    state: &ToursAppState<T>,
    requested_at: chrono::DateTime<chrono::Utc>,
    pairs: &[(String, String)],
) -> TourResult<ApiJson<ListEnvelope<ToursData>>>
where
    T: TourRepository + Sync + 'static,
{
    let query = translator().translate(pairs)?;
    let page = ListToursUseCase::new(state.repo.clone()).execute(&query).await?;

    let tours = page
        .items
        .iter()
        .map(|tour| -> Result<serde_json::Value, serde_json::Error> {
            let mut document = serde_json::to_value(tour.view())?;
            query.projection.apply(&mut document);
            Ok(document)
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(AppError::from)?;

    Ok(ApiJson(ListEnvelope::success(
        requested_at,
        tours.len(),
        page.meta,
        ToursData { tours },
    )))
}

/// GET /api/v1/tours
pub async fn list_tours<T>(
    State(state): State<ToursAppState<T>>,
    RequestedAt(requested_at): RequestedAt,
    ApiQuery(pairs): ApiQuery<Vec<(String, String)>>,
) -> TourResult<ApiJson<ListEnvelope<ToursData>>>
where
    T: TourRepository + Sync + 'static,
{
    list(&state, requested_at, &pairs).await
}

/// GET /api/v1/tours/top-5-cheap
pub async fn top_five_cheap<T>(
    State(state): State<ToursAppState<T>>,
    RequestedAt(requested_at): RequestedAt,
    ApiQuery(pairs): ApiQuery<Vec<(String, String)>>,
) -> TourResult<ApiJson<ListEnvelope<ToursData>>>
where
    T: TourRepository + Sync + 'static,
{
    list(&state, requested_at, &with_alias(pairs, &TOP_FIVE_CHEAP)).await
}

/// GET /api/v1/tours/tour-stats
pub async fn tour_stats<T>(
    State(state): State<ToursAppState<T>>,
) -> TourResult<ApiJson<DataEnvelope<StatsData>>>
where
    T: TourRepository + Sync + 'static,
{
    let stats = TourStatsUseCase::new(state.repo.clone()).execute().await?;
    Ok(ApiJson(DataEnvelope::success(StatsData { stats })))
}

/// GET /api/v1/tours/monthly-plan/{year}
pub async fn monthly_plan<T>(
    State(state): State<ToursAppState<T>>,
    Path(year): Path<String>,
) -> TourResult<ApiJson<DataEnvelope<PlanData>>>
where
    T: TourRepository + Sync + 'static,
{
    let plan = MonthlyPlanUseCase::new(state.repo.clone()).execute(&year).await?;
    Ok(ApiJson(DataEnvelope::success(PlanData { plan })))
}

/// POST /api/v1/tours
pub async fn create_tour<T>(
    State(state): State<ToursAppState<T>>,
    ApiJson(req): ApiJson<CreateTourRequest>,
) -> TourResult<impl IntoResponse>
where
    T: TourRepository + Sync + 'static,
{
    let tour = CreateTourUseCase::new(state.repo.clone())
        .execute(req.into())
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiJson(DataEnvelope::success(TourData { tour: tour.view() })),
    ))
}

/// GET /api/v1/tours/{id}
pub async fn get_tour<T>(
    State(state): State<ToursAppState<T>>,
    Path(id): Path<String>,
) -> TourResult<ApiJson<DataEnvelope<TourData>>>
where
    T: TourRepository + Sync + 'static,
{
    let id = TourId::parse(&id)?;
    let tour = GetTourUseCase::new(state.repo.clone()).execute(&id).await?;
    Ok(ApiJson(DataEnvelope::success(TourData { tour: tour.view() })))
}

/// PATCH /api/v1/tours/{id}
pub async fn update_tour<T>(
    State(state): State<ToursAppState<T>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateTourRequest>,
) -> TourResult<ApiJson<DataEnvelope<TourData>>>
where
    T: TourRepository + Sync + 'static,
{
    let id = TourId::parse(&id)?;
    let tour = UpdateTourUseCase::new(state.repo.clone())
        .execute(&id, req.into())
        .await?;
    Ok(ApiJson(DataEnvelope::success(TourData { tour: tour.view() })))
}

/// DELETE /api/v1/tours/{id}
pub async fn delete_tour<T>(
    State(state): State<ToursAppState<T>>,
    Path(id): Path<String>,
) -> TourResult<StatusCode>
where
    T: TourRepository + Sync + 'static,
{
    let id = TourId::parse(&id)?;
    DeleteTourUseCase::new(state.repo.clone()).execute(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
