//! API DTOs (Data Transfer Objects)
//!
//! Request fields are optional so that missing fields are reported together
//! by the entity validation (400) rather than as a body parse error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::entity::tour::{TourDraft, TourPatch, TourView};
use crate::domain::stats::{DifficultyStats, MonthlyPlan};

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTourRequest {
    pub name: Option<String>,
    pub duration: Option<i32>,
    pub max_group_size: Option<i32>,
    pub difficulty: Option<String>,
    pub ratings_average: Option<f64>,
    pub ratings_quantity: Option<i32>,
    pub price: Option<f64>,
    pub price_discount: Option<f64>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub image_cover: Option<String>,
    pub images: Option<Vec<String>>,
    pub start_dates: Option<Vec<DateTime<Utc>>>,
    pub secret_tour: Option<bool>,
}

impl From<CreateTourRequest> for TourDraft {
    fn from(req: CreateTourRequest) -> Self {
        TourDraft {
            name: req.name,
            duration: req.duration,
            max_group_size: req.max_group_size,
            difficulty: req.difficulty,
            ratings_average: req.ratings_average,
            ratings_quantity: req.ratings_quantity,
            price: req.price,
            price_discount: req.price_discount,
            summary: req.summary,
            description: req.description,
            image_cover: req.image_cover,
            images: req.images,
            start_dates: req.start_dates,
            secret_tour: req.secret_tour,
        }
    }
}

/// PATCH body. `priceDiscount: null` and `description: null` clear the
/// field; leaving them out keeps it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTourRequest {
    pub name: Option<String>,
    pub duration: Option<i32>,
    pub max_group_size: Option<i32>,
    pub difficulty: Option<String>,
    pub ratings_average: Option<f64>,
    pub ratings_quantity: Option<i32>,
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "present")]
    pub price_discount: Option<Option<f64>>,
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    pub image_cover: Option<String>,
    pub images: Option<Vec<String>>,
    pub start_dates: Option<Vec<DateTime<Utc>>>,
    pub secret_tour: Option<bool>,
}

/// Distinguishes an explicit `null` from an absent key.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl From<UpdateTourRequest> for TourPatch {
    fn from(req: UpdateTourRequest) -> Self {
        TourPatch {
            name: req.name,
            duration: req.duration,
            max_group_size: req.max_group_size,
            difficulty: req.difficulty,
            ratings_average: req.ratings_average,
            ratings_quantity: req.ratings_quantity,
            price: req.price,
            price_discount: req.price_discount,
            summary: req.summary,
            description: req.description,
            image_cover: req.image_cover,
            images: req.images,
            start_dates: req.start_dates,
            secret_tour: req.secret_tour,
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct TourData {
    pub tour: TourView,
}

/// Projected tours
#[derive(Debug, Clone, Serialize)]
pub struct ToursData {
    pub tours: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsData {
    pub stats: Vec<DifficultyStats>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanData {
    pub plan: Vec<MonthlyPlan>,
}
