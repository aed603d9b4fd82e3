//! Tour Entity
//!
//! Validation happens when a tour is built from a [`TourDraft`] or changed
//! by a [`TourPatch`]; both report every failing field at once. The slug
//! follows the name and the discount stays below the price.

use chrono::{DateTime, Utc};
use kernel::id::TourId;
use serde::Serialize;

use crate::domain::value_object::{difficulty::Difficulty, tour_name::TourName};

pub const DEFAULT_RATINGS_AVERAGE: f64 = 4.5;
pub const MIN_RATING: f64 = 1.0;
pub const MAX_RATING: f64 = 5.0;

/// Tour entity
#[derive(Debug, Clone, PartialEq)]
pub struct Tour {
    pub id: TourId,
    pub name: TourName,
    /// Derived from `name`
    pub slug: String,
    /// Days
    pub duration: i32,
    pub max_group_size: i32,
    pub difficulty: Difficulty,
    pub ratings_average: f64,
    pub ratings_quantity: i32,
    pub price: f64,
    pub price_discount: Option<f64>,
    pub summary: String,
    pub description: Option<String>,
    pub image_cover: String,
    pub images: Vec<String>,
    pub start_dates: Vec<DateTime<Utc>>,
    /// Hidden from every read and aggregation
    pub secret_tour: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields of a new tour as submitted
#[derive(Debug, Clone, Default)]
pub struct TourDraft {
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

/// Partial update. `None` leaves a field alone; for the two optional
/// fields `Some(None)` clears them.
#[derive(Debug, Clone, Default)]
pub struct TourPatch {
    pub name: Option<String>,
    pub duration: Option<i32>,
    pub max_group_size: Option<i32>,
    pub difficulty: Option<String>,
    pub ratings_average: Option<f64>,
    pub ratings_quantity: Option<i32>,
    pub price: Option<f64>,
    pub price_discount: Option<Option<f64>>,
    pub summary: Option<String>,
    pub description: Option<Option<String>>,
    pub image_cover: Option<String>,
    pub images: Option<Vec<String>>,
    pub start_dates: Option<Vec<DateTime<Utc>>>,
    pub secret_tour: Option<bool>,
}

impl Tour {
    /// Validate a draft, applying defaults.
    pub fn create(draft: TourDraft) -> Result<Self, Vec<String>> {
        let mut errors = Errors::default();

        let name = errors.take(TourName::new(draft.name.unwrap_or_default()));
        let duration = errors.take(validate_duration(draft.duration));
        let max_group_size = errors.take(validate_group_size(draft.max_group_size));
        let difficulty = errors.take(Difficulty::parse(draft.difficulty.as_deref().unwrap_or_default()));
        let ratings_average = errors.take(validate_rating(
            draft.ratings_average.unwrap_or(DEFAULT_RATINGS_AVERAGE),
        ));
        let ratings_quantity = errors.take(validate_ratings_quantity(draft.ratings_quantity.unwrap_or(0)));
        let price = errors.take(validate_price(draft.price));
        let summary = errors.take(required_text(draft.summary, SUMMARY_MISSING));
        let image_cover = errors.take(required_text(draft.image_cover, IMAGE_COVER_MISSING));

        if let (Some(price), Some(discount)) = (price, draft.price_discount) {
            if discount >= price {
                errors.push(format!("Discount price ({discount}) should be below regular price"));
            }
        }

        let (
            Some(name),
            Some(duration),
            Some(max_group_size),
            Some(difficulty),
            Some(ratings_average),
            Some(ratings_quantity),
            Some(price),
            Some(summary),
            Some(image_cover),
        ) = (
            name,
            duration,
            max_group_size,
            difficulty,
            ratings_average,
            ratings_quantity,
            price,
            summary,
            image_cover,
        )
        else {
            return Err(errors.into_inner());
        };
        errors.finish()?;

        let now = Utc::now();
        Ok(Self {
            id: TourId::new(),
            slug: name.slug(),
            name,
            duration,
            max_group_size,
            difficulty,
            ratings_average,
            ratings_quantity,
            price,
            price_discount: draft.price_discount,
            summary,
            description: optional_text(draft.description),
            image_cover,
            images: draft.images.unwrap_or_default(),
            start_dates: draft.start_dates.unwrap_or_default(),
            secret_tour: draft.secret_tour.unwrap_or(false),
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a patch. On error the tour is left unchanged.
    ///
    /// When only one of `price` / `priceDiscount` is supplied, the current
    /// value of the other is used for the comparison.
    pub fn apply(&mut self, patch: TourPatch) -> Result<(), Vec<String>> {
        let mut errors = Errors::default();
        let mut next = self.clone();

        if let Some(raw) = patch.name {
            if let Some(name) = errors.take(TourName::new(raw)) {
                next.slug = name.slug();
                next.name = name;
            }
        }
        if let Some(duration) = patch.duration {
            next.duration = errors.take(validate_duration(Some(duration))).unwrap_or(next.duration);
        }
        if let Some(size) = patch.max_group_size {
            next.max_group_size = errors
                .take(validate_group_size(Some(size)))
                .unwrap_or(next.max_group_size);
        }
        if let Some(raw) = patch.difficulty {
            next.difficulty = errors.take(Difficulty::parse(&raw)).unwrap_or(next.difficulty);
        }
        if let Some(rating) = patch.ratings_average {
            next.ratings_average = errors.take(validate_rating(rating)).unwrap_or(next.ratings_average);
        }
        if let Some(quantity) = patch.ratings_quantity {
            next.ratings_quantity = errors
                .take(validate_ratings_quantity(quantity))
                .unwrap_or(next.ratings_quantity);
        }

        let price_touched = patch.price.is_some() || patch.price_discount.is_some();
        let mut price_valid = true;
        if let Some(price) = patch.price {
            match validate_price(Some(price)) {
                Ok(price) => next.price = price,
                Err(e) => {
                    errors.push(e);
                    price_valid = false;
                }
            }
        }
        if let Some(discount) = patch.price_discount {
            next.price_discount = discount;
        }
        if price_touched && price_valid {
            if let Some(discount) = next.price_discount {
                if discount >= next.price {
                    errors.push(format!(
                        "Discount price ({discount}) should be below regular price ({})",
                        next.price
                    ));
                }
            }
        }

        if let Some(raw) = patch.summary {
            next.summary = errors.take(required_text(Some(raw), SUMMARY_MISSING)).unwrap_or(next.summary);
        }
        if let Some(description) = patch.description {
            next.description = optional_text(description);
        }
        if let Some(raw) = patch.image_cover {
            next.image_cover = errors
                .take(required_text(Some(raw), IMAGE_COVER_MISSING))
                .unwrap_or(next.image_cover);
        }
        if let Some(images) = patch.images {
            next.images = images;
        }
        if let Some(start_dates) = patch.start_dates {
            next.start_dates = start_dates;
        }
        if let Some(secret) = patch.secret_tour {
            next.secret_tour = secret;
        }

        errors.finish()?;
        next.updated_at = Utc::now();
        *self = next;
        Ok(())
    }

    /// `duration / 7`, two decimals
    pub fn duration_in_weeks(&self) -> f64 {
        (f64::from(self.duration) / 7.0 * 100.0).round() / 100.0
    }

    pub fn view(&self) -> TourView {
        TourView {
            id: self.id,
            name: self.name.as_str().to_string(),
            slug: self.slug.clone(),
            duration: self.duration,
            max_group_size: self.max_group_size,
            difficulty: self.difficulty,
            ratings_average: self.ratings_average,
            ratings_quantity: self.ratings_quantity,
            price: self.price,
            price_discount: self.price_discount,
            summary: self.summary.clone(),
            description: self.description.clone(),
            image_cover: self.image_cover.clone(),
            images: self.images.clone(),
            start_dates: self.start_dates.clone(),
            secret_tour: self.secret_tour,
            created_at: self.created_at,
            updated_at: self.updated_at,
            duration_in_weeks: self.duration_in_weeks(),
        }
    }
}

/// Serialized tour, including derived fields
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TourView {
    pub id: TourId,
    pub name: String,
    pub slug: String,
    pub duration: i32,
    pub max_group_size: i32,
    pub difficulty: Difficulty,
    pub ratings_average: f64,
    pub ratings_quantity: i32,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_discount: Option<f64>,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub image_cover: String,
    pub images: Vec<String>,
    pub start_dates: Vec<DateTime<Utc>>,
    pub secret_tour: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub duration_in_weeks: f64,
}

// ============================================================================
// Field rules
// ============================================================================

const SUMMARY_MISSING: &str = "A tour must have a summary";
const IMAGE_COVER_MISSING: &str = "A tour must have a cover image";

#[derive(Default)]
struct Errors(Vec<String>);

impl Errors {
    fn take<T, E: Into<String>>(&mut self, result: Result<T, E>) -> Option<T> {
        result.map_err(|e| self.0.push(e.into())).ok()
    }

    fn push(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    fn finish(self) -> Result<(), Vec<String>> {
        if self.0.is_empty() { Ok(()) } else { Err(self.0) }
    }

    fn into_inner(self) -> Vec<String> {
        self.0
    }
}

fn validate_duration(value: Option<i32>) -> Result<i32, &'static str> {
    match value {
        None => Err("A tour must have a duration"),
        Some(days) if days < 1 => Err("Duration must be at least 1 day"),
        Some(days) => Ok(days),
    }
}

fn validate_group_size(value: Option<i32>) -> Result<i32, &'static str> {
    match value {
        None => Err("A tour must have a group size"),
        Some(size) if size < 1 => Err("Group size must be at least 1 person"),
        Some(size) => Ok(size),
    }
}

/// Rounded to one decimal before the bounds are checked, so 4.666 is 4.7.
fn validate_rating(value: f64) -> Result<f64, &'static str> {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded < MIN_RATING {
        Err("Rating must be above 1.0")
    } else if rounded > MAX_RATING {
        Err("Rating must be below 5.0")
    } else {
        Ok(rounded)
    }
}

fn validate_ratings_quantity(value: i32) -> Result<i32, &'static str> {
    if value < 0 {
        Err("Ratings quantity cannot be negative")
    } else {
        Ok(value)
    }
}

fn validate_price(value: Option<f64>) -> Result<f64, &'static str> {
    match value {
        None => Err("A tour must have a price"),
        Some(price) if price < 1.0 => Err("Price should be at least 1"),
        Some(price) => Ok(price),
    }
}

fn required_text(value: Option<String>, missing: &'static str) -> Result<String, &'static str> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(missing)
}

fn optional_text(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
