//! Aggregations over visible tours
//!
//! The PostgreSQL store computes these in SQL; the functions here are the
//! in-process equivalent used by the in-memory store.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::domain::entity::tour::Tour;

/// Ratings threshold of the stats endpoint
pub const STATS_MIN_RATING: f64 = 4.5;

/// Entries in a monthly plan (one per month at most)
pub const MONTHLY_PLAN_LIMIT: usize = 12;

/// Per-difficulty summary, difficulty upper-cased
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyStats {
    pub difficulty: String,
    pub num_tours: u64,
    pub num_ratings: i64,
    pub avg_rating: f64,
    pub avg_price: f64,
    pub min_price: f64,
    pub max_price: f64,
}

/// Tours starting in one month of a year
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPlan {
    /// 1-12
    pub month: u32,
    pub num_tour_starts: u64,
    /// One entry per start date, so a tour may appear twice
    pub tours: Vec<String>,
}

/// First instant of `year` and of the year after, or `None` when out of range.
pub fn year_bounds(year: i32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let end = NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?;
    Some((start, end))
}

/// Sorted by average price, cheapest first.
pub fn difficulty_stats<'a>(
    tours: impl IntoIterator<Item = &'a Tour>,
    min_rating: f64,
) -> Vec<DifficultyStats> {
    let mut groups: BTreeMap<String, Vec<&Tour>> = BTreeMap::new();
    for tour in tours {
        if !tour.secret_tour && tour.ratings_average >= min_rating {
            groups
                .entry(tour.difficulty.code().to_uppercase())
                .or_default()
                .push(tour);
        }
    }

    let mut stats: Vec<DifficultyStats> = groups
        .into_iter()
        .map(|(difficulty, tours)| {
            let count = tours.len() as f64;
            let prices = tours.iter().map(|t| t.price);
            DifficultyStats {
                difficulty,
                num_tours: tours.len() as u64,
                num_ratings: tours.iter().map(|t| i64::from(t.ratings_quantity)).sum(),
                avg_rating: tours.iter().map(|t| t.ratings_average).sum::<f64>() / count,
                avg_price: prices.clone().sum::<f64>() / count,
                min_price: prices.clone().fold(f64::INFINITY, f64::min),
                max_price: prices.fold(f64::NEG_INFINITY, f64::max),
            }
        })
        .collect();

    stats.sort_by(|a, b| a.avg_price.total_cmp(&b.avg_price));
    stats
}

/// Busiest months first, then by month; at most twelve entries.
pub fn monthly_plan<'a>(tours: impl IntoIterator<Item = &'a Tour>, year: i32) -> Vec<MonthlyPlan> {
    let mut months: BTreeMap<u32, Vec<String>> = BTreeMap::new();
    for tour in tours {
        if tour.secret_tour {
            continue;
        }
        for start in &tour.start_dates {
            if start.year() == year {
                months
                    .entry(start.month())
                    .or_default()
                    .push(tour.name.as_str().to_string());
            }
        }
    }

    let mut plan: Vec<MonthlyPlan> = months
        .into_iter()
        .map(|(month, mut tours)| {
            tours.sort();
            MonthlyPlan {
                month,
                num_tour_starts: tours.len() as u64,
                tours,
            }
        })
        .collect();

    plan.sort_by(|a, b| {
        b.num_tour_starts
            .cmp(&a.num_tour_starts)
            .then(a.month.cmp(&b.month))
    });
    plan.truncate(MONTHLY_PLAN_LIMIT);
    plan
}
