//! In-memory tour store
//!
//! Same contract as the PostgreSQL store: unique name and slug, secret
//! tours hidden, query semantics through `kernel::query::document`.

use std::collections::HashMap;
use std::sync::Arc;

use kernel::error::app_error::AppError;
use kernel::id::TourId;
use kernel::query::ListQuery;
use kernel::query::document::DocumentSchema;
use tokio::sync::RwLock;

use crate::domain::entity::tour::Tour;
use crate::domain::repository::TourRepository;
use crate::domain::stats::{self, DifficultyStats, MonthlyPlan};
use crate::error::{TourError, TourResult};

/// Queryable fields of a tour (the serialized view)
pub const TOUR_SCHEMA: DocumentSchema = DocumentSchema {
    fields: &[
        "id",
        "name",
        "slug",
        "duration",
        "maxGroupSize",
        "difficulty",
        "ratingsAverage",
        "ratingsQuantity",
        "price",
        "priceDiscount",
        "summary",
        "description",
        "imageCover",
        "createdAt",
        "updatedAt",
    ],
    search: &[("name", 10), ("description", 5)],
};

#[derive(Clone, Default)]
pub struct InMemoryTourRepository {
    tours: Arc<RwLock<HashMap<TourId, Tour>>>,
}

impl InMemoryTourRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_unique(tours: &HashMap<TourId, Tour>, candidate: &Tour) -> TourResult<()> {
        for other in tours.values().filter(|t| t.id != candidate.id) {
            if other.name == candidate.name {
                return Err(duplicate("name", candidate.name.as_str()));
            }
            if other.slug == candidate.slug {
                return Err(duplicate("slug", &candidate.slug));
            }
        }
        Ok(())
    }

    async fn run(&self, query: &ListQuery) -> TourResult<(Vec<Tour>, u64)> {
        let tours = self.tours.read().await;
        let documents = tours
            .values()
            .filter(|tour| !tour.secret_tour)
            .map(|tour| {
                serde_json::to_value(tour.view())
                    .map(|doc| (tour.clone(), doc))
                    .map_err(AppError::from)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let (page, total) = TOUR_SCHEMA.run(documents, query)?;
        Ok((page.into_iter().map(|(tour, _)| tour).collect(), total))
    }
}

fn duplicate(field: &str, value: &str) -> TourError {
    TourError::App(AppError::conflict(format!(
        "Duplicate field: {field}: \"{value}\". Please use another value."
    )))
}

impl TourRepository for InMemoryTourRepository {
    async fn create(&self, tour: &Tour) -> TourResult<()> {
        let mut tours = self.tours.write().await;
        Self::check_unique(&tours, tour)?;
        tours.insert(tour.id, tour.clone());
        Ok(())
    }

    async fn create_many(&self, batch: &[Tour]) -> TourResult<()> {
        let mut tours = self.tours.write().await;
        let mut staged = tours.clone();
        for tour in batch {
            Self::check_unique(&staged, tour)?;
            staged.insert(tour.id, tour.clone());
        }
        *tours = staged;
        Ok(())
    }

    async fn find_by_id(&self, id: &TourId) -> TourResult<Option<Tour>> {
        let tours = self.tours.read().await;
        Ok(tours.get(id).filter(|t| !t.secret_tour).cloned())
    }

    async fn update(&self, tour: &Tour) -> TourResult<()> {
        let mut tours = self.tours.write().await;
        match tours.get(&tour.id) {
            Some(current) if !current.secret_tour => {}
            _ => return Err(TourError::TourNotFound),
        }
        Self::check_unique(&tours, tour)?;
        tours.insert(tour.id, tour.clone());
        Ok(())
    }

    async fn delete(&self, id: &TourId) -> TourResult<bool> {
        let mut tours = self.tours.write().await;
        if tours.get(id).is_some_and(|t| !t.secret_tour) {
            tours.remove(id);
            return Ok(true);
        }
        Ok(false)
    }

    async fn delete_all(&self) -> TourResult<u64> {
        let mut tours = self.tours.write().await;
        let removed = tours.len() as u64;
        tours.clear();
        Ok(removed)
    }

    async fn find_page(&self, query: &ListQuery) -> TourResult<Vec<Tour>> {
        self.run(query).await.map(|(page, _)| page)
    }

    async fn count(&self, query: &ListQuery) -> TourResult<u64> {
        self.run(query).await.map(|(_, total)| total)
    }

    async fn difficulty_stats(&self, min_rating: f64) -> TourResult<Vec<DifficultyStats>> {
        let tours = self.tours.read().await;
        Ok(stats::difficulty_stats(tours.values(), min_rating))
    }

    async fn monthly_plan(&self, year: i32) -> TourResult<Vec<MonthlyPlan>> {
        let tours = self.tours.read().await;
        Ok(stats::monthly_plan(tours.values(), year))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::tour::fixtures;
    use kernel::query::{QueryTranslator, ResourceDefaults};

    fn query(pairs: &[(&str, &str)]) -> ListQuery {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        QueryTranslator::new(ResourceDefaults::default().excluding(["secretTour"]))
            .translate(&pairs)
            .unwrap()
    }

    #[tokio::test]
    async fn test_unique_name_and_slug() {
        let repo = InMemoryTourRepository::new();
        repo.create(&fixtures::tour("The Forest Hiker")).await.unwrap();

        let err = repo.create(&fixtures::tour("The Forest Hiker")).await.unwrap_err();
        assert_eq!(
            err.into_app_error().message(),
            "Duplicate field: name: \"The Forest Hiker\". Please use another value."
        );

        let err = repo.create(&fixtures::tour("The Forest Hiker!")).await.unwrap_err();
        assert_eq!(err.into_app_error().status_code(), 409);
    }

    #[tokio::test]
    async fn test_secret_tours_are_invisible() {
        let repo = InMemoryTourRepository::new();
        let mut secret = fixtures::tour("The Secret Place");
        secret.secret_tour = true;
        repo.create(&secret).await.unwrap();
        repo.create(&fixtures::tour("The Forest Hiker")).await.unwrap();

        assert!(repo.find_by_id(&secret.id).await.unwrap().is_none());
        assert!(!repo.delete(&secret.id).await.unwrap());
        assert!(matches!(repo.update(&secret).await, Err(TourError::TourNotFound)));
        assert_eq!(repo.count(&query(&[])).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_many_is_all_or_nothing() {
        let repo = InMemoryTourRepository::new();
        let batch = vec![
            fixtures::tour("The Forest Hiker"),
            fixtures::tour("The Sea Explorer"),
            fixtures::tour("The Forest Hiker"),
        ];
        assert!(repo.create_many(&batch).await.is_err());
        assert_eq!(repo.count(&query(&[])).await.unwrap(), 0);

        repo.create_many(&batch[..2]).await.unwrap();
        assert_eq!(repo.delete_all().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_filter_and_search() {
        let repo = InMemoryTourRepository::new();
        repo.create(&fixtures::tour("The Forest Hiker")).await.unwrap();
        repo.create(&fixtures::tour("The Sea Explorer")).await.unwrap();

        let page = repo
            .find_page(&query(&[("search", "Forest")]))
            .await
            .unwrap();
        assert_eq!(page.len(), 2); // the fixture description mentions a forest too
        assert_eq!(page[0].name.as_str(), "The Forest Hiker");

        let err = repo
            .find_page(&query(&[("duration[gte]", "five")]))
            .await
            .unwrap_err();
        assert_eq!(err.into_app_error().message(), "Invalid duration: five.");
    }
}
