//! Update Tour Use Case
//!
//! The patch is merged into the stored tour before validation, so a change
//! to only `price` or only `priceDiscount` is checked against the other.

use std::sync::Arc;

use kernel::id::TourId;

use crate::domain::entity::tour::{Tour, TourPatch};
use crate::domain::repository::TourRepository;
use crate::error::{TourError, TourResult};

pub struct UpdateTourUseCase<T>
where
    T: TourRepository,
{
    repo: Arc<T>,
}

impl<T> UpdateTourUseCase<T>
where
    T: TourRepository,
{
    pub fn new(repo: Arc<T>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, id: &TourId, patch: TourPatch) -> TourResult<Tour> {
        let mut tour = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(TourError::TourNotFound)?;

        tour.apply(patch).map_err(TourError::Validation)?;
        self.repo.update(&tour).await?;

        tracing::info!(tour_id = %tour.id, "Tour updated");
        Ok(tour)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::Harness;

    #[tokio::test]
    async fn test_rename_regenerates_slug() {
        let h = Harness::new();
        let tour = h.tour("The Forest Hiker").await;

        let updated = h
            .update_tour()
            .execute(
                &tour.id,
                TourPatch {
                    name: Some("The Mountain Hiker".into()),
                    ..TourPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.slug, "the-mountain-hiker");
        assert_eq!(
            h.repo.find_by_id(&tour.id).await.unwrap().unwrap().slug,
            "the-mountain-hiker"
        );
    }

    #[tokio::test]
    async fn test_discount_is_checked_against_stored_price() {
        let h = Harness::new();
        let tour = h.tour("The Forest Hiker").await;

        let err = h
            .update_tour()
            .execute(
                &tour.id,
                TourPatch {
                    price_discount: Some(Some(500.0)),
                    ..TourPatch::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(
            err.into_app_error().message(),
            "Invalid input data. Discount price (500) should be below regular price (397)"
        );

        let stored = h.repo.find_by_id(&tour.id).await.unwrap().unwrap();
        assert_eq!(stored.price_discount, None);
    }

    #[tokio::test]
    async fn test_lowering_price_below_discount_fails() {
        let h = Harness::new();
        let tour = h.tour("The Forest Hiker").await;
        h.update_tour()
            .execute(
                &tour.id,
                TourPatch {
                    price_discount: Some(Some(100.0)),
                    ..TourPatch::default()
                },
            )
            .await
            .unwrap();

        let result = h
            .update_tour()
            .execute(
                &tour.id,
                TourPatch {
                    price: Some(90.0),
                    ..TourPatch::default()
                },
            )
            .await;
        assert!(matches!(result, Err(TourError::Validation(_))));
    }

    #[tokio::test]
    async fn test_missing_tour() {
        let h = Harness::new();
        assert!(matches!(
            h.update_tour().execute(&TourId::new(), TourPatch::default()).await,
            Err(TourError::TourNotFound)
        ));
    }
}
