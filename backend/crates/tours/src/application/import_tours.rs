//! Import Tours Use Case
//!
//! Bulk load used by the seed binary. Every draft is validated before
//! anything is written and the batch is stored all or nothing.

use std::sync::Arc;

use crate::domain::entity::tour::{Tour, TourDraft};
use crate::domain::repository::TourRepository;
use crate::error::{TourError, TourResult};

pub struct ImportToursUseCase<T>
where
    T: TourRepository,
{
    repo: Arc<T>,
}

impl<T> ImportToursUseCase<T>
where
    T: TourRepository,
{
    pub fn new(repo: Arc<T>) -> Self {
        Self { repo }
    }

    /// Returns the number of stored tours.
    pub async fn execute(&self, drafts: Vec<TourDraft>) -> TourResult<usize> {
        let mut tours = Vec::with_capacity(drafts.len());
        let mut errors = Vec::new();
        for (index, draft) in drafts.into_iter().enumerate() {
            match Tour::create(draft) {
                Ok(tour) => tours.push(tour),
                Err(messages) => errors.extend(
                    messages
                        .into_iter()
                        .map(|m| format!("Tour #{}: {m}", index + 1)),
                ),
            }
        }
        if !errors.is_empty() {
            return Err(TourError::Validation(errors));
        }

        self.repo.create_many(&tours).await?;
        tracing::info!(count = tours.len(), "Tours imported");
        Ok(tours.len())
    }
}

/// Removes every tour. Used by the seed binary.
pub struct DeleteAllToursUseCase<T>
where
    T: TourRepository,
{
    repo: Arc<T>,
}

impl<T> DeleteAllToursUseCase<T>
where
    T: TourRepository,
{
    pub fn new(repo: Arc<T>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self) -> TourResult<u64> {
        let removed = self.repo.delete_all().await?;
        tracing::info!(count = removed, "Tours deleted");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{Harness, tour_query};
    use crate::domain::entity::tour::fixtures;

    #[tokio::test]
    async fn test_import_then_delete_all() {
        let h = Harness::new();
        let imported = h
            .import_tours()
            .execute(vec![
                fixtures::draft("The Forest Hiker"),
                fixtures::draft("The Sea Explorer"),
            ])
            .await
            .unwrap();
        assert_eq!(imported, 2);

        assert_eq!(h.delete_all_tours().execute().await.unwrap(), 2);
        assert_eq!(h.repo.count(&tour_query(&[])).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_one_invalid_draft_stores_nothing() {
        let h = Harness::new();
        let err = h
            .import_tours()
            .execute(vec![
                fixtures::draft("The Forest Hiker"),
                TourDraft {
                    price: None,
                    ..fixtures::draft("The Sea Explorer")
                },
            ])
            .await
            .unwrap_err();

        let TourError::Validation(messages) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(messages, vec!["Tour #2: A tour must have a price".to_string()]);
        assert_eq!(h.repo.count(&tour_query(&[])).await.unwrap(), 0);
    }
}
