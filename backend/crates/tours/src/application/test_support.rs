//! Shared wiring for use case tests

use std::sync::Arc;

use kernel::query::{ListQuery, QueryTranslator, ResourceDefaults};

use crate::application::{
    CreateTourUseCase, DeleteAllToursUseCase, DeleteTourUseCase, GetTourUseCase,
    ImportToursUseCase, ListToursUseCase, MonthlyPlanUseCase, TourStatsUseCase,
    UpdateTourUseCase,
};
use crate::domain::entity::tour::{Tour, TourDraft, fixtures};
use crate::domain::repository::TourRepository;
use crate::infra::memory::InMemoryTourRepository;

/// Translate pairs with the tour listing defaults.
pub(crate) fn tour_query(pairs: &[(&str, &str)]) -> ListQuery {
    let pairs: Vec<(String, String)> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    QueryTranslator::new(ResourceDefaults::default().excluding(["secretTour"]))
        .translate(&pairs)
        .unwrap()
}

pub(crate) struct Harness {
    pub repo: Arc<InMemoryTourRepository>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            repo: Arc::new(InMemoryTourRepository::new()),
        }
    }

    pub async fn tour(&self, name: &str) -> Tour {
        self.create_tour().execute(fixtures::draft(name)).await.unwrap()
    }

    pub async fn secret_tour(&self, name: &str) -> Tour {
        let tour = Tour::create(TourDraft {
            secret_tour: Some(true),
            ..fixtures::draft(name)
        })
        .unwrap();
        self.repo.create(&tour).await.unwrap();
        tour
    }

    pub fn create_tour(&self) -> CreateTourUseCase<InMemoryTourRepository> {
        CreateTourUseCase::new(self.repo.clone())
    }

    pub fn get_tour(&self) -> GetTourUseCase<InMemoryTourRepository> {
        GetTourUseCase::new(self.repo.clone())
    }

    pub fn list_tours(&self) -> ListToursUseCase<InMemoryTourRepository> {
        ListToursUseCase::new(self.repo.clone())
    }

    pub fn update_tour(&self) -> UpdateTourUseCase<InMemoryTourRepository> {
        UpdateTourUseCase::new(self.repo.clone())
    }

    pub fn delete_tour(&self) -> DeleteTourUseCase<InMemoryTourRepository> {
        DeleteTourUseCase::new(self.repo.clone())
    }

    pub fn tour_stats(&self) -> TourStatsUseCase<InMemoryTourRepository> {
        TourStatsUseCase::new(self.repo.clone())
    }

    pub fn monthly_plan(&self) -> MonthlyPlanUseCase<InMemoryTourRepository> {
        MonthlyPlanUseCase::new(self.repo.clone())
    }

    pub fn import_tours(&self) -> ImportToursUseCase<InMemoryTourRepository> {
        ImportToursUseCase::new(self.repo.clone())
    }

    pub fn delete_all_tours(&self) -> DeleteAllToursUseCase<InMemoryTourRepository> {
        DeleteAllToursUseCase::new(self.repo.clone())
    }
}
