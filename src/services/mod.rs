//! Business logic services

pub mod availability;
pub mod changefeed;
pub mod inventory;
pub mod pricing;
pub mod reservations;
pub mod subscriptions;

use sqlx::{Pool, Postgres};

use crate::{config::ReservationsConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub inventory: inventory::InventoryService,
    pub availability: availability::AvailabilityService,
    pub reservations: reservations::ReservationsService,
    pub subscriptions: subscriptions::SubscriptionsService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, reservations_config: ReservationsConfig) -> Self {
        Self {
            inventory: inventory::InventoryService::new(repository.clone()),
            availability: availability::AvailabilityService::new(repository.clone()),
            reservations: reservations::ReservationsService::new(
                repository.clone(),
                reservations_config,
            ),
            subscriptions: subscriptions::SubscriptionsService::new(repository.clone()),
            repository,
        }
    }

    /// Shared database pool (readiness probes)
    pub fn repository_pool(&self) -> &Pool<Postgres> {
        &self.repository.pool
    }
}
