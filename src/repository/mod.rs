//! Repository layer for database operations

pub mod accessories;
pub mod device_types;
pub mod devices;
pub mod payments;
pub mod reservations;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub device_types: device_types::DeviceTypesRepository,
    pub devices: devices::DevicesRepository,
    pub reservations: reservations::ReservationsRepository,
    pub accessories: accessories::AccessoriesRepository,
    pub payments: payments::PaymentsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            device_types: device_types::DeviceTypesRepository::new(pool.clone()),
            devices: devices::DevicesRepository::new(pool.clone()),
            reservations: reservations::ReservationsRepository::new(pool.clone()),
            accessories: accessories::AccessoriesRepository::new(pool.clone()),
            payments: payments::PaymentsRepository::new(pool.clone()),
            pool,
        }
    }
}
