//! Accessory (shared pool) model and related types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Accessory record
///
/// Accessories are interchangeable and pool-counted, unlike devices which are
/// tracked as individual serialized units.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Accessory {
    pub id: i32,
    pub name: String,
    /// Rental price per day
    pub rental_rate: Decimal,
    /// Size of the shared pool
    pub total_quantity: i32,
}

/// Create accessory request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAccessory {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub rental_rate: Decimal,
    #[validate(range(min = 0))]
    pub total_quantity: i32,
}

/// Update accessory request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAccessory {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub rental_rate: Option<Decimal>,
    #[validate(range(min = 0))]
    pub total_quantity: Option<i32>,
}
