//! Device type (catalog category) model and related types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Device type record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct DeviceType {
    pub id: i32,
    /// Catalog name, e.g. "Camera"
    pub name: String,
    /// Rental price per day
    pub rental_rate: Decimal,
    /// Deposit charged per unit
    pub deposit: Decimal,
    /// Whether units of this type carry a recurring subscription
    pub has_subscription: bool,
    /// Monthly subscription amount (when has_subscription)
    pub subscription_cost: Option<Decimal>,
    pub crea_date: Option<DateTime<Utc>>,
    pub modif_date: Option<DateTime<Utc>>,
}

/// Create device type request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateDeviceType {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub rental_rate: Decimal,
    pub deposit: Decimal,
    #[serde(default)]
    pub has_subscription: bool,
    pub subscription_cost: Option<Decimal>,
}

/// Update device type request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateDeviceType {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub rental_rate: Option<Decimal>,
    pub deposit: Option<Decimal>,
    pub has_subscription: Option<bool>,
    pub subscription_cost: Option<Decimal>,
}

/// Free/total unit counts for a device type over a window
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Availability {
    /// Units free for the whole requested window
    pub available: i64,
    /// Working units of the type
    pub total: i64,
}

/// Bulk availability entry (catalog listing)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TypeAvailability {
    pub device_type_id: i32,
    pub name: String,
    pub available: i64,
    pub total: i64,
}
