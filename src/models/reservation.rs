//! Reservation (booking) model and related types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Reservation record: one physical unit booked for a half-open window
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Reservation {
    pub id: i32,
    /// Unit assigned at commit time
    pub device_id: i32,
    pub device_type_id: i32,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    /// 0=pending, 1=active, 2=completed, 3=cancelled
    pub status: i16,
    pub crea_date: Option<DateTime<Utc>>,
}

/// An accessory pick inside a checkout request
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct AccessorySelection {
    pub accessory_id: i32,
    #[validate(range(min = 1))]
    pub quantity: i32,
}

/// Checkout request: book `quantity` units of a type for a window
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CheckoutRequest {
    pub device_type_id: i32,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    #[validate(range(min = 1))]
    pub quantity: i32,
    #[serde(default)]
    #[validate(nested)]
    pub accessories: Vec<AccessorySelection>,
}

/// Cost breakdown for a prospective reservation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PriceBreakdown {
    /// Billed days (ceiling of the window duration, at least 1)
    pub days: i64,
    pub device_rental_cost: Decimal,
    pub accessory_cost: Decimal,
    pub deposit: Decimal,
    pub total: Decimal,
}

/// Checkout response: the committed reservations plus the priced total
#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    pub reservation_ids: Vec<i32>,
    pub price: PriceBreakdown,
}

/// Reservation list query parameters
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ReservationQuery {
    /// Filter by device type
    pub device_type_id: Option<i32>,
    /// Filter by device
    pub device_id: Option<i32>,
    /// Filter by status (0=pending, 1=active, 2=completed, 3=cancelled)
    pub status: Option<i16>,
}
