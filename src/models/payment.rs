//! Subscription payment model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Subscription payment record, one per billing cycle
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct SubscriptionPayment {
    pub id: i32,
    pub device_id: i32,
    /// Due date of the cycle this payment covers
    pub payment_date: DateTime<Utc>,
    pub amount: Decimal,
    /// 0=unspecified, 1=cash, 2=card, 3=transfer
    pub method: i16,
    /// 0=due, 1=paid
    pub status: i16,
}

/// Record-payment request (settles a Due payment)
#[derive(Debug, Deserialize, ToSchema)]
pub struct PayRequest {
    /// 0=unspecified, 1=cash, 2=card, 3=transfer
    pub method: Option<i16>,
}
