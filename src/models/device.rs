//! Device (physical unit) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Device record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Device {
    pub id: i32,
    pub device_type_id: i32,
    /// 0=working, 1=not working, 2=under repair
    pub working_state: i16,
    /// Free-form condition notes
    pub condition: Option<String>,
    /// Next subscription billing date, when the type has a subscription
    pub subscription_date: Option<DateTime<Utc>>,
    pub crea_date: Option<DateTime<Utc>>,
    pub modif_date: Option<DateTime<Utc>>,
}

/// Create device request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateDevice {
    pub device_type_id: i32,
    /// 0=working, 1=not working, 2=under repair
    pub working_state: Option<i16>,
    #[validate(length(max = 2000))]
    pub condition: Option<String>,
    pub subscription_date: Option<DateTime<Utc>>,
}

/// Update device request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateDevice {
    pub working_state: Option<i16>,
    #[validate(length(max = 2000))]
    pub condition: Option<String>,
    pub subscription_date: Option<DateTime<Utc>>,
}
