//! Shared domain enums
//!
//! Stored as `smallint` columns; row structs keep the raw `i16` and convert
//! through these enums at the business-logic boundary.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ---------------------------------------------------------------------------
// WorkingState
// ---------------------------------------------------------------------------

/// Physical condition of a device; only `Working` units can be reserved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[repr(i16)]
pub enum WorkingState {
    Working = 0,
    NotWorking = 1,
    UnderRepair = 2,
}

impl From<i16> for WorkingState {
    fn from(v: i16) -> Self {
        match v {
            1 => WorkingState::NotWorking,
            2 => WorkingState::UnderRepair,
            _ => WorkingState::Working,
        }
    }
}

impl From<WorkingState> for i16 {
    fn from(s: WorkingState) -> Self {
        s as i16
    }
}

impl std::fmt::Display for WorkingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            WorkingState::Working => "Working",
            WorkingState::NotWorking => "Not working",
            WorkingState::UnderRepair => "Under repair",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// ReservationStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of a reservation
///
/// `Pending` and `Active` both occupy the unit; `Completed` and `Cancelled`
/// free it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[repr(i16)]
pub enum ReservationStatus {
    Pending = 0,
    Active = 1,
    Completed = 2,
    Cancelled = 3,
}

impl From<i16> for ReservationStatus {
    fn from(v: i16) -> Self {
        match v {
            1 => ReservationStatus::Active,
            2 => ReservationStatus::Completed,
            3 => ReservationStatus::Cancelled,
            _ => ReservationStatus::Pending,
        }
    }
}

impl From<ReservationStatus> for i16 {
    fn from(s: ReservationStatus) -> Self {
        s as i16
    }
}

// ---------------------------------------------------------------------------
// PaymentMethod / PaymentStatus
// ---------------------------------------------------------------------------

/// How a subscription payment was (or will be) settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[repr(i16)]
pub enum PaymentMethod {
    Unspecified = 0,
    Cash = 1,
    Card = 2,
    Transfer = 3,
}

impl From<i16> for PaymentMethod {
    fn from(v: i16) -> Self {
        match v {
            1 => PaymentMethod::Cash,
            2 => PaymentMethod::Card,
            3 => PaymentMethod::Transfer,
            _ => PaymentMethod::Unspecified,
        }
    }
}

impl From<PaymentMethod> for i16 {
    fn from(m: PaymentMethod) -> Self {
        m as i16
    }
}

/// Settlement status of a subscription payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[repr(i16)]
pub enum PaymentStatus {
    Due = 0,
    Paid = 1,
}

impl From<i16> for PaymentStatus {
    fn from(v: i16) -> Self {
        match v {
            1 => PaymentStatus::Paid,
            _ => PaymentStatus::Due,
        }
    }
}

impl From<PaymentStatus> for i16 {
    fn from(s: PaymentStatus) -> Self {
        s as i16
    }
}
