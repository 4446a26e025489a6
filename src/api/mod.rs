//! API handlers for Rentdesk REST endpoints

pub mod accessories;
pub mod device_types;
pub mod devices;
pub mod events;
pub mod health;
pub mod openapi;
pub mod reservations;
pub mod subscriptions;

use crate::error::AppError;

/// Run `validator` checks on a request payload
pub(crate) fn validate<T: validator::Validate>(payload: &T) -> Result<(), AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))
}
