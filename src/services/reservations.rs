//! Reservation coordinator
//!
//! A checkout never trusts a previously served availability number. Every
//! attempt re-locks the type's working units and recounts inside its own
//! transaction, so the availability check and the reservation writes are
//! atomic end to end. Write races (two checkouts fighting for the last unit)
//! surface as serialization or exclusion-constraint failures and are retried
//! a bounded number of times before becoming a conflict for the caller.

use std::collections::HashSet;
use std::time::Duration;

use rand::Rng;

use crate::{
    config::ReservationsConfig,
    error::{AppError, AppResult},
    interval::overlaps,
    models::{
        device_type::DeviceType,
        reservation::{
            CheckoutRequest, CheckoutResponse, PriceBreakdown, Reservation, ReservationQuery,
        },
    },
    repository::Repository,
    services::{availability::count_available, pricing},
};

/// SQLSTATEs worth retrying: serialization failure, deadlock, and the
/// reservation table's no-overlap exclusion constraint
const RETRYABLE_SQLSTATES: [&str; 3] = ["40001", "40P01", "23P01"];

#[derive(Clone)]
pub struct ReservationsService {
    repository: Repository,
    config: ReservationsConfig,
}

impl ReservationsService {
    pub fn new(repository: Repository, config: ReservationsConfig) -> Self {
        Self { repository, config }
    }

    /// Price a prospective checkout without reserving anything
    pub async fn quote(&self, request: &CheckoutRequest) -> AppResult<PriceBreakdown> {
        let device_type = self
            .repository
            .device_types
            .get_by_id(request.device_type_id)
            .await?;

        let mut picks = Vec::with_capacity(request.accessories.len());
        for sel in &request.accessories {
            let accessory = self.repository.accessories.get_by_id(sel.accessory_id).await?;
            picks.push((accessory, sel.quantity));
        }

        pricing::price(
            &device_type,
            &picks,
            request.quantity,
            request.start_at,
            request.end_at,
        )
    }

    /// Atomically reserve `quantity` units (plus accessory draws) or nothing
    pub async fn checkout(&self, request: CheckoutRequest) -> AppResult<CheckoutResponse> {
        if request.end_at <= request.start_at {
            return Err(AppError::Validation(
                "Window end must be after start".to_string(),
            ));
        }
        let device_type = self
            .repository
            .device_types
            .get_by_id(request.device_type_id)
            .await?;

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.try_checkout(&request, &device_type).await {
                Ok(response) => {
                    tracing::info!(
                        device_type_id = request.device_type_id,
                        quantity = request.quantity,
                        reservations = ?response.reservation_ids,
                        attempt,
                        "checkout committed"
                    );
                    return Ok(response);
                }
                Err(err) if is_write_race(&err) => {
                    if attempt >= self.config.max_attempts {
                        tracing::warn!(
                            device_type_id = request.device_type_id,
                            attempt,
                            "checkout lost its write race, giving up"
                        );
                        return Err(AppError::Conflict(
                            "Concurrent checkout conflict, please retry".to_string(),
                        ));
                    }
                    let delay = backoff_delay(self.config.backoff_base_ms, attempt);
                    tracing::debug!(
                        device_type_id = request.device_type_id,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "checkout write race, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// One transactional checkout attempt
    async fn try_checkout(
        &self,
        request: &CheckoutRequest,
        device_type: &DeviceType,
    ) -> AppResult<CheckoutResponse> {
        let mut tx = self.repository.pool.begin().await?;

        // Lock the candidate pool, then recount inside this transaction
        let device_ids = self
            .repository
            .devices
            .working_ids_for_update(&mut tx, request.device_type_id)
            .await?;
        let windows = self
            .repository
            .reservations
            .occupied_windows_in_tx(&mut tx, request.device_type_id)
            .await?;

        let counts = count_available(&device_ids, &windows, request.start_at, request.end_at);
        let requested = request.quantity as i64;
        if counts.available < requested {
            return Err(AppError::InsufficientAvailability {
                requested,
                available: counts.available,
            });
        }

        // Lowest ids first, for reproducible unit assignment
        let busy: HashSet<i32> = windows
            .iter()
            .filter(|w| overlaps(request.start_at, request.end_at, w.start_at, w.end_at))
            .map(|w| w.device_id)
            .collect();
        let picked: Vec<i32> = device_ids
            .iter()
            .copied()
            .filter(|id| !busy.contains(id))
            .take(request.quantity as usize)
            .collect();

        // The accessory row lock serializes pool checks across checkouts of
        // different device types, which share no device locks
        let mut picks = Vec::with_capacity(request.accessories.len());
        for sel in &request.accessories {
            let accessory = self
                .repository
                .accessories
                .get_for_update(&mut tx, sel.accessory_id)
                .await?;
            let drawn = self
                .repository
                .reservations
                .accessory_draws_overlapping(&mut tx, sel.accessory_id, request.start_at, request.end_at)
                .await?;
            let free = accessory.total_quantity as i64 - drawn;
            if (sel.quantity as i64) > free {
                return Err(AppError::InsufficientAvailability {
                    requested: sel.quantity as i64,
                    available: free.max(0),
                });
            }
            picks.push((accessory, sel.quantity));
        }

        let mut reservation_ids = Vec::with_capacity(picked.len());
        for device_id in &picked {
            let id = self
                .repository
                .reservations
                .insert_pending(
                    &mut tx,
                    *device_id,
                    request.device_type_id,
                    request.start_at,
                    request.end_at,
                )
                .await?;
            reservation_ids.push(id);
        }

        // Accessory draws are per checkout, recorded on its first reservation
        if let Some(&anchor) = reservation_ids.first() {
            for sel in &request.accessories {
                self.repository
                    .reservations
                    .insert_accessory_draw(&mut tx, anchor, sel.accessory_id, sel.quantity)
                    .await?;
            }
        }

        let price = pricing::price(
            device_type,
            &picks,
            request.quantity,
            request.start_at,
            request.end_at,
        )?;

        tx.commit().await?;

        Ok(CheckoutResponse {
            reservation_ids,
            price,
        })
    }

    /// Get reservation by ID
    pub async fn get(&self, id: i32) -> AppResult<Reservation> {
        self.repository.reservations.get_by_id(id).await
    }

    /// List reservations with optional filters
    pub async fn list(&self, query: &ReservationQuery) -> AppResult<Vec<Reservation>> {
        self.repository.reservations.list(query).await
    }

    /// Administrative cancellation of a Pending/Active reservation
    pub async fn cancel(&self, id: i32) -> AppResult<Reservation> {
        let reservation = self.repository.reservations.cancel(id).await?;
        tracing::info!(reservation_id = id, "reservation cancelled");
        Ok(reservation)
    }
}

/// Whether a failed attempt is a transient write race
fn is_write_race(err: &AppError) -> bool {
    match err {
        AppError::Database(sqlx::Error::Database(db)) => db
            .code()
            .map(|code| RETRYABLE_SQLSTATES.contains(&code.as_ref()))
            .unwrap_or(false),
        _ => false,
    }
}

/// Exponential backoff with jitter: `base * 2^(attempt-1) + rand(0..=base)`
fn backoff_delay(base_ms: u64, attempt: u32) -> Duration {
    let exp = base_ms.saturating_mul(1u64 << (attempt.saturating_sub(1)).min(10));
    let jitter = rand::thread_rng().gen_range(0..=base_ms);
    Duration::from_millis(exp + jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_grows_and_stays_bounded() {
        for attempt in 1..=3 {
            let floor = 50u64 << (attempt - 1);
            let delay = backoff_delay(50, attempt);
            assert!(delay >= Duration::from_millis(floor));
            assert!(delay <= Duration::from_millis(floor + 50));
        }
    }

    #[test]
    fn test_availability_error_is_not_retried() {
        let err = AppError::InsufficientAvailability {
            requested: 3,
            available: 2,
        };
        assert!(!is_write_race(&err));
    }
}
