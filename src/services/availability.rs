//! Availability calculation service
//!
//! Free-unit counts are always derived from the store; nothing here caches.
//! The same counting runs again inside the checkout transaction, so the
//! numbers served to clients are advisory and never gate a booking.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::{
    error::{AppError, AppResult},
    interval::overlaps,
    models::device_type::{Availability, TypeAvailability},
    repository::{reservations::ReservationWindow, Repository},
};

#[derive(Clone)]
pub struct AvailabilityService {
    repository: Repository,
}

impl AvailabilityService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Free/total units of a device type over a window
    ///
    /// Without a window the probe is the zero-length instant `[now, now)`,
    /// which counts only reservations covering the current moment.
    pub async fn for_type(
        &self,
        device_type_id: i32,
        window: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> AppResult<Availability> {
        self.repository.device_types.get_by_id(device_type_id).await?;
        let (start, end) = resolve_window(window)?;

        let mut tx = self.repository.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
            .execute(&mut *tx)
            .await?;
        let device_ids = self
            .repository
            .devices
            .working_ids_in_tx(&mut tx, device_type_id)
            .await?;
        let windows = self
            .repository
            .reservations
            .occupied_windows_in_tx(&mut tx, device_type_id)
            .await?;
        tx.commit().await?;

        Ok(count_available(&device_ids, &windows, start, end))
    }

    /// Free/total units for every device type at one snapshot read point
    pub async fn for_all_types(
        &self,
        window: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> AppResult<Vec<TypeAvailability>> {
        let (start, end) = resolve_window(window)?;

        let mut tx = self.repository.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
            .execute(&mut *tx)
            .await?;
        let types = self.repository.device_types.list_in_tx(&mut tx).await?;
        let devices = self.repository.devices.all_working_ids_in_tx(&mut tx).await?;
        let windows = self
            .repository
            .reservations
            .all_occupied_windows_in_tx(&mut tx)
            .await?;
        tx.commit().await?;

        let mut ids_by_type: HashMap<i32, Vec<i32>> = HashMap::new();
        for (device_id, type_id) in devices {
            ids_by_type.entry(type_id).or_default().push(device_id);
        }
        let mut windows_by_type: HashMap<i32, Vec<ReservationWindow>> = HashMap::new();
        for w in windows {
            windows_by_type.entry(w.device_type_id).or_default().push(w);
        }

        let empty_ids = Vec::new();
        let empty_windows = Vec::new();
        Ok(types
            .into_iter()
            .map(|t| {
                let counts = count_available(
                    ids_by_type.get(&t.id).unwrap_or(&empty_ids),
                    windows_by_type.get(&t.id).unwrap_or(&empty_windows),
                    start,
                    end,
                );
                TypeAvailability {
                    device_type_id: t.id,
                    name: t.name,
                    available: counts.available,
                    total: counts.total,
                }
            })
            .collect())
    }
}

/// Default a missing window to the current instant; reject inverted windows
pub(crate) fn resolve_window(
    window: Option<(DateTime<Utc>, DateTime<Utc>)>,
) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
    match window {
        Some((start, end)) if end < start => Err(AppError::Validation(
            "Window end must not be before start".to_string(),
        )),
        Some((start, end)) => Ok((start, end)),
        None => {
            let now = Utc::now();
            Ok((now, now))
        }
    }
}

/// Count free units among `device_ids` for `[start, end)`
///
/// A unit is busy if any Pending/Active reservation window overlaps the probe.
/// Reservations on units outside `device_ids` (e.g. a unit broken after being
/// booked) do not reduce the count.
pub(crate) fn count_available(
    device_ids: &[i32],
    windows: &[ReservationWindow],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Availability {
    let id_set: HashSet<i32> = device_ids.iter().copied().collect();
    let busy: HashSet<i32> = windows
        .iter()
        .filter(|w| overlaps(start, end, w.start_at, w.end_at))
        .map(|w| w.device_id)
        .filter(|id| id_set.contains(id))
        .collect();

    Availability {
        available: device_ids.len() as i64 - busy.len() as i64,
        total: device_ids.len() as i64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
    }

    fn window(device_id: i32, start: u32, end: u32) -> ReservationWindow {
        ReservationWindow {
            device_id,
            device_type_id: 1,
            start_at: day(start),
            end_at: day(end),
        }
    }

    #[test]
    fn test_no_reservations_all_available() {
        let counts = count_available(&[1, 2, 3], &[], day(1), day(8));
        assert_eq!(counts.available, 3);
        assert_eq!(counts.total, 3);
    }

    #[test]
    fn test_overlapping_reservation_blocks_one_unit() {
        let counts = count_available(&[1, 2, 3], &[window(2, 3, 5)], day(4), day(6));
        assert_eq!(counts.available, 2);
        assert_eq!(counts.total, 3);
    }

    #[test]
    fn test_boundary_touch_does_not_block() {
        let counts = count_available(&[1, 2, 3], &[window(2, 3, 5)], day(5), day(6));
        assert_eq!(counts.available, 3);
    }

    #[test]
    fn test_two_windows_same_unit_count_once() {
        let reservations = [window(2, 1, 3), window(2, 4, 6)];
        let counts = count_available(&[1, 2, 3], &reservations, day(2), day(5));
        assert_eq!(counts.available, 2);
    }

    #[test]
    fn test_reservation_on_broken_unit_ignored() {
        // unit 9 is no longer among the working ids
        let counts = count_available(&[1, 2], &[window(9, 3, 5)], day(4), day(6));
        assert_eq!(counts.available, 2);
        assert_eq!(counts.total, 2);
    }

    #[test]
    fn test_instant_probe_counts_containing_windows_only() {
        let reservations = [window(1, 3, 5), window(2, 5, 7)];
        // probe "now" at day 6: unit 1 is free again, unit 2 is out
        let counts = count_available(&[1, 2, 3], &reservations, day(6), day(6));
        assert_eq!(counts.available, 2);

        // at exactly day 5 unit 1's window has closed and unit 2's has not
        // yet strictly begun, so neither blocks
        let counts = count_available(&[1, 2, 3], &reservations, day(5), day(5));
        assert_eq!(counts.available, 3);
    }
}
