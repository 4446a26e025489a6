//! Subscription billing rollover
//!
//! Rollover is lazy: any device listing sweeps due subscriptions first, and
//! the same operation is exposed as an endpoint so an external scheduler can
//! drive it. Staleness is bounded by how often either happens.

use chrono::{DateTime, Months, Utc};

use crate::{error::AppResult, repository::Repository};

#[derive(Clone)]
pub struct SubscriptionsService {
    repository: Repository,
}

impl SubscriptionsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Advance every due subscription past `as_of`, creating one Due payment
    /// per skipped cycle. Returns the number of devices updated.
    pub async fn rollover_due(&self, as_of: DateTime<Utc>) -> AppResult<u64> {
        let mut tx = self.repository.pool.begin().await?;
        let due = self.repository.devices.due_subscriptions(&mut tx, as_of).await?;

        let mut updated = 0u64;
        for entry in due {
            let (cycles, next) = cycles_due(entry.subscription_date, as_of);
            for cycle in &cycles {
                self.repository
                    .payments
                    .insert_due(&mut tx, entry.device_id, *cycle, entry.subscription_cost)
                    .await?;
            }
            self.repository
                .devices
                .set_subscription_date(&mut tx, entry.device_id, next)
                .await?;
            updated += 1;
        }
        tx.commit().await?;

        if updated > 0 {
            tracing::info!(updated, "rolled over due subscriptions");
        }
        Ok(updated)
    }
}

/// One calendar month later, same day-of-month, clamped to the target
/// month's last day
pub fn next_billing_date(date: DateTime<Utc>) -> Option<DateTime<Utc>> {
    date.checked_add_months(Months::new(1))
}

/// All billing cycles due up to `as_of` (inclusive) starting from `date`,
/// and the first date strictly after `as_of`
pub fn cycles_due(date: DateTime<Utc>, as_of: DateTime<Utc>) -> (Vec<DateTime<Utc>>, DateTime<Utc>) {
    let mut current = date;
    let mut billed = Vec::new();
    while current <= as_of {
        billed.push(current);
        match next_billing_date(current) {
            Some(next) if next > current => current = next,
            _ => break,
        }
    }
    (billed, current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_plain_advance() {
        assert_eq!(next_billing_date(at(2024, 3, 15)), Some(at(2024, 4, 15)));
    }

    #[test]
    fn test_clamp_to_shorter_month() {
        assert_eq!(next_billing_date(at(2024, 1, 31)), Some(at(2024, 2, 29)));
        assert_eq!(next_billing_date(at(2023, 1, 31)), Some(at(2023, 2, 28)));
        assert_eq!(next_billing_date(at(2024, 3, 31)), Some(at(2024, 4, 30)));
    }

    #[test]
    fn test_single_due_cycle() {
        let (billed, next) = cycles_due(at(2024, 3, 10), at(2024, 3, 20));
        assert_eq!(billed, vec![at(2024, 3, 10)]);
        assert_eq!(next, at(2024, 4, 10));
    }

    #[test]
    fn test_dormant_device_bills_every_skipped_cycle() {
        let (billed, next) = cycles_due(at(2024, 1, 5), at(2024, 3, 20));
        assert_eq!(billed, vec![at(2024, 1, 5), at(2024, 2, 5), at(2024, 3, 5)]);
        assert_eq!(next, at(2024, 4, 5));
    }

    #[test]
    fn test_new_date_is_strictly_future() {
        let as_of = at(2024, 6, 1);
        let (_, next) = cycles_due(at(2023, 11, 1), as_of);
        assert!(next > as_of);
    }

    #[test]
    fn test_not_yet_due_is_untouched() {
        let (billed, next) = cycles_due(at(2024, 5, 1), at(2024, 4, 30));
        assert!(billed.is_empty());
        assert_eq!(next, at(2024, 5, 1));
    }
}
