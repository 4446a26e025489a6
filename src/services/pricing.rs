//! Pricing for prospective reservations
//!
//! Pure functions of the request plus current rates. The same computation
//! serves client quotes and the commit-time price inside a checkout
//! transaction, so both always agree for identical inputs.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::{
    error::{AppError, AppResult},
    models::{
        accessory::Accessory,
        device_type::DeviceType,
        reservation::PriceBreakdown,
    },
};

const SECONDS_PER_DAY: i64 = 86_400;

/// Billed days for a window: ceiling of the duration, floor of one day
pub fn billable_days(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let seconds = (end - start).num_seconds();
    ((seconds + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY).max(1)
}

/// Compute the cost breakdown for `quantity` units of `device_type` over
/// `[start, end)` with the given accessory picks
///
/// Accessory quantities are per checkout; they are not multiplied by the
/// device quantity.
pub fn price(
    device_type: &DeviceType,
    accessory_picks: &[(Accessory, i32)],
    quantity: i32,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> AppResult<PriceBreakdown> {
    if quantity <= 0 {
        return Err(AppError::Validation("Quantity must be positive".to_string()));
    }
    if end <= start {
        return Err(AppError::Validation(
            "Window end must be after start".to_string(),
        ));
    }
    for (accessory, picked) in accessory_picks {
        if *picked <= 0 {
            return Err(AppError::Validation(format!(
                "Accessory {} quantity must be positive",
                accessory.id
            )));
        }
        if *picked > accessory.total_quantity {
            return Err(AppError::Validation(format!(
                "Accessory {} quantity {} exceeds pool of {}",
                accessory.id, picked, accessory.total_quantity
            )));
        }
    }

    let days = billable_days(start, end);
    let days_dec = Decimal::from(days);
    let quantity_dec = Decimal::from(quantity);

    let device_rental_cost = device_type.rental_rate * days_dec * quantity_dec;
    let accessory_cost: Decimal = accessory_picks
        .iter()
        .map(|(accessory, picked)| accessory.rental_rate * days_dec * Decimal::from(*picked))
        .sum();
    let deposit = device_type.deposit * quantity_dec;

    Ok(PriceBreakdown {
        days,
        device_rental_cost,
        accessory_cost,
        deposit,
        total: device_rental_cost + accessory_cost + deposit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn camera() -> DeviceType {
        DeviceType {
            id: 1,
            name: "Camera".to_string(),
            rental_rate: dec!(20),
            deposit: dec!(50),
            has_subscription: false,
            subscription_cost: None,
            crea_date: None,
            modif_date: None,
        }
    }

    fn tripod(pool: i32) -> Accessory {
        Accessory {
            id: 7,
            name: "Tripod".to_string(),
            rental_rate: dec!(5),
            total_quantity: pool,
        }
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_seven_day_checkout() {
        let breakdown = price(&camera(), &[], 2, day(1), day(8)).unwrap();
        assert_eq!(breakdown.days, 7);
        assert_eq!(breakdown.device_rental_cost, dec!(280));
        assert_eq!(breakdown.deposit, dec!(100));
        assert_eq!(breakdown.total, dec!(380));
    }

    #[test]
    fn test_accessory_cost_not_scaled_by_device_quantity() {
        let breakdown = price(&camera(), &[(tripod(10), 1)], 2, day(1), day(8)).unwrap();
        // 1 tripod * $5 * 7 days, regardless of the 2 cameras
        assert_eq!(breakdown.accessory_cost, dec!(35));
        assert_eq!(breakdown.total, dec!(415));
    }

    #[test]
    fn test_short_window_bills_one_day() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let breakdown = price(&camera(), &[], 1, start, end).unwrap();
        assert_eq!(breakdown.days, 1);
        assert_eq!(breakdown.device_rental_cost, dec!(20));
    }

    #[test]
    fn test_partial_day_rounds_up() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 8, 1, 0, 0).unwrap();
        let breakdown = price(&camera(), &[], 1, start, end).unwrap();
        assert_eq!(breakdown.days, 8);
    }

    #[test]
    fn test_linear_in_quantity_and_days() {
        let one = price(&camera(), &[], 1, day(1), day(4)).unwrap();
        let three = price(&camera(), &[], 3, day(1), day(4)).unwrap();
        assert_eq!(three.device_rental_cost, one.device_rental_cost * dec!(3));
        assert_eq!(three.deposit, one.deposit * dec!(3));

        let doubled = price(&camera(), &[], 1, day(1), day(7)).unwrap();
        assert_eq!(doubled.device_rental_cost, one.device_rental_cost * dec!(2));
        // deposit is charged once per unit, not per day
        assert_eq!(doubled.deposit, one.deposit);
    }

    #[test]
    fn test_rejects_bad_quantity() {
        assert!(matches!(
            price(&camera(), &[], 0, day(1), day(2)),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_inverted_window() {
        assert!(matches!(
            price(&camera(), &[], 1, day(5), day(5)),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_pick_over_pool() {
        assert!(matches!(
            price(&camera(), &[(tripod(2), 3)], 1, day(1), day(2)),
            Err(AppError::Validation(_))
        ));
    }
}
