//! Half-open time interval helpers

use chrono::{DateTime, Utc};

/// Whether two half-open windows `[a_start, a_end)` and `[b_start, b_end)`
/// intersect. Windows that merely touch at a boundary do not overlap.
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_partial_overlap() {
        assert!(overlaps(day(3), day(5), day(4), day(6)));
        assert!(overlaps(day(4), day(6), day(3), day(5)));
    }

    #[test]
    fn test_containment() {
        assert!(overlaps(day(1), day(10), day(4), day(5)));
        assert!(overlaps(day(4), day(5), day(1), day(10)));
    }

    #[test]
    fn test_boundary_touch_is_not_overlap() {
        assert!(!overlaps(day(3), day(5), day(5), day(6)));
        assert!(!overlaps(day(5), day(6), day(3), day(5)));
    }

    #[test]
    fn test_disjoint() {
        assert!(!overlaps(day(1), day(2), day(3), day(4)));
    }

    #[test]
    fn test_zero_length_window_inside() {
        // a "current instant" probe [t, t) against a booked window
        assert!(overlaps(day(4), day(4), day(3), day(5)));
        assert!(!overlaps(day(6), day(6), day(3), day(5)));
        // probe exactly at the booking's end: unit is already free
        assert!(!overlaps(day(5), day(5), day(3), day(5)));
    }
}
