//! UTC day bounds and nearby-day iteration.

use chrono::{NaiveDate, NaiveTime, TimeDelta};

use crate::from_datetime;

const MICROS_PER_DAY: i64 = 86_400_000_000;

/// Returns the half-open Sierra Chart timestamp range covering a UTC day.
///
/// The range is `[day 00:00:00.000000Z, day+1 00:00:00.000000Z)`.
#[must_use]
pub fn day_bounds(day: NaiveDate) -> (i64, i64) {
    let start = from_datetime(&day.and_time(NaiveTime::MIN).and_utc());
    (start, start + MICROS_PER_DAY)
}

/// Iterator over the days surrounding a center day, nearest first.
///
/// Yields `day-1, day+1, day-2, day+2, ...` up to `window` days on either
/// side. The center day itself is not yielded. Dates outside the calendar
/// range are skipped.
#[derive(Debug, Clone)]
pub struct FallbackDays {
    center: NaiveDate,
    delta: u32,
    window: u32,
    after: bool,
}

impl FallbackDays {
    /// Creates a new fallback iterator around `center`.
    #[must_use]
    pub const fn new(center: NaiveDate, window: u32) -> Self {
        Self {
            center,
            delta: 1,
            window,
            after: false,
        }
    }
}

impl Iterator for FallbackDays {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        while self.delta <= self.window {
            let offset = TimeDelta::days(i64::from(self.delta));
            let day = if self.after {
                self.center.checked_add_signed(offset)
            } else {
                self.center.checked_sub_signed(offset)
            };

            if self.after {
                self.delta += 1;
            }
            self.after = !self.after;

            if day.is_some() {
                return day;
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.window + 1).saturating_sub(self.delta) as usize * 2;
        let remaining = if self.after {
            remaining.saturating_sub(1)
        } else {
            remaining
        };
        (0, Some(remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_day_bounds() {
        let (start, end) = day_bounds(date(2025, 9, 15));
        let expected = Utc.with_ymd_and_hms(2025, 9, 15, 0, 0, 0).unwrap();
        assert_eq!(start, from_datetime(&expected));
        assert_eq!(end - start, MICROS_PER_DAY);
        assert_eq!(end, day_bounds(date(2025, 9, 16)).0);
    }

    #[test]
    fn test_fallback_order() {
        let days: Vec<_> = FallbackDays::new(date(2025, 9, 15), 2).collect();
        assert_eq!(
            days,
            vec![
                date(2025, 9, 14),
                date(2025, 9, 16),
                date(2025, 9, 13),
                date(2025, 9, 17),
            ]
        );
    }

    #[test]
    fn test_fallback_zero_window() {
        assert_eq!(FallbackDays::new(date(2025, 1, 1), 0).count(), 0);
    }

    #[test]
    fn test_fallback_crosses_month() {
        let days: Vec<_> = FallbackDays::new(date(2025, 3, 1), 1).collect();
        assert_eq!(days, vec![date(2025, 2, 28), date(2025, 3, 2)]);
    }

    #[test]
    fn test_fallback_size_hint() {
        let mut iter = FallbackDays::new(date(2025, 3, 1), 3);
        assert_eq!(iter.size_hint(), (0, Some(6)));
        iter.next();
        assert_eq!(iter.size_hint(), (0, Some(5)));
    }
}
