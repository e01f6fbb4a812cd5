//! Sierra Chart timestamp codec.
//!
//! Every on-disk timestamp in `.depth` and `.scid` files is a 64-bit count of
//! microseconds since 1899-12-30T00:00:00 UTC (the spreadsheet epoch), not the
//! Unix epoch. These helpers translate between that integer and
//! [`DateTime<Utc>`].

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, TimeZone, Timelike, Utc};

use crate::TimeError;

/// Microseconds between 1899-12-30T00:00:00Z and 1970-01-01T00:00:00Z.
pub const SC_EPOCH_OFFSET_MICROS: i64 = 25_569 * 86_400 * 1_000_000;

/// Returns the Sierra Chart epoch, 1899-12-30T00:00:00Z.
#[must_use]
pub fn sc_epoch() -> DateTime<Utc> {
    DateTime::UNIX_EPOCH - TimeDelta::microseconds(SC_EPOCH_OFFSET_MICROS)
}

/// Converts Sierra Chart microseconds to a UTC timestamp.
///
/// Negative values (dates before 1899-12-30) are accepted.
///
/// # Errors
///
/// Returns [`TimeError::OutOfRange`] if the result falls outside the range
/// `chrono` can represent.
pub fn to_datetime(micros: i64) -> Result<DateTime<Utc>, TimeError> {
    micros
        .checked_sub(SC_EPOCH_OFFSET_MICROS)
        .and_then(DateTime::<Utc>::from_timestamp_micros)
        .ok_or(TimeError::OutOfRange(micros))
}

/// Converts a zone-anchored timestamp to Sierra Chart microseconds.
///
/// The input is normalized to UTC first, so an instant expressed in any
/// offset maps to the same integer.
#[must_use]
pub fn from_datetime<Tz: TimeZone>(ts: &DateTime<Tz>) -> i64 {
    ts.with_timezone(&Utc).timestamp_micros() + SC_EPOCH_OFFSET_MICROS
}

/// Renders Sierra Chart microseconds as `HH:MM:SS.mmm` (UTC).
///
/// Values outside the representable range are rendered as the raw integer.
#[must_use]
pub fn format_ms(micros: i64) -> String {
    to_datetime(micros).map_or_else(
        |_| micros.to_string(),
        |dt| dt.format("%H:%M:%S%.3f").to_string(),
    )
}

/// A wall-clock time of day with millisecond precision.
///
/// Parsed from `HH:MM:SS` or `HH:MM:SS.fff`; fractional digits beyond the
/// third are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    /// Creates a time of day from its components.
    #[must_use]
    pub fn from_hms_milli(hour: u32, min: u32, sec: u32, milli: u32) -> Option<Self> {
        NaiveTime::from_hms_milli_opt(hour, min, sec, milli).map(Self)
    }

    /// Returns the underlying naive time.
    #[must_use]
    pub const fn time(&self) -> NaiveTime {
        self.0
    }
}

impl std::str::FromStr for TimeOfDay {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TimeError::InvalidTimeOfDay(s.to_string());
        let part = s.trim();
        let (hms, fraction) = part.split_once('.').unwrap_or((part, ""));

        if !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let mut millis = fraction.chars().take(3).collect::<String>();
        while millis.len() < 3 {
            millis.push('0');
        }
        let millis: u32 = millis.parse().map_err(|_| invalid())?;

        let base = NaiveTime::parse_from_str(hms, "%H:%M:%S").map_err(|_| invalid())?;
        base.with_nanosecond(millis * 1_000_000)
            .map(Self)
            .ok_or_else(invalid)
    }
}

impl std::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%H:%M:%S%.3f"))
    }
}

/// Returns the Sierra Chart timestamp of `tod` on the UTC calendar `day`.
#[must_use]
pub fn at_time_of_day(day: NaiveDate, tod: TimeOfDay) -> i64 {
    from_datetime(&day.and_time(tod.time()).and_utc())
}
