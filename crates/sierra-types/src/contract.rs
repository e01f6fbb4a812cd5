//! Contract stems and filename conventions.
//!
//! Depth files are named `<stem>.<YYYY-MM-DD>.depth` and trade files
//! `<stem>.scid`, where the stem is `<root><month code><YY><suffix>`,
//! e.g. `ESU25_FUT_CME`.

use chrono::{Datelike, NaiveDate};

use crate::StemError;

/// Extension of market-depth files.
pub const DEPTH_EXTENSION: &str = "depth";

/// Extension of intraday trade files.
pub const TRADE_EXTENSION: &str = "scid";

/// Venue suffix used when none can be inferred from existing files.
pub const DEFAULT_SUFFIX: &str = "_FUT_CME";

/// Suffix appended to a source stem to name export outputs.
pub const SYNC_SUFFIX: &str = "-SYNC";

const MONTH_CODES: [char; 12] = ['F', 'G', 'H', 'J', 'K', 'M', 'N', 'Q', 'U', 'V', 'X', 'Z'];

/// Returns the futures month letter for the month of `day`.
#[must_use]
pub fn month_code_for(day: NaiveDate) -> char {
    MONTH_CODES[day.month0() as usize]
}

/// Canonical contract identifier: symbol root, month code, two-digit year
/// and venue suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContractStem {
    /// Symbol root, e.g. `ES`.
    pub root: String,
    /// Futures month letter, e.g. `U`.
    pub month_code: char,
    /// Two-digit year (0-99).
    pub year: u8,
    /// Venue suffix, e.g. `_FUT_CME`.
    pub suffix: String,
}

impl ContractStem {
    /// Builds the stem for `root` in the contract month containing `day`.
    #[must_use]
    pub fn for_day(root: &str, day: NaiveDate, suffix: &str) -> Self {
        Self {
            root: root.to_string(),
            month_code: month_code_for(day),
            year: day.year().rem_euclid(100) as u8,
            suffix: suffix.to_string(),
        }
    }

    /// Returns the depth filename for this stem on `day`.
    #[must_use]
    pub fn depth_file_name(&self, day: NaiveDate) -> String {
        depth_file_name(&self.to_string(), day)
    }

    /// Returns the trade filename for this stem.
    #[must_use]
    pub fn trade_file_name(&self) -> String {
        trade_file_name(&self.to_string())
    }
}

impl std::fmt::Display for ContractStem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}{:02}{}",
            self.root, self.month_code, self.year, self.suffix
        )
    }
}

/// Returns `<stem>.<YYYY-MM-DD>.depth`.
#[must_use]
pub fn depth_file_name(stem: &str, day: NaiveDate) -> String {
    format!("{stem}.{}.{DEPTH_EXTENSION}", day.format("%Y-%m-%d"))
}

/// Returns `<stem>.scid`.
#[must_use]
pub fn trade_file_name(stem: &str) -> String {
    format!("{stem}.{TRADE_EXTENSION}")
}

/// Returns true if `stem` names an export output (ends with `-SYNC`,
/// any case).
#[must_use]
pub fn is_sync_output(stem: &str) -> bool {
    stem.len() >= SYNC_SUFFIX.len()
        && stem.as_bytes()[stem.len() - SYNC_SUFFIX.len()..]
            .eq_ignore_ascii_case(SYNC_SUFFIX.as_bytes())
}

/// Strips the `.<day>.depth` suffix from a depth filename.
///
/// # Errors
///
/// Returns [`StemError::NotDepthName`] if the name does not end with the
/// suffix for `day` or nothing is left once it is removed.
pub fn stem_from_depth_name(name: &str, day: NaiveDate) -> Result<&str, StemError> {
    let expected_suffix = format!(".{}.{DEPTH_EXTENSION}", day.format("%Y-%m-%d"));
    match name.strip_suffix(&expected_suffix) {
        Some(stem) if !stem.is_empty() => Ok(stem),
        _ => Err(StemError::NotDepthName {
            name: name.to_string(),
            expected_suffix,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_codes() {
        assert_eq!(month_code_for(date(2025, 1, 2)), 'F');
        assert_eq!(month_code_for(date(2025, 9, 15)), 'U');
        assert_eq!(month_code_for(date(2025, 12, 31)), 'Z');
    }

    #[test]
    fn test_stem_display() {
        let stem = ContractStem::for_day("ES", date(2025, 9, 15), DEFAULT_SUFFIX);
        assert_eq!(stem.to_string(), "ESU25_FUT_CME");
        assert_eq!(stem.trade_file_name(), "ESU25_FUT_CME.scid");
        assert_eq!(
            stem.depth_file_name(date(2025, 9, 15)),
            "ESU25_FUT_CME.2025-09-15.depth"
        );
    }

    #[test]
    fn test_stem_year_padding() {
        let stem = ContractStem::for_day("NQ", date(2007, 3, 1), "_FUT_CME");
        assert_eq!(stem.to_string(), "NQH07_FUT_CME");
    }

    #[test]
    fn test_stem_from_depth_name() {
        let day = date(2025, 9, 15);
        assert_eq!(
            stem_from_depth_name("ESU25_FUT_CME.2025-09-15.depth", day),
            Ok("ESU25_FUT_CME")
        );
        assert!(stem_from_depth_name("ESU25_FUT_CME.2025-09-16.depth", day).is_err());
        assert!(stem_from_depth_name(".2025-09-15.depth", day).is_err());
    }

    #[test]
    fn test_is_sync_output() {
        assert!(is_sync_output("ESU25_FUT_CME-SYNC"));
        assert!(is_sync_output("esu25_fut_cme-sync"));
        assert!(is_sync_output("ESU25_FUT_CME-SYNC-SYNC"));
        assert!(!is_sync_output("ESU25_FUT_CME"));
        assert!(!is_sync_output("SYNC"));
        assert!(!is_sync_output(""));
    }
}
