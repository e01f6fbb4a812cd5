//! Venue suffix inference from existing trade files.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use sierra_types::{ContractStem, DEFAULT_SUFFIX, TRADE_EXTENSION, is_sync_output};

use crate::DiscoveryError;

/// Month code plus two-digit year between the symbol root and the suffix.
const CONTRACT_CODE_LEN: usize = 3;

/// Infers the venue suffix used by existing `<symbol>*.scid` files.
///
/// The suffix is whatever follows `<symbol><month code><YY>` in the file
/// stem; export outputs (`-SYNC` stems) are not counted. Returns the most
/// common suffix (ties go to the lexicographically
/// smallest), or `None` when no trade file yields one.
///
/// # Errors
///
/// Returns [`DiscoveryError::Io`] if `scid_root` cannot be listed.
pub fn infer_suffix(scid_root: &Path, symbol: &str) -> Result<Option<String>, DiscoveryError> {
    let entries = fs::read_dir(scid_root).map_err(|e| DiscoveryError::io(scid_root, e))?;

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for entry in entries {
        let entry = entry.map_err(|e| DiscoveryError::io(scid_root, e))?;
        let name = entry.file_name();
        let suffix = name
            .to_str()
            .and_then(|n| n.strip_suffix(TRADE_EXTENSION)?.strip_suffix('.'))
            .filter(|stem| !is_sync_output(stem))
            .and_then(|stem| stem.strip_prefix(symbol))
            .and_then(|rest| rest.get(CONTRACT_CODE_LEN..))
            .filter(|suffix| !suffix.is_empty());
        if let Some(suffix) = suffix {
            *counts.entry(suffix.to_string()).or_default() += 1;
        }
    }

    // BTreeMap iterates in key order, so the first maximum is the smallest.
    let best = counts
        .into_iter()
        .fold(None::<(String, usize)>, |best, (suffix, n)| match best {
            Some((_, m)) if m >= n => best,
            _ => Some((suffix, n)),
        });
    Ok(best.map(|(suffix, _)| suffix))
}

/// Builds the stem a symbol's contract for `day` is expected to use.
///
/// The suffix is inferred from existing trade files, defaulting to
/// `_FUT_CME`; an unreadable trade root also falls back to the default.
#[must_use]
pub fn synthesize_stem(scid_root: &Path, symbol: &str, day: NaiveDate) -> ContractStem {
    let suffix = infer_suffix(scid_root, symbol)
        .ok()
        .flatten()
        .unwrap_or_else(|| DEFAULT_SUFFIX.to_string());
    ContractStem::for_day(symbol, day, &suffix)
}
