//! Directory scans for depth files and their trade pairs.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use sierra_types::{FallbackDays, is_sync_output, stem_from_depth_name, trade_file_name};
use tracing::debug;

use crate::{DiscoveredCandidate, DiscoveryError};

/// Lists depth files named `<symbol>*.<YYYY-MM-DD>.depth` under `depth_root`.
///
/// Only regular files are returned, sorted by name. Export outputs
/// (stems ending in `-SYNC`) are skipped.
///
/// # Errors
///
/// Returns [`DiscoveryError::Io`] if the directory cannot be listed.
pub fn candidates_for(
    depth_root: &Path,
    symbol: &str,
    day: NaiveDate,
) -> Result<Vec<PathBuf>, DiscoveryError> {
    let entries = fs::read_dir(depth_root).map_err(|e| DiscoveryError::io(depth_root, e))?;

    let mut found = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| DiscoveryError::io(depth_root, e))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let matches = stem_from_depth_name(name, day)
            .is_ok_and(|stem| stem.starts_with(symbol) && !is_sync_output(stem));
        if !matches {
            continue;
        }
        let path = entry.path();
        if path.is_file() {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

/// Discovers depth/trade candidates for `symbol` on `day`.
///
/// When the requested day has no depth files and `fallback_window_days > 0`,
/// nearby days are scanned nearest first (`day-1, day+1, day-2, ...`) and
/// the first day with any match is used. Each candidate records the day its
/// depth file belongs to. A missing trade file is not an error here.
///
/// # Errors
///
/// Returns [`DiscoveryError::Io`] if a root cannot be scanned.
pub fn discover(
    scid_root: &Path,
    depth_root: &Path,
    symbol: &str,
    day: NaiveDate,
    fallback_window_days: u32,
) -> Result<Vec<DiscoveredCandidate>, DiscoveryError> {
    let mut found_day = day;
    let mut depth_files = candidates_for(depth_root, symbol, day)?;

    if depth_files.is_empty() {
        for nearby in FallbackDays::new(day, fallback_window_days) {
            let files = candidates_for(depth_root, symbol, nearby)?;
            if !files.is_empty() {
                debug!(symbol, requested = %day, found = %nearby, "using depth files from nearby day");
                found_day = nearby;
                depth_files = files;
                break;
            }
        }
    }

    depth_files
        .into_iter()
        .filter_map(|depth_file| {
            let name = depth_file.file_name()?.to_str()?;
            let stem = stem_from_depth_name(name, found_day).ok()?.to_string();
            Some((stem, depth_file))
        })
        .map(|(stem, depth_file)| {
            let depth_mtime = fs::metadata(&depth_file)
                .and_then(|m| m.modified())
                .map_err(|e| DiscoveryError::io(&depth_file, e))?;
            let trade_path = scid_root.join(trade_file_name(&stem));
            let trade_file = trade_path.is_file().then_some(trade_path);
            debug!(%stem, depth = %depth_file.display(), paired = trade_file.is_some(), "candidate");
            Ok(DiscoveredCandidate {
                stem,
                trade_file,
                depth_file,
                depth_mtime,
                day: found_day,
            })
        })
        .collect()
}
