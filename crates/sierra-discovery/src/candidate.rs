//! Discovered depth/trade candidates and selection.

use std::cmp::Reverse;
use std::path::PathBuf;
use std::time::SystemTime;

use chrono::NaiveDate;
use serde::Serialize;

/// A depth file found for a symbol, with its paired trade file if present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredCandidate {
    /// Contract stem derived from the depth filename.
    pub stem: String,
    /// `<stem>.scid` under the trade root, when it exists.
    pub trade_file: Option<PathBuf>,
    /// The depth file.
    pub depth_file: PathBuf,
    /// Modification time of the depth file, used for ranking only.
    pub depth_mtime: SystemTime,
    /// Day the depth file belongs to; differs from the requested day when
    /// it was found by the fallback scan.
    pub day: NaiveDate,
}

impl DiscoveredCandidate {
    /// Returns true if the trade file exists.
    #[must_use]
    pub const fn has_pair(&self) -> bool {
        self.trade_file.is_some()
    }
}

/// Picks the candidate to sync.
///
/// Candidates with a trade file are preferred. Within the preferred pool the
/// newest depth file wins, and equal modification times resolve to the
/// lexicographically smallest stem. Returns `None` for an empty slice.
#[must_use]
pub fn choose_best(candidates: &[DiscoveredCandidate]) -> Option<&DiscoveredCandidate> {
    let paired = candidates.iter().any(DiscoveredCandidate::has_pair);
    candidates
        .iter()
        .filter(|c| !paired || c.has_pair())
        .max_by(|a, b| {
            (a.depth_mtime, Reverse(&a.stem)).cmp(&(b.depth_mtime, Reverse(&b.stem)))
        })
}
