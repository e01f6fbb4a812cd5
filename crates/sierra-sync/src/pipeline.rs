//! Sync state machine: validate roots, discover, select, then report or
//! export.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use sierra_discovery::{DiscoveredCandidate, choose_best, discover, synthesize_stem};
use sierra_types::{SYNC_SUFFIX, depth_file_name, trade_file_name};
use tracing::{Dispatch, debug, error, info, info_span};

use crate::export::ExportJob;
use crate::{ExportReport, MissingRoot, SyncConfig, SyncError};

/// Pipeline states. `Failed` is reachable from every other state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SyncState {
    /// Checking that both storage roots exist.
    ValidatingRoots,
    /// Scanning for depth files and their trade pairs.
    Discovering,
    /// Picking one candidate.
    Selecting,
    /// Returning the plan without writing anything.
    Reporting,
    /// Writing the output pair.
    Exporting,
    /// Finished successfully.
    Done,
    /// Stopped on an error.
    Failed,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ValidatingRoots => "validating-roots",
            Self::Discovering => "discovering",
            Self::Selecting => "selecting",
            Self::Reporting => "reporting",
            Self::Exporting => "exporting",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// What to do once a candidate is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SyncMode {
    /// Report the candidates and the choice; write nothing.
    #[default]
    Plan,
    /// Write the `-SYNC` output pair.
    Export,
}

/// Parameters of one sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRequest {
    /// Symbol root, e.g. `ES`.
    pub symbol: String,
    /// Requested UTC day.
    pub day: NaiveDate,
    /// Explicit stem to use instead of the automatic choice.
    pub stem: Option<String>,
    /// Plan or export.
    pub mode: SyncMode,
    /// Literal output stem; defaults to `<stem>-SYNC`.
    pub out_stem: Option<String>,
    /// Draw progress bars while exporting.
    pub progress: bool,
}

impl SyncRequest {
    /// Creates a plan-only request.
    #[must_use]
    pub fn new(symbol: impl Into<String>, day: NaiveDate) -> Self {
        Self {
            symbol: symbol.into(),
            day,
            stem: None,
            mode: SyncMode::Plan,
            out_stem: None,
            progress: false,
        }
    }

    /// Forces the candidate with this stem (case-insensitive).
    #[must_use]
    pub fn with_stem(mut self, stem: impl Into<String>) -> Self {
        self.stem = Some(stem.into());
        self
    }

    /// Switches to export mode.
    #[must_use]
    pub fn export(mut self) -> Self {
        self.mode = SyncMode::Export;
        self
    }

    /// Uses `out_stem` literally for the outputs.
    #[must_use]
    pub fn with_out_stem(mut self, out_stem: impl Into<String>) -> Self {
        self.out_stem = Some(out_stem.into());
        self
    }

    /// Enables or disables progress bars.
    #[must_use]
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }
}

/// The selected candidate and where its outputs would go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncPlan {
    /// Requested symbol.
    pub symbol: String,
    /// Requested day.
    pub requested_day: NaiveDate,
    /// Every candidate discovered, in name order.
    pub candidates: Vec<DiscoveredCandidate>,
    /// The selected candidate.
    pub chosen: DiscoveredCandidate,
    /// Stem of the output pair.
    pub out_stem: String,
    /// Plan or export.
    pub mode: SyncMode,
}

impl SyncPlan {
    /// Day the chosen depth file belongs to; names the depth output and
    /// bounds the trade window.
    #[must_use]
    pub const fn day(&self) -> NaiveDate {
        self.chosen.day
    }

    /// Depth output filename, `<out_stem>.<day>.depth`.
    #[must_use]
    pub fn depth_output_name(&self) -> String {
        depth_file_name(&self.out_stem, self.day())
    }

    /// Trade output filename, `<out_stem>.scid`.
    #[must_use]
    pub fn trade_output_name(&self) -> String {
        trade_file_name(&self.out_stem)
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SyncOutcome {
    /// Plan mode finished.
    Planned(SyncPlan),
    /// Export mode finished.
    Exported {
        /// The executed plan.
        plan: SyncPlan,
        /// Copy statistics.
        report: ExportReport,
    },
}

impl SyncOutcome {
    /// The plan, in either mode.
    #[must_use]
    pub const fn plan(&self) -> &SyncPlan {
        match self {
            Self::Planned(plan) | Self::Exported { plan, .. } => plan,
        }
    }

    /// The export report, in export mode.
    #[must_use]
    pub const fn report(&self) -> Option<&ExportReport> {
        match self {
            Self::Planned(_) => None,
            Self::Exported { report, .. } => Some(report),
        }
    }
}

/// Runs one sync request against a configuration, tracking its state.
#[derive(Debug)]
pub struct SyncPipeline<'a> {
    config: &'a SyncConfig,
    state: SyncState,
    history: Vec<SyncState>,
}

impl<'a> SyncPipeline<'a> {
    /// Creates a pipeline in [`SyncState::ValidatingRoots`].
    #[must_use]
    pub fn new(config: &'a SyncConfig) -> Self {
        Self {
            config,
            state: SyncState::ValidatingRoots,
            history: vec![SyncState::ValidatingRoots],
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> SyncState {
        self.state
    }

    /// Every state entered so far, in order.
    #[must_use]
    pub fn history(&self) -> &[SyncState] {
        &self.history
    }

    /// Runs `request` to completion.
    ///
    /// Ends in [`SyncState::Done`] on success and [`SyncState::Failed`]
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns the [`SyncError`] that stopped the run; see
    /// [`SyncError::exit_code`] for the mapping to process exit codes.
    pub fn run(&mut self, request: &SyncRequest) -> Result<SyncOutcome, SyncError> {
        match self.drive(request) {
            Ok(outcome) => {
                self.enter(SyncState::Done);
                Ok(outcome)
            }
            Err(err) => {
                error!(state = %self.state, error = %err, "sync failed");
                self.enter(SyncState::Failed);
                Err(err)
            }
        }
    }

    fn drive(&mut self, request: &SyncRequest) -> Result<SyncOutcome, SyncError> {
        self.validate_roots()?;

        self.enter(SyncState::Discovering);
        let candidates = discover(
            &self.config.scid_root,
            &self.config.depth_root,
            &request.symbol,
            request.day,
            self.config.fallback_window_days,
        )?;
        info!(candidates = candidates.len(), "discovery finished");

        self.enter(SyncState::Selecting);
        let chosen = self.select(&candidates, request)?.clone();
        let out_stem = request
            .out_stem
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("{}{SYNC_SUFFIX}", chosen.stem));
        info!(
            stem = %chosen.stem,
            day = %chosen.day,
            paired = chosen.has_pair(),
            out_stem = %out_stem,
            "candidate selected"
        );

        let plan = SyncPlan {
            symbol: request.symbol.clone(),
            requested_day: request.day,
            candidates,
            chosen,
            out_stem,
            mode: request.mode,
        };

        match request.mode {
            SyncMode::Plan => {
                self.enter(SyncState::Reporting);
                Ok(SyncOutcome::Planned(plan))
            }
            SyncMode::Export => {
                self.enter(SyncState::Exporting);
                let report = self.export(&plan, request.progress)?;
                Ok(SyncOutcome::Exported { plan, report })
            }
        }
    }

    fn enter(&mut self, next: SyncState) {
        debug!(from = %self.state, to = %next, "state transition");
        self.state = next;
        self.history.push(next);
    }

    fn validate_roots(&self) -> Result<(), SyncError> {
        let missing: Vec<MissingRoot> = [
            ("scid_root", &self.config.scid_root),
            ("depth_root", &self.config.depth_root),
        ]
        .into_iter()
        .filter(|(_, path)| !path.exists())
        .map(|(name, path)| MissingRoot {
            name,
            path: path.clone(),
        })
        .collect();

        for root in &missing {
            error!(root = root.name, path = %root.path.display(), "storage root missing");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(SyncError::RootMissing(missing))
        }
    }

    fn select<'c>(
        &self,
        candidates: &'c [DiscoveredCandidate],
        request: &SyncRequest,
    ) -> Result<&'c DiscoveredCandidate, SyncError> {
        if let Some(stem) = &request.stem {
            return candidates
                .iter()
                .find(|c| c.stem.eq_ignore_ascii_case(stem))
                .ok_or_else(|| SyncError::StemNotFound {
                    stem: stem.clone(),
                    candidates: candidates.iter().map(|c| c.stem.clone()).collect(),
                });
        }

        choose_best(candidates).ok_or_else(|| {
            let expected = synthesize_stem(&self.config.scid_root, &request.symbol, request.day)
                .depth_file_name(request.day);
            SyncError::NoCandidates {
                symbol: request.symbol.clone(),
                day: request.day,
                expected,
            }
        })
    }

    fn export(&self, plan: &SyncPlan, progress: bool) -> Result<ExportReport, SyncError> {
        let chosen = &plan.chosen;
        let Some(trade_source) = chosen.trade_file.as_deref() else {
            return Err(SyncError::MissingPair {
                stem: chosen.stem.clone(),
                expected: self.config.scid_root.join(trade_file_name(&chosen.stem)),
            });
        };
        if !chosen.depth_file.is_file() {
            return Err(SyncError::MissingDepth {
                path: chosen.depth_file.clone(),
            });
        }

        ExportJob {
            depth_source: &chosen.depth_file,
            trade_source,
            depth_output: self.config.depth_root.join(plan.depth_output_name()),
            trade_output: self.config.scid_root.join(plan.trade_output_name()),
            day: plan.day(),
            progress,
        }
        .run()
    }
}

/// Runs a sync request and returns its process exit code.
///
/// Logging goes to `dispatch` for the duration of the call; pass
/// [`Dispatch::none`] to discard it.
///
/// `0` success, `2` missing root, `3` missing trade file, `4` missing depth
/// file / no candidates / unknown stem, `1` any other failure.
#[must_use]
pub fn run_sync(config: &SyncConfig, request: &SyncRequest, dispatch: &Dispatch) -> i32 {
    tracing::dispatcher::with_default(dispatch, || {
        let span = info_span!("sync", symbol = %request.symbol, day = %request.day);
        let _entered = span.enter();
        match SyncPipeline::new(config).run(request) {
            Ok(outcome) => {
                info!(stem = %outcome.plan().chosen.stem, "sync done");
                0
            }
            Err(err) => err.exit_code(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sierra_format::{DepthWriter, TradeWriter};
    use sierra_types::{DepthCommand, DepthRecord, TradeRecord};
    use std::fs;
    use std::path::Path;
    use tempfile::{TempDir, tempdir};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct Roots {
        _dir: TempDir,
        config: SyncConfig,
    }

    fn roots() -> Roots {
        let dir = tempdir().unwrap();
        let scid = dir.path().join("Data");
        let depth = scid.join("MarketDepthData");
        fs::create_dir_all(&depth).unwrap();
        Roots {
            config: SyncConfig::new(scid, depth),
            _dir: dir,
        }
    }

    fn write_depth(path: &Path) {
        let mut writer = DepthWriter::open(path).unwrap();
        writer
            .append(&DepthRecord::new(1, DepthCommand::ClearBook, 1, 0, 0.0, 0))
            .unwrap();
        writer.close().unwrap();
    }

    fn write_trade(path: &Path) {
        let mut writer = TradeWriter::open(path).unwrap();
        writer
            .append(&TradeRecord {
                timestamp: 1,
                open: 0.0,
                high: 1.0,
                low: 1.0,
                close: 1.0,
                num_trades: 1,
                total_volume: 1,
                bid_volume: 1,
                ask_volume: 0,
            })
            .unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn test_missing_roots_reported_together() {
        let dir = tempdir().unwrap();
        let config = SyncConfig::new(dir.path().join("a"), dir.path().join("b"));
        let mut pipeline = SyncPipeline::new(&config);

        let err = pipeline
            .run(&SyncRequest::new("ES", date(2025, 9, 15)))
            .unwrap_err();
        match &err {
            SyncError::RootMissing(missing) => {
                assert_eq!(missing.len(), 2);
                assert_eq!(missing[0].name, "scid_root");
                assert_eq!(missing[1].name, "depth_root");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(pipeline.state(), SyncState::Failed);
        assert_eq!(
            pipeline.history(),
            &[SyncState::ValidatingRoots, SyncState::Failed]
        );
        assert_eq!(
            run_sync(&config, &SyncRequest::new("ES", date(2025, 9, 15)), &Dispatch::none()),
            2
        );
    }

    #[test]
    fn test_no_candidates_names_expected_file() {
        let roots = roots();
        write_trade(&roots.config.scid_root.join("ESZ25_FUT_CME.scid"));

        let err = SyncPipeline::new(&roots.config)
            .run(&SyncRequest::new("ES", date(2025, 9, 15)))
            .unwrap_err();
        match &err {
            SyncError::NoCandidates { expected, .. } => {
                assert_eq!(expected, "ESU25_FUT_CME.2025-09-15.depth");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_plan_mode_writes_nothing() {
        let roots = roots();
        let depth = roots.config.depth_root.join("ESU25_FUT_CME.2025-09-15.depth");
        write_depth(&depth);
        let before: Vec<_> = fs::read_dir(&roots.config.depth_root).unwrap().collect();

        let mut pipeline = SyncPipeline::new(&roots.config);
        let outcome = pipeline
            .run(&SyncRequest::new("ES", date(2025, 9, 15)))
            .unwrap();

        let plan = outcome.plan();
        assert_eq!(plan.chosen.stem, "ESU25_FUT_CME");
        assert!(!plan.chosen.has_pair());
        assert_eq!(plan.out_stem, "ESU25_FUT_CME-SYNC");
        assert!(outcome.report().is_none());
        assert_eq!(
            pipeline.history(),
            &[
                SyncState::ValidatingRoots,
                SyncState::Discovering,
                SyncState::Selecting,
                SyncState::Reporting,
                SyncState::Done,
            ]
        );
        let after: Vec<_> = fs::read_dir(&roots.config.depth_root).unwrap().collect();
        assert_eq!(before.len(), after.len());
        assert!(!roots.config.scid_root.join("ESU25_FUT_CME-SYNC.scid").exists());
    }

    #[test]
    fn test_explicit_stem_is_case_insensitive() {
        let roots = roots();
        write_depth(&roots.config.depth_root.join("ESU25_FUT_CME.2025-09-15.depth"));
        write_depth(&roots.config.depth_root.join("ESZ25_FUT_CME.2025-09-15.depth"));

        let request = SyncRequest::new("ES", date(2025, 9, 15)).with_stem("esz25_fut_cme");
        let outcome = SyncPipeline::new(&roots.config).run(&request).unwrap();
        assert_eq!(outcome.plan().chosen.stem, "ESZ25_FUT_CME");

        let request = SyncRequest::new("ES", date(2025, 9, 15)).with_stem("ESH26_FUT_CME");
        let err = SyncPipeline::new(&roots.config).run(&request).unwrap_err();
        assert!(matches!(err, SyncError::StemNotFound { ref candidates, .. } if candidates.len() == 2));
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_export_requires_trade_pair() {
        let roots = roots();
        write_depth(&roots.config.depth_root.join("ESU25_FUT_CME.2025-09-15.depth"));

        let request = SyncRequest::new("ES", date(2025, 9, 15)).export();
        let mut pipeline = SyncPipeline::new(&roots.config);
        let err = pipeline.run(&request).unwrap_err();
        assert!(matches!(err, SyncError::MissingPair { .. }));
        assert_eq!(err.exit_code(), 3);
        assert_eq!(
            pipeline.history()[pipeline.history().len() - 2],
            SyncState::Exporting
        );
        assert_eq!(run_sync(&roots.config, &request, &Dispatch::none()), 3);
    }

    #[test]
    fn test_export_refuses_to_overwrite_source() {
        let roots = roots();
        write_depth(&roots.config.depth_root.join("ESU25_FUT_CME.2025-09-15.depth"));
        write_trade(&roots.config.scid_root.join("ESU25_FUT_CME.scid"));

        let request = SyncRequest::new("ES", date(2025, 9, 15))
            .export()
            .with_out_stem("ESU25_FUT_CME");
        let err = SyncPipeline::new(&roots.config).run(&request).unwrap_err();
        assert!(matches!(err, SyncError::OutputCollision { .. }));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_export_names_outputs_after_found_day() {
        let roots = roots();
        write_depth(&roots.config.depth_root.join("ESU25_FUT_CME.2025-09-17.depth"));
        write_trade(&roots.config.scid_root.join("ESU25_FUT_CME.scid"));

        let request = SyncRequest::new("ES", date(2025, 9, 15))
            .export()
            .with_out_stem("ES-TEST");
        let outcome = SyncPipeline::new(&roots.config).run(&request).unwrap();
        let report = outcome.report().unwrap();

        assert_eq!(report.day, date(2025, 9, 17));
        assert_eq!(
            report.depth.output,
            roots.config.depth_root.join("ES-TEST.2025-09-17.depth")
        );
        assert_eq!(report.trade.output, roots.config.scid_root.join("ES-TEST.scid"));
        assert_eq!(report.depth.records, 1);
        assert_eq!(report.depth.bytes, 64 + 24);
        assert_eq!(report.trade.records, 0);
        assert_eq!(report.trade.bytes, 56);
    }
}
