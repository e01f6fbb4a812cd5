//! Sync command implementation.

use crate::display::{render_plan, render_report};
use chrono::NaiveDate;
use sierra_lib::{SyncConfig, SyncPipeline, SyncRequest};
use std::process::ExitCode;

/// Arguments of the `sync` subcommand.
pub(crate) struct SyncArgs {
    pub(crate) symbol: String,
    pub(crate) date: NaiveDate,
    pub(crate) stem: Option<String>,
    pub(crate) export: bool,
    pub(crate) out_stem: Option<String>,
    pub(crate) progress: bool,
    pub(crate) json: bool,
}

impl SyncArgs {
    fn request(&self) -> SyncRequest {
        let mut request =
            SyncRequest::new(self.symbol.clone(), self.date).with_progress(self.progress);
        if let Some(stem) = &self.stem {
            request = request.with_stem(stem.clone());
        }
        if self.export {
            request = request.export();
        }
        if let Some(out_stem) = &self.out_stem {
            request = request.with_out_stem(out_stem.clone());
        }
        request
    }
}

/// Runs the sync pipeline and maps its failure to the documented exit code.
pub(crate) fn sync(config: &SyncConfig, args: SyncArgs) -> ExitCode {
    let request = args.request();
    let outcome = match SyncPipeline::new(config).run(&request) {
        Ok(outcome) => outcome,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(1));
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&outcome) {
            Ok(text) => println!("{text}"),
            Err(err) => {
                eprintln!("Error: failed to encode outcome: {err}");
                return ExitCode::FAILURE;
            }
        }
        return ExitCode::SUCCESS;
    }

    print!("{}", render_plan(outcome.plan()));
    if let Some(report) = outcome.report() {
        println!();
        print!("{}", render_report(report));
    }
    ExitCode::SUCCESS
}
